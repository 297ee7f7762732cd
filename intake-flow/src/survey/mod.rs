//! Branching intake questionnaire

pub mod catalog;
pub mod engine;
pub mod navigator;
pub mod progress;
pub mod question;

pub use catalog::{SurveyCatalog, PHOTO_PREPARATION};
pub use engine::{Advance, AnswerRules, StepInput, StepView, SurveyEngine};
pub use navigator::{Location, SurveyNavigator};
pub use progress::{effective_step, ProgressCheck, ProgressSnapshot, PROGRESS_CHECKS};
pub use question::{ChoiceOption, OptionValue, QuestionKind, SurveyQuestion};
