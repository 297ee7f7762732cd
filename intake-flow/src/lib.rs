//! # Patient Intake Flow (intake-flow)
//!
//! Guided intake for a hair-transplant clinic: a branching medical
//! questionnaire, five standardized reference photos (voice-guided,
//! manual or gallery), review and submission, and the patient dashboard
//! read models.
//!
//! **Architecture:** two in-memory stores (answers, photos) shared by
//! handle; step engines that return routes instead of owning screens;
//! device capabilities (camera, speech, picker, timer) behind async
//! traits.

pub mod answers;
pub mod capture;
pub mod dashboard;
pub mod error;
pub mod photos;
pub mod providers;
pub mod review;
pub mod routes;
pub mod session;
pub mod survey;

pub use answers::{AnswerStore, AnswerValue, QuestionId};
pub use error::{Error, Result};
pub use photos::{ImageRef, PhotoStore, ProgressRecord};
pub use routes::{NextStep, Route};
pub use session::IntakeSession;
