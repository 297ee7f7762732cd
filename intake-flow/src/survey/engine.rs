//! Survey step engine
//!
//! Looks up the question for a navigation location, decides whether the
//! patient's input allows continuing, records the answer and returns the
//! next step. The engine never moves the location itself; the navigator
//! (or any other host) owns that.

use std::sync::Arc;

use intake_common::config::SurveyConfig;
use intake_common::events::{EventBus, IntakeEvent};
use intake_common::time;
use tracing::{debug, info, warn};

use crate::answers::{AnswerStore, AnswerValue, QuestionId};
use crate::error::{Error, Result};
use crate::routes::NextStep;
use crate::survey::catalog::SurveyCatalog;
use crate::survey::question::{QuestionKind, SurveyQuestion};

/// Input validation bounds for text questions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRules {
    /// Inclusive numeric bounds for numeric-text questions
    pub min_age: i64,
    pub max_age: i64,
    /// Minimum trimmed character count for long-text questions
    pub min_long_text_len: usize,
}

impl Default for AnswerRules {
    fn default() -> Self {
        Self::from(&SurveyConfig::default())
    }
}

impl From<&SurveyConfig> for AnswerRules {
    fn from(config: &SurveyConfig) -> Self {
        Self {
            min_age: config.min_age,
            max_age: config.max_age,
            min_long_text_len: config.min_long_text_len,
        }
    }
}

/// What to render for a navigation location
#[derive(Debug, Clone, PartialEq)]
pub enum StepView<'a> {
    Question(&'a SurveyQuestion),
    /// Inert dead end for an id outside the catalog
    NotFound { requested: String },
}

/// Patient input for the current step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    /// Draft of a text question
    Text(String),
    /// Index of the tapped option of a choice question
    Choice(usize),
    /// Continue from an instructional step
    Acknowledge,
}

/// Result of an advance attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Input did not satisfy the question; nothing recorded
    Blocked,
    /// Answer recorded (if any) and the flow moves on
    Moved(NextStep),
}

/// Stateless engine over a survey catalog
#[derive(Debug, Clone)]
pub struct SurveyEngine {
    catalog: Arc<SurveyCatalog>,
    rules: AnswerRules,
    events: Option<EventBus>,
}

impl SurveyEngine {
    pub fn new(catalog: Arc<SurveyCatalog>, rules: AnswerRules) -> Self {
        Self {
            catalog,
            rules,
            events: None,
        }
    }

    /// Publish recorded answers and exits on `events`
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn catalog(&self) -> &SurveyCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &AnswerRules {
        &self.rules
    }

    /// Resolve a raw location id to something renderable
    pub fn view(&self, raw: &str) -> StepView<'_> {
        let found = raw
            .parse::<QuestionId>()
            .ok()
            .and_then(|id| self.catalog.get(id));

        match found {
            Some(question) => StepView::Question(question),
            None => {
                warn!(question_id = raw, "Survey question not found");
                if let Some(events) = &self.events {
                    events.emit_lossy(IntakeEvent::QuestionNotFound {
                        question_id: raw.to_string(),
                        timestamp: time::now(),
                    });
                }
                StepView::NotFound {
                    requested: raw.to_string(),
                }
            }
        }
    }

    /// Whether a text draft enables the continue action
    ///
    /// Choice and instructional questions are always actionable; their
    /// options (or the continue button) are the trigger.
    ///
    /// Drafts are trimmed first, so whitespace-only text never enables
    /// continue.
    pub fn can_continue(&self, question: &SurveyQuestion, draft: &str) -> bool {
        let value = draft.trim();
        match question.kind {
            QuestionKind::ShortText => !value.is_empty(),
            QuestionKind::NumericText => value
                .parse::<i64>()
                .map(|n| n >= self.rules.min_age && n <= self.rules.max_age)
                .unwrap_or(false),
            QuestionKind::LongText => value.chars().count() >= self.rules.min_long_text_len,
            QuestionKind::YesNo | QuestionKind::MultipleChoice | QuestionKind::Instructional => true,
        }
    }

    /// Record the answer for `question` and return where to go next
    ///
    /// Blocked input leaves `answers` untouched. Input of the wrong kind
    /// for the question is an error.
    pub fn advance(
        &self,
        question: &SurveyQuestion,
        input: StepInput,
        answers: &mut AnswerStore,
    ) -> Result<Advance> {
        let (value, next) = match (question.kind, input) {
            (QuestionKind::Instructional, StepInput::Acknowledge) => {
                (None, self.default_next(question)?)
            }
            (kind, StepInput::Text(draft)) if kind.is_text() => {
                if !self.can_continue(question, &draft) {
                    debug!(question_id = %question.id, "Continue blocked by input rules");
                    return Ok(Advance::Blocked);
                }
                let value = AnswerValue::Text(draft.trim().to_string());
                (Some(value), self.default_next(question)?)
            }
            (kind, StepInput::Choice(index)) if kind.is_choice() => {
                let option = question.options.get(index).ok_or_else(|| Error::InvalidAnswer {
                    question: question.id.to_string(),
                    reason: format!("no option at index {}", index),
                })?;
                let next = question.option_target(index).cloned().ok_or_else(|| {
                    Error::Catalog(format!("{} option {} has no next step", question.id, index))
                })?;
                (Some(option.value.to_answer()), next)
            }
            (kind, input) => {
                return Err(Error::InvalidAnswer {
                    question: question.id.to_string(),
                    reason: format!("{:?} does not answer a {:?} question", input, kind),
                });
            }
        };

        if let Some(value) = value {
            info!(
                question_id = %question.id,
                answer = %value.display(),
                next = %next,
                "Answer recorded"
            );
            answers.update(question.id, value);
            self.emit(IntakeEvent::AnswerRecorded {
                question_id: question.id.to_string(),
                next: next.to_string(),
                timestamp: time::now(),
            });
        }

        if let NextStep::Exit(route) = &next {
            info!(from = %question.id, route = %route, "Survey exited question graph");
            self.emit(IntakeEvent::SurveyExited {
                route: route.path(),
                timestamp: time::now(),
            });
        }

        Ok(Advance::Moved(next))
    }

    /// Title with `{name}` replaced by the recorded name
    pub fn render_title(&self, question: &SurveyQuestion, answers: &AnswerStore) -> String {
        if question.kind != QuestionKind::Instructional {
            return question.title.clone();
        }
        question
            .title
            .replace("{name}", answers.patient_name().unwrap_or_default())
    }

    /// Draft a text question opens with: the earlier answer, if any
    pub fn initial_draft(&self, question: &SurveyQuestion, answers: &AnswerStore) -> String {
        answers
            .get(question.id)
            .map(|value| value.display())
            .unwrap_or_default()
    }

    fn default_next(&self, question: &SurveyQuestion) -> Result<NextStep> {
        question
            .next
            .clone()
            .ok_or_else(|| Error::Catalog(format!("{} has no next step", question.id)))
    }

    fn emit(&self, event: IntakeEvent) {
        if let Some(events) = &self.events {
            events.emit_lossy(event);
        }
    }
}
