//! Survey navigator
//!
//! Owns the navigation location and back stack for one survey run and
//! drives the step engine against the shared answer store. Failures are
//! logged and leave the patient where they were.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::answers::{AnswerStore, QuestionId};
use crate::routes::{NextStep, Route};
use crate::survey::engine::{Advance, StepInput, StepView, SurveyEngine};
use crate::survey::progress::ProgressSnapshot;
use crate::survey::question::{QuestionKind, SurveyQuestion};

/// Current navigation location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Question(QuestionId),
    /// Dead end for an unknown id
    NotFound(String),
    /// Control left the question graph
    Exited(Route),
}

pub struct SurveyNavigator {
    engine: SurveyEngine,
    answers: Arc<RwLock<AnswerStore>>,
    location: Location,
    history: Vec<QuestionId>,
}

impl SurveyNavigator {
    /// Navigator positioned on the first question; answers are left as is
    pub fn new(engine: SurveyEngine, answers: Arc<RwLock<AnswerStore>>) -> Self {
        let location = Location::Question(engine.catalog().first().id);
        Self {
            engine,
            answers,
            location,
            history: Vec::new(),
        }
    }

    pub fn engine(&self) -> &SurveyEngine {
        &self.engine
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Question at the current location, if there is one
    pub fn current_question(&self) -> Option<&SurveyQuestion> {
        match &self.location {
            Location::Question(id) => self.engine.catalog().get(*id),
            _ => None,
        }
    }

    /// Restart the intake: clear answers and land on the first question
    pub async fn start(&mut self) -> &Location {
        self.answers.write().await.reset();
        self.history.clear();
        self.location = Location::Question(self.engine.catalog().first().id);
        info!(first = ?self.location, "Survey started");
        &self.location
    }

    /// Jump to a raw location id (deep link, route parameter)
    pub fn go_to(&mut self, raw: &str) -> &Location {
        let next = match self.engine.view(raw) {
            StepView::Question(question) => Location::Question(question.id),
            StepView::NotFound { requested } => Location::NotFound(requested),
        };
        if let Location::Question(current) = self.location {
            self.history.push(current);
        }
        self.location = next;
        &self.location
    }

    /// Apply patient input to the current question
    ///
    /// Errors are logged and reported as `Advance::Blocked`; the
    /// location does not move.
    pub async fn submit(&mut self, input: StepInput) -> Advance {
        let Location::Question(current) = self.location else {
            error!(location = ?self.location, "Survey input outside a question");
            return Advance::Blocked;
        };
        let result = match self.engine.catalog().require(current) {
            Ok(question) => {
                let mut answers = self.answers.write().await;
                self.engine.advance(question, input, &mut answers)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(Advance::Moved(next)) => {
                self.history.push(current);
                self.location = match &next {
                    NextStep::Question(id) => Location::Question(*id),
                    NextStep::Exit(route) => Location::Exited(route.clone()),
                };
                debug!(from = %current, to = ?self.location, "Survey moved");
                Advance::Moved(next)
            }
            Ok(Advance::Blocked) => Advance::Blocked,
            Err(e) => {
                error!(question_id = %current, error = %e, "Survey advance failed");
                Advance::Blocked
            }
        }
    }

    /// Back is offered on answerable questions other than the first
    pub fn can_go_back(&self) -> bool {
        match self.current_question() {
            Some(question) => {
                question.kind != QuestionKind::Instructional
                    && question.id != self.engine.catalog().first().id
                    && !self.history.is_empty()
            }
            None => false,
        }
    }

    /// Return to the previous question; false when back is not offered
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        match self.history.pop() {
            Some(previous) => {
                debug!(to = %previous, "Survey back");
                self.location = Location::Question(previous);
                true
            }
            None => false,
        }
    }

    /// Progress bar state; hidden off-graph and on instructional steps
    pub async fn progress(&self) -> Option<ProgressSnapshot> {
        let question = self.current_question()?;
        if question.kind == QuestionKind::Instructional {
            return None;
        }
        let answers = self.answers.read().await;
        Some(ProgressSnapshot::from_answers(&answers))
    }

    /// Rendered title of the current question
    pub async fn current_title(&self) -> Option<String> {
        let question = self.current_question()?;
        let answers = self.answers.read().await;
        Some(self.engine.render_title(question, &answers))
    }

    /// Pre-filled draft of the current question
    pub async fn current_draft(&self) -> Option<String> {
        let question = self.current_question()?;
        let answers = self.answers.read().await;
        Some(self.engine.initial_draft(question, &answers))
    }
}
