//! Navigation boundary
//!
//! The engines never own screen transitions. They return a `Route`
//! naming where the host should go next, or a `NextStep` that is either
//! another survey question or an exit out of the question graph.

use intake_common::events::CaptureMode;
use serde::{Deserialize, Serialize};

use crate::answers::QuestionId;

/// Destinations outside the survey question graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "kebab-case")]
pub enum Route {
    /// Landing screen that starts the intake
    Welcome,
    /// Photo capture mode selection
    ModeSelection,
    /// Capture screen for a mode, optionally retaking one slot
    Capture {
        mode: CaptureMode,
        #[serde(default)]
        retake: Option<usize>,
    },
    /// Photo review and submission
    Review,
    /// Post-submission confirmation
    Completion {
        #[serde(default)]
        patient_name: Option<String>,
    },
    /// Patient dashboard tabs
    Dashboard,
}

impl Route {
    /// Path form, as a router would address it
    pub fn path(&self) -> String {
        match self {
            Route::Welcome => "/".to_string(),
            Route::ModeSelection => "/(photo-capture)/".to_string(),
            Route::Capture { mode, retake: None } => format!("/(photo-capture)/{}", mode),
            Route::Capture { mode, retake: Some(index) } => {
                format!("/(photo-capture)/{}?retakeIndex={}", mode, index)
            }
            Route::Review => "/(photo-capture)/review".to_string(),
            Route::Completion { .. } => "/completion".to_string(),
            Route::Dashboard => "/(tabs)/".to_string(),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where a survey step leads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    /// Another question in the graph
    Question(QuestionId),
    /// Leave the survey for an external route
    Exit(Route),
}

impl std::fmt::Display for NextStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextStep::Question(id) => write!(f, "question:{}", id),
            NextStep::Exit(route) => write!(f, "exit:{}", route),
        }
    }
}
