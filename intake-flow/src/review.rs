//! Review and submission
//!
//! Reads both stores to summarize the intake, then submits it. There is
//! no backend yet: submitting logs the payload, archives the photo set
//! into progress history and clears the answers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use intake_common::events::{CaptureMode, EventBus, IntakeEvent};
use intake_common::time;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::answers::AnswerStore;
use crate::capture::steps::CAPTURE_STEPS;
use crate::error::{Error, Result};
use crate::photos::{PhotoStore, PHOTO_SLOT_COUNT};
use crate::routes::Route;

/// One tile of the review grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    pub index: usize,
    pub step_id: &'static str,
    pub title: &'static str,
    pub filled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub entries: Vec<ReviewEntry>,
    /// Submit is enabled only when every slot is filled
    pub complete: bool,
    pub answers: serde_json::Value,
}

/// Payload handed to the (future) intake backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub id: Uuid,
    pub answers: serde_json::Value,
    pub photo_count: usize,
    pub submitted_at: DateTime<Utc>,
}

/// What a successful submit produced
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub submission: Submission,
    pub record_id: Uuid,
    pub period_label: String,
    /// Completion screen, carrying the patient's name
    pub route: Route,
}

#[derive(Debug, Clone)]
pub struct ReviewDesk {
    answers: Arc<RwLock<AnswerStore>>,
    photos: Arc<RwLock<PhotoStore>>,
    events: Option<EventBus>,
}

impl ReviewDesk {
    pub fn new(answers: Arc<RwLock<AnswerStore>>, photos: Arc<RwLock<PhotoStore>>) -> Self {
        Self {
            answers,
            photos,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn summary(&self) -> ReviewSummary {
        let answers = self.answers.read().await.to_json();
        let photos = self.photos.read().await;
        let entries = CAPTURE_STEPS
            .iter()
            .enumerate()
            .map(|(index, step)| ReviewEntry {
                index,
                step_id: step.id,
                title: step.title,
                filled: photos.photo(index).is_some(),
            })
            .collect();

        ReviewSummary {
            entries,
            complete: photos.is_complete(),
            answers,
        }
    }

    /// Submit answers and photos
    ///
    /// Fails without side effects unless all five photos are present.
    pub async fn submit(&self) -> Result<SubmitReceipt> {
        let mut answers = self.answers.write().await;
        let mut photos = self.photos.write().await;

        if !photos.is_complete() {
            return Err(Error::InvalidState(format!(
                "cannot submit with {} of {} photos",
                photos.filled_count(),
                PHOTO_SLOT_COUNT
            )));
        }

        let submission = Submission {
            id: Uuid::new_v4(),
            answers: answers.to_json(),
            photo_count: photos.filled_count(),
            submitted_at: time::now(),
        };
        info!(
            submission_id = %submission.id,
            answers = %submission.answers,
            photo_count = submission.photo_count,
            "Intake submitted"
        );

        let period_label = match photos.history().len() {
            0 => "initial".to_string(),
            n => format!("month-{}", n),
        };
        let date_label = time::date_label(submission.submitted_at);
        let record_id = photos
            .archive_to_progress(&date_label, &period_label, None)
            .map(|record| record.id)
            .ok_or_else(|| Error::InvalidState("photo set changed during submit".to_string()))?;

        let patient_name = answers.patient_name().map(str::to_string);
        let answer_count = answers.len();
        answers.reset();

        self.emit(IntakeEvent::ProgressArchived {
            record_id,
            period_label: period_label.clone(),
            timestamp: time::now(),
        });
        self.emit(IntakeEvent::IntakeSubmitted {
            submission_id: submission.id,
            answer_count,
            photo_count: submission.photo_count,
            timestamp: time::now(),
        });

        Ok(SubmitReceipt {
            submission,
            record_id,
            period_label,
            route: Route::Completion { patient_name },
        })
    }

    /// Re-shoot one photo in manual mode, then come back here
    pub fn retake(&self, index: usize) -> Result<Route> {
        if index >= PHOTO_SLOT_COUNT {
            return Err(Error::SlotOutOfRange(index));
        }
        info!(index, step = CAPTURE_STEPS[index].id, "Retake requested");
        Ok(Route::Capture {
            mode: CaptureMode::Manual,
            retake: Some(index),
        })
    }

    /// Discard the working photos and pick a capture mode again
    pub async fn redo_all(&self) -> Route {
        self.photos.write().await.clear_photos();
        info!("Photo set cleared, restarting capture");
        Route::ModeSelection
    }

    fn emit(&self, event: IntakeEvent) {
        if let Some(events) = &self.events {
            events.emit_lossy(event);
        }
    }
}

/// Greeting on the completion screen
pub fn completion_greeting(patient_name: Option<&str>) -> String {
    let name = patient_name.filter(|n| !n.is_empty()).unwrap_or("Smile Ailesi");
    format!("Tebrikler {}, Smile Ailesi'ne hoş geldiniz! 🎉", name)
}

/// "What happens next" on the completion screen
pub const NEXT_STEPS: [&str; 3] = [
    "Medikal ekibimiz bilgilerinizi ve fotoğraflarınızı detaylı olarak inceleyecektir",
    "Kıdemli uzmanlarımız size özel saç ekimi planını hazırlayacaktır",
    "Hasta koordinatörünüz en kısa sürede sizinle iletişime geçecektir",
];
