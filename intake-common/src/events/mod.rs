//! Event types for the intake event system
//!
//! Provides the shared event definitions and the EventBus used by the
//! survey and capture engines to publish what happened.

mod capture_types;

pub use capture_types::{CameraFacing, CaptureExitReason, CaptureMode, CapturePhase};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Intake event types
///
/// Events are broadcast via EventBus and serialize with a `type` tag,
/// so a future remote consumer can receive them unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum IntakeEvent {
    /// An answer was written to the answer store
    AnswerRecorded {
        /// Question wire id (e.g. "chronicIllness")
        question_id: String,
        /// Step shown next ("question:age" or "exit:/review")
        next: String,
        timestamp: DateTime<Utc>,
    },

    /// The survey handed control to a route outside the question graph
    SurveyExited {
        route: String,
        timestamp: DateTime<Utc>,
    },

    /// Navigation targeted an id that is not in the catalog
    QuestionNotFound {
        question_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Guided capture moved to a new phase
    CapturePhaseChanged {
        step_index: usize,
        phase: CapturePhase,
        timestamp: DateTime<Utc>,
    },

    /// A photo was committed to the working photo set
    PhotoCaptured {
        step_index: usize,
        /// Capture target id ("front", "crown", ...)
        target: String,
        mode: CaptureMode,
        retake: bool,
        timestamp: DateTime<Utc>,
    },

    /// A capture attempt failed; the step stays current
    CaptureFailed {
        step_index: usize,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Capture returned to mode selection
    CaptureExited {
        reason: CaptureExitReason,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A complete photo set was archived into history
    ProgressArchived {
        record_id: Uuid,
        period_label: String,
        timestamp: DateTime<Utc>,
    },

    /// The review step submitted answers and photos
    IntakeSubmitted {
        submission_id: Uuid,
        answer_count: usize,
        photo_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A message was appended to the support chat
    ChatMessagePosted {
        message_id: Uuid,
        /// "patient" or "coordinator"
        sender: String,
        timestamp: DateTime<Utc>,
    },
}

impl IntakeEvent {
    /// Timestamp carried by every event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            IntakeEvent::AnswerRecorded { timestamp, .. }
            | IntakeEvent::SurveyExited { timestamp, .. }
            | IntakeEvent::QuestionNotFound { timestamp, .. }
            | IntakeEvent::CapturePhaseChanged { timestamp, .. }
            | IntakeEvent::PhotoCaptured { timestamp, .. }
            | IntakeEvent::CaptureFailed { timestamp, .. }
            | IntakeEvent::CaptureExited { timestamp, .. }
            | IntakeEvent::ProgressArchived { timestamp, .. }
            | IntakeEvent::IntakeSubmitted { timestamp, .. }
            | IntakeEvent::ChatMessagePosted { timestamp, .. } => *timestamp,
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use intake_common::events::{EventBus, IntakeEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(IntakeEvent::SurveyExited {
///     route: "/(photo-capture)/".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(IntakeEvent::SurveyExited { .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<IntakeEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<IntakeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: IntakeEvent,
    ) -> Result<usize, broadcast::error::SendError<IntakeEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: IntakeEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}
