//! Guided capture sequencer
//!
//! Pure state machine for one guided step:
//!
//! ```text
//! Idle --Begin--> Speaking --SpeechFinished--> CountingDown(n)
//! CountingDown(n) --Tick--> CountingDown(n-1) ... CountingDown(1) --Tick--> Capturing
//! Capturing --CaptureFinished--> Done
//! Capturing --CaptureFailed--> Idle
//! ```
//!
//! The sequencer performs no I/O. Each accepted event yields the action
//! the driver must perform next; events that do not fit the current
//! phase are ignored and yield nothing.

use intake_common::events::CapturePhase;
use tracing::debug;

/// Input to the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidedEvent {
    Begin,
    /// Speech resolved (finished or failed)
    SpeechFinished,
    /// One countdown interval elapsed
    Tick,
    CaptureFinished,
    CaptureFailed,
}

/// Work the driver must perform after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidedAction {
    /// Speak the step's voice instruction and report SpeechFinished
    Speak,
    /// Show `n`, wait one interval, report Tick
    ShowCountdown(u8),
    /// Take the picture and report CaptureFinished or CaptureFailed
    TakePicture,
    /// Write the image to the photo set
    Commit,
    /// Release the in-progress flag; the step stays current
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidedSequencer {
    phase: CapturePhase,
    countdown_from: u8,
}

impl GuidedSequencer {
    pub fn new(countdown_from: u8) -> Self {
        Self {
            phase: CapturePhase::Idle,
            countdown_from,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// Remaining countdown value while counting down
    pub fn countdown(&self) -> Option<u8> {
        match self.phase {
            CapturePhase::CountingDown(n) => Some(n),
            _ => None,
        }
    }

    /// Back to Idle for the next step
    pub fn reset(&mut self) {
        self.phase = CapturePhase::Idle;
    }

    pub fn handle(&mut self, event: GuidedEvent) -> Option<GuidedAction> {
        let (phase, action) = match (self.phase, event) {
            (CapturePhase::Idle, GuidedEvent::Begin) => (CapturePhase::Speaking, GuidedAction::Speak),
            (CapturePhase::Speaking, GuidedEvent::SpeechFinished) => self.count_from(self.countdown_from),
            (CapturePhase::CountingDown(n), GuidedEvent::Tick) => self.count_from(n.saturating_sub(1)),
            (CapturePhase::Capturing, GuidedEvent::CaptureFinished) => {
                (CapturePhase::Done, GuidedAction::Commit)
            }
            (CapturePhase::Capturing, GuidedEvent::CaptureFailed) => {
                (CapturePhase::Idle, GuidedAction::Release)
            }
            (phase, event) => {
                debug!(%phase, ?event, "Guided event ignored");
                return None;
            }
        };
        self.phase = phase;
        Some(action)
    }

    fn count_from(&self, n: u8) -> (CapturePhase, GuidedAction) {
        if n == 0 {
            (CapturePhase::Capturing, GuidedAction::TakePicture)
        } else {
            (CapturePhase::CountingDown(n), GuidedAction::ShowCountdown(n))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sequence_speaks_counts_then_captures() {
        let mut seq = GuidedSequencer::new(3);
        assert_eq!(seq.handle(GuidedEvent::Begin), Some(GuidedAction::Speak));
        assert_eq!(seq.phase(), CapturePhase::Speaking);
        assert_eq!(seq.handle(GuidedEvent::SpeechFinished), Some(GuidedAction::ShowCountdown(3)));
        assert_eq!(seq.handle(GuidedEvent::Tick), Some(GuidedAction::ShowCountdown(2)));
        assert_eq!(seq.handle(GuidedEvent::Tick), Some(GuidedAction::ShowCountdown(1)));
        assert_eq!(seq.countdown(), Some(1));
        assert_eq!(seq.handle(GuidedEvent::Tick), Some(GuidedAction::TakePicture));
        assert_eq!(seq.countdown(), None);
        assert_eq!(seq.handle(GuidedEvent::CaptureFinished), Some(GuidedAction::Commit));
        assert_eq!(seq.phase(), CapturePhase::Done);
    }

    #[test]
    fn test_countdown_cannot_start_while_speaking() {
        let mut seq = GuidedSequencer::new(3);
        seq.handle(GuidedEvent::Begin);
        assert_eq!(seq.handle(GuidedEvent::Tick), None);
        assert_eq!(seq.handle(GuidedEvent::CaptureFinished), None);
        assert_eq!(seq.phase(), CapturePhase::Speaking);
    }

    #[test]
    fn test_begin_is_not_reentrant() {
        let mut seq = GuidedSequencer::new(3);
        seq.handle(GuidedEvent::Begin);
        assert_eq!(seq.handle(GuidedEvent::Begin), None);
    }

    #[test]
    fn test_capture_failure_returns_to_idle() {
        let mut seq = GuidedSequencer::new(1);
        seq.handle(GuidedEvent::Begin);
        seq.handle(GuidedEvent::SpeechFinished);
        assert_eq!(seq.handle(GuidedEvent::Tick), Some(GuidedAction::TakePicture));
        assert_eq!(seq.handle(GuidedEvent::CaptureFailed), Some(GuidedAction::Release));
        assert_eq!(seq.phase(), CapturePhase::Idle);
        assert_eq!(seq.handle(GuidedEvent::Begin), Some(GuidedAction::Speak));
    }

    #[test]
    fn test_zero_countdown_captures_after_speech() {
        let mut seq = GuidedSequencer::new(0);
        seq.handle(GuidedEvent::Begin);
        assert_eq!(seq.handle(GuidedEvent::SpeechFinished), Some(GuidedAction::TakePicture));
    }

    #[test]
    fn test_done_requires_reset() {
        let mut seq = GuidedSequencer::new(0);
        seq.handle(GuidedEvent::Begin);
        seq.handle(GuidedEvent::SpeechFinished);
        seq.handle(GuidedEvent::CaptureFinished);
        assert_eq!(seq.handle(GuidedEvent::Begin), None);
        seq.reset();
        assert_eq!(seq.handle(GuidedEvent::Begin), Some(GuidedAction::Speak));
    }
}
