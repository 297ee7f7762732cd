//! Reference photo capture
//!
//! Five fixed capture steps, three acquisition strategies (guided,
//! manual, gallery), device capabilities behind async traits.

pub mod capabilities;
pub mod engine;
pub mod sequencer;
pub mod steps;

pub use capabilities::{
    Camera, CaptureProviders, ImagePicker, PermissionStatus, PickOutcome, PickerOptions,
    SpeechSynthesizer, Ticker, TokioTicker, VoiceSettings,
};
pub use engine::{CameraAccess, CaptureEngine, CaptureOutcome, CaptureSettings, CaptureStatus};
pub use sequencer::{GuidedAction, GuidedEvent, GuidedSequencer};
pub use steps::{CaptureStep, OverlayShape, CAPTURE_STEPS};
