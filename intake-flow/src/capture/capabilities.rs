//! Device capability seams
//!
//! Camera, speech synthesis, image picker and timer are external
//! collaborators. The capture engine only sees these traits, so hosts
//! plug in real hardware and tests plug in scripted fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use intake_common::config::{CaptureConfig, SpeechConfig};
use intake_common::events::CameraFacing;

use crate::error::Result;
use crate::photos::ImageRef;

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Voice used for spoken instructions
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    /// BCP 47 language tag
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
}

impl From<&SpeechConfig> for VoiceSettings {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            language: config.language.clone(),
            rate: config.rate,
            pitch: config.pitch,
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::from(&SpeechConfig::default())
    }
}

/// Gallery picker presentation options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerOptions {
    /// Only still images are offered
    pub images_only: bool,
    /// Basic crop/edit before returning
    pub allow_editing: bool,
    /// JPEG quality, 0.0-1.0
    pub quality: f32,
}

impl From<&CaptureConfig> for PickerOptions {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            images_only: true,
            allow_editing: config.allow_editing,
            quality: config.picker_quality,
        }
    }
}

/// Result of presenting the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(ImageRef),
    Cancelled,
}

#[async_trait]
pub trait Camera: Send + Sync {
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// Capture a still image with the given lens
    async fn take_picture(&self, facing: CameraFacing) -> Result<ImageRef>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text`, resolving once playback ends
    ///
    /// Implementations must resolve on failure too, never hang.
    async fn speak(&self, text: &str, voice: &VoiceSettings) -> Result<()>;
}

#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn request_permission(&self) -> Result<PermissionStatus>;

    async fn pick_image(&self, options: PickerOptions) -> Result<PickOutcome>;
}

/// Source of delays (countdown ticks, picker re-prompt, chat auto-reply)
#[async_trait]
pub trait Ticker: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Wall-clock ticker on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTicker;

#[async_trait]
impl Ticker for TokioTicker {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bundle of providers injected into the capture engine
#[derive(Clone)]
pub struct CaptureProviders {
    pub camera: Arc<dyn Camera>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub picker: Arc<dyn ImagePicker>,
    pub ticker: Arc<dyn Ticker>,
}

impl std::fmt::Debug for CaptureProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureProviders").finish_non_exhaustive()
    }
}
