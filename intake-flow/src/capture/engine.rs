//! Capture step engine
//!
//! Drives one capture session over the five capture steps with one of
//! three acquisition strategies and writes each image into the shared
//! photo set.
//!
//! # Concurrency
//!
//! The engine is a cheap `Clone` handle; every clone drives the same
//! session. Session state sits behind a `tokio::sync::Mutex` that is
//! never held across a camera, speech, picker or timer await. The
//! `capturing` flag is the only re-entry guard: a capture attempt while
//! one is in flight is ignored.
//!
//! `abandon()` bumps the session generation. Every in-flight operation
//! remembers the generation it started under and drops its result if
//! the generation has moved on.

use std::sync::Arc;
use std::time::Duration;

use intake_common::config::IntakeConfig;
use intake_common::events::{
    CameraFacing, CaptureExitReason, CaptureMode, CapturePhase, EventBus, IntakeEvent,
};
use intake_common::time;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::capture::capabilities::{
    CaptureProviders, PermissionStatus, PickOutcome, PickerOptions, VoiceSettings,
};
use crate::capture::sequencer::{GuidedAction, GuidedEvent, GuidedSequencer};
use crate::capture::steps::{CaptureStep, CAPTURE_STEPS};
use crate::error::{Error, Result};
use crate::photos::{ImageRef, PhotoStore, PHOTO_SLOT_COUNT};
use crate::routes::Route;

/// Shown when the camera is refused twice
pub const CAMERA_PERMISSION_MESSAGE: &str = "Kamera izni gerekiyor";
/// Shown when gallery access is refused
pub const GALLERY_PERMISSION_MESSAGE: &str = "Galeri izni vermeniz gerekiyor.";
const PICKER_CANCELLED_MESSAGE: &str = "Galeri seçimi iptal edildi";

/// Timing and device options for a capture session
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    pub countdown_from: u8,
    /// Countdown cadence
    pub tick: Duration,
    /// Delay before the picker re-opens for the next gallery step
    pub gallery_reprompt: Duration,
    pub picker: PickerOptions,
    pub voice: VoiceSettings,
    pub default_facing: CameraFacing,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self::from(&IntakeConfig::default())
    }
}

impl From<&IntakeConfig> for CaptureSettings {
    fn from(config: &IntakeConfig) -> Self {
        let capture = &config.capture;
        Self {
            countdown_from: capture.countdown_from,
            tick: time::millis_to_duration(capture.tick_ms),
            gallery_reprompt: time::millis_to_duration(capture.gallery_reprompt_ms),
            picker: PickerOptions::from(capture),
            voice: VoiceSettings::from(&config.speech),
            default_facing: capture.default_facing.parse().unwrap_or_default(),
        }
    }
}

/// Camera access as seen by this session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAccess {
    NotRequested,
    Granted,
    /// Refused once; the patient may ask again
    DeniedOnce,
    Refused,
}

/// Result of a capture engine operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Session can capture
    Ready,
    /// Photo committed; `next_index` is now current
    Advanced { next_index: usize },
    /// Photo committed and the session hands off to `route` (review)
    Finished(Route),
    /// Session gave up and returns to `route` (mode selection)
    Exited {
        route: Route,
        reason: CaptureExitReason,
        message: String,
    },
    /// Camera refused once; ask again or leave
    PermissionRequired,
    /// Gallery cancelled past the first step; same step, pick again
    Reprompt,
    /// Attempt failed; step unchanged and free to retry
    Failed(String),
    /// Duplicate trigger while a capture is in flight, or session over
    Ignored,
    /// Result arrived after the session was abandoned
    Abandoned,
}

/// Read-only view of the session for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureStatus {
    pub mode: CaptureMode,
    pub step_index: usize,
    pub retake: Option<usize>,
    pub capturing: bool,
    pub countdown: Option<u8>,
    pub phase: CapturePhase,
    pub facing: CameraFacing,
    pub camera: CameraAccess,
    pub finished: bool,
}

#[derive(Debug)]
struct SessionState {
    mode: CaptureMode,
    step_index: usize,
    retake: Option<usize>,
    capturing: bool,
    countdown: Option<u8>,
    phase: CapturePhase,
    facing: CameraFacing,
    camera: CameraAccess,
    gallery: Option<PermissionStatus>,
    generation: u64,
    finished: Option<Route>,
}

/// Ticket for one in-flight capture attempt
#[derive(Debug, Clone, Copy)]
struct Attempt {
    generation: u64,
    index: usize,
}

enum Admission {
    Go(Attempt),
    Busy,
    NeedsPermission,
    Over,
}

#[derive(Clone)]
pub struct CaptureEngine {
    state: Arc<Mutex<SessionState>>,
    photos: Arc<RwLock<PhotoStore>>,
    providers: CaptureProviders,
    settings: CaptureSettings,
    events: Option<EventBus>,
}

impl std::fmt::Debug for CaptureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CaptureEngine {
    /// New session for `mode`; `retake` re-captures a single slot
    pub fn new(
        mode: CaptureMode,
        retake: Option<usize>,
        photos: Arc<RwLock<PhotoStore>>,
        providers: CaptureProviders,
        settings: CaptureSettings,
    ) -> Result<Self> {
        if let Some(index) = retake {
            if index >= PHOTO_SLOT_COUNT {
                return Err(Error::SlotOutOfRange(index));
            }
        }

        let state = SessionState {
            mode,
            step_index: retake.unwrap_or(0),
            retake,
            capturing: false,
            countdown: None,
            phase: CapturePhase::Idle,
            facing: settings.default_facing,
            camera: CameraAccess::NotRequested,
            gallery: None,
            generation: 0,
            finished: None,
        };
        info!(%mode, ?retake, "Capture session created");

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            photos,
            providers,
            settings,
            events: None,
        })
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn status(&self) -> CaptureStatus {
        let state = self.state.lock().await;
        CaptureStatus {
            mode: state.mode,
            step_index: state.step_index,
            retake: state.retake,
            capturing: state.capturing,
            countdown: state.countdown,
            phase: state.phase,
            facing: state.facing,
            camera: state.camera,
            finished: state.finished.is_some(),
        }
    }

    /// Step the session is on
    pub async fn current_step(&self) -> &'static CaptureStep {
        let index = self.state.lock().await.step_index;
        &CAPTURE_STEPS[index.min(PHOTO_SLOT_COUNT - 1)]
    }

    /// Enter the capture screen
    ///
    /// Camera modes ask for camera permission; gallery permission is
    /// asked right before the first pick.
    pub async fn start(&self) -> CaptureOutcome {
        let mode = self.state.lock().await.mode;
        if mode.uses_camera() {
            self.request_camera_permission().await
        } else {
            CaptureOutcome::Ready
        }
    }

    /// Ask for camera access; a second refusal leaves the flow
    pub async fn request_camera_permission(&self) -> CaptureOutcome {
        let generation = self.state.lock().await.generation;
        let status = match self.providers.camera.request_permission().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Camera permission request failed");
                return CaptureOutcome::Failed(e.to_string());
            }
        };

        let mut state = self.state.lock().await;
        if state.generation != generation {
            return CaptureOutcome::Abandoned;
        }
        if status.is_granted() {
            info!("Camera permission granted");
            state.camera = CameraAccess::Granted;
            return CaptureOutcome::Ready;
        }

        match state.camera {
            CameraAccess::NotRequested | CameraAccess::Granted => {
                warn!("Camera permission denied");
                state.camera = CameraAccess::DeniedOnce;
                CaptureOutcome::PermissionRequired
            }
            CameraAccess::DeniedOnce | CameraAccess::Refused => {
                warn!("Camera permission refused again, leaving capture");
                state.camera = CameraAccess::Refused;
                state.finished = Some(Route::ModeSelection);
                drop(state);
                self.exit(CaptureExitReason::PermissionDenied, CAMERA_PERMISSION_MESSAGE)
            }
        }
    }

    /// Flip between front and back camera; progression is unaffected
    pub async fn toggle_facing(&self) -> Result<CameraFacing> {
        let mut state = self.state.lock().await;
        if !state.mode.uses_camera() {
            return Err(Error::InvalidState(format!(
                "{} mode has no camera to flip",
                state.mode
            )));
        }
        state.facing = state.facing.toggled();
        debug!(facing = ?state.facing, "Camera facing toggled");
        Ok(state.facing)
    }

    /// Leave the capture screen; in-flight work is dropped when it lands
    pub async fn abandon(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.capturing = false;
        state.countdown = None;
        state.phase = CapturePhase::Idle;
        info!(step = state.step_index, "Capture session abandoned");
    }

    /// Shutter press in manual mode
    pub async fn capture_manual(&self) -> Result<CaptureOutcome> {
        self.ensure_mode(CaptureMode::Manual).await?;
        let attempt = match self.admit().await {
            Admission::Go(attempt) => attempt,
            other => return Ok(other.into_outcome()),
        };

        let Some(facing) = self.lens(attempt).await else {
            return Ok(CaptureOutcome::Abandoned);
        };
        match self.providers.camera.take_picture(facing).await {
            Ok(image) => self.commit(attempt, image).await,
            Err(e) => Ok(self.fail(attempt, e.to_string()).await),
        }
    }

    /// One guided step: speak, count down, capture
    pub async fn run_guided_step(&self) -> Result<CaptureOutcome> {
        self.ensure_mode(CaptureMode::Guided).await?;
        let attempt = match self.admit().await {
            Admission::Go(attempt) => attempt,
            other => return Ok(other.into_outcome()),
        };
        let step = &CAPTURE_STEPS[attempt.index];
        let mut sequencer = GuidedSequencer::new(self.settings.countdown_from);
        let mut action = sequencer.handle(GuidedEvent::Begin);

        while let Some(next) = action {
            if !self.enter_phase(attempt, sequencer.phase()).await {
                return Ok(CaptureOutcome::Abandoned);
            }
            action = match next {
                GuidedAction::Speak => {
                    if let Err(e) = self.providers.speech.speak(step.voice_instruction, &self.settings.voice).await {
                        warn!(step = step.id, error = %e, "Speech failed, continuing with countdown");
                    }
                    sequencer.handle(GuidedEvent::SpeechFinished)
                }
                GuidedAction::ShowCountdown(n) => {
                    debug!(step = step.id, remaining = n, "Countdown");
                    self.providers.ticker.wait(self.settings.tick).await;
                    sequencer.handle(GuidedEvent::Tick)
                }
                GuidedAction::TakePicture => {
                    // Facing may have been flipped during speech or countdown
                    let Some(facing) = self.lens(attempt).await else {
                        return Ok(CaptureOutcome::Abandoned);
                    };
                    match self.providers.camera.take_picture(facing).await {
                        Ok(image) => {
                            sequencer.handle(GuidedEvent::CaptureFinished);
                            if !self.enter_phase(attempt, sequencer.phase()).await {
                                return Ok(CaptureOutcome::Abandoned);
                            }
                            return self.commit(attempt, image).await;
                        }
                        Err(e) => {
                            sequencer.handle(GuidedEvent::CaptureFailed);
                            return Ok(self.fail(attempt, e.to_string()).await);
                        }
                    }
                }
                GuidedAction::Commit | GuidedAction::Release => None,
            };
        }

        Ok(CaptureOutcome::Failed("guided sequence stalled".to_string()))
    }

    /// Guided mode self-triggers on every step until review or a stop
    pub async fn run_guided(&self) -> Result<CaptureOutcome> {
        loop {
            match self.run_guided_step().await? {
                CaptureOutcome::Advanced { .. } => continue,
                outcome => return Ok(outcome),
            }
        }
    }

    /// Pick one image for the current step from the gallery
    pub async fn import_from_gallery(&self) -> Result<CaptureOutcome> {
        self.ensure_mode(CaptureMode::Gallery).await?;
        if let Some(exit) = self.ensure_gallery_permission().await {
            return Ok(exit);
        }
        let attempt = match self.admit().await {
            Admission::Go(attempt) => attempt,
            other => return Ok(other.into_outcome()),
        };

        match self.providers.picker.pick_image(self.settings.picker).await {
            Ok(PickOutcome::Picked(image)) => self.commit(attempt, image).await,
            Ok(PickOutcome::Cancelled) => Ok(self.cancelled(attempt).await),
            Err(e) => Ok(self.fail(attempt, e.to_string()).await),
        }
    }

    /// Gallery mode: keep re-opening the picker until review or a stop
    pub async fn run_gallery(&self) -> Result<CaptureOutcome> {
        loop {
            match self.import_from_gallery().await? {
                CaptureOutcome::Advanced { .. } | CaptureOutcome::Reprompt => {
                    self.providers.ticker.wait(self.settings.gallery_reprompt).await;
                }
                outcome => return Ok(outcome),
            }
        }
    }

    async fn ensure_mode(&self, expected: CaptureMode) -> Result<()> {
        let mode = self.state.lock().await.mode;
        if mode != expected {
            return Err(Error::InvalidState(format!(
                "{} capture requested in a {} session",
                expected, mode
            )));
        }
        Ok(())
    }

    /// None when picking may proceed, otherwise the outcome to report
    async fn ensure_gallery_permission(&self) -> Option<CaptureOutcome> {
        let generation = {
            let state = self.state.lock().await;
            if state.gallery == Some(PermissionStatus::Granted) {
                return None;
            }
            state.generation
        };

        let status = match self.providers.picker.request_permission().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Gallery permission request failed");
                return Some(CaptureOutcome::Failed(e.to_string()));
            }
        };

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("Stale gallery permission result ignored");
            return Some(CaptureOutcome::Abandoned);
        }
        state.gallery = Some(status);
        if status.is_granted() {
            info!("Gallery permission granted");
            return None;
        }

        warn!("Gallery permission denied, leaving capture");
        state.finished = Some(Route::ModeSelection);
        drop(state);
        Some(self.exit(CaptureExitReason::PermissionDenied, GALLERY_PERMISSION_MESSAGE))
    }

    /// Claim the in-progress flag for the current step
    async fn admit(&self) -> Admission {
        let mut state = self.state.lock().await;
        if state.finished.is_some() {
            return Admission::Over;
        }
        if state.capturing {
            debug!(step = state.step_index, "Capture already in progress, ignoring trigger");
            return Admission::Busy;
        }
        if state.mode.uses_camera() && state.camera != CameraAccess::Granted {
            return Admission::NeedsPermission;
        }
        state.capturing = true;
        Admission::Go(Attempt {
            generation: state.generation,
            index: state.step_index,
        })
    }

    /// Record a guided phase; false if the attempt went stale
    async fn enter_phase(&self, attempt: Attempt, phase: CapturePhase) -> bool {
        let mut state = self.state.lock().await;
        if state.generation != attempt.generation {
            debug!(step = attempt.index, %phase, "Stale guided phase ignored");
            return false;
        }
        state.phase = phase;
        state.countdown = match phase {
            CapturePhase::CountingDown(n) => Some(n),
            _ => None,
        };
        drop(state);

        self.emit(IntakeEvent::CapturePhaseChanged {
            step_index: attempt.index,
            phase,
            timestamp: time::now(),
        });
        true
    }

    /// Lens to shoot with right now; None if the attempt went stale
    async fn lens(&self, attempt: Attempt) -> Option<CameraFacing> {
        let state = self.state.lock().await;
        (state.generation == attempt.generation).then_some(state.facing)
    }

    async fn commit(&self, attempt: Attempt, image: ImageRef) -> Result<CaptureOutcome> {
        let mut state = self.state.lock().await;
        if state.generation != attempt.generation {
            debug!(step = attempt.index, "Stale capture result ignored");
            return Ok(CaptureOutcome::Abandoned);
        }
        state.capturing = false;
        state.countdown = None;
        state.phase = CapturePhase::Done;

        self.photos.write().await.set_photo(attempt.index, image)?;

        let step = &CAPTURE_STEPS[attempt.index];
        info!(
            step = step.id,
            index = attempt.index,
            mode = %state.mode,
            retake = state.retake.is_some(),
            "Photo captured"
        );
        self.emit(IntakeEvent::PhotoCaptured {
            step_index: attempt.index,
            target: step.id.to_string(),
            mode: state.mode,
            retake: state.retake.is_some(),
            timestamp: time::now(),
        });

        if state.retake.is_some() || attempt.index + 1 >= PHOTO_SLOT_COUNT {
            state.finished = Some(Route::Review);
            info!("Capture finished, handing off to review");
            return Ok(CaptureOutcome::Finished(Route::Review));
        }

        state.step_index = attempt.index + 1;
        state.phase = CapturePhase::Idle;
        Ok(CaptureOutcome::Advanced {
            next_index: state.step_index,
        })
    }

    async fn fail(&self, attempt: Attempt, message: String) -> CaptureOutcome {
        let mut state = self.state.lock().await;
        if state.generation != attempt.generation {
            debug!(step = attempt.index, "Stale capture failure ignored");
            return CaptureOutcome::Abandoned;
        }
        state.capturing = false;
        state.countdown = None;
        state.phase = CapturePhase::Idle;
        drop(state);

        warn!(step = attempt.index, error = %message, "Capture failed");
        self.emit(IntakeEvent::CaptureFailed {
            step_index: attempt.index,
            message: message.clone(),
            timestamp: time::now(),
        });
        CaptureOutcome::Failed(message)
    }

    async fn cancelled(&self, attempt: Attempt) -> CaptureOutcome {
        let mut state = self.state.lock().await;
        if state.generation != attempt.generation {
            return CaptureOutcome::Abandoned;
        }
        state.capturing = false;

        if attempt.index == 0 {
            info!("Gallery cancelled on first step, leaving capture");
            state.finished = Some(Route::ModeSelection);
            drop(state);
            return self.exit(CaptureExitReason::PickerCancelled, PICKER_CANCELLED_MESSAGE);
        }

        debug!(step = attempt.index, "Gallery cancelled, picking again");
        CaptureOutcome::Reprompt
    }

    fn exit(&self, reason: CaptureExitReason, message: &str) -> CaptureOutcome {
        self.emit(IntakeEvent::CaptureExited {
            reason,
            message: message.to_string(),
            timestamp: time::now(),
        });
        CaptureOutcome::Exited {
            route: Route::ModeSelection,
            reason,
            message: message.to_string(),
        }
    }

    fn emit(&self, event: IntakeEvent) {
        if let Some(events) = &self.events {
            events.emit_lossy(event);
        }
    }
}

impl Admission {
    fn into_outcome(self) -> CaptureOutcome {
        match self {
            Admission::NeedsPermission => CaptureOutcome::PermissionRequired,
            Admission::Busy | Admission::Over | Admission::Go(_) => CaptureOutcome::Ignored,
        }
    }
}
