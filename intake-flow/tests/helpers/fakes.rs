//! Scripted fake device providers
//!
//! Every fake appends to a shared call log so tests can assert the
//! exact order of speech, countdown ticks, captures and picks.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use intake_common::events::CameraFacing;
use intake_flow::capture::{
    Camera, CaptureProviders, ImagePicker, PermissionStatus, PickOutcome, PickerOptions,
    SpeechSynthesizer, Ticker, VoiceSettings,
};
use intake_flow::{Error, ImageRef, Result};
use tokio::sync::Notify;

/// One recorded provider call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CameraPermission,
    TakePicture(CameraFacing),
    Speak(String),
    Wait(Duration),
    PickerPermission,
    Pick(PickerOptions),
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }
}

/// Camera answering permission and shots from scripts
///
/// Unscripted permission requests are granted; unscripted shots return
/// `Handle("shot-N")`.
pub struct FakeCamera {
    log: CallLog,
    permissions: Mutex<VecDeque<PermissionStatus>>,
    shots: Mutex<VecDeque<std::result::Result<ImageRef, String>>>,
    taken: Mutex<usize>,
    /// When set, `take_picture` signals `entered` and waits on `release`
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakeCamera {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            permissions: Mutex::new(VecDeque::new()),
            shots: Mutex::new(VecDeque::new()),
            taken: Mutex::new(0),
            gate: None,
        }
    }

    pub fn with_permissions(self, statuses: &[PermissionStatus]) -> Self {
        self.permissions.lock().unwrap().extend(statuses.iter().copied());
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.shots.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    /// Block every shot until `release` is notified
    pub fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        self.log.push(Call::CameraPermission);
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PermissionStatus::Granted))
    }

    async fn take_picture(&self, facing: CameraFacing) -> Result<ImageRef> {
        self.log.push(Call::TakePicture(facing));
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }

        let scripted = self.shots.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(image)) => Ok(image),
            Some(Err(message)) => Err(Error::Capability(message)),
            None => {
                let mut taken = self.taken.lock().unwrap();
                *taken += 1;
                Ok(ImageRef::Handle(format!("shot-{}", *taken)))
            }
        }
    }
}

pub struct FakeSpeech {
    log: CallLog,
    fail: bool,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakeSpeech {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail: false, gate: None }
    }

    pub fn failing(log: CallLog) -> Self {
        Self { log, fail: true, gate: None }
    }

    /// Hold every utterance until `release` is notified
    pub fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn speak(&self, text: &str, _voice: &VoiceSettings) -> Result<()> {
        self.log.push(Call::Speak(text.to_string()));
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        if self.fail {
            return Err(Error::Capability("speech engine unavailable".to_string()));
        }
        Ok(())
    }
}

/// Picker replaying a script; an exhausted script is an error
pub struct FakePicker {
    log: CallLog,
    permission: std::result::Result<PermissionStatus, String>,
    picks: Mutex<VecDeque<PickOutcome>>,
    /// When set, `request_permission` signals `entered` and waits on `release`
    permission_gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakePicker {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            permission: Ok(PermissionStatus::Granted),
            picks: Mutex::new(VecDeque::new()),
            permission_gate: None,
        }
    }

    pub fn denied(mut self) -> Self {
        self.permission = Ok(PermissionStatus::Denied);
        self
    }

    /// Permission request errors instead of answering
    pub fn broken(mut self, message: &str) -> Self {
        self.permission = Err(message.to_string());
        self
    }

    pub fn gated_permission(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.permission_gate = Some((entered, release));
        self
    }

    pub fn with_picks(self, picks: Vec<PickOutcome>) -> Self {
        self.picks.lock().unwrap().extend(picks);
        self
    }
}

#[async_trait]
impl ImagePicker for FakePicker {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        self.log.push(Call::PickerPermission);
        if let Some((entered, release)) = &self.permission_gate {
            entered.notify_one();
            release.notified().await;
        }
        self.permission.clone().map_err(Error::Capability)
    }

    async fn pick_image(&self, options: PickerOptions) -> Result<PickOutcome> {
        self.log.push(Call::Pick(options));
        self.picks
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Capability("picker script exhausted".to_string()))
    }
}

/// Ticker that records the delay and returns at once
pub struct FakeTicker {
    log: CallLog,
}

impl FakeTicker {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl Ticker for FakeTicker {
    async fn wait(&self, duration: Duration) {
        self.log.push(Call::Wait(duration));
        tokio::task::yield_now().await;
    }
}

/// A full provider set sharing one call log
pub struct FakeDevices {
    pub log: CallLog,
    pub camera: FakeCamera,
    pub speech: FakeSpeech,
    pub picker: FakePicker,
}

impl Default for FakeDevices {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDevices {
    pub fn new() -> Self {
        let log = CallLog::default();
        Self {
            camera: FakeCamera::new(log.clone()),
            speech: FakeSpeech::new(log.clone()),
            picker: FakePicker::new(log.clone()),
            log,
        }
    }

    pub fn camera(mut self, f: impl FnOnce(FakeCamera) -> FakeCamera) -> Self {
        self.camera = f(self.camera);
        self
    }

    pub fn picker(mut self, f: impl FnOnce(FakePicker) -> FakePicker) -> Self {
        self.picker = f(self.picker);
        self
    }

    pub fn speech(mut self, f: impl FnOnce(FakeSpeech) -> FakeSpeech) -> Self {
        self.speech = f(self.speech);
        self
    }

    pub fn failing_speech(mut self) -> Self {
        self.speech = FakeSpeech::failing(self.log.clone());
        self
    }

    /// Providers plus the log to inspect afterwards
    pub fn build(self) -> (CaptureProviders, CallLog) {
        let ticker = FakeTicker::new(self.log.clone());
        let providers = CaptureProviders {
            camera: Arc::new(self.camera),
            speech: Arc::new(self.speech),
            picker: Arc::new(self.picker),
            ticker: Arc::new(ticker),
        };
        (providers, self.log)
    }
}

pub fn picked(name: &str) -> PickOutcome {
    PickOutcome::Picked(ImageRef::Handle(name.to_string()))
}
