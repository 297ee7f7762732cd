//! Test helper modules for intake-flow integration tests
//!
//! - fakes: scripted camera, speech, picker and ticker with a shared call log
//! - session helpers: isolated sessions and pre-filled photo sets

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{picked, Call, CallLog, FakeCamera, FakeDevices, FakePicker, FakeSpeech, FakeTicker};

use intake_common::config::IntakeConfig;
use intake_flow::{ImageRef, IntakeSession};

/// Fresh session on the built-in catalog with default config
pub fn session() -> IntakeSession {
    IntakeSession::new(IntakeConfig::default()).expect("default session")
}

/// Fill every working photo slot with `prefix-N` handles
pub async fn fill_photos(session: &IntakeSession, prefix: &str) {
    let photos = session.photos();
    let mut photos = photos.write().await;
    for i in 0..5 {
        photos
            .set_photo(i, ImageRef::Handle(format!("{}-{}", prefix, i)))
            .expect("slot in range");
    }
}
