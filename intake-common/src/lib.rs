//! # Intake Common Library
//!
//! Shared code for the patient intake crates:
//! - Error and Result types
//! - Configuration loading (TOML bootstrap with compiled defaults)
//! - Event types (IntakeEvent enum) and the EventBus
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use config::IntakeConfig;
pub use error::{Error, Result};
pub use events::{EventBus, IntakeEvent};
