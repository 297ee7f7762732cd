//! Capture-related type definitions
//!
//! Supporting types for the photo capture flow, shared by the engine
//! and by event consumers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How photos are acquired for a capture session
///
/// Chosen once on the mode selection screen and fixed for the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Voice-guided hands-free capture: speak, count down, shoot
    #[serde(rename = "studio")]
    Guided,
    /// User presses the shutter
    Manual,
    /// Photos are picked from the device gallery
    Gallery,
}

impl CaptureMode {
    pub const ALL: [CaptureMode; 3] = [CaptureMode::Guided, CaptureMode::Manual, CaptureMode::Gallery];

    /// Route segment for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Guided => "studio",
            CaptureMode::Manual => "manual",
            CaptureMode::Gallery => "gallery",
        }
    }

    /// Whether the mode drives the camera (as opposed to the picker)
    pub fn uses_camera(&self) -> bool {
        !matches!(self, CaptureMode::Gallery)
    }
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "studio" | "guided" => Ok(CaptureMode::Guided),
            "manual" => Ok(CaptureMode::Manual),
            "gallery" => Ok(CaptureMode::Gallery),
            other => Err(format!("unknown capture mode: {}", other)),
        }
    }
}

/// Phase of the guided capture sequence for one step
///
/// Idle → Speaking → CountingDown(n..1) → Capturing → Done
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", content = "remaining", rename_all = "snake_case")]
pub enum CapturePhase {
    Idle,
    Speaking,
    CountingDown(u8),
    Capturing,
    Done,
}

impl std::fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapturePhase::Idle => write!(f, "Idle"),
            CapturePhase::Speaking => write!(f, "Speaking"),
            CapturePhase::CountingDown(n) => write!(f, "CountingDown({})", n),
            CapturePhase::Capturing => write!(f, "Capturing"),
            CapturePhase::Done => write!(f, "Done"),
        }
    }
}

/// Camera lens direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    #[default]
    Front,
    Back,
}

impl CameraFacing {
    pub fn toggled(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

impl FromStr for CameraFacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(CameraFacing::Front),
            "back" => Ok(CameraFacing::Back),
            other => Err(format!("unknown camera facing: {}", other)),
        }
    }
}

/// Why a capture session handed control back to mode selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaptureExitReason {
    /// Camera or gallery access refused
    PermissionDenied,
    /// Picker dismissed on the first step
    PickerCancelled,
}

impl std::fmt::Display for CaptureExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureExitReason::PermissionDenied => write!(f, "permission denied"),
            CaptureExitReason::PickerCancelled => write!(f, "picker cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parses_route_segment_and_alias() {
        for mode in CaptureMode::ALL {
            assert_eq!(mode.as_str().parse::<CaptureMode>(), Ok(mode));
        }
        assert_eq!("guided".parse::<CaptureMode>(), Ok(CaptureMode::Guided));
        assert!("selfie".parse::<CaptureMode>().is_err());
    }

    #[test]
    fn test_countdown_phase_serializes_remaining() {
        let json = serde_json::to_value(CapturePhase::CountingDown(2)).unwrap();
        assert_eq!(json, serde_json::json!({ "phase": "counting_down", "remaining": 2 }));
    }
}
