//! Photo store
//!
//! Holds the working photo set (one slot per capture target, in the
//! fixed capture order) and the history of archived progress records.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Number of reference photos in a set
pub const PHOTO_SLOT_COUNT: usize = 5;

const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Reference to captured image bytes
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
    /// Inline `data:` URI carrying the encoded image
    DataUri(String),
    /// Opaque handle owned by the platform (file URI, asset id)
    Handle(String),
}

impl ImageRef {
    /// Wrap raw JPEG bytes as a data URI
    pub fn jpeg_from_bytes(bytes: &[u8]) -> Self {
        ImageRef::DataUri(format!("{}{}", JPEG_DATA_URI_PREFIX, STANDARD.encode(bytes)))
    }

    /// Wrap already base64-encoded JPEG data as a data URI
    pub fn jpeg_from_base64(encoded: &str) -> Self {
        ImageRef::DataUri(format!("{}{}", JPEG_DATA_URI_PREFIX, encoded))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::DataUri(s) | ImageRef::Handle(s) => s,
        }
    }

    /// Decode the payload of a base64 data URI
    ///
    /// Returns None for handles and non-base64 URIs.
    pub fn decode_bytes(&self) -> Option<Vec<u8>> {
        let ImageRef::DataUri(uri) = self else {
            return None;
        };
        let (_, payload) = uri.split_once(";base64,")?;
        STANDARD.decode(payload).ok()
    }
}

impl std::fmt::Debug for ImageRef {
    // Data URIs run to megabytes; show only their size
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageRef::DataUri(s) => write!(f, "DataUri({} bytes)", s.len()),
            ImageRef::Handle(s) => write!(f, "Handle({:?})", s),
        }
    }
}

/// Named viewing angle of a progress photo, in slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Angle {
    Front,
    Top,
    Left,
    Right,
    Back,
}

impl Angle {
    pub const ALL: [Angle; PHOTO_SLOT_COUNT] =
        [Angle::Front, Angle::Top, Angle::Left, Angle::Right, Angle::Back];

    pub fn key(&self) -> &'static str {
        match self {
            Angle::Front => "front",
            Angle::Top => "top",
            Angle::Left => "left",
            Angle::Right => "right",
            Angle::Back => "back",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Angle::Front => "Ön",
            Angle::Top => "Tepe",
            Angle::Left => "Sol",
            Angle::Right => "Sağ",
            Angle::Back => "Ense",
        }
    }

    /// Slot index this angle is captured into
    pub fn slot(&self) -> usize {
        match self {
            Angle::Front => 0,
            Angle::Top => 1,
            Angle::Left => 2,
            Angle::Right => 3,
            Angle::Back => 4,
        }
    }
}

/// A complete photo set keyed by angle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnglePhotos {
    pub front: ImageRef,
    pub top: ImageRef,
    pub left: ImageRef,
    pub right: ImageRef,
    pub back: ImageRef,
}

impl AnglePhotos {
    pub fn get(&self, angle: Angle) -> &ImageRef {
        match angle {
            Angle::Front => &self.front,
            Angle::Top => &self.top,
            Angle::Left => &self.left,
            Angle::Right => &self.right,
            Angle::Back => &self.back,
        }
    }
}

/// Archived, immutable photo session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: Uuid,
    /// Capture date label ("2024-11-04")
    pub date_label: String,
    /// Treatment period label ("initial", "month-1")
    pub period_label: String,
    pub photos: AnglePhotos,
    pub note: Option<String>,
    pub archived_at: DateTime<Utc>,
}

/// Working photo set plus progress history
#[derive(Debug, Clone, Default)]
pub struct PhotoStore {
    slots: [Option<ImageRef>; PHOTO_SLOT_COUNT],
    history: Vec<ProgressRecord>,
}

impl PhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite slot `index` unconditionally
    pub fn set_photo(&mut self, index: usize, image: ImageRef) -> Result<()> {
        let slot = self.slots.get_mut(index).ok_or(Error::SlotOutOfRange(index))?;
        debug!(index, image = ?image, "Photo slot set");
        *slot = Some(image);
        Ok(())
    }

    /// Reset all working slots to empty; history is kept
    pub fn clear_photos(&mut self) {
        self.slots = Default::default();
    }

    pub fn photo(&self, index: usize) -> Option<&ImageRef> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn slots(&self) -> &[Option<ImageRef>; PHOTO_SLOT_COUNT] {
        &self.slots
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.filled_count() == PHOTO_SLOT_COUNT
    }

    /// Archive the working set as a progress record
    ///
    /// Only effective when every slot is filled: the record is appended
    /// to history and the working set is cleared. Otherwise nothing
    /// changes and None is returned.
    pub fn archive_to_progress(
        &mut self,
        date_label: &str,
        period_label: &str,
        note: Option<String>,
    ) -> Option<&ProgressRecord> {
        let [Some(front), Some(top), Some(left), Some(right), Some(back)] = self.slots.clone() else {
            debug!(filled = self.filled_count(), "Archive skipped: photo set incomplete");
            return None;
        };

        let record = ProgressRecord {
            id: Uuid::new_v4(),
            date_label: date_label.to_string(),
            period_label: period_label.to_string(),
            photos: AnglePhotos { front, top, left, right, back },
            note,
            archived_at: intake_common::time::now(),
        };
        info!(
            record_id = %record.id,
            period = %record.period_label,
            "Photo set archived to progress history"
        );

        self.history.push(record);
        self.clear_photos();
        self.history.last()
    }

    /// Archived records, oldest first
    pub fn history(&self) -> &[ProgressRecord] {
        &self.history
    }
}
