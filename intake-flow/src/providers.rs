//! Terminal-backed capability providers
//!
//! Stand-ins for device hardware when the flow runs from a terminal: a
//! directory of image files plays camera and gallery, stdout plays the
//! speech synthesizer and stdin answers prompts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use intake_common::events::CameraFacing;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::capture::capabilities::{
    Camera, ImagePicker, PermissionStatus, PickOutcome, PickerOptions, SpeechSynthesizer,
    VoiceSettings,
};
use crate::error::{Error, Result};
use crate::photos::ImageRef;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Line-oriented console shared by every prompt
#[derive(Clone)]
pub struct Console {
    lines: Arc<Mutex<Lines<BufReader<Stdin>>>>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines())),
        }
    }

    pub async fn say(&self, text: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{}\n", text).as_bytes())
            .await
            .map_err(intake_common::Error::from)?;
        stdout.flush().await.map_err(intake_common::Error::from)?;
        Ok(())
    }

    /// Print `prompt` and read one line; None at end of input
    pub async fn ask(&self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{} ", prompt).as_bytes())
            .await
            .map_err(intake_common::Error::from)?;
        stdout.flush().await.map_err(intake_common::Error::from)?;

        let line = self
            .lines
            .lock()
            .await
            .next_line()
            .await
            .map_err(intake_common::Error::from)?;
        Ok(line)
    }

    /// Yes unless the answer starts with n/h (hayır)
    pub async fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = self.ask(prompt).await?.unwrap_or_default();
        let answer = answer.trim().to_lowercase();
        Ok(!(answer.starts_with('n') || answer.starts_with('h')))
    }
}

/// Image files in `dir`, sorted by name
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(intake_common::Error::from)?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

async fn read_image(path: &Path) -> Result<ImageRef> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(intake_common::Error::from)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Image read");
    Ok(ImageRef::jpeg_from_bytes(&bytes))
}

/// Camera that "shoots" the next image file of a directory, cycling
pub struct DirectoryCamera {
    dir: PathBuf,
    cursor: Mutex<usize>,
}

impl DirectoryCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cursor: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Camera for DirectoryCamera {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        if self.dir.is_dir() {
            Ok(PermissionStatus::Granted)
        } else {
            warn!(dir = %self.dir.display(), "Camera directory missing");
            Ok(PermissionStatus::Denied)
        }
    }

    async fn take_picture(&self, facing: CameraFacing) -> Result<ImageRef> {
        if !self.dir.is_dir() {
            return Err(Error::PermissionDenied(format!(
                "camera directory {} is gone",
                self.dir.display()
            )));
        }
        let files = list_images(&self.dir)?;
        if files.is_empty() {
            return Err(Error::Capability(format!(
                "no images in {}",
                self.dir.display()
            )));
        }
        let mut cursor = self.cursor.lock().await;
        let path = &files[*cursor % files.len()];
        *cursor += 1;
        info!(path = %path.display(), ?facing, "Picture taken");
        read_image(path).await
    }
}

/// Speech written to the terminal
pub struct ConsoleSpeech {
    console: Console,
}

impl ConsoleSpeech {
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

#[async_trait]
impl SpeechSynthesizer for ConsoleSpeech {
    async fn speak(&self, text: &str, voice: &VoiceSettings) -> Result<()> {
        debug!(language = %voice.language, rate = voice.rate, pitch = voice.pitch, "Speaking");
        self.console.say(&format!("🔊 {}", text)).await
    }
}

/// Gallery picker listing a directory; blank input cancels
pub struct DirectoryPicker {
    dir: PathBuf,
    console: Console,
}

impl DirectoryPicker {
    pub fn new(dir: impl Into<PathBuf>, console: Console) -> Self {
        Self {
            dir: dir.into(),
            console,
        }
    }
}

#[async_trait]
impl ImagePicker for DirectoryPicker {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        let granted = self.dir.is_dir()
            && self
                .console
                .confirm(&format!("Galeriye ({}) erişim izni verilsin mi? [E/h]", self.dir.display()))
                .await?;
        Ok(if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    async fn pick_image(&self, options: PickerOptions) -> Result<PickOutcome> {
        debug!(?options, "Picker opened");
        let files = list_images(&self.dir)?;
        for (i, path) in files.iter().enumerate() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
            self.console.say(&format!("  [{}] {}", i + 1, name)).await?;
        }

        let Some(line) = self.console.ask("Fotoğraf numarası (boş: iptal):").await? else {
            return Ok(PickOutcome::Cancelled);
        };
        let line = line.trim();
        if line.is_empty() {
            return Ok(PickOutcome::Cancelled);
        }

        let path = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| files.get(i))
            .ok_or_else(|| Error::Capability(format!("no image numbered {}", line)))?;
        Ok(PickOutcome::Picked(read_image(path).await?))
    }
}
