//! JSON reports and replay scripts used by the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use paper_piano_detect::DetectionSummary;
use paper_piano_touch::Fingertip;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ReportIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Read any JSON document from disk.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ReportIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write `value` to disk as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), ReportIoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Result of `paper-piano detect`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectReport {
    pub image_path: String,
    pub frame_size: [u32; 2],
    #[serde(flatten)]
    pub detection: DetectionSummary,
}

/// One recorded cycle: a frame on disk and the fingertips seen in it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Image path; relative paths are resolved against the script's directory.
    pub image: PathBuf,
    #[serde(default)]
    pub fingertips: Vec<Fingertip>,
    #[serde(default)]
    pub freeze_keys: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub frames: Vec<ReplayFrame>,
}

impl ReplayScript {
    /// Image paths with relative entries resolved against `base`.
    pub fn image_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.frames
            .iter()
            .map(|f| {
                if f.image.is_absolute() {
                    f.image.clone()
                } else {
                    base.join(&f.image)
                }
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrameReport {
    pub frame: usize,
    pub key_count: usize,
    pub found_sheet: bool,
    pub pressed: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sounds: Vec<PathBuf>,
}

/// Result of `paper-piano replay`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub frames: Vec<ReplayFrameReport>,
}

impl ReplayReport {
    /// Every `(frame, key)` press in the replay, in order.
    pub fn presses(&self) -> Vec<(usize, usize)> {
        self.frames
            .iter()
            .flat_map(|f| f.pressed.iter().map(move |&k| (f.frame, k)))
            .collect()
    }
}
