//! JSON configuration for a piano session.

use std::fs;
use std::path::{Path, PathBuf};

use paper_piano_detect::{DetectError, DetectorParams, EdgeParams};
use paper_piano_touch::{joints, TouchError, TouchParams};
use serde::{Deserialize, Serialize};

use crate::sounds::SoundSelection;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Touch(#[from] TouchError),
}

fn default_tracked_joints() -> Vec<u32> {
    vec![joints::INDEX_TIP]
}

fn default_flip() -> bool {
    true
}

/// Everything a session needs besides the frames and the hand tracker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PianoConfig {
    #[serde(default)]
    pub detector: DetectorParams,
    #[serde(default)]
    pub edges: EdgeParams,
    #[serde(default)]
    pub touch: TouchParams,
    /// Hand-landmark joints treated as fingertips.
    #[serde(default = "default_tracked_joints")]
    pub tracked_joints: Vec<u32>,
    /// Mirror frames before processing (front-facing cameras).
    #[serde(default = "default_flip")]
    pub flip_horizontal: bool,
    #[serde(default)]
    pub sound_selection: SoundSelection,
    #[serde(default)]
    pub sounds_dir: Option<PathBuf>,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            detector: DetectorParams::default(),
            edges: EdgeParams::default(),
            touch: TouchParams::default(),
            tracked_joints: default_tracked_joints(),
            flip_horizontal: default_flip(),
            sound_selection: SoundSelection::default(),
            sounds_dir: None,
        }
    }
}

impl PianoConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector.validate()?;
        self.edges.validate()?;
        self.touch.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let cfg: PianoConfig = serde_json::from_str("{}").expect("json");
        assert_eq!(cfg, PianoConfig::default());
        assert_eq!(cfg.tracked_joints, vec![8]);
        assert!(cfg.flip_horizontal);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg: PianoConfig = serde_json::from_str(
            r#"{
                "edges": {"blur_strength": 3},
                "touch": {"untouch_distance": 20},
                "tracked_joints": [4, 8, 12],
                "sound_selection": "uniform"
            }"#,
        )
        .expect("json");
        assert_eq!(cfg.edges.blur_strength, 3);
        assert_eq!(cfg.edges.edge_threshold1, 10.0);
        assert_eq!(cfg.touch.untouch_distance, 20.0);
        assert_eq!(cfg.touch.touch_distance, 10.0);
        assert_eq!(cfg.tracked_joints, vec![4, 8, 12]);
        assert_eq!(cfg.sound_selection, SoundSelection::Uniform);
    }

    #[test]
    fn write_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("piano.json");
        let cfg = PianoConfig {
            flip_horizontal: false,
            sounds_dir: Some(PathBuf::from("sounds")),
            ..PianoConfig::default()
        };
        cfg.write_json(&path).expect("write");
        assert_eq!(PianoConfig::load_json(&path).expect("load"), cfg);
    }

    #[test]
    fn validation_reports_the_failing_section() {
        let mut cfg = PianoConfig::default();
        cfg.touch.touch_distance = -3.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Touch(_))));

        let mut cfg = PianoConfig::default();
        cfg.detector.adaptive_block_size = 1;
        assert!(matches!(cfg.validate(), Err(ConfigError::Detect(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            PianoConfig::load_json(dir.path().join("nope.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
