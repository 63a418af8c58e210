//! Per-frame orchestration: flip, detect, locate fingertips, validate.

use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

use image::{imageops, RgbImage};
use log::debug;
use paper_piano_core::{KeyPoint, Quad};
use paper_piano_detect::{DetectError, DetectionResult, EdgeParams, PaperDetector};
use paper_piano_touch::{Fingertip, TouchError, TouchParams, TouchValidator};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::PianoConfig;
use crate::sounds::{SoundBank, SoundSelection};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Touch(#[from] TouchError),
}

/// Source of fingertip positions for a frame.
pub trait HandTracker {
    /// Fingertips among `joints` visible in `frame`, in frame pixels.
    fn fingertips(&mut self, frame: &RgbImage, joints: &[u32]) -> Vec<Fingertip>;
}

/// Replays prerecorded fingertip lists, one per call. Once exhausted it
/// reports no fingertips.
#[derive(Clone, Debug, Default)]
pub struct ScriptedHands {
    frames: VecDeque<Vec<Fingertip>>,
}

impl ScriptedHands {
    pub fn new(frames: impl IntoIterator<Item = Vec<Fingertip>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, fingertips: Vec<Fingertip>) {
        self.frames.push_back(fingertips);
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl HandTracker for ScriptedHands {
    fn fingertips(&mut self, _frame: &RgbImage, joints: &[u32]) -> Vec<Fingertip> {
        let mut tips = self.frames.pop_front().unwrap_or_default();
        tips.retain(|t| joints.contains(&t.joint));
        tips
    }
}

/// Values read from the control panel each cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub edges: EdgeParams,
    pub touch: TouchParams,
    /// Keep the last detected key layout instead of detecting again.
    pub freeze_keys: bool,
    pub tracked_joints: Vec<u32>,
}

impl Controls {
    pub fn from_config(config: &PianoConfig) -> Self {
        Self {
            edges: config.edges,
            touch: config.touch,
            freeze_keys: false,
            tracked_joints: config.tracked_joints.clone(),
        }
    }
}

/// What one [`PianoSession::step`] produced.
#[derive(Clone, Debug)]
pub struct FrameOutcome {
    /// The frame after the optional flip; all positions refer to it.
    pub frame: RgbImage,
    /// Fresh detection, `None` while the key layout is frozen.
    pub detection: Option<DetectionResult>,
    pub quad: Option<Quad>,
    pub key_points: Vec<KeyPoint>,
    pub fingertips: Vec<Fingertip>,
    /// Keys pressed this cycle.
    pub pressed: BTreeSet<usize>,
    /// Sound files for `pressed`, in key order, when a bank is attached.
    pub sounds: Vec<PathBuf>,
}

/// Owns the detector, the validator and the hand tracker, and runs them in
/// order once per frame.
pub struct PianoSession<H: HandTracker> {
    detector: PaperDetector,
    validator: TouchValidator,
    hands: H,
    flip_horizontal: bool,
    sounds: Option<(SoundBank, SoundSelection)>,
    quad: Option<Quad>,
    keys: Vec<KeyPoint>,
}

impl<H: HandTracker> PianoSession<H> {
    pub fn new(detector: PaperDetector, hands: H) -> Self {
        Self {
            detector,
            validator: TouchValidator::new(),
            hands,
            flip_horizontal: false,
            sounds: None,
            quad: None,
            keys: Vec::new(),
        }
    }

    /// Build a session from a validated config. The sound bank is not loaded
    /// here; see [`PianoSession::with_sounds`].
    pub fn from_config(config: &PianoConfig, hands: H) -> Result<Self, DetectError> {
        let detector = PaperDetector::new(config.detector.clone())?;
        Ok(Self::new(detector, hands).with_flip(config.flip_horizontal))
    }

    pub fn with_flip(mut self, flip_horizontal: bool) -> Self {
        self.flip_horizontal = flip_horizontal;
        self
    }

    pub fn with_sounds(mut self, bank: SoundBank, selection: SoundSelection) -> Self {
        self.sounds = Some((bank, selection));
        self
    }

    #[inline]
    pub fn key_points(&self) -> &[KeyPoint] {
        &self.keys
    }

    #[inline]
    pub fn validator(&self) -> &TouchValidator {
        &self.validator
    }

    #[inline]
    pub fn hands(&self) -> &H {
        &self.hands
    }

    /// Run one cycle on a raw camera frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame, controls), fields(frozen = controls.freeze_keys))
    )]
    pub fn step(
        &mut self,
        frame: &RgbImage,
        controls: &Controls,
    ) -> Result<FrameOutcome, SessionError> {
        let frame = if self.flip_horizontal {
            imageops::flip_horizontal(frame)
        } else {
            frame.clone()
        };

        let detection = if controls.freeze_keys {
            None
        } else {
            let result = self.detector.process(&frame, &controls.edges)?;
            self.quad = result.quad;
            self.keys = result.key_points.clone();
            Some(result)
        };

        let fingertips = self.hands.fingertips(&frame, &controls.tracked_joints);
        let pressed = self
            .validator
            .process(&self.keys, &fingertips, &controls.touch)?;

        let sounds = match &self.sounds {
            Some((bank, selection)) => pressed
                .iter()
                .filter_map(|&i| bank.resolve(self.keys.len(), i, *selection))
                .map(PathBuf::from)
                .collect(),
            None => Vec::new(),
        };
        if !pressed.is_empty() {
            debug!("pressed {pressed:?} -> {} sounds", sounds.len());
        }

        Ok(FrameOutcome {
            frame,
            detection,
            quad: self.quad,
            key_points: self.keys.clone(),
            fingertips,
            pressed,
            sounds,
        })
    }
}
