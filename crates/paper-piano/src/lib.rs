//! Play a piano drawn on a sheet of paper.
//!
//! This crate provides:
//! - re-exports of the detector (`paper-piano-detect`), the touch validator
//!   (`paper-piano-touch`) and their shared types (`paper-piano-core`),
//! - [`PianoSession`], which runs flip, detection, hand tracking and touch
//!   validation once per camera frame,
//! - JSON configuration, sound file selection and debug overlays,
//! - the `paper-piano` command line tool (feature `cli`).
//!
//! Camera capture, hand landmark estimation and audio playback stay outside:
//! frames come in as `image::RgbImage`, fingertips through [`HandTracker`],
//! and pressed keys come out as indices and sound file paths.
//!
//! ## Quickstart
//!
//! ```no_run
//! use paper_piano::{Controls, PianoConfig, PianoSession, ScriptedHands};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PianoConfig::default();
//! let mut session = PianoSession::from_config(&config, ScriptedHands::default())?;
//! let controls = Controls::from_config(&config);
//!
//! let frame = image::open("frame.png")?.to_rgb8();
//! let outcome = session.step(&frame, &controls)?;
//! println!("{} keys, pressed {:?}", outcome.key_points.len(), outcome.pressed);
//! # Ok(())
//! # }
//! ```

pub use paper_piano_core as core;
pub use paper_piano_detect as detect;
pub use paper_piano_touch as touch;

mod config;
mod overlay;
pub mod report;
mod session;
mod sounds;

pub use config::{ConfigError, PianoConfig};
pub use overlay::{draw_overlay, mask_to_rgb};
pub use session::{
    Controls, FrameOutcome, HandTracker, PianoSession, ScriptedHands, SessionError,
};
pub use sounds::{SoundBank, SoundError, SoundSelection};

pub use paper_piano_core::{KeyPoint, Quad};
pub use paper_piano_detect::{DetectionResult, DetectorParams, EdgeParams, PaperDetector};
pub use paper_piano_touch::{Fingertip, Hand, TouchParams, TouchValidator};
