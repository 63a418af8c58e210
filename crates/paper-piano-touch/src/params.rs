use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the touch validator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TouchError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Position a tracked fingertip's release distance is measured from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReference {
    /// Where the fingertip was when it first touched the key. A finger that
    /// first lands near the edge of the touch radius keeps that reference
    /// for as long as it stays tracked.
    #[default]
    FirstContact,
    /// The fingertip's position on the previous cycle it stayed tracked.
    Latest,
}

/// Hysteresis distances in frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchParams {
    /// A fingertip closer than this to a key starts resting on it.
    pub touch_distance: f32,
    /// A resting fingertip farther than this from its reference is released.
    pub untouch_distance: f32,
    pub release_reference: ReleaseReference,
}

impl Default for TouchParams {
    fn default() -> Self {
        Self {
            touch_distance: 10.0,
            untouch_distance: 15.0,
            release_reference: ReleaseReference::FirstContact,
        }
    }
}

impl TouchParams {
    /// Both distances must be finite and non-negative. Their relative order
    /// is not enforced; an untouch distance below the touch distance simply
    /// makes presses flicker.
    pub fn validate(&self) -> Result<(), TouchError> {
        check_distance("touch_distance", self.touch_distance)?;
        check_distance("untouch_distance", self.untouch_distance)
    }
}

fn check_distance(name: &'static str, v: f32) -> Result<(), TouchError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(TouchError::InvalidParameter {
            name,
            reason: format!("expected a finite distance >= 0, got {v}"),
        })
    }
}
