use std::fmt;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Hand-landmark joint ids of the fingertips (21-point hand model).
pub mod joints {
    pub const THUMB_TIP: u32 = 4;
    pub const INDEX_TIP: u32 = 8;
    pub const MIDDLE_TIP: u32 = 12;
    pub const RING_TIP: u32 = 16;
    pub const PINKY_TIP: u32 = 20;

    /// All five fingertips, thumb first.
    pub const FINGERTIPS: [u32; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
}

/// Handedness label reported by the hand tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hand::Left => f.write_str("left"),
            Hand::Right => f.write_str("right"),
        }
    }
}

/// Identity of a fingertip across frames. Position plays no part in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FingertipId {
    pub hand: Hand,
    pub joint: u32,
}

impl fmt::Display for FingertipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.hand, self.joint)
    }
}

/// One fingertip observation in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fingertip {
    pub hand: Hand,
    pub joint: u32,
    pub position: Point2<f32>,
}

impl Fingertip {
    pub fn new(hand: Hand, joint: u32, position: Point2<f32>) -> Self {
        Self {
            hand,
            joint,
            position,
        }
    }

    #[inline]
    pub fn id(&self) -> FingertipId {
        FingertipId {
            hand: self.hand,
            joint: self.joint,
        }
    }
}
