//! Touch validation for paper keyboards.
//!
//! [`TouchValidator`] keeps, per key index, the set of fingertips resting on
//! the key and reports a press when that set goes from empty to non-empty.
//! Entering uses [`TouchParams::touch_distance`] to the key, leaving uses the
//! larger [`TouchParams::untouch_distance`] to the fingertip's reference
//! position, so a finger hovering near the edge does not retrigger.

mod fingertip;
mod params;
mod validator;

pub use fingertip::{joints, Fingertip, FingertipId, Hand};
pub use params::{ReleaseReference, TouchError, TouchParams};
pub use validator::{TouchValidator, TrackedKey};
