use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};
use nalgebra::Point2;
use paper_piano_core::KeyPoint;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Fingertip, FingertipId, ReleaseReference, TouchError, TouchParams};

/// Per-key hysteresis state: the fingertips currently resting on the key.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedKey {
    /// Key position seen on the latest cycle.
    pub position: Point2<f32>,
    /// Resting fingertips with their reference positions.
    pub contacts: BTreeMap<FingertipId, Point2<f32>>,
}

impl TrackedKey {
    fn at(position: Point2<f32>) -> Self {
        Self {
            position,
            contacts: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn is_touched(&self) -> bool {
        !self.contacts.is_empty()
    }
}

/// Turns key positions and fingertip observations into key press events.
///
/// State is kept per key index. Whenever the number of keys changes, all
/// state is dropped and every key starts untouched again.
#[derive(Clone, Debug, Default)]
pub struct TouchValidator {
    keys: Vec<TrackedKey>,
}

impl TouchValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one validation cycle and return the indices of keys that went
    /// from no resting fingertip to at least one.
    ///
    /// Fingertips missing from `fingertips` keep their associations; only
    /// moving beyond the untouch distance releases them. Releases are not
    /// reported.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, keys, fingertips, params),
            fields(keys = keys.len(), fingertips = fingertips.len())
        )
    )]
    pub fn process(
        &mut self,
        keys: &[KeyPoint],
        fingertips: &[Fingertip],
        params: &TouchParams,
    ) -> Result<BTreeSet<usize>, TouchError> {
        params.validate()?;

        if keys.len() != self.keys.len() {
            debug!(
                "key count changed {} -> {}, dropping touch state",
                self.keys.len(),
                keys.len()
            );
            self.keys = keys.iter().map(|k| TrackedKey::at(k.position)).collect();
        }

        let mut pressed = BTreeSet::new();
        for (i, (key, tracked)) in keys.iter().zip(self.keys.iter_mut()).enumerate() {
            tracked.position = key.position;
            for tip in fingertips {
                let id = tip.id();
                match tracked.contacts.get(&id).copied() {
                    Some(reference) => {
                        let moved = nalgebra::distance(&tip.position, &reference);
                        if moved > params.untouch_distance {
                            trace!("key {i}: {id} released after moving {moved:.1}px");
                            tracked.contacts.remove(&id);
                        } else if params.release_reference == ReleaseReference::Latest {
                            tracked.contacts.insert(id, tip.position);
                        }
                    }
                    None => {
                        let dist = nalgebra::distance(&tip.position, &key.position);
                        if dist < params.touch_distance {
                            let was_free = tracked.contacts.is_empty();
                            tracked.contacts.insert(id, tip.position);
                            trace!("key {i}: {id} touching at {dist:.1}px");
                            if was_free {
                                pressed.insert(i);
                            }
                        }
                    }
                }
            }
        }

        if !pressed.is_empty() {
            debug!("pressed keys {pressed:?}");
        }
        Ok(pressed)
    }

    /// Forget all associations, as if no cycle had run.
    pub fn reset(&mut self) {
        self.keys.clear();
    }

    #[inline]
    pub fn tracked_keys(&self) -> &[TrackedKey] {
        &self.keys
    }

    /// Whether key `index` currently has a resting fingertip.
    pub fn is_touched(&self, index: usize) -> bool {
        self.keys.get(index).is_some_and(TrackedKey::is_touched)
    }
}
