//! Mapping key indices to sound files.
//!
//! A sound directory holds one file per note, named with a leading number
//! that gives its pitch order (`01_c4.wav`, `2-d4.ogg`, ...). Only a subset
//! is used when fewer keys are drawn than there are notes; which subset is
//! decided by [`SoundSelection`]. Playing the file is up to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum SoundError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no numbered sound files in {}", dir.display())]
    NoSounds { dir: PathBuf },
}

/// How `count` keys are spread over the available notes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundSelection {
    /// Evenly strided across the whole range, lowest and highest note included.
    Uniform,
    /// `count` consecutive notes centered in the range.
    #[default]
    Middle,
}

/// Ordered list of note files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundBank {
    files: Vec<PathBuf>,
}

/// Leading decimal number of a file name, e.g. `12` for `12_e5.wav`.
fn leading_number(name: &str) -> Option<u64> {
    let end = name
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(name.len(), |(i, _)| i);
    name[..end].parse().ok()
}

impl SoundBank {
    /// Collect the numbered files of `dir`. Other entries are skipped with a
    /// warning.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SoundError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                paths.push(entry.path());
            }
        }
        let bank = Self::from_paths(paths);
        if bank.is_empty() {
            return Err(SoundError::NoSounds {
                dir: dir.to_path_buf(),
            });
        }
        debug!("{} sounds in {}", bank.len(), dir.display());
        Ok(bank)
    }

    /// Keep the paths whose file name starts with a number and sort them by
    /// that number (ties by name).
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut numbered: Vec<(u64, PathBuf)> = paths
            .into_iter()
            .filter_map(|p| {
                let n = p
                    .file_name()
                    .and_then(|s| s.to_str())
                    .and_then(leading_number);
                if n.is_none() {
                    warn!("skipping sound without a leading number: {}", p.display());
                }
                n.map(|n| (n, p))
            })
            .collect();
        numbered.sort();
        Self {
            files: numbered.into_iter().map(|(_, p)| p).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[inline]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Bank positions used for a keyboard of `key_count` keys, key 0 first.
    pub fn layout(&self, key_count: usize, selection: SoundSelection) -> Vec<usize> {
        let len = self.files.len();
        if len == 0 || key_count == 0 {
            return Vec::new();
        }
        if key_count == 1 {
            return vec![len / 2];
        }
        match selection {
            SoundSelection::Uniform => {
                let step = (len - 1) as f64 / (key_count - 1) as f64;
                (0..key_count)
                    .map(|i| ((step * i as f64).round_ties_even() as usize).min(len - 1))
                    .collect()
            }
            SoundSelection::Middle => {
                let start = len.saturating_sub(key_count) / 2;
                (start..(start + key_count).min(len)).collect()
            }
        }
    }

    /// File played by key `key_index` of a `key_count`-key keyboard.
    ///
    /// `None` when the bank has fewer notes than a centered window needs, or
    /// the index is out of range.
    pub fn resolve(
        &self,
        key_count: usize,
        key_index: usize,
        selection: SoundSelection,
    ) -> Option<&Path> {
        if key_index >= key_count {
            return None;
        }
        let layout = self.layout(key_count, selection);
        layout
            .get(key_index)
            .and_then(|&i| self.files.get(i))
            .map(PathBuf::as_path)
    }
}
