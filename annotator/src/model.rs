use crate::error::AnnotatorError;
use crate::video_id;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const ID_PREFIX: &str = "bp_";

/// A named timestamp bookmark on a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub id: String,
    pub name: String,
    pub time: f64, // seconds
}

impl Breakpoint {
    /// Create the `n`-th breakpoint of a session at `time`.
    pub fn numbered(n: u64, time: f64) -> Self {
        Self {
            id: format!("{}{}", ID_PREFIX, n),
            name: format!("BP {}", n),
            time,
        }
    }

    /// Numeric suffix of a generated id (`bp_<n>`).
    ///
    /// Only the canonical decimal form counts: `bp_+3` and `bp_003` are
    /// opaque ids, not suffix 3.
    pub fn id_number(&self) -> Option<u64> {
        let digits = self.id.strip_prefix(ID_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        digits.parse().ok()
    }
}

/// First unused counter value after the given breakpoints.
///
/// Saturates at `u64::MAX`, a value the counter never hands out.
pub fn next_number(breakpoints: &[Breakpoint]) -> u64 {
    breakpoints
        .iter()
        .filter_map(Breakpoint::id_number)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// A/B loop markers.
///
/// A cleared marker is zero, the same value as a mark at the very start of
/// the video.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Markers {
    pub start: f64,
    pub end: f64,
}

impl Markers {
    /// The loop region, present only when `end > start`.
    pub fn region(&self) -> Option<(f64, f64)> {
        if self.end > self.start {
            Some((self.start, self.end))
        } else {
            None
        }
    }
}

/// Persisted association of a video with its title and breakpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub breakpoints: Vec<Breakpoint>,
}

impl VideoRecord {
    pub fn new(video_id: String) -> Self {
        Self {
            video_id,
            title: String::new(),
            breakpoints: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, AnnotatorError> {
        serde_json::to_string(self).map_err(|e| {
            AnnotatorError::StorageError(format!("serialize record {}: {}", self.video_id, e))
        })
    }

    /// Parse and validate a stored record that was kept under `video_id`.
    pub fn from_json(video_id: &str, data: &str) -> Result<Self, AnnotatorError> {
        let record: VideoRecord = serde_json::from_str(data).map_err(|e| {
            AnnotatorError::CorruptStore(format!("record {}: {}", video_id, e))
        })?;

        record.validate(video_id)?;
        Ok(record)
    }

    fn validate(&self, video_id: &str) -> Result<(), AnnotatorError> {
        if !video_id::is_valid(&self.video_id) {
            return Err(AnnotatorError::CorruptStore(format!(
                "invalid video id '{}'",
                self.video_id
            )));
        }

        if self.video_id != video_id {
            return Err(AnnotatorError::CorruptStore(format!(
                "record for '{}' stored under '{}'",
                self.video_id, video_id
            )));
        }

        let mut ids = HashSet::new();
        for bp in &self.breakpoints {
            if bp.id.is_empty() {
                return Err(AnnotatorError::CorruptStore(format!(
                    "record {}: breakpoint without id",
                    video_id
                )));
            }

            if !ids.insert(bp.id.as_str()) {
                return Err(AnnotatorError::CorruptStore(format!(
                    "record {}: duplicate breakpoint id '{}'",
                    video_id, bp.id
                )));
            }

            if bp.id_number() == Some(u64::MAX) {
                return Err(AnnotatorError::CorruptStore(format!(
                    "record {}: breakpoint id '{}' exhausts the counter",
                    video_id, bp.id
                )));
            }

            if !bp.time.is_finite() {
                return Err(AnnotatorError::CorruptStore(format!(
                    "record {}: breakpoint '{}' has no finite time",
                    video_id, bp.id
                )));
            }
        }

        Ok(())
    }
}
