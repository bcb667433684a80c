use crate::error::AnnotatorError;
use crate::jar::CookieJar;
use crate::model::{Breakpoint, VideoRecord};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Video records keyed by video id, mirrored into a cookie jar with one
/// entry per video.
#[derive(Debug)]
pub struct Library {
    prefix: String,
    max_age: Duration,
    records: BTreeMap<String, VideoRecord>,
}

impl Library {
    pub fn new(prefix: String, max_age: Duration) -> Self {
        Self {
            prefix,
            max_age,
            records: BTreeMap::new(),
        }
    }

    /// Read every record kept in `jar`.
    ///
    /// An unreadable jar yields an empty library; a record that fails
    /// validation is discarded on its own.
    pub fn load(jar: &dyn CookieJar, prefix: String, max_age: Duration) -> Self {
        let mut library = Self::new(prefix, max_age);
        let entries = match jar.entries() {
            Ok(entries) => entries,
            Err(e) => {
                error!("Reading stored videos: {}", e);
                return library;
            }
        };

        let key_prefix = format!("{}::", library.prefix);
        for (key, value) in entries {
            let Some(video_id) = key.strip_prefix(&key_prefix) else {
                continue;
            };

            match VideoRecord::from_json(video_id, &value) {
                Ok(record) => {
                    debug!(
                        "Restored video {} with {} breakpoints",
                        video_id,
                        record.breakpoints.len()
                    );
                    library.records.insert(video_id.to_string(), record);
                }
                Err(e) => warn!("Discarding stored video {}: {}", video_id, e),
            }
        }

        info!("Loaded {} stored videos", library.records.len());
        library
    }

    pub fn get(&self, video_id: &str) -> Option<&VideoRecord> {
        self.records.get(video_id)
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.records.contains_key(video_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &VideoRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the record for `video_id`, creating an empty one if needed.
    pub fn entry(&mut self, video_id: &str) -> &mut VideoRecord {
        self.records
            .entry(video_id.to_string())
            .or_insert_with(|| VideoRecord::new(video_id.to_string()))
    }

    /// Replace the stored breakpoints of `video_id` with a copy of `breakpoints`.
    pub fn store_breakpoints(&mut self, video_id: &str, breakpoints: &[Breakpoint]) {
        self.entry(video_id).breakpoints = breakpoints.to_vec();
    }

    /// Write the record of `video_id` into `jar`.
    pub fn persist(&self, jar: &mut dyn CookieJar, video_id: &str) -> Result<(), AnnotatorError> {
        let record = self.records.get(video_id).ok_or_else(|| {
            AnnotatorError::StorageError(format!("no record for video {}", video_id))
        })?;

        let json = record.to_json()?;
        jar.set(&self.key(video_id), &json, self.max_age)
    }

    fn key(&self, video_id: &str) -> String {
        format!("{}::{}", self.prefix, video_id)
    }
}
