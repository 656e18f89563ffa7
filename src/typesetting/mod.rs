/*!
 * Typesetting detection for ASS/SSA subtitles.
 *
 * This module contains the detection pipeline:
 * - `events`: parses the events section into sorted dialogue events
 * - `scoring`: scores override tags with a weight table
 * - `classifier`: flags typesetting lines and deduplicates dense runs
 * - `bookmarks`: writes the editor bookmark list
 */

pub mod bookmarks;
pub mod classifier;
pub mod events;
pub mod scoring;

use log::{debug, info};
use std::fs;
use std::path::Path;

use crate::errors::SubtitleError;

pub use bookmarks::BookmarkEntry;
pub use classifier::{classify, DetectionParams, EffectPolicy, SEEK_OFFSET_MS};
pub use events::{parse, DialogueEvent};
pub use scoring::{score, OverrideTagWeightTable, TagFamily, TagWeight};

/// Runs parse, classify and write for subtitle documents.
///
/// Holds only read-only configuration, so one detector can be shared
/// across threads processing different documents.
#[derive(Debug, Clone, Default)]
pub struct TypesettingDetector {
    table: OverrideTagWeightTable,
    params: DetectionParams,
}

impl TypesettingDetector {
    pub fn new(table: OverrideTagWeightTable, params: DetectionParams) -> Self {
        Self { table, params }
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    /// Detect typesetting lines in document text
    pub fn detect(&self, document: &str) -> Vec<BookmarkEntry> {
        let events = parse(document);
        debug!("Parsed {} event(s)", events.len());
        classify(&events, &self.table, &self.params)
    }

    /// Read a document from disk and detect typesetting lines.
    ///
    /// A missing or unreadable file fails before any parsing happens.
    pub fn detect_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<BookmarkEntry>, SubtitleError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| SubtitleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = String::from_utf8_lossy(&bytes);
        Ok(self.detect(&document))
    }

    /// Detect typesetting in `input` and write the bookmark list to `output`.
    ///
    /// Nothing is written when the input cannot be read.
    pub fn export<P1: AsRef<Path>, P2: AsRef<Path>>(&self, input: P1, output: P2) -> Result<Vec<BookmarkEntry>, SubtitleError> {
        let entries = self.detect_file(&input)?;
        bookmarks::write(&entries, &output)?;
        info!(
            "Wrote {} bookmark(s) to {:?}",
            entries.len(),
            output.as_ref().file_name().unwrap_or_default()
        );
        Ok(entries)
    }
}
