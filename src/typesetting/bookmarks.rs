use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::SubtitleError;

// @module: Bookmark list serialization

/// One detected typesetting line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookmarkEntry {
    /// Index among the chronologically sorted dialogue events
    pub line_number: usize,

    /// Seek position in milliseconds
    pub timestamp_ms: u64,
}

impl BookmarkEntry {
    pub fn new(line_number: usize, timestamp_ms: u64) -> Self {
        Self { line_number, timestamp_ms }
    }

    /// Format the timestamp as `HH:MM:SS.mmm`
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for BookmarkEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.line_number, Self::format_timestamp(self.timestamp_ms))
    }
}

/// Render entries in list order, one newline-terminated line each
pub fn render(entries: &[BookmarkEntry]) -> String {
    entries.iter().map(|entry| format!("{}\n", entry)).collect()
}

/// Write entries to `path`, replacing any existing file
pub fn write<P: AsRef<Path>>(entries: &[BookmarkEntry], path: P) -> Result<(), SubtitleError> {
    let path = path.as_ref();
    let write_error = |source| SubtitleError::Write { path: path.to_path_buf(), source };

    let file = File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    for entry in entries {
        writeln!(writer, "{}", entry).map_err(write_error)?;
    }
    writer.flush().map_err(write_error)?;

    Ok(())
}
