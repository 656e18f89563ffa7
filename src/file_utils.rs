use anyhow::{Result, Context};
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use chrono::Local;

// @module: File and directory utilities

// @const: Container extensions treated as videos
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mka", "mk3d", "webm", "mp4", "m4v", "mov", "avi", "ts", "m2ts", "mts",
];

// @const: Subtitle extensions
const SUBTITLE_EXTENSIONS: &[&str] = &["ass", "ssa", "srt"];

// @const: Subtitle extensions carrying override tags
const ASS_EXTENSIONS: &[&str] = &["ass", "ssa"];

// @const: Font file extensions
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc", "otc"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Sibling path with the stem kept and a new suffix
    // @params: input_file, suffix (e.g. ".ass" or ".bookmarks.txt")
    pub fn with_suffix<P: AsRef<Path>>(input_file: P, suffix: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push_str(suffix);

        input_file.with_file_name(output_filename)
    }

    /// Find files whose extension is in `extensions`, sorted by path.
    ///
    /// `max_depth` of 1 limits the search to the directory itself.
    pub fn find_files<P: AsRef<Path>>(dir: P, extensions: &[&str], max_depth: usize) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).max_depth(max_depth).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_extension(path, extensions) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// ASS/SSA subtitle files below `dir`
    pub fn find_ass_subtitles<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        Self::find_files(dir, ASS_EXTENSIONS, usize::MAX)
    }

    /// Videos directly inside `dir`
    pub fn find_videos<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        Self::find_files(dir, VIDEO_EXTENSIONS, 1)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        // Open file in append mode, create if it doesn't exist
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Detect the kind of file from its extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> FileType {
        let path = path.as_ref();

        if Self::has_extension(path, SUBTITLE_EXTENSIONS) {
            FileType::Subtitle
        } else if Self::has_extension(path, VIDEO_EXTENSIONS) {
            FileType::Video
        } else if Self::has_extension(path, FONT_EXTENSIONS) {
            FileType::Font
        } else {
            FileType::Unknown
        }
    }

    fn has_extension(path: &Path, extensions: &[&str]) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| extensions.contains(&ext.as_str()))
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Subtitle file (ASS, SSA or SRT)
    Subtitle,
    /// Video container
    Video,
    /// Font file
    Font,
    /// Unknown file type
    Unknown,
}
