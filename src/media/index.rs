use std::ffi::OsString;
use std::path::{Path, PathBuf};

// @module: Video seek index helpers

/// Result of an indexing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// A new index was written
    Created,
    /// An index was already present and left alone
    AlreadyExists,
}

/// Index file written next to the video (`ep01.mkv` -> `ep01.mkv.ffindex`)
pub fn index_path(video: &Path) -> PathBuf {
    let mut path = video.as_os_str().to_owned();
    path.push(".ffindex");
    PathBuf::from(path)
}

/// Arguments for ffmsindex
pub fn index_args(video: &Path, force: bool) -> Vec<OsString> {
    let mut args = Vec::with_capacity(3);
    if force {
        args.push(OsString::from("-f"));
    }
    args.push(video.as_os_str().to_owned());
    args.push(index_path(video).into_os_string());
    args
}
