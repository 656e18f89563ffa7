use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

// @module: Stream and attachment extraction helpers

// @const: mkvextract progress line, plain or GUI mode
static PROGRESS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Progress:|#GUI#progress)\s*(\d{1,3})%").unwrap()
});

/// Result of an extraction request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// The tool ran and wrote the destination
    Extracted,
    /// Every destination already existed and overwriting was not requested
    AlreadyExists,
}

/// Parse a progress percentage from a line of mkvextract output
pub fn parse_progress(line: &str) -> Option<u8> {
    let caps = PROGRESS_REGEX.captures(line)?;
    let percent: u32 = caps.get(1)?.as_str().parse().ok()?;
    Some(percent.min(100) as u8)
}

// @returns: `id:path` argument understood by mkvextract
fn id_and_path(id: u64, path: &Path) -> OsString {
    let mut arg = OsString::from(format!("{}:", id));
    arg.push(path.as_os_str());
    arg
}

/// Arguments extracting one track
pub fn track_args(container: &Path, track_id: u64, dest: &Path) -> Vec<OsString> {
    vec![
        container.as_os_str().to_owned(),
        OsString::from("tracks"),
        id_and_path(track_id, dest),
    ]
}

/// Arguments extracting several attachments in one run
pub fn attachment_args(container: &Path, attachments: &[(u64, PathBuf)]) -> Vec<OsString> {
    let mut args = vec![container.as_os_str().to_owned(), OsString::from("attachments")];
    args.extend(attachments.iter().map(|(id, path)| id_and_path(*id, path)));
    args
}

/// mkvextract exits with 1 when it finished with warnings
pub fn is_success_code(code: Option<i32>) -> bool {
    matches!(code, Some(0) | Some(1))
}
