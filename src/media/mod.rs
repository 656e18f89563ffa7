/*!
 * Media tool wrappers.
 *
 * The workflow talks to external binaries through the [`MediaTools`] trait:
 * - `probe`: container introspection (mkvmerge)
 * - `extract`: subtitle track and attachment extraction (mkvextract)
 * - `index`: video seek index creation (ffmsindex)
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::app_config::ToolsConfig;
use crate::errors::ToolError;

pub mod command;
pub mod extract;
pub mod index;
pub mod probe;

pub use extract::ExtractOutcome;
pub use index::IndexOutcome;
pub use probe::{Attachment, ContainerInfo, SubtitleTrack, VideoTrack};

/// Progress callback receiving a percentage between 0 and 100
pub type ProgressFn<'a> = dyn Fn(u8) + Send + Sync + 'a;

/// Interface to the external media tools
///
/// Implementations must be idempotent: existing outputs are kept unless
/// `force` is set.
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Describe the tracks and attachments of a container
    async fn probe(&self, container: &Path) -> Result<ContainerInfo, ToolError>;

    /// Extract one track to `dest`
    async fn extract_track(
        &self,
        container: &Path,
        track_id: u64,
        dest: &Path,
        force: bool,
        progress: &ProgressFn<'_>,
    ) -> Result<ExtractOutcome, ToolError>;

    /// Extract attachments, each to its own destination
    async fn extract_attachments(
        &self,
        container: &Path,
        attachments: &[(u64, PathBuf)],
        force: bool,
        progress: &ProgressFn<'_>,
    ) -> Result<ExtractOutcome, ToolError>;

    /// Build the seek index of a video
    async fn index_video(&self, video: &Path, force: bool) -> Result<IndexOutcome, ToolError>;
}

/// [`MediaTools`] backed by MKVToolNix and FFMS2 command line tools
#[derive(Debug, Clone)]
pub struct CommandMediaTools {
    tools: ToolsConfig,
}

impl CommandMediaTools {
    pub fn new(tools: ToolsConfig) -> Self {
        Self { tools }
    }

    async fn run_mkvextract(&self, args: Vec<std::ffi::OsString>, progress: &ProgressFn<'_>) -> Result<(), ToolError> {
        let tool = self.tools.mkvextract.as_str();
        let mut errors = Vec::new();

        let (code, stderr) = command::run_tool_streaming(tool, &args, self.tools.timeout_secs, |line| {
            if let Some(percent) = extract::parse_progress(line) {
                progress(percent);
            } else if line.starts_with("Error") || line.starts_with("Warning") {
                errors.push(line.to_string());
            }
        })
        .await?;

        if !extract::is_success_code(code) {
            let mut message = errors.join("\n");
            message.push('\n');
            message.push_str(&stderr);
            return Err(command::failure(tool, code, message.as_bytes()));
        }

        if code == Some(1) {
            warn!("{} finished with warnings: {}", tool, errors.join("; "));
        }
        progress(100);
        Ok(())
    }
}

#[async_trait]
impl MediaTools for CommandMediaTools {
    async fn probe(&self, container: &Path) -> Result<ContainerInfo, ToolError> {
        let tool = self.tools.mkvmerge.as_str();
        let args = vec!["-J".into(), container.as_os_str().to_owned()];
        let output = command::run_tool(tool, &args, self.tools.timeout_secs).await?;

        if !output.status.success() {
            return Err(command::failure(tool, output.status.code(), &output.stderr));
        }

        let info = ContainerInfo::from_mkvmerge_json(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            "{:?}: {} subtitle track(s), {} attachment(s)",
            container.file_name().unwrap_or_default(),
            info.subtitles.len(),
            info.attachments.len()
        );
        Ok(info)
    }

    async fn extract_track(
        &self,
        container: &Path,
        track_id: u64,
        dest: &Path,
        force: bool,
        progress: &ProgressFn<'_>,
    ) -> Result<ExtractOutcome, ToolError> {
        if dest.exists() && !force {
            return Ok(ExtractOutcome::AlreadyExists);
        }

        self.run_mkvextract(extract::track_args(container, track_id, dest), progress).await?;
        Ok(ExtractOutcome::Extracted)
    }

    async fn extract_attachments(
        &self,
        container: &Path,
        attachments: &[(u64, PathBuf)],
        force: bool,
        progress: &ProgressFn<'_>,
    ) -> Result<ExtractOutcome, ToolError> {
        let pending: Vec<(u64, PathBuf)> = attachments
            .iter()
            .filter(|(_, path)| force || !path.exists())
            .cloned()
            .collect();

        if pending.is_empty() {
            return Ok(ExtractOutcome::AlreadyExists);
        }

        self.run_mkvextract(extract::attachment_args(container, &pending), progress).await?;
        Ok(ExtractOutcome::Extracted)
    }

    async fn index_video(&self, video: &Path, force: bool) -> Result<IndexOutcome, ToolError> {
        if index::index_path(video).exists() && !force {
            return Ok(IndexOutcome::AlreadyExists);
        }

        let tool = self.tools.ffmsindex.as_str();
        let output = command::run_tool(tool, &index::index_args(video, force), self.tools.timeout_secs).await?;
        if !output.status.success() {
            return Err(command::failure(tool, output.status.code(), &output.stderr));
        }

        Ok(IndexOutcome::Created)
    }
}
