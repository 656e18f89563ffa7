/*!
 * Mock media tools for testing
 *
 * Implements the MediaTools trait without running any external binary.
 * Outputs are written as small placeholder files so the rest of the
 * workflow can run against them, and every call is recorded.
 */

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use subprep::errors::ToolError;
use subprep::media::index::index_path;
use subprep::media::{
    Attachment, ContainerInfo, ExtractOutcome, IndexOutcome, MediaTools, ProgressFn, SubtitleTrack, VideoTrack,
};

use super::SAMPLE_ASS;

/// Records tool calls made through the mock
#[derive(Debug, Default)]
pub struct ToolCallTracker {
    /// Names of the operations called, in order
    pub calls: Vec<String>,
    /// Should every call fail
    pub should_fail: bool,
}

/// Mock implementation of the media tools
#[derive(Debug)]
pub struct MockMediaTools {
    tracker: Arc<Mutex<ToolCallTracker>>,
    info: ContainerInfo,
    subtitle_content: String,
}

impl MockMediaTools {
    /// Create a mock describing a 720p video with one ASS track and one font
    pub fn new() -> Self {
        Self::with_info(sample_container_info())
    }

    /// Create a mock returning `info` from every probe
    pub fn with_info(info: ContainerInfo) -> Self {
        MockMediaTools {
            tracker: Arc::new(Mutex::new(ToolCallTracker::default())),
            info,
            subtitle_content: SAMPLE_ASS.to_string(),
        }
    }

    /// Get the call tracker
    pub fn tracker(&self) -> Arc<Mutex<ToolCallTracker>> {
        self.tracker.clone()
    }

    /// Make every following call fail
    pub fn fail_calls(&self) {
        self.tracker.lock().unwrap().should_fail = true;
    }

    /// Operations called so far
    pub fn calls(&self) -> Vec<String> {
        self.tracker.lock().unwrap().calls.clone()
    }

    fn record(&self, call: &str) -> Result<(), ToolError> {
        let mut tracker = self.tracker.lock().unwrap();
        tracker.calls.push(call.to_string());
        if tracker.should_fail {
            return Err(ToolError::Failed {
                tool: "mock".to_string(),
                code: Some(2),
                stderr: format!("{} failed", call),
            });
        }
        Ok(())
    }
}

/// Container description used by [`MockMediaTools::new`]
pub fn sample_container_info() -> ContainerInfo {
    ContainerInfo {
        video: Some(VideoTrack {
            id: 0,
            codec: "AVC/H.264/MPEG-4p10".to_string(),
            width: 1280,
            height: 720,
        }),
        subtitles: vec![SubtitleTrack {
            id: 2,
            codec: "SubStationAlpha".to_string(),
            codec_id: Some("S_TEXT/ASS".to_string()),
            language: Some("eng".to_string()),
            name: Some("Full Subtitles".to_string()),
        }],
        attachments: vec![
            Attachment {
                id: 1,
                file_name: "Impact.ttf".to_string(),
                content_type: Some("application/x-truetype-font".to_string()),
                size: 4,
            },
            Attachment {
                id: 2,
                file_name: "cover.jpg".to_string(),
                content_type: Some("image/jpeg".to_string()),
                size: 4,
            },
        ],
    }
}

fn write_placeholder(path: &Path, content: &str) -> Result<(), ToolError> {
    fs::write(path, content).map_err(|source| ToolError::Spawn {
        tool: "mock".to_string(),
        source,
    })
}

#[async_trait]
impl MediaTools for MockMediaTools {
    async fn probe(&self, _container: &Path) -> Result<ContainerInfo, ToolError> {
        self.record("probe")?;
        Ok(self.info.clone())
    }

    async fn extract_track(
        &self,
        _container: &Path,
        track_id: u64,
        dest: &Path,
        force: bool,
        progress: &ProgressFn<'_>,
    ) -> Result<ExtractOutcome, ToolError> {
        self.record(&format!("extract_track:{}", track_id))?;
        if dest.exists() && !force {
            return Ok(ExtractOutcome::AlreadyExists);
        }

        progress(50);
        write_placeholder(dest, &self.subtitle_content)?;
        progress(100);
        Ok(ExtractOutcome::Extracted)
    }

    async fn extract_attachments(
        &self,
        _container: &Path,
        attachments: &[(u64, PathBuf)],
        force: bool,
        progress: &ProgressFn<'_>,
    ) -> Result<ExtractOutcome, ToolError> {
        self.record("extract_attachments")?;
        let pending: Vec<&(u64, PathBuf)> = attachments.iter().filter(|(_, path)| force || !path.exists()).collect();
        if pending.is_empty() {
            return Ok(ExtractOutcome::AlreadyExists);
        }

        for (_, path) in pending {
            write_placeholder(path, "font")?;
        }
        progress(100);
        Ok(ExtractOutcome::Extracted)
    }

    async fn index_video(&self, video: &Path, force: bool) -> Result<IndexOutcome, ToolError> {
        self.record("index_video")?;
        let index = index_path(video);
        if index.exists() && !force {
            return Ok(IndexOutcome::AlreadyExists);
        }

        write_placeholder(&index, "index")?;
        Ok(IndexOutcome::Created)
    }
}
