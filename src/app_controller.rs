use anyhow::{anyhow, Context, Result};
use futures::future::join_all;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType};
use crate::media::{CommandMediaTools, ExtractOutcome, IndexOutcome, MediaTools};
use crate::script_template::ScriptWriter;
use crate::typesetting::{OverrideTagWeightTable, TypesettingDetector};

// @module: Application controller for workspace preparation

/// Name of the issue log written into processed directories
const ISSUES_LOG: &str = "subprep.issues.log";

/// What was produced for one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReport {
    pub video: PathBuf,
    pub subtitle: Option<PathBuf>,
    pub fonts_extracted: usize,
    pub index: IndexOutcome,
    pub script: PathBuf,
    pub bookmarks: Option<usize>,
}

/// Totals of a directory run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareSummary {
    pub processed: usize,
    pub failed: usize,
    pub bookmarks: usize,
}

/// Totals of a detection run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectSummary {
    pub written: Vec<(PathBuf, usize)>,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: External media tools
    tools: Arc<dyn MediaTools>,
    // @field: Shared read-only detector
    detector: TypesettingDetector,
    // @field: Playback script renderer
    scripts: ScriptWriter,
}

impl Controller {
    /// Create a controller that drives the real command line tools
    pub fn with_config(config: Config) -> Result<Self> {
        let tools = Arc::new(CommandMediaTools::new(config.tools.clone()));
        Self::with_tools(config, tools)
    }

    /// Create a controller with a custom tool backend
    pub fn with_tools(config: Config, tools: Arc<dyn MediaTools>) -> Result<Self> {
        let detector = TypesettingDetector::new(OverrideTagWeightTable::default(), config.detection.params());
        let scripts = ScriptWriter::from_config(&config.script)?;

        Ok(Self {
            config,
            tools,
            detector,
            scripts,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Prepare every video directly inside `input_dir`.
    ///
    /// A failing video is logged and counted; the remaining videos are still processed.
    pub async fn prepare_directory(&self, input_dir: &Path, force_overwrite: bool) -> Result<PrepareSummary> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let videos = FileManager::find_videos(input_dir)?;
        if videos.is_empty() {
            warn!("No video files found in directory: {:?}", input_dir);
            return Ok(PrepareSummary::default());
        }

        let start_time = std::time::Instant::now();
        let multi_progress = MultiProgress::new();
        let mut summary = PrepareSummary::default();

        for video in &videos {
            let file_name = video.file_name().unwrap_or_default().to_string_lossy().to_string();
            info!("Preparing {}", file_name);

            match self.prepare_video(video, force_overwrite, &multi_progress).await {
                Ok(report) => {
                    summary.processed += 1;
                    summary.bookmarks += report.bookmarks.unwrap_or(0);
                }
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                    let log_path = input_dir.join(ISSUES_LOG);
                    if let Err(log_error) = FileManager::append_to_log_file(&log_path, &format!("{}: {:#}", file_name, e)) {
                        warn!("Failed to write issue log: {}", log_error);
                    }
                }
            }
        }

        info!(
            "Directory prepared in {:.1}s: {} processed, {} errors, {} bookmarks",
            start_time.elapsed().as_secs_f64(),
            summary.processed,
            summary.failed,
            summary.bookmarks
        );

        Ok(summary)
    }

    /// Run the whole workflow for a single video
    pub async fn prepare_video(&self, video: &Path, force_overwrite: bool, multi_progress: &MultiProgress) -> Result<VideoReport> {
        let info = self.tools.probe(video).await
            .with_context(|| format!("Failed to inspect {:?}", video))?;

        let subtitle = match info.preferred_subtitle() {
            Some(track) => {
                let dest = FileManager::with_suffix(video, &format!(".{}", track.file_extension()));
                let bar = Self::progress_bar(multi_progress, "Subtitle");
                let progress = |percent: u8| bar.set_position(u64::from(percent));
                let outcome = self.tools
                    .extract_track(video, track.id, &dest, force_overwrite, &progress)
                    .await
                    .with_context(|| format!("Failed to extract subtitle track {}", track.id))?;
                bar.finish_and_clear();
                if outcome == ExtractOutcome::AlreadyExists {
                    debug!("Keeping existing subtitle {:?}", dest);
                }
                Some(dest)
            }
            None => {
                warn!("No subtitle track in {:?}", video.file_name().unwrap_or_default());
                None
            }
        };

        let fonts_extracted = self.extract_fonts(video, &info, force_overwrite, multi_progress).await?;

        let index = self.tools.index_video(video, force_overwrite).await
            .with_context(|| format!("Failed to index {:?}", video))?;
        if index == IndexOutcome::AlreadyExists {
            debug!("Index already present for {:?}", video.file_name().unwrap_or_default());
        }

        let subtitle_for_script = subtitle.clone().unwrap_or_default();
        let script = self.scripts.write(video, &subtitle_for_script, info.video.as_ref())?;

        let bookmarks = match &subtitle {
            Some(path) if Self::has_override_tags(path) => {
                let output = self.bookmark_path(path);
                Some(self.detector.export(path, &output)?.len())
            }
            _ => None,
        };

        Ok(VideoReport {
            video: video.to_path_buf(),
            subtitle,
            fonts_extracted,
            index,
            script,
            bookmarks,
        })
    }

    async fn extract_fonts(&self, video: &Path, info: &crate::media::ContainerInfo, force_overwrite: bool, multi_progress: &MultiProgress) -> Result<usize> {
        let font_dir = video
            .parent()
            .unwrap_or(Path::new("."))
            .join(&self.config.fonts.attachment_dir_name);

        let attachments: Vec<(u64, PathBuf)> = info
            .font_attachments()
            .map(|attachment| (attachment.id, font_dir.join(&attachment.file_name)))
            .collect();

        if attachments.is_empty() {
            return Ok(0);
        }

        FileManager::ensure_dir(&font_dir)?;
        let bar = Self::progress_bar(multi_progress, "Fonts");
        let progress = |percent: u8| bar.set_position(u64::from(percent));
        let outcome = self.tools
            .extract_attachments(video, &attachments, force_overwrite, &progress)
            .await
            .context("Failed to extract font attachments")?;
        bar.finish_and_clear();

        Ok(match outcome {
            ExtractOutcome::Extracted => attachments.len(),
            ExtractOutcome::AlreadyExists => 0,
        })
    }

    /// Build the seek index of a single video
    pub async fn index(&self, video: &Path, force_overwrite: bool) -> Result<IndexOutcome> {
        if !FileManager::file_exists(video) {
            return Err(anyhow!("Video file does not exist: {:?}", video));
        }
        Ok(self.tools.index_video(video, force_overwrite).await?)
    }

    /// Detect typesetting in subtitle files and directories of subtitle files.
    ///
    /// Documents are processed in parallel; `output` only applies when exactly
    /// one document is processed.
    pub async fn detect_paths(&self, inputs: &[PathBuf], output: Option<PathBuf>) -> Result<DetectSummary> {
        let mut documents = Vec::new();
        for input in inputs {
            if input.is_dir() {
                documents.extend(FileManager::find_ass_subtitles(input)?);
            } else if input.exists() && FileManager::detect_file_type(input) != FileType::Subtitle {
                warn!("Skipping {:?}: not a subtitle file", input);
            } else {
                documents.push(input.clone());
            }
        }

        if output.is_some() && documents.len() != 1 {
            return Err(anyhow!("--output requires exactly one subtitle document, got {}", documents.len()));
        }

        let tasks = documents.into_iter().map(|document| {
            let detector = self.detector.clone();
            let destination = output.clone().unwrap_or_else(|| self.bookmark_path(&document));
            tokio::task::spawn_blocking(move || {
                let result = detector.export(&document, &destination);
                (destination, result)
            })
        });

        let mut summary = DetectSummary::default();
        for joined in join_all(tasks).await {
            match joined {
                Ok((destination, Ok(entries))) => summary.written.push((destination, entries.len())),
                Ok((_, Err(e))) => {
                    error!("{}", e);
                    summary.failed += 1;
                }
                Err(e) => {
                    error!("Detection task failed: {}", e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Bookmark file for a subtitle (`ep01.ass` -> `ep01.bookmarks.txt`)
    pub fn bookmark_path(&self, subtitle: &Path) -> PathBuf {
        FileManager::with_suffix(subtitle, &self.config.detection.bookmark_suffix)
    }

    fn has_override_tags(subtitle: &Path) -> bool {
        subtitle
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ass") || ext.eq_ignore_ascii_case("ssa"))
    }

    fn progress_bar(multi_progress: &MultiProgress, label: &str) -> ProgressBar {
        let progress_bar = multi_progress.add(ProgressBar::new(100));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:<10} [{bar:40.cyan/blue}] {pos:>3}%")
            .or_else(|_| ProgressStyle::default_bar().template("{msg} [{bar:40}] {pos}%"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message(label.to_string());
        progress_bar
    }
}
