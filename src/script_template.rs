use anyhow::{Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::app_config::ScriptConfig;
use crate::file_utils::FileManager;
use crate::media::VideoTrack;

// @module: Playback script generation from a placeholder template

// @const: Leading release group tag, e.g. "[Group] Show - 01.mkv"
static GROUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([^\]]+)\]").unwrap()
});

// @const: Any {{PLACEHOLDER}} left in a rendered script
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([A-Z_]+)\}\}").unwrap()
});

pub const VIDEO_PATH: &str = "{{VIDEO_PATH}}";
pub const SUBTITLE_PATH: &str = "{{SUBTITLE_PATH}}";
pub const GROUP: &str = "{{GROUP}}";
pub const TARGET_WIDTH: &str = "{{TARGET_WIDTH}}";
pub const TARGET_HEIGHT: &str = "{{TARGET_HEIGHT}}";
pub const UPSCALE: &str = "{{UPSCALE}}";

/// Template used when no template file is configured
pub const DEFAULT_TEMPLATE: &str = r#"import vapoursynth as vs
core = vs.core

# {{GROUP}}
clip = core.ffms2.Source(r"{{VIDEO_PATH}}")
if {{UPSCALE}}:
    clip = core.resize.Spline36(clip, {{TARGET_WIDTH}}, {{TARGET_HEIGHT}})
else:
    clip = core.resize.Bicubic(clip, {{TARGET_WIDTH}}, {{TARGET_HEIGHT}})
clip = core.sub.TextFile(clip, r"{{SUBTITLE_PATH}}")
clip.set_output()
"#;

/// Values substituted into a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptValues {
    pub video_path: PathBuf,
    pub subtitle_path: PathBuf,
    pub group: String,
    pub target_width: u32,
    pub target_height: u32,
    pub upscale: bool,
}

impl ScriptValues {
    /// Compute the values for a video and its extracted subtitle
    pub fn for_video(video_path: &Path, subtitle_path: &Path, video: Option<&VideoTrack>, config: &ScriptConfig) -> Self {
        let target_height = config.target_height;
        let (target_width, upscale) = match video {
            Some(track) if track.width > 0 && track.height > 0 => (
                scaled_width(track.width, track.height, target_height),
                track.height < target_height,
            ),
            _ => (scaled_width(16, 9, target_height), false),
        };

        Self {
            video_path: video_path.to_path_buf(),
            subtitle_path: subtitle_path.to_path_buf(),
            group: group_name(video_path).unwrap_or_else(|| config.default_group.clone()),
            target_width,
            target_height,
            upscale,
        }
    }
}

/// Release group from a `[Group]` filename prefix
pub fn group_name(video_path: &Path) -> Option<String> {
    let file_name = video_path.file_name()?.to_string_lossy();
    GROUP_REGEX
        .captures(&file_name)
        .and_then(|caps| caps.get(1))
        .map(|group| group.as_str().trim().to_string())
        .filter(|group| !group.is_empty())
}

/// Width keeping the aspect ratio at `target_height`, rounded to an even number
pub fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    let exact = f64::from(width) * f64::from(target_height) / f64::from(height);
    ((exact / 2.0).round() as u32) * 2
}

fn script_path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Substitute the placeholders of `template`
pub fn render(template: &str, values: &ScriptValues) -> String {
    let rendered = template
        .replace(VIDEO_PATH, &script_path_string(&values.video_path))
        .replace(SUBTITLE_PATH, &script_path_string(&values.subtitle_path))
        .replace(GROUP, &values.group)
        .replace(TARGET_WIDTH, &values.target_width.to_string())
        .replace(TARGET_HEIGHT, &values.target_height.to_string())
        .replace(UPSCALE, if values.upscale { "True" } else { "False" });

    for caps in PLACEHOLDER_REGEX.captures_iter(&rendered) {
        warn!("Unknown placeholder left in script: {}", &caps[0]);
    }

    rendered
}

/// Renders and writes playback scripts
pub struct ScriptWriter {
    template: String,
    config: ScriptConfig,
}

impl ScriptWriter {
    /// Load the configured template, or fall back to the built-in one
    pub fn from_config(config: &ScriptConfig) -> Result<Self> {
        let template = match &config.template_path {
            Some(path) => FileManager::read_to_string(path)
                .with_context(|| format!("Failed to load script template: {:?}", path))?,
            None => DEFAULT_TEMPLATE.to_string(),
        };

        Ok(Self {
            template,
            config: config.clone(),
        })
    }

    /// Script path for a video (`ep01.mkv` -> `ep01.vpy`)
    pub fn output_path(&self, video_path: &Path) -> PathBuf {
        FileManager::with_suffix(video_path, &format!(".{}", self.config.output_extension))
    }

    /// Render the script for a video and write it next to it
    pub fn write(&self, video_path: &Path, subtitle_path: &Path, video: Option<&VideoTrack>) -> Result<PathBuf> {
        let values = ScriptValues::for_video(video_path, subtitle_path, video, &self.config);
        let output = self.output_path(video_path);
        FileManager::write_to_file(&output, &render(&self.template, &values))?;
        Ok(output)
    }
}
