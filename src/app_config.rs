use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::typesetting::{DetectionParams, EffectPolicy};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Typesetting detection settings
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Playback script settings
    #[serde(default)]
    pub script: ScriptConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Font management settings
    #[serde(default)]
    pub fonts: FontConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Typesetting detection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DetectionConfig {
    /// Minimum override-tag score for a typesetting line
    #[serde(default = "default_score_threshold")]
    pub score_threshold: u32,

    /// Minimum time between two bookmarks, in seconds
    #[serde(default = "default_time_gap_secs")]
    pub time_gap_secs: f64,

    /// Minimum number of dialogue lines since the last flagged line
    #[serde(default = "default_line_gap")]
    pub line_gap: usize,

    /// Whether a non-empty effect field flags a line by itself
    #[serde(default)]
    pub effect_policy: EffectPolicy,

    /// Suffix appended to the subtitle stem for the bookmark file
    #[serde(default = "default_bookmark_suffix")]
    pub bookmark_suffix: String,
}

impl DetectionConfig {
    /// Classifier thresholds for this configuration
    pub fn params(&self) -> DetectionParams {
        DetectionParams {
            score_threshold: self.score_threshold,
            time_gap_ms: (self.time_gap_secs * 1000.0).round() as u64,
            line_gap: self.line_gap,
            effect_policy: self.effect_policy,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            score_threshold: default_score_threshold(),
            time_gap_secs: default_time_gap_secs(),
            line_gap: default_line_gap(),
            effect_policy: EffectPolicy::default(),
            bookmark_suffix: default_bookmark_suffix(),
        }
    }
}

/// Playback script configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScriptConfig {
    /// Template file; the built-in template is used when unset
    #[serde(default)]
    pub template_path: Option<PathBuf>,

    /// Extension of the generated script
    #[serde(default = "default_script_extension")]
    pub output_extension: String,

    /// Output height the script scales to
    #[serde(default = "default_target_height")]
    pub target_height: u32,

    /// Group name used when the filename carries no `[Group]` tag
    #[serde(default = "default_group")]
    pub default_group: String,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            output_extension: default_script_extension(),
            target_height: default_target_height(),
            default_group: default_group(),
        }
    }
}

/// External tool configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolsConfig {
    /// Container introspection binary
    #[serde(default = "default_mkvmerge")]
    pub mkvmerge: String,

    /// Stream extraction binary
    #[serde(default = "default_mkvextract")]
    pub mkvextract: String,

    /// Video indexing binary
    #[serde(default = "default_ffmsindex")]
    pub ffmsindex: String,

    /// Installed font listing binary
    #[serde(default = "default_fc_list")]
    pub fc_list: String,

    /// Font file inspection binary
    #[serde(default = "default_fc_scan")]
    pub fc_scan: String,

    /// Font cache refresh binary
    #[serde(default = "default_fc_cache")]
    pub fc_cache: String,

    /// Timeout for a single tool invocation in seconds
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            mkvmerge: default_mkvmerge(),
            mkvextract: default_mkvextract(),
            ffmsindex: default_ffmsindex(),
            fc_list: default_fc_list(),
            fc_scan: default_fc_scan(),
            fc_cache: default_fc_cache(),
            timeout_secs: default_tool_timeout_secs(),
        }
    }
}

/// Font management configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FontConfig {
    /// User font directory; the platform default is used when unset
    #[serde(default)]
    pub font_dir: Option<PathBuf>,

    /// Subdirectory of the font directory holding temporarily loaded fonts
    #[serde(default = "default_session_dir_name")]
    pub session_dir_name: String,

    /// Directory next to the videos that receives extracted font attachments
    #[serde(default = "default_attachment_dir_name")]
    pub attachment_dir_name: String,
}

impl FontConfig {
    /// Resolve the font directory from the configuration or the platform
    pub fn resolve_font_dir(&self) -> Option<PathBuf> {
        self.font_dir.clone().or_else(dirs::font_dir)
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            font_dir: None,
            session_dir_name: default_session_dir_name(),
            attachment_dir_name: default_attachment_dir_name(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_score_threshold() -> u32 {
    5
}

fn default_time_gap_secs() -> f64 {
    2.0
}

fn default_line_gap() -> usize {
    2
}

fn default_bookmark_suffix() -> String {
    ".bookmarks.txt".to_string()
}

fn default_script_extension() -> String {
    "vpy".to_string()
}

fn default_target_height() -> u32 {
    1080
}

fn default_group() -> String {
    "Unknown".to_string()
}

fn default_mkvmerge() -> String {
    "mkvmerge".to_string()
}

fn default_mkvextract() -> String {
    "mkvextract".to_string()
}

fn default_ffmsindex() -> String {
    "ffmsindex".to_string()
}

fn default_fc_list() -> String {
    "fc-list".to_string()
}

fn default_fc_scan() -> String {
    "fc-scan".to_string()
}

fn default_fc_cache() -> String {
    "fc-cache".to_string()
}

fn default_tool_timeout_secs() -> u64 {
    600 // indexing a long episode can take minutes
}

fn default_session_dir_name() -> String {
    "subprep-session".to_string()
}

fn default_attachment_dir_name() -> String {
    "fonts".to_string()
}

impl Config {
    /// Load the configuration from `path`, writing a default file when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;
        if detection.score_threshold == 0 {
            return Err(anyhow!("detection.score_threshold must be at least 1"));
        }
        if !detection.time_gap_secs.is_finite() || detection.time_gap_secs < 0.0 {
            return Err(anyhow!("detection.time_gap_secs must be a non-negative number"));
        }
        if detection.bookmark_suffix.is_empty() {
            return Err(anyhow!("detection.bookmark_suffix must not be empty"));
        }

        if self.script.target_height == 0 {
            return Err(anyhow!("script.target_height must be greater than zero"));
        }
        if self.script.output_extension.is_empty() {
            return Err(anyhow!("script.output_extension must not be empty"));
        }

        let tools = [
            ("mkvmerge", &self.tools.mkvmerge),
            ("mkvextract", &self.tools.mkvextract),
            ("ffmsindex", &self.tools.ffmsindex),
            ("fc_list", &self.tools.fc_list),
            ("fc_scan", &self.tools.fc_scan),
            ("fc_cache", &self.tools.fc_cache),
        ];
        if let Some((name, _)) = tools.iter().find(|(_, binary)| binary.trim().is_empty()) {
            return Err(anyhow!("tools.{} must name a binary", name));
        }
        if self.tools.timeout_secs == 0 {
            return Err(anyhow!("tools.timeout_secs must be greater than zero"));
        }

        if self.fonts.session_dir_name.is_empty() || self.fonts.attachment_dir_name.is_empty() {
            return Err(anyhow!("fonts directory names must not be empty"));
        }

        Ok(())
    }
}
