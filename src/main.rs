// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subprep::app_config::{self, Config};
use subprep::fonts::{self, FontManager};
use subprep::media::IndexOutcome;
use subprep::typesetting::EffectPolicy;
use subprep::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prepare every video in a directory: extract, index, script and bookmarks
    Prepare(PrepareArgs),

    /// Detect typesetting lines and write editor bookmarks
    Detect(DetectArgs),

    /// Build the seek index of a video
    Index {
        /// Video file to index
        #[arg(value_name = "VIDEO")]
        video: PathBuf,

        /// Rebuild an existing index
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Inspect and manage fonts
    #[command(subcommand)]
    Fonts(FontCommands),

    /// Generate shell completions for subprep
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct PrepareArgs {
    /// Directory containing the videos
    #[arg(value_name = "DIR")]
    input_dir: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Group name for videos without a [Group] filename tag
    #[arg(short, long)]
    group: Option<String>,

    /// Output height of the playback script
    #[arg(long)]
    target_height: Option<u32>,
}

#[derive(Parser, Debug)]
struct DetectArgs {
    /// Subtitle files or directories of subtitle files
    #[arg(value_name = "SUBTITLE", required = true)]
    inputs: Vec<PathBuf>,

    /// Bookmark file to write (single input only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Minimum override-tag score for a typesetting line
    #[arg(long)]
    score_threshold: Option<u32>,

    /// Minimum seconds between two bookmarks
    #[arg(long)]
    time_gap: Option<f64>,

    /// Minimum dialogue lines since the last typesetting line
    #[arg(long)]
    line_gap: Option<usize>,

    /// Treat a non-empty effect field as typesetting
    #[arg(long)]
    effect_qualifies: bool,
}

#[derive(Subcommand, Debug)]
enum FontCommands {
    /// List installed font families
    List,
    /// Show fonts in a directory that are not installed
    Diff {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Temporarily load the missing fonts of a directory
    Load {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Remove all temporarily loaded fonts
    Unload,
    /// Permanently install the missing fonts of a directory
    Install {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Remove installed copies of the fonts in a directory
    Uninstall {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}

/// subprep - subtitle workspace preparation
///
/// Prepares comparison workspaces for video releases: extracts subtitles and
/// fonts, indexes videos, writes playback scripts and bookmarks typesetting.
#[derive(Parser, Debug)]
#[command(name = "subprep")]
#[command(version)]
#[command(about = "Subtitle workspace preparation tool")]
#[command(long_about = "subprep prepares subtitle comparison workspaces for video releases.

EXAMPLES:
    subprep prepare /releases/show/              # Extract, index, script and bookmark every video
    subprep prepare -f /releases/show/           # Overwrite existing outputs
    subprep detect ep01.ass                      # Write ep01.bookmarks.txt
    subprep detect ep01.ass -o ts.txt --line-gap 4
    subprep index ep01.mkv                       # Build ep01.mkv.ffindex
    subprep fonts diff /releases/show/fonts      # Fonts not installed on this system
    subprep fonts load /releases/show/fonts      # Load them until 'fonts unload'
    subprep completions bash > subprep.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in subprep.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = "subprep.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself lets everything through; log::max_level filters
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "subprep", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    match &cli.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    match cli.command {
        Commands::Prepare(args) => run_prepare(config, args).await,
        Commands::Detect(args) => run_detect(config, args).await,
        Commands::Index { video, force_overwrite } => run_index(config, video, force_overwrite).await,
        Commands::Fonts(command) => run_fonts(config, command).await,
        Commands::Completions { .. } => Ok(()),
    }
}

async fn run_prepare(mut config: Config, args: PrepareArgs) -> Result<()> {
    if let Some(group) = args.group {
        config.script.default_group = group;
    }
    if let Some(target_height) = args.target_height {
        config.script.target_height = target_height;
    }
    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    let summary = controller.prepare_directory(&args.input_dir, args.force_overwrite).await?;

    if summary.failed > 0 {
        return Err(anyhow!("{} of {} videos failed", summary.failed, summary.failed + summary.processed));
    }
    Ok(())
}

async fn run_detect(mut config: Config, args: DetectArgs) -> Result<()> {
    if let Some(score_threshold) = args.score_threshold {
        config.detection.score_threshold = score_threshold;
    }
    if let Some(time_gap) = args.time_gap {
        config.detection.time_gap_secs = time_gap;
    }
    if let Some(line_gap) = args.line_gap {
        config.detection.line_gap = line_gap;
    }
    if args.effect_qualifies {
        config.detection.effect_policy = EffectPolicy::Qualifies;
    }
    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    let summary = controller.detect_paths(&args.inputs, args.output).await?;

    for (path, count) in &summary.written {
        info!("{} bookmark(s) -> {}", count, path.display());
    }
    if summary.failed > 0 {
        return Err(anyhow!("{} subtitle document(s) failed", summary.failed));
    }
    Ok(())
}

async fn run_index(config: Config, video: PathBuf, force_overwrite: bool) -> Result<()> {
    config.validate().context("Configuration validation failed")?;
    let controller = Controller::with_config(config)?;

    match controller.index(&video, force_overwrite).await? {
        IndexOutcome::Created => info!("Index written for {}", video.display()),
        IndexOutcome::AlreadyExists => warn!("Index already exists for {} (use -f to rebuild)", video.display()),
    }
    Ok(())
}

async fn run_fonts(config: Config, command: FontCommands) -> Result<()> {
    config.validate().context("Configuration validation failed")?;
    let manager = FontManager::new(config.tools.clone(), config.fonts.clone());

    match command {
        FontCommands::List => {
            for family in manager.installed_families().await? {
                println!("{}", family);
            }
        }
        FontCommands::Diff { dir } => {
            let missing = manager.missing_in_directory(&dir).await?;
            if missing.is_empty() {
                info!("All fonts in {} are installed", dir.display());
            }
            for font in missing {
                println!("{}\t{}", font.path.display(), font.families.join(", "));
            }
        }
        FontCommands::Load { dir } => {
            let missing = manager.missing_in_directory(&dir).await?;
            let files: Vec<PathBuf> = missing.into_iter().map(|font| font.path).collect();
            manager.load(&files).await?;
        }
        FontCommands::Unload => {
            manager.unload().await?;
        }
        FontCommands::Install { dir } => {
            let missing = manager.missing_in_directory(&dir).await?;
            let files: Vec<PathBuf> = missing.into_iter().map(|font| font.path).collect();
            manager.install(&files).await?;
        }
        FontCommands::Uninstall { dir } => {
            let files = fonts::find_font_files(&dir).map_err(|e| {
                error!("{}", e);
                e
            })?;
            manager.uninstall(&files).await?;
        }
    }

    Ok(())
}
