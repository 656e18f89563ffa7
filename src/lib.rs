/*!
 * # subprep - subtitle workspace preparation
 *
 * A Rust library for preparing subtitle comparison workspaces for video releases.
 *
 * ## Features
 *
 * - Inspect Matroska containers and extract subtitle tracks and font attachments
 * - Build video seek indexes
 * - Generate playback scripts from a placeholder template
 * - Detect typesetting lines in ASS/SSA subtitles and export editor bookmarks
 * - List, diff, load and install fonts through fontconfig
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `typesetting`: Typesetting detection:
 *   - `typesetting::events`: Dialogue event parsing
 *   - `typesetting::scoring`: Override-tag scoring
 *   - `typesetting::classifier`: Classification and deduplication
 *   - `typesetting::bookmarks`: Bookmark list writing
 * - `media`: Wrappers for container, extraction and indexing tools
 * - `script_template`: Playback script generation
 * - `fonts`: Font inventory and installation
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod fonts;
pub mod media;
pub mod script_template;
pub mod typesetting;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, FontError, SubtitleError, ToolError};
pub use typesetting::{BookmarkEntry, DetectionParams, DialogueEvent, OverrideTagWeightTable, TypesettingDetector};
