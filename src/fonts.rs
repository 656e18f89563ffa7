/*!
 * Font inventory and temporary installation.
 *
 * Installed families are listed with fontconfig (`fc-list`), font files found
 * in a directory are identified with `fc-scan`, and fonts are made available
 * by copying them into the per-user font directory and refreshing the cache
 * with `fc-cache`. Temporarily loaded fonts live in a session subdirectory so
 * they can be unloaded in one step.
 */

use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::app_config::{FontConfig, ToolsConfig};
use crate::errors::FontError;
use crate::media::command;

/// Font file extensions
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc", "otc"];

/// A font file and the family names it provides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFile {
    pub path: PathBuf,
    pub families: Vec<String>,
}

/// Parse family lists as printed by `fc-list : family` or `fc-scan --format "%{family}\n"`.
///
/// Each line may carry several comma-separated aliases.
pub fn parse_family_list(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .flat_map(|line| line.split(','))
        .map(|family| family.replace('\\', "").trim().to_string())
        .filter(|family| !family.is_empty())
        .collect()
}

/// Font files none of whose families is installed
pub fn missing_fonts<'a>(installed: &BTreeSet<String>, found: &'a [FontFile]) -> Vec<&'a FontFile> {
    let installed: BTreeSet<String> = installed.iter().map(|family| family.to_lowercase()).collect();

    found
        .iter()
        .filter(|font| !font.families.iter().any(|family| installed.contains(&family.to_lowercase())))
        .collect()
}

/// Font operations against the host's fontconfig setup
pub struct FontManager {
    tools: ToolsConfig,
    config: FontConfig,
}

impl FontManager {
    pub fn new(tools: ToolsConfig, config: FontConfig) -> Self {
        Self { tools, config }
    }

    fn font_dir(&self) -> Result<PathBuf, FontError> {
        self.config.resolve_font_dir().ok_or(FontError::NoFontDirectory)
    }

    /// Directory holding temporarily loaded fonts
    pub fn session_dir(&self) -> Result<PathBuf, FontError> {
        Ok(self.font_dir()?.join(&self.config.session_dir_name))
    }

    /// Family names of all installed fonts
    pub async fn installed_families(&self) -> Result<BTreeSet<String>, FontError> {
        let tool = self.tools.fc_list.as_str();
        let args = [OsString::from(":"), OsString::from("family")];
        let output = command::run_tool(tool, &args, self.tools.timeout_secs).await?;
        if !output.status.success() {
            return Err(command::failure(tool, output.status.code(), &output.stderr).into());
        }

        let families = parse_family_list(&String::from_utf8_lossy(&output.stdout));
        debug!("{} installed font families", families.len());
        Ok(families)
    }

    /// Font files below `dir` with their family names
    pub async fn scan_directory(&self, dir: &Path) -> Result<Vec<FontFile>, FontError> {
        let mut fonts = Vec::new();
        for path in find_font_files(dir)? {
            let families = self.file_families(&path).await;
            fonts.push(FontFile { path, families });
        }
        Ok(fonts)
    }

    // @returns: Families reported by fc-scan, or the file stem when it cannot tell
    async fn file_families(&self, path: &Path) -> Vec<String> {
        let tool = self.tools.fc_scan.as_str();
        let args = [
            OsString::from("--format"),
            OsString::from("%{family}\n"),
            path.as_os_str().to_owned(),
        ];

        let families = match command::run_tool(tool, &args, self.tools.timeout_secs).await {
            Ok(output) if output.status.success() => parse_family_list(&String::from_utf8_lossy(&output.stdout)),
            Ok(output) => {
                debug!("{} could not read {:?}: {}", tool, path, command::filter_stderr(&String::from_utf8_lossy(&output.stderr)));
                BTreeSet::new()
            }
            Err(e) => {
                warn!("{}", e);
                BTreeSet::new()
            }
        };

        if families.is_empty() {
            let stem = path.file_stem().unwrap_or_default().to_string_lossy().to_string();
            return vec![stem];
        }
        families.into_iter().collect()
    }

    /// Fonts in `dir` that are not installed
    pub async fn missing_in_directory(&self, dir: &Path) -> Result<Vec<FontFile>, FontError> {
        let installed = self.installed_families().await?;
        let found = self.scan_directory(dir).await?;
        Ok(missing_fonts(&installed, &found).into_iter().cloned().collect())
    }

    /// Copy fonts into the session directory until [`FontManager::unload`]
    pub async fn load(&self, files: &[PathBuf]) -> Result<usize, FontError> {
        let session_dir = self.session_dir()?;
        let copied = copy_fonts(files, &session_dir)?;
        self.refresh_cache(&session_dir).await?;
        info!("Loaded {} font(s) into {:?}", copied, session_dir);
        Ok(copied)
    }

    /// Remove every temporarily loaded font
    pub async fn unload(&self) -> Result<usize, FontError> {
        let session_dir = self.session_dir()?;
        if !session_dir.exists() {
            debug!("No font session to unload");
            return Ok(0);
        }

        let removed = find_font_files(&session_dir)?.len();
        fs::remove_dir_all(&session_dir).map_err(|source| FontError::Io {
            path: session_dir.clone(),
            source,
        })?;
        self.refresh_cache(&self.font_dir()?).await?;
        info!("Unloaded {} font(s)", removed);
        Ok(removed)
    }

    /// Copy fonts into the font directory permanently
    pub async fn install(&self, files: &[PathBuf]) -> Result<usize, FontError> {
        let font_dir = self.font_dir()?;
        let copied = copy_fonts(files, &font_dir)?;
        self.refresh_cache(&font_dir).await?;
        info!("Installed {} font(s) into {:?}", copied, font_dir);
        Ok(copied)
    }

    /// Remove previously installed copies of `files` from the font directory
    pub async fn uninstall(&self, files: &[PathBuf]) -> Result<usize, FontError> {
        let font_dir = self.font_dir()?;
        let mut removed = 0;

        for file in files {
            let Some(name) = file.file_name() else { continue };
            let installed = font_dir.join(name);
            if installed.is_file() {
                fs::remove_file(&installed).map_err(|source| FontError::Io {
                    path: installed.clone(),
                    source,
                })?;
                removed += 1;
            }
        }

        if removed > 0 {
            self.refresh_cache(&font_dir).await?;
        }
        info!("Uninstalled {} font(s)", removed);
        Ok(removed)
    }

    async fn refresh_cache(&self, dir: &Path) -> Result<(), FontError> {
        let tool = self.tools.fc_cache.as_str();
        let args = [OsString::from("-f"), dir.as_os_str().to_owned()];
        let output = command::run_tool(tool, &args, self.tools.timeout_secs).await?;
        if !output.status.success() {
            return Err(command::failure(tool, output.status.code(), &output.stderr).into());
        }
        Ok(())
    }
}

/// Font files anywhere below `dir`, sorted by path
pub fn find_font_files(dir: &Path) -> Result<Vec<PathBuf>, FontError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| FontError::Io {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();
        let is_font = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.as_str()));

        if path.is_file() && is_font {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Copy files into `dest_dir`, returning how many were copied
pub fn copy_fonts(files: &[PathBuf], dest_dir: &Path) -> Result<usize, FontError> {
    fs::create_dir_all(dest_dir).map_err(|source| FontError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    let mut copied = 0;
    for file in files {
        let Some(name) = file.file_name() else {
            warn!("Skipping font path without a file name: {:?}", file);
            continue;
        };
        fs::copy(file, dest_dir.join(name)).map_err(|source| FontError::Io {
            path: file.clone(),
            source,
        })?;
        copied += 1;
    }

    Ok(copied)
}
