/*!
 * Tests for font inventory helpers
 */

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;
use subprep::app_config::{FontConfig, ToolsConfig};
use subprep::fonts::{copy_fonts, find_font_files, missing_fonts, parse_family_list, FontFile, FontManager};
use crate::common;

fn font(path: &str, families: &[&str]) -> FontFile {
    FontFile {
        path: PathBuf::from(path),
        families: families.iter().map(|family| family.to_string()).collect(),
    }
}

#[test]
fn test_parse_family_list_withAliases_shouldSplitAndDeduplicate() {
    let output = "DejaVu Sans,DejaVu Sans Condensed\nArial\n\nArial\nFoo\\, Bar\n";

    let families = parse_family_list(output);

    let expected: BTreeSet<String> = ["Arial", "Bar", "DejaVu Sans", "DejaVu Sans Condensed", "Foo"]
        .iter()
        .map(|family| family.to_string())
        .collect();
    assert_eq!(families, expected);
}

#[test]
fn test_missing_fonts_withInstalledFamily_shouldCompareCaseInsensitively() {
    let installed: BTreeSet<String> = ["Arial".to_string(), "Impact".to_string()].into_iter().collect();
    let found = vec![
        font("fonts/arial.ttf", &["ARIAL"]),
        font("fonts/sign.otf", &["Sign Font", "Sign Font Bold"]),
        font("fonts/impact.ttf", &["Impact"]),
    ];

    let missing = missing_fonts(&installed, &found);

    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].path, PathBuf::from("fonts/sign.otf"));
}

#[test]
fn test_find_font_files_withMixedFiles_shouldReturnFontsSorted() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "b.OTF", "font")?;
    common::create_test_file(dir, "a.ttf", "font")?;
    common::create_test_file(dir, "readme.txt", "text")?;
    common::create_test_file(dir, "sub/c.ttc", "font")?;

    let files = find_font_files(dir)?;

    assert_eq!(files, vec![dir.join("a.ttf"), dir.join("b.OTF"), dir.join("sub").join("c.ttc")]);
    Ok(())
}

#[test]
fn test_copy_fonts_withMissingDestination_shouldCreateItAndCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "src/a.ttf", "font data")?;
    let dest = temp_dir.path().join("installed").join("session");

    let copied = copy_fonts(&[source], &dest)?;

    assert_eq!(copied, 1);
    assert_eq!(std::fs::read_to_string(dest.join("a.ttf"))?, "font data");
    Ok(())
}

#[test]
fn test_copy_fonts_withMissingSource_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let result = copy_fonts(&[temp_dir.path().join("nope.ttf")], temp_dir.path());

    assert!(result.is_err());
    Ok(())
}

fn manager_in(font_dir: PathBuf) -> FontManager {
    let config = FontConfig {
        font_dir: Some(font_dir),
        ..FontConfig::default()
    };
    FontManager::new(ToolsConfig::default(), config)
}

#[test]
fn test_session_dir_withConfiguredFontDir_shouldBeInsideIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let manager = manager_in(temp_dir.path().to_path_buf());

    assert_eq!(manager.session_dir()?, temp_dir.path().join("subprep-session"));
    Ok(())
}

#[tokio::test]
async fn test_unload_withoutSession_shouldRemoveNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let manager = manager_in(temp_dir.path().to_path_buf());

    assert_eq!(manager.unload().await?, 0);
    Ok(())
}

#[test]
fn test_uninstall_withFontsNotInstalled_shouldRemoveNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let manager = manager_in(temp_dir.path().join("installed"));

    let removed = tokio_test::block_on(manager.uninstall(&[temp_dir.path().join("a.ttf")]))?;

    assert_eq!(removed, 0);
    Ok(())
}
