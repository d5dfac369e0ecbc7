/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use loctrans::file_utils::FileManager;
use crate::common;

/// Test that file_exists distinguishes files from directories
#[test]
fn test_fileExists_withDirectory_shouldReturnFalse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "a.xml", "<a/>")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(FileManager::dir_exists(temp_dir.path()));
    Ok(())
}

/// scan_files descends into subdirectories and ignores extension case
#[test]
fn test_scanFiles_withNestedMixedCase_shouldReturnSortedMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "b.xml", "")?;
    common::create_test_file(temp_dir.path(), "sub/a.XML", "")?;
    common::create_test_file(temp_dir.path(), "sub/notes.txt", "")?;

    let scan = FileManager::scan_files(temp_dir.path(), "xml");
    let files = scan.files;

    assert_eq!(files.len(), 2);
    assert_eq!(scan.unreadable, 0);
    assert_eq!(files, {
        let mut sorted = files.clone();
        sorted.sort();
        sorted
    });
    Ok(())
}

/// move_file replaces an existing destination
#[test]
fn test_moveFile_withExistingDestination_shouldOverwrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let from = common::create_test_file(temp_dir.path(), "from.xml", "new")?;
    let to = common::create_test_file(temp_dir.path(), "dest/to.xml", "old")?;

    FileManager::move_file(&from, &to)?;

    assert!(!from.exists());
    assert_eq!(fs::read_to_string(&to)?, "new");
    Ok(())
}

/// Staging moves only direct XML children of folders named after the language
#[test]
fn test_stageLanguageFiles_shouldMoveOnlySourceLanguageXml() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let localization = temp_dir.path().join("Localization");
    let input = temp_dir.path().join("input");

    common::create_test_file(&localization, "English/english.xml", "<a/>")?;
    common::create_test_file(&localization, "Mod/English/extra.xml", "<a/>")?;
    common::create_test_file(&localization, "English/readme.txt", "x")?;
    common::create_test_file(&localization, "English/nested/deep.xml", "<a/>")?;
    common::create_test_file(&localization, "Chinese/chinese.xml", "<a/>")?;

    let moved = FileManager::stage_language_files(&localization, "English", &input)?;

    assert_eq!(moved, 2);
    assert!(input.join("English/english.xml").exists());
    assert!(input.join("Mod/English/extra.xml").exists());
    assert!(!localization.join("English/english.xml").exists());
    assert!(localization.join("English/readme.txt").exists());
    assert!(localization.join("English/nested/deep.xml").exists());
    assert!(localization.join("Chinese/chinese.xml").exists());
    Ok(())
}

/// Same-named files from different packs are both kept
#[test]
fn test_stageLanguageFiles_withSameFileName_shouldKeepBoth() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let localization = temp_dir.path().join("Localization");
    let input = temp_dir.path().join("input");

    common::create_test_file(&localization, "ModA/English/strings.xml", "first")?;
    common::create_test_file(&localization, "ModB/English/strings.xml", "second")?;

    let moved = FileManager::stage_language_files(&localization, "English", &input)?;

    assert_eq!(moved, 2);
    assert_eq!(fs::read_to_string(input.join("ModA/English/strings.xml"))?, "first");
    assert_eq!(fs::read_to_string(input.join("ModB/English/strings.xml"))?, "second");
    assert_eq!(FileManager::scan_files(&input, "xml").files.len(), 2);
    Ok(())
}

/// A dangling link is counted as unreadable and the rest of the tree is still returned
#[cfg(unix)]
#[test]
fn test_scanFiles_withDanglingLink_shouldCountItAndContinue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "good.xml", "<a/>")?;
    std::os::unix::fs::symlink(temp_dir.path().join("missing.xml"), temp_dir.path().join("dangling.xml"))?;

    let scan = FileManager::scan_files(temp_dir.path(), "xml");

    assert_eq!(scan.files, vec![temp_dir.path().join("good.xml")]);
    assert_eq!(scan.unreadable, 1);
    Ok(())
}

/// A missing localization tree is not an error
#[test]
fn test_stageLanguageFiles_withMissingTree_shouldReturnZero() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let moved = FileManager::stage_language_files(
        temp_dir.path().join("Localization"),
        "English",
        temp_dir.path().join("input"),
    )?;

    assert_eq!(moved, 0);
    Ok(())
}

/// write_to_file creates missing parent directories
#[test]
fn test_writeToFile_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a/b/c.txt");

    FileManager::write_to_file(&path, "content")?;

    assert_eq!(fs::read_to_string(&path)?, "content");
    Ok(())
}
