/*!
 * Common test utilities for the loctrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use loctrans::app_config::Config;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Route library logs to the test output when `RUST_LOG` is set
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a valid 37 character content id from a number
pub fn uid(n: usize) -> String {
    format!("h{:0>36}", n)
}

/// Creates a file with the given content, creating parent directories
pub fn create_test_file(dir: &Path, relative: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Render a language-pack document from `(id, text)` pairs
pub fn content_list(entries: &[(&str, &str)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<contentList>\n");
    for (id, text) in entries {
        xml.push_str(&format!(
            "  <content contentuid=\"{}\" version=\"1\">{}</content>\n",
            id, text
        ));
    }
    xml.push_str("</contentList>\n");
    xml
}

/// Writes a language-pack document at `relative` below `dir`
pub fn create_language_file(dir: &Path, relative: &str, entries: &[(&str, &str)]) -> Result<PathBuf> {
    create_test_file(dir, relative, &content_list(entries))
}

/// A config whose paths all live inside `root`
pub fn test_config(root: &Path) -> Config {
    let path = |p: &str| root.join(p).to_string_lossy().into_owned();

    let mut config = Config {
        game_root: path("game"),
        input_dir: path("input"),
        output_file: path("out/translated_content.xml"),
        database_path: path("data/translations.db"),
        ..Config::default()
    };
    config.translation.max_workers = 4;
    config.translation.timeout_secs = 5;
    config
}
