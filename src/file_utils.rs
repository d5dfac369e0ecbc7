use anyhow::{Context, Result};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: Result of a directory scan
#[derive(Debug, Default)]
pub struct FileScan {
    /// Matching files, sorted
    pub files: Vec<PathBuf>,
    /// Entries that produced an I/O error and were skipped
    pub unreadable: usize,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find files with a specific extension in a directory tree
    ///
    /// The match is case-insensitive and the result is sorted so repeated
    /// runs visit files in the same order. Entries that cannot be read, such
    /// as dangling links or unreadable folders, are logged and counted
    /// instead of failing the scan.
    pub fn scan_files<P: AsRef<Path>>(dir: P, extension: &str) -> FileScan {
        let mut scan = FileScan::default();
        let wanted = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    scan.unreadable += 1;
                    continue;
                }
            };
            let path = entry.path();

            if entry.file_type().is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(wanted) {
                        scan.files.push(path.to_path_buf());
                    }
                }
            }
        }

        scan.files.sort();
        scan
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Move a file, replacing any existing file at the destination
    ///
    /// Falls back to copy + delete when a rename is not possible, e.g. across
    /// filesystems.
    pub fn move_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        if fs::rename(from, to).is_err() {
            fs::copy(from, to)
                .with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
            fs::remove_file(from)
                .with_context(|| format!("Failed to remove {:?} after copy", from))?;
        }

        Ok(())
    }

    /// Move the XML files of every `<language>` folder below `localization_root`
    /// into `input_dir`
    ///
    /// Only files directly inside a folder named `language` are moved. Each
    /// file keeps its path relative to `localization_root`, so packs that ship
    /// files with the same name land side by side. A missing localization
    /// tree is logged and counts as zero files; a file that cannot be moved is
    /// logged and skipped.
    pub fn stage_language_files<P1: AsRef<Path>, P2: AsRef<Path>>(
        localization_root: P1,
        language: &str,
        input_dir: P2,
    ) -> Result<usize> {
        let localization_root = localization_root.as_ref();
        let input_dir = input_dir.as_ref();

        if !Self::dir_exists(localization_root) {
            warn!("Localization folder not found: {:?}", localization_root);
            return Ok(0);
        }

        Self::ensure_dir(input_dir)?;

        let language_dirs: Vec<PathBuf> = WalkDir::new(localization_root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir() && e.file_name() == language)
            .map(|e| e.into_path())
            .collect();

        let mut moved = 0;
        for language_dir in language_dirs {
            let entries = fs::read_dir(&language_dir)
                .with_context(|| format!("Failed to list {:?}", language_dir))?;

            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                let is_xml = path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("xml"));
                if !path.is_file() || !is_xml {
                    continue;
                }

                let relative = match path.strip_prefix(localization_root) {
                    Ok(relative) => relative,
                    Err(_) => {
                        error!("Staging skipped {:?}: outside {:?}", path, localization_root);
                        continue;
                    }
                };
                let destination = input_dir.join(relative);

                match Self::move_file(&path, &destination) {
                    Ok(()) => {
                        info!("Staged {:?} -> {:?}", path, destination);
                        moved += 1;
                    }
                    Err(e) => error!("Failed to stage {:?}: {}", path, e),
                }
            }
        }

        Ok(moved)
    }
}
