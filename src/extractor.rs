/*!
 * Language-pack extraction.
 *
 * Walks a directory tree of localization XML documents and feeds every
 * `<content contentuid="...">text</content>` pair into the content store.
 * A document that cannot be read or parsed is logged and skipped; the rest
 * of the tree is still processed.
 */

use anyhow::{anyhow, Context, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::path::Path;

use crate::database::ContentStore;
use crate::file_utils::FileManager;

/// Attribute carrying the record id
pub const CONTENT_ID_ATTRIBUTE: &str = "contentuid";

/// Element holding one localized string
pub const CONTENT_ELEMENT: &str = "content";

/// One `content` element as found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    /// Value of the `contentuid` attribute, if present
    pub id: Option<String>,
    /// Trimmed, unescaped element text
    pub text: String,
}

/// Counters for one extraction or seeding pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// XML files found
    pub files_scanned: usize,
    /// Files that could not be read or parsed
    pub files_failed: usize,
    /// Records written to the store
    pub inserted: usize,
    /// Entries rejected or already known
    pub skipped: usize,
}

impl std::fmt::Display for ExtractionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files ({} failed), {} written, {} skipped",
            self.files_scanned, self.files_failed, self.inserted, self.skipped
        )
    }
}

/// How extracted pairs are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Source-language text, inserted as pending records
    Source,
    /// Reference translations, imported with `seed_translation`
    Reference,
}

/// Reads language-pack trees into the content store
pub struct Extractor {
    store: ContentStore,
}

impl Extractor {
    /// Create an extractor writing into `store`
    pub fn new(store: ContentStore) -> Self {
        Self { store }
    }

    /// Insert every source-language string found below `dir`
    pub async fn extract_dir<P: AsRef<Path>>(&self, dir: P) -> Result<ExtractionReport> {
        self.scan(dir.as_ref(), Mode::Source).await
    }

    /// Import every reference translation found below `dir`
    pub async fn seed_dir<P: AsRef<Path>>(&self, dir: P) -> Result<ExtractionReport> {
        self.scan(dir.as_ref(), Mode::Reference).await
    }

    async fn scan(&self, dir: &Path, mode: Mode) -> Result<ExtractionReport> {
        let mut report = ExtractionReport::default();

        if !FileManager::dir_exists(dir) {
            warn!("Directory not found, nothing to extract: {:?}", dir);
            return Ok(report);
        }

        let scan = FileManager::scan_files(dir, "xml");
        report.files_failed += scan.unreadable;
        info!("Found {} XML files in {:?}", scan.files.len(), dir);

        for file in scan.files {
            report.files_scanned += 1;

            let entries = match read_document(&file).await {
                Ok(entries) => entries,
                Err(e) => {
                    error!("Parsing error: {:#} - File: {:?}", e, file);
                    report.files_failed += 1;
                    continue;
                }
            };

            for entry in entries {
                let id = match entry.id.as_deref() {
                    Some(id) if !id.is_empty() => id,
                    _ => {
                        warn!("Skipping content without {} in {:?}", CONTENT_ID_ATTRIBUTE, file);
                        report.skipped += 1;
                        continue;
                    }
                };

                if entry.text.is_empty() {
                    warn!("Skipping empty content {} in {:?}", id, file);
                    report.skipped += 1;
                    continue;
                }

                let written = match mode {
                    Mode::Source => self.store.insert_if_new(id, &entry.text).await?,
                    Mode::Reference => self.store.seed_translation(id, &entry.text).await?.changed(),
                };

                if written {
                    report.inserted += 1;
                } else {
                    report.skipped += 1;
                }
            }

            debug!("Processed {:?}", file);
        }

        info!("Extraction from {:?}: {}", dir, report);
        Ok(report)
    }
}

/// Read and parse one document
async fn read_document(path: &Path) -> Result<Vec<ContentEntry>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    let xml = decode_document(&bytes)?;
    parse_content_document(&xml)
}

static ENCODING_DECL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^<\?xml[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
        .expect("encoding declaration pattern is valid")
});

/// Decode raw document bytes into a string
///
/// A byte order mark wins, then UTF-16 detected from the leading `<`, then
/// the `encoding` of the XML declaration, then UTF-8. A UTF-16 declaration
/// on ASCII-compatible bytes is read as UTF-8.
pub fn decode_document(bytes: &[u8]) -> Result<String> {
    let (encoding, body) = if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        (encoding, &bytes[bom_len..])
    } else if bytes.starts_with(&[b'<', 0]) {
        (UTF_16LE, bytes)
    } else if bytes.starts_with(&[0, b'<']) {
        (UTF_16BE, bytes)
    } else {
        (declared_encoding(bytes).unwrap_or(UTF_8), bytes)
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| anyhow!("Document is not valid {}", encoding.name()))
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let label = ENCODING_DECL_REGEX.captures(&head)?.get(1)?.as_str().to_string();

    match Encoding::for_label_no_replacement(label.as_bytes()) {
        Some(encoding) => Some(encoding.output_encoding()),
        None => {
            warn!("Unknown declared encoding {:?}, reading as UTF-8", label);
            None
        }
    }
}

/// Collect every `content` element of a document, at any depth
///
/// Text is the element's own text and CDATA before its first child element,
/// unescaped and trimmed, which mirrors how language packs store markup as
/// escaped text.
pub fn parse_content_document(xml: &str) -> Result<Vec<ContentEntry>> {
    let xml = xml.trim_start_matches('\u{feff}');
    let mut reader = Reader::from_str(xml);

    let mut entries = Vec::new();
    let mut open_elements = 0usize;
    let mut saw_root = false;

    // (id, collected text, nesting below the content element, collecting)
    let mut current: Option<(Option<String>, String, usize, bool)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                open_elements += 1;
                saw_root = true;

                if let Some((_, _, depth, collecting)) = current.as_mut() {
                    *depth += 1;
                    *collecting = false;
                } else if is_content(&e) {
                    current = Some((content_id(&e)?, String::new(), 0, true));
                }
            }
            Event::Empty(e) => {
                saw_root = true;
                if let Some((_, _, _, collecting)) = current.as_mut() {
                    *collecting = false;
                } else if is_content(&e) {
                    entries.push(ContentEntry {
                        id: content_id(&e)?,
                        text: String::new(),
                    });
                }
            }
            Event::Text(e) => {
                if let Some((_, text, _, true)) = current.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some((_, text, _, true)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                open_elements = open_elements
                    .checked_sub(1)
                    .ok_or_else(|| anyhow!("Unexpected closing tag"))?;

                if let Some((_, _, depth, _)) = current.as_mut() {
                    if *depth == 0 {
                        if let Some((id, text, _, _)) = current.take() {
                            entries.push(ContentEntry {
                                id,
                                text: text.trim().to_string(),
                            });
                        }
                    } else {
                        *depth -= 1;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(anyhow!("No root element found"));
    }
    if open_elements > 0 {
        return Err(anyhow!("Unexpected end of document: {} unclosed elements", open_elements));
    }

    Ok(entries)
}

fn is_content(e: &BytesStart) -> bool {
    e.local_name().as_ref() == CONTENT_ELEMENT.as_bytes()
}

fn content_id(e: &BytesStart) -> Result<Option<String>> {
    Ok(match e.try_get_attribute(CONTENT_ID_ATTRIBUTE)? {
        Some(attr) => Some(attr.unescape_value()?.trim().to_string()),
        None => None,
    })
}
