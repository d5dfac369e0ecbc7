/*!
 * Merged translation file output.
 *
 * Serializes complete records into a single `contentList` document. The
 * output depends only on the set of records: entries are sorted by
 * `contentuid`, so two runs over the same store produce identical bytes.
 */

use anyhow::{Context, Result};
use log::info;
use quick_xml::escape::{escape, partial_escape};
use std::path::Path;

use crate::extractor::{CONTENT_ELEMENT, CONTENT_ID_ATTRIBUTE};
use crate::file_utils::FileManager;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
const ROOT_ELEMENT: &str = "contentList";
const INDENT: &str = "  ";

/// Value of the `version` attribute on every emitted entry
pub const CONTENT_VERSION: &str = "1";

/// Render `(id, translated_text)` pairs as a language-pack document
pub fn render(records: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = records.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::with_capacity(64 + records.len() * 96);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str(&format!("<{}>\n", ROOT_ELEMENT));

    for (id, text) in sorted {
        out.push_str(&format!(
            "{indent}<{el} {attr}=\"{id}\" version=\"{version}\">{text}</{el}>\n",
            indent = INDENT,
            el = CONTENT_ELEMENT,
            attr = CONTENT_ID_ATTRIBUTE,
            id = escape(id.as_str()),
            version = CONTENT_VERSION,
            text = partial_escape(text.as_str()),
        ));
    }

    out.push_str(&format!("</{}>\n", ROOT_ELEMENT));
    out
}

/// Render `records` and overwrite `path` with the result
///
/// Returns the number of entries written.
pub fn write<P: AsRef<Path>>(path: P, records: &[(String, String)]) -> Result<usize> {
    let path = path.as_ref();
    let document = render(records);

    FileManager::write_to_file(path, &document)
        .with_context(|| format!("Failed to write translation file {:?}", path))?;

    info!("Wrote {} translations to {:?}", records.len(), path);
    Ok(records.len())
}
