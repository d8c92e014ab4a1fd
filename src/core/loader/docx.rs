//! Word (.docx) text extraction.
//!
//! A .docx file is a zip archive; text lives in `word/document.xml`
//! (plus header and footer parts) as `<w:t>` runs inside `<w:p>`
//! paragraphs. Extraction follows the docx2txt conventions:
//!
//! - every paragraph opens with a blank line (`\n\n`)
//! - `<w:tab/>` inside a run becomes `\t`
//! - `<w:br/>` and `<w:cr/>` become `\n`
//! - headers come first, then the body, then footers
//! - the result is trimmed

use crate::core::error::{RagError, Result};
use crate::core::types::{Document, Metadata};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const BODY_PART: &str = "word/document.xml";

/// Load a .docx file into a single `Document` with no page number.
///
/// # Errors
///
/// Returns `LoadFailed` if the file is not a readable zip archive,
/// has no `word/document.xml` part, or contains malformed XML.
pub fn load_docx(path: &Path) -> Result<Vec<Document>> {
    let source = path.display().to_string();
    let file =
        File::open(path).map_err(|e| RagError::LoadFailed(format!("{source}: {e}")))?;

    let text = extract_text(file).map_err(|e| RagError::LoadFailed(format!("{source}: {e}")))?;

    tracing::debug!("Loaded {} chars from {}", text.chars().count(), source);
    Ok(vec![Document::new(text, Metadata::new(source, None))])
}

/// Extract the text of every text-bearing part of a .docx archive
pub fn extract_text<R: Read + Seek>(reader: R) -> std::result::Result<String, String> {
    let mut archive = ZipArchive::new(reader).map_err(|e| format!("Not a .docx archive: {e}"))?;

    let mut headers = Vec::new();
    let mut footers = Vec::new();
    for name in archive.file_names() {
        if is_part(name, "word/header") {
            headers.push(name.to_string());
        } else if is_part(name, "word/footer") {
            footers.push(name.to_string());
        }
    }
    headers.sort();
    footers.sort();

    let mut text = String::new();
    for name in &headers {
        text.push_str(&xml_to_text(&read_part(&mut archive, name)?)?);
    }
    text.push_str(&xml_to_text(&read_part(&mut archive, BODY_PART)?)?);
    for name in &footers {
        text.push_str(&xml_to_text(&read_part(&mut archive, name)?)?);
    }

    Ok(text.trim().to_string())
}

fn is_part(name: &str, prefix: &str) -> bool {
    name.starts_with(prefix) && name.ends_with(".xml")
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> std::result::Result<String, String> {
    let mut part = archive
        .by_name(name)
        .map_err(|e| format!("Missing {name}: {e}"))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| format!("Failed to read {name}: {e}"))?;
    Ok(xml)
}

/// Flatten WordprocessingML into plain text
fn xml_to_text(xml: &str) -> std::result::Result<String, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut text = String::new();
    let mut in_text = false;
    let mut run_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => text.push_str("\n\n"),
                b"r" => run_depth += 1,
                b"t" => in_text = true,
                b"tab" if run_depth > 0 => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" => text.push_str("\n\n"),
                b"tab" if run_depth > 0 => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let unescaped = e
                    .unescape()
                    .map_err(|err| format!("Malformed text run: {err}"))?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(e)) if in_text => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "Malformed XML at position {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
    }

    Ok(text)
}
