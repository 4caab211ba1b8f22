//! Document readers for plain text, PDF, and DOCX files.
//!
//! The reader is selected once from the file extension ([`FileType`]) and
//! either returns the whole text of the document or an error; there is no
//! partial-content success. Every error carries the path it was raised for.

use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{Document, FileType};

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

const DOCX_BODY_PART: &str = "word/document.xml";

/// Read the full text of the document at `path`.
pub fn read_document(path: &Path) -> Result<String> {
    read_as(path, &FileType::from_path(path))
}

/// Read `path` into a [`Document`] named after its base filename.
pub fn load_document(path: &Path) -> Result<Document> {
    let file_type = FileType::from_path(path);
    let text = read_as(path, &file_type)?;
    Ok(Document {
        name: base_name(path),
        file_type,
        text,
    })
}

fn read_as(path: &Path, file_type: &FileType) -> Result<String> {
    match file_type {
        FileType::Text => read_text(path),
        FileType::Pdf => read_pdf(path),
        FileType::Docx => read_docx(path),
        FileType::Unsupported(extension) => Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: extension.clone(),
        }),
    }
}

/// The final path component, lossily converted to UTF-8.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))
}

fn read_pdf(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::from_io(path, e))?;
    let pages = extract_pdf_pages(&bytes).map_err(|reason| Error::MalformedDocument {
        path: path.to_path_buf(),
        reason,
    })?;

    let mut text = String::new();
    for page in pages {
        text.push_str(&page);
        text.push('\n');
    }
    Ok(text)
}

fn extract_pdf_pages(bytes: &[u8]) -> std::result::Result<Vec<String>, String> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())
}

fn read_docx(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::from_io(path, e))?;
    let xml = read_docx_body(&bytes).map_err(|reason| Error::MalformedDocument {
        path: path.to_path_buf(),
        reason,
    })?;
    let paragraphs = extract_paragraphs(&xml).map_err(|reason| Error::MalformedDocument {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(paragraphs.join("\n"))
}

fn read_docx_body(bytes: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let entry = archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| format!("{}: {}", DOCX_BODY_PART, e))?;
    let mut out = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| e.to_string())?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(format!(
            "ZIP entry {} exceeds size limit ({} bytes)",
            DOCX_BODY_PART, MAX_XML_ENTRY_BYTES
        ));
    }
    Ok(out)
}

/// Collect the text of every `w:p` paragraph, in document order.
///
/// A paragraph's text is the concatenation of its `w:t` runs; empty
/// paragraphs are kept so that the joined output mirrors the layout.
fn extract_paragraphs(xml: &[u8]) -> std::result::Result<Vec<String>, String> {
    use quick_xml::events::Event;

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"p" {
                    paragraphs.push(String::new());
                }
            }
            Ok(Event::Text(te)) if in_text => {
                let text = te.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }
    Ok(paragraphs)
}
