//! Document text extraction for the `Documents` column.
//!
//! The column holds either a path to a document or the document text itself.
//! [`extract`] resolves it to plain text:
//!
//! * empty                          → empty text
//! * `*.pdf`                        → text of every page, via `lopdf`
//! * `*.txt` / `*.md` / `*.text`    → file contents
//! * anything else                  → used verbatim as inline text
//!
//! Extraction never fails the pipeline.  Errors are returned next to an empty
//! text in [`Extraction::error`] and logged as warnings.

use std::path::Path;

use thiserror::Error;

// ---------------------------------------------------------------------------
// ExtractError
// ---------------------------------------------------------------------------

/// Why a document could not be turned into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse PDF {path}: {message}")]
    Pdf { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extracted text plus the non-fatal error, if any.
#[derive(Debug, Default)]
pub struct Extraction {
    pub text: String,
    pub error: Option<ExtractError>,
}

impl Extraction {
    fn ok(text: String) -> Self {
        Self { text, error: None }
    }

    fn failed(error: ExtractError) -> Self {
        log::warn!("extract: {error}; continuing without document text");
        Self {
            text: String::new(),
            error: Some(error),
        }
    }
}

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "text"];

enum Source<'a> {
    Empty,
    Pdf(&'a Path),
    TextFile(&'a Path),
    Inline(&'a str),
}

fn classify(source: &str) -> Source<'_> {
    if source.is_empty() {
        return Source::Empty;
    }
    if source.contains('\n') {
        return Source::Inline(source);
    }
    let path = Path::new(source);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => Source::Pdf(path),
        Some(e) if TEXT_EXTENSIONS.contains(&e) => Source::TextFile(path),
        _ => Source::Inline(source),
    }
}

/// Resolve a `Documents` value to plain text.
///
/// ```
/// use geo_compliance::extract::extract;
///
/// let inline = extract("Additional compliance requirements for EU users");
/// assert_eq!(inline.text, "Additional compliance requirements for EU users");
/// assert!(inline.error.is_none());
///
/// let missing = extract("no_such_file.pdf");
/// assert!(missing.text.is_empty());
/// assert!(missing.error.is_some());
/// ```
pub fn extract(source: &str) -> Extraction {
    match classify(source.trim()) {
        Source::Empty => Extraction::default(),
        Source::Inline(text) => Extraction::ok(text.to_string()),
        Source::TextFile(path) => match read_text_file(path) {
            Ok(text) => Extraction::ok(text),
            Err(e) => Extraction::failed(e),
        },
        Source::Pdf(path) => match read_pdf(path) {
            Ok(text) => Extraction::ok(text),
            Err(e) => Extraction::failed(e),
        },
    }
}

fn read_text_file(path: &Path) -> Result<String, ExtractError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(ExtractError::NotFound(display));
    }
    let text = std::fs::read_to_string(path).map_err(|source| ExtractError::Read {
        path: display,
        source,
    })?;
    Ok(text.trim().to_string())
}

fn read_pdf(path: &Path) -> Result<String, ExtractError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(ExtractError::NotFound(display));
    }
    let doc = lopdf::Document::load(path).map_err(|e| ExtractError::Pdf {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => log::debug!("extract: {display} page {page_number}: {e}"),
        }
    }
    log::debug!("extract: {display}: {} page(s) with text", pages.len());
    Ok(pages.join("\n").trim().to_string())
}

/// Writes a one-page PDF showing `text`, for extraction tests.
#[cfg(test)]
pub(crate) fn write_test_pdf(path: &Path, text: &str) {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
