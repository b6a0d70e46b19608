use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::content::Operation;
use lopdf::{Document, Encoding, Object, ObjectId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Cannot open document: {0}")]
    Open(String),
    #[error("Cannot extract text from page {page}: {reason}")]
    Page { page: usize, reason: String },
}

/// Abstraction over the document store.
/// Implementations open a statement file and hand out its text one page at a time.
pub trait PageSource {
    fn open(&self, path: &Path) -> Result<Box<dyn PageReader>, SourceError>;
}

/// An opened document. Page indices are zero-based.
pub trait PageReader {
    fn page_count(&self) -> usize;
    fn page_text(&self, index: usize) -> Result<String, SourceError>;
}

// ── PDF backend ───────────────────────────────────────────────────────────────

/// Reads PDF statements with `lopdf`, rebuilding visual lines from the page's
/// text operators.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextSource;

struct PdfReader {
    doc: Document,
    /// Page objects in document order.
    pages: Vec<ObjectId>,
}

impl PageSource for PdfTextSource {
    fn open(&self, path: &Path) -> Result<Box<dyn PageReader>, SourceError> {
        let doc = Document::load(path).map_err(|e| SourceError::Open(e.to_string()))?;
        let pages = doc.get_pages().into_values().collect();
        Ok(Box::new(PdfReader { doc, pages }))
    }
}

impl PageReader for PdfReader {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, SourceError> {
        let page_err = |reason: String| SourceError::Page { page: index + 1, reason };
        let page_id = *self
            .pages
            .get(index)
            .ok_or_else(|| page_err("no such page".to_string()))?;

        // Fonts whose encoding lopdf cannot work out fall back to Latin-1 below.
        let encodings: BTreeMap<Vec<u8>, Encoding> = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| page_err(e.to_string()))?
            .into_iter()
            .filter_map(|(name, font)| font.get_font_encoding(&self.doc).ok().map(|enc| (name, enc)))
            .collect();
        let content = self
            .doc
            .get_and_decode_page_content(page_id)
            .map_err(|e| page_err(e.to_string()))?;

        let mut lines = LineBuilder::default();
        let mut encoding = None;
        for op in &content.operations {
            match op.operator.as_str() {
                "BT" => lines.begin_text(),
                "Tf" => {
                    encoding = op
                        .operands
                        .first()
                        .and_then(|name| name.as_name().ok())
                        .and_then(|name| encodings.get(name));
                }
                "TL" => lines.leading = operand(op, 0),
                "Td" => lines.move_by(operand(op, 1)),
                "TD" => {
                    lines.leading = -operand(op, 1);
                    lines.move_by(operand(op, 1));
                }
                "Tm" => lines.move_to(operand(op, 5)),
                "T*" => lines.next_line(),
                "Tj" | "TJ" => {
                    let text = decode_shown(encoding, &op.operands).map_err(|e| page_err(e.to_string()))?;
                    lines.show(&text);
                }
                "'" => {
                    lines.next_line();
                    let text = decode_shown(encoding, &op.operands).map_err(|e| page_err(e.to_string()))?;
                    lines.show(&text);
                }
                "\"" => {
                    lines.next_line();
                    let text = decode_shown(encoding, op.operands.get(2..).unwrap_or_default())
                        .map_err(|e| page_err(e.to_string()))?;
                    lines.show(&text);
                }
                _ => {}
            }
        }
        Ok(lines.finish())
    }
}

fn operand(op: &Operation, index: usize) -> f32 {
    op.operands
        .get(index)
        .and_then(|o| o.as_float().ok())
        .unwrap_or(0.0)
}

/// Text of a `Tj`/`TJ` operand list. Kerning gaps wider than a tenth of an
/// em inside `TJ` arrays become spaces.
fn decode_shown(encoding: Option<&Encoding>, operands: &[Object]) -> lopdf::Result<String> {
    let mut text = String::new();
    for operand in operands {
        match operand {
            Object::String(bytes, _) => match encoding {
                Some(enc) => text.push_str(&Document::decode_text(enc, bytes)?),
                None => text.extend(bytes.iter().map(|b| char::from(*b))),
            },
            Object::Array(items) => text.push_str(&decode_shown(encoding, items)?),
            Object::Integer(gap) if *gap < -100 => text.push(' '),
            Object::Real(gap) if *gap < -100.0 => text.push(' '),
            _ => {}
        }
    }
    Ok(text)
}

/// Vertical movement smaller than this keeps text on the same line.
const SAME_LINE_TOLERANCE: f32 = 1.0;

/// Groups shown text into lines by baseline. A line move or a new baseline
/// starts a line; a move along the same baseline inserts a space.
#[derive(Debug, Default)]
struct LineBuilder {
    lines: Vec<String>,
    current: String,
    /// Baseline of the current text line, in text space.
    line_y: f32,
    leading: f32,
    /// Baseline of the text already in `current`.
    shown_y: Option<f32>,
    forced_break: bool,
    moved: bool,
}

impl LineBuilder {
    fn begin_text(&mut self) {
        self.line_y = 0.0;
        self.moved = true;
    }

    fn move_by(&mut self, dy: f32) {
        self.line_y += dy;
        self.moved = true;
    }

    fn move_to(&mut self, y: f32) {
        self.line_y = y;
        self.moved = true;
    }

    fn next_line(&mut self) {
        self.line_y -= self.leading;
        self.forced_break = true;
    }

    fn show(&mut self, text: &str) {
        let new_baseline = self
            .shown_y
            .is_some_and(|y| (y - self.line_y).abs() > SAME_LINE_TOLERANCE);
        if self.forced_break || new_baseline {
            self.break_line();
        } else if self.moved && !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
        self.forced_break = false;
        self.moved = false;
        self.current.push_str(text);
        self.shown_y = Some(self.line_y);
    }

    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        let line = line.trim_end();
        if !line.trim_start().is_empty() {
            self.lines.push(line.to_string());
        }
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Serves pre-set pages keyed by file name, ignoring file contents.
/// Any file name it does not know opens as unreadable.
#[derive(Debug, Default, Clone)]
pub struct MockSource {
    documents: HashMap<String, Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document<I, S>(mut self, file_name: &str, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents
            .insert(file_name.to_string(), pages.into_iter().map(Into::into).collect());
        self
    }
}

struct MockReader {
    pages: Vec<String>,
}

impl PageSource for MockSource {
    fn open(&self, path: &Path) -> Result<Box<dyn PageReader>, SourceError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let pages = self
            .documents
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::Open(format!("unknown mock document '{name}'")))?;
        Ok(Box::new(MockReader { pages }))
    }
}

impl PageReader for MockReader {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, SourceError> {
        self.pages.get(index).cloned().ok_or_else(|| SourceError::Page {
            page: index + 1,
            reason: "no such page".to_string(),
        })
    }
}
