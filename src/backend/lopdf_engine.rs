//! [`DecodeEngine`] backed by lopdf.
//!
//! lopdf exposes content-stream operations, not text runs, so this module
//! walks each page's operators, decodes shown strings with the font
//! encoding, and derives end-of-line hints from baseline changes.

use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use super::{decode_text_simple, DecodeEngine, TextLayer};
use crate::detect::sniff_header;
use crate::error::{Error, Result};
use crate::model::TextRun;

/// TJ adjustments beyond this (in 1/1000 text space units) read as a word gap.
const SPACE_THRESHOLD: f32 = 200.0;

/// Default leading used by `T*` when no `TL` has been set.
const DEFAULT_LEADING: f32 = 12.0;

/// The built-in lopdf decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfEngine;

impl LopdfEngine {
    /// Create the engine.
    pub fn new() -> Self {
        Self
    }
}

impl DecodeEngine for LopdfEngine {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn open(&self, data: &[u8]) -> Result<Box<dyn TextLayer>> {
        Ok(Box::new(LopdfTextLayer::load(data)?))
    }
}

/// A document loaded with lopdf.
pub struct LopdfTextLayer {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
}

impl LopdfTextLayer {
    /// Load from an in-memory byte slice.
    pub fn load(data: &[u8]) -> Result<Self> {
        let header = sniff_header(data)?;
        log::debug!("Opening PDF {} ({} bytes)", header.version, data.len());

        let doc = LopdfDocument::load_mem(data)?;
        let pages = doc.get_pages().into_values().collect();
        Ok(Self { doc, pages })
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        page_number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .copied()
            .ok_or_else(|| {
                Error::Decode(format!(
                    "page {} is out of range (document has {} pages)",
                    page_number,
                    self.pages.len()
                ))
            })
    }

    fn decode_string(
        &self,
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        font_name: &[u8],
        bytes: &[u8],
    ) -> String {
        if let Some(font) = fonts.get(font_name) {
            if let Ok(encoding) = font.get_font_encoding(&self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Decode a `TJ` array, turning wide negative kerning into spaces.
    fn decode_array(
        &self,
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        font_name: &[u8],
        items: &[Object],
    ) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    combined.push_str(&self.decode_string(fonts, font_name, bytes));
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = -get_number(item).unwrap_or(0.0);
                    if adjustment > SPACE_THRESHOLD
                        && combined.chars().last().is_some_and(|c| {
                            !c.is_whitespace() && !is_spaceless_script_char(c)
                        })
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }
        combined
    }
}

impl TextLayer for LopdfTextLayer {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn text_runs(&self, page_number: u32) -> Result<Vec<TextRun>> {
        use lopdf::content::Content;

        let page_id = self.page_id(page_number)?;
        let fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();
        let data = self.doc.get_page_content(page_id)?;
        let content = Content::decode(&data).map_err(|e| Error::Decode(e.to_string()))?;

        let mut builder = RunBuilder::default();
        let mut state = TextState::default();
        let mut state_stack: Vec<(TextState, Vec<u8>)> = Vec::new();
        let mut font_name: Vec<u8> = Vec::new();
        let mut in_text_block = false;

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => state_stack.push((state.clone(), font_name.clone())),
                "Q" => {
                    if let Some((saved, saved_font)) = state_stack.pop() {
                        state.restore(saved);
                        font_name = saved_font;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operands(operands) {
                        state.ctm = multiply(&m, &state.ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    state.reset_text_matrix();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        font_name = name.clone();
                    }
                    if let Some(size) = operands.get(1).and_then(get_number) {
                        state.font_size = size;
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    let tx = operands.first().and_then(get_number).unwrap_or(0.0);
                    let ty = operands.get(1).and_then(get_number).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.translate(tx, ty);
                }
                "Tm" => {
                    if let Some(m) = matrix_operands(operands) {
                        state.tm = m;
                        state.line_origin = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" if in_text_block => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = self.decode_string(&fonts, &font_name, bytes);
                        builder.push(text, &state);
                    }
                }
                "TJ" if in_text_block => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let text = self.decode_array(&fonts, &font_name, items);
                        builder.push(text, &state);
                    }
                }
                "'" | "\"" if in_text_block => {
                    state.next_line();
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = operands.get(text_idx) {
                        let text = self.decode_string(&fonts, &font_name, bytes);
                        builder.push(text, &state);
                    }
                }
                _ => {}
            }
        }

        Ok(builder.finish())
    }
}

/// Collects runs and marks the previous run as end-of-line whenever the
/// baseline moves.
#[derive(Default)]
struct RunBuilder {
    runs: Vec<TextRun>,
    last_baseline: Option<f32>,
}

impl RunBuilder {
    fn push(&mut self, text: String, state: &TextState) {
        if text.trim().is_empty() {
            return;
        }
        let baseline = state.baseline();
        let tolerance = (state.effective_font_size() * 0.5).max(1.0);
        if let (Some(prev), Some(last)) = (self.last_baseline, self.runs.last_mut()) {
            if (baseline - prev).abs() > tolerance {
                last.end_of_line = true;
            }
        }
        self.last_baseline = Some(baseline);
        self.runs.push(TextRun::new(text));
    }

    fn finish(self) -> Vec<TextRun> {
        self.runs
    }
}

/// Graphics and text state needed to place runs vertically.
#[derive(Clone)]
struct TextState {
    ctm: [f32; 6],
    tm: [f32; 6],
    line_origin: [f32; 6],
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            tm: IDENTITY,
            line_origin: IDENTITY,
            font_size: 12.0,
            leading: DEFAULT_LEADING,
        }
    }
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl TextState {
    fn reset_text_matrix(&mut self) {
        self.tm = IDENTITY;
        self.line_origin = IDENTITY;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        let m = self.line_origin;
        self.line_origin[4] = tx * m[0] + ty * m[2] + m[4];
        self.line_origin[5] = tx * m[1] + ty * m[3] + m[5];
        self.tm = self.line_origin;
    }

    /// Restore a state saved by `q`. The text matrices are not part of the
    /// graphics state and keep their current values.
    fn restore(&mut self, saved: TextState) {
        *self = TextState {
            tm: self.tm,
            line_origin: self.line_origin,
            ..saved
        };
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    /// Baseline y in device space.
    fn baseline(&self) -> f32 {
        let m = multiply(&self.tm, &self.ctm);
        m[5]
    }

    fn effective_font_size(&self) -> f32 {
        let m = multiply(&self.tm, &self.ctm);
        self.font_size * (m[2] * m[2] + m[3] * m[3]).sqrt()
    }
}

/// Multiply two 2D transformation matrices in PDF `[a b c d e f]` form.
fn multiply(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn matrix_operands(operands: &[Object]) -> Option<[f32; 6]> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [0.0f32; 6];
    for (slot, obj) in m.iter_mut().zip(operands) {
        *slot = get_number(obj)?;
    }
    Some(m)
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Scripts that do not separate words with spaces (Chinese, Japanese).
/// Hangul is excluded: Korean uses word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}
