//! PDF decode capability.
//!
//! The extractor only needs a page count and, per page, an ordered list of
//! [`TextRun`]s with end-of-line hints. These traits keep the concrete PDF
//! library (lopdf by default) out of the extraction and comparison logic.

mod lopdf_engine;

pub use lopdf_engine::{LopdfEngine, LopdfTextLayer};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::TextRun;

/// An opened document's text layer.
pub trait TextLayer: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Text runs of a 1-indexed page, in content order.
    fn text_runs(&self, page_number: u32) -> Result<Vec<TextRun>>;
}

/// A swappable PDF decoder.
pub trait DecodeEngine: Send + Sync {
    /// Engine name used for lookup in an [`EngineRegistry`].
    fn name(&self) -> &str;

    /// Prepare the engine for use.
    ///
    /// Failing here means the comparison feature is unavailable, which is
    /// reported as [`Error::EngineUnavailable`].
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Open a document from its bytes.
    fn open(&self, data: &[u8]) -> Result<Box<dyn TextLayer>>;
}

/// Registry mapping engine names to engines.
pub struct EngineRegistry {
    engines: BTreeMap<String, Arc<dyn DecodeEngine>>,
}

impl EngineRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            engines: BTreeMap::new(),
        }
    }

    /// Create a registry with the built-in lopdf engine.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LopdfEngine::new()));
        registry
    }

    /// Register an engine under its (case-insensitive) name.
    pub fn register(&mut self, engine: Arc<dyn DecodeEngine>) {
        self.engines.insert(engine.name().to_lowercase(), engine);
    }

    /// Look up an engine by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn DecodeEngine>> {
        self.engines
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| Error::EngineUnavailable(format!("no engine named '{}'", name)))
    }

    /// Registered engine names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.engines.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
