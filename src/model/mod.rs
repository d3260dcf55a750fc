//! Data model shared by the extractor and the difference engine.
//!
//! Extraction produces [`PageText`] from [`TextRun`]s; comparison turns two
//! `PageText` values into [`DifferenceRecord`]s. Nothing here is mutated
//! after construction.

mod page;
mod record;

pub use page::{PageText, TextRun};
pub use record::{DiffReport, DifferenceRecord, DocumentRole};
