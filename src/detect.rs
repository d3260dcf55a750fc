//! PDF header sniffing.
//!
//! Rejects obviously non-PDF input before handing bytes to a decode engine,
//! so that e.g. an HTML error page saved as `.pdf` fails fast with
//! [`Error::UnknownFormat`].

use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Producers may put junk (often a BOM or mail headers) before the header.
/// Readers tolerate up to 1024 bytes of it.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Version read from the `%PDF-x.y` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// Version string (e.g., "1.7")
    pub version: String,
    /// Byte offset of the `%PDF-` marker
    pub offset: usize,
}

/// Locate and validate the PDF header.
pub fn sniff_header(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + PDF_MAGIC.len();
    let version_bytes = data
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version, offset })
}

/// Quick check without error details.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    sniff_header(data).is_ok()
}

fn is_valid_version(version: &str) -> bool {
    matches!(
        version,
        "1.0" | "1.1" | "1.2" | "1.3" | "1.4" | "1.5" | "1.6" | "1.7" | "2.0"
    )
}
