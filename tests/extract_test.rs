//! Integration tests for text extraction through lopdf.

mod common;

use std::sync::Mutex;

use common::{build_pdf, build_pdf_with_layout, Layout};
use pdfdiff::{
    extract_bytes, is_pdf_bytes, DecodeEngine, EngineRegistry, Error, ExtractOptions,
    ExtractProgress, LopdfEngine, TextExtractor,
};

#[test]
fn test_generated_pdf_is_detected() {
    let pdf = build_pdf(&[&["Hello"]]);
    assert!(is_pdf_bytes(&pdf));
}

#[test]
fn test_lines_become_page_blocks() {
    let pdf = build_pdf(&[
        &["The sky is blue.", "Grass is green."],
        &["Second page."],
    ]);
    let pages = extract_bytes(&pdf).unwrap();

    assert_eq!(pages.page_count(), 2);
    assert_eq!(pages.page(1), Some("The sky is blue.\nGrass is green."));
    assert_eq!(pages.page(2), Some("Second page."));
}

#[test]
fn test_runs_on_one_baseline_share_a_line() {
    let pdf = build_pdf_with_layout(&[&["Quarterly revenue grew", "Costs fell"]], Layout::Words);
    let pages = extract_bytes(&pdf).unwrap();
    assert_eq!(pages.page(1), Some("Quarterly revenue grew\nCosts fell"));
}

#[test]
fn test_empty_page_keeps_its_slot() {
    let pdf = build_pdf(&[&["First."], &[], &["Third."]]);
    let pages = extract_bytes(&pdf).unwrap();

    assert_eq!(pages.page_count(), 3);
    assert_eq!(pages.page(2), Some(""));
    assert_eq!(pages.page(3), Some("Third."));
}

#[test]
fn test_sequential_matches_parallel() {
    let blocks: Vec<Vec<String>> = (1..=12)
        .map(|p| (1..=4).map(|l| format!("Page {} line {}", p, l)).collect())
        .collect();
    let refs: Vec<Vec<&str>> = blocks
        .iter()
        .map(|b| b.iter().map(String::as_str).collect())
        .collect();
    let pages: Vec<&[&str]> = refs.iter().map(Vec::as_slice).collect();
    let pdf = build_pdf(&pages);

    let parallel = TextExtractor::lopdf().extract(&pdf, &|_| {}).unwrap();
    let sequential = TextExtractor::lopdf()
        .with_options(ExtractOptions::new().sequential())
        .extract(&pdf, &|_| {})
        .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.page(7), Some("Page 7 line 1\nPage 7 line 2\nPage 7 line 3\nPage 7 line 4"));
}

#[test]
fn test_progress_loading_then_pages() {
    let pdf = build_pdf(&[&["a"], &["b"], &["c"]]);
    let seen = Mutex::new(Vec::new());
    TextExtractor::lopdf()
        .with_options(ExtractOptions::new().sequential())
        .extract(&pdf, &|p| seen.lock().unwrap().push(p))
        .unwrap();

    let seen = seen.into_inner().unwrap();
    let size = pdf.len() as u64;
    assert_eq!(
        seen,
        vec![
            ExtractProgress::Loading {
                loaded: size,
                total: size
            },
            ExtractProgress::Pages { loaded: 1, total: 3 },
            ExtractProgress::Pages { loaded: 2, total: 3 },
            ExtractProgress::Pages { loaded: 3, total: 3 },
        ]
    );
}

#[test]
fn test_non_pdf_is_a_decode_error() {
    let err = extract_bytes(b"PK\x03\x04 this is a zip archive").unwrap_err();
    assert!(matches!(err, Error::UnknownFormat));
    assert!(err.is_decode_error());
}

#[test]
fn test_corrupt_pdf_is_a_decode_error() {
    let mut pdf = build_pdf(&[&["Hello"]]);
    pdf.truncate(40);
    let err = extract_bytes(&pdf).unwrap_err();
    assert!(err.is_decode_error(), "unexpected error: {}", err);
}

#[test]
fn test_out_of_range_page_is_rejected() {
    let pdf = build_pdf(&[&["Only page."]]);
    let layer = LopdfEngine::new().open(&pdf).unwrap();
    assert_eq!(layer.page_count(), 1);
    assert!(layer.text_runs(0).is_err());
    assert!(layer.text_runs(2).is_err());
}

#[test]
fn test_registry_lookup() {
    let registry = EngineRegistry::with_defaults();
    assert_eq!(registry.names(), vec!["lopdf"]);
    assert!(registry.get("LOPDF").is_ok());
    assert!(matches!(
        registry.get("pdfium"),
        Err(Error::EngineUnavailable(_))
    ));
}
