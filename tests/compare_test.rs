//! End-to-end comparison of generated PDFs.

mod common;

use std::sync::{Arc, Mutex};

use chrono::TimeZone;
use common::build_pdf;
use pdfdiff::report;
use pdfdiff::{
    compare_bytes, Comparator, ComparisonStatus, DecodeEngine, DiffOptions, DifferenceRecord,
    DocumentRole, Error, ExtractOptions, ExtractProgress, TextLayer,
};

#[test]
fn test_added_sentence_is_reported() {
    let latest = build_pdf(&[&["The sky is blue.", "Grass is green."]]);
    let outdated = build_pdf(&[&["The sky is blue."]]);

    let records = compare_bytes(&latest, &outdated).unwrap();
    assert_eq!(records, vec![DifferenceRecord::new(1, "Grass is green.", 1)]);
}

#[test]
fn test_minor_edit_is_not_reported() {
    let latest = build_pdf(&[&["Revenue grew 12 percent year over year in the third quarter"]]);
    let outdated = build_pdf(&[&["Revenue grew 12 percent year over year in the 3rd quarter"]]);
    assert!(compare_bytes(&latest, &outdated).unwrap().is_empty());
}

#[test]
fn test_reworded_line_is_reported() {
    let latest = build_pdf(&[&["Meeting moved to 3:00pm."]]);
    let outdated = build_pdf(&[&["Meeting moved to 3pm."]]);

    let records = compare_bytes(&latest, &outdated).unwrap();
    assert_eq!(records, vec![DifferenceRecord::new(1, "Meeting moved to 3:00pm.", 1)]);
}

#[test]
fn test_appended_pages_are_fully_new() {
    let latest = build_pdf(&[&["Cover."], &["Appendix A.", "Appendix B."]]);
    let outdated = build_pdf(&[&["Cover."]]);

    let records = compare_bytes(&latest, &outdated).unwrap();
    assert_eq!(records, vec![DifferenceRecord::new(2, "Appendix A.", 2)]);
}

#[test]
fn test_same_document_twice() {
    let pdf = build_pdf(&[&["One.", "Two."], &["Three."]]);
    assert!(compare_bytes(&pdf, &pdf).unwrap().is_empty());
}

#[test]
fn test_failing_document_is_named() {
    let good = build_pdf(&[&["Fine."]]);

    let err = compare_bytes(b"not a pdf", &good).unwrap_err();
    assert_eq!(err.document(), Some(DocumentRole::Latest));
    assert!(err.is_decode_error());

    let err = compare_bytes(&good, b"not a pdf").unwrap_err();
    assert_eq!(err.document(), Some(DocumentRole::Outdated));
}

struct UnloadableEngine;

impl DecodeEngine for UnloadableEngine {
    fn name(&self) -> &str {
        "wasm"
    }

    fn initialize(&self) -> pdfdiff::Result<()> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "worker bundle missing",
        )))
    }

    fn open(&self, _data: &[u8]) -> pdfdiff::Result<Box<dyn TextLayer>> {
        Err(Error::Decode("unreachable".into()))
    }
}

#[test]
fn test_engine_failure_is_unavailable() {
    let err = Comparator::new(Arc::new(UnloadableEngine)).unwrap_err();
    assert!(matches!(err, Error::EngineUnavailable(_)));
    assert!(err.user_message().starts_with("PDF engine failed to load"));
}

#[test]
fn test_progress_reaches_completion_for_both_documents() {
    let latest = build_pdf(&[&["a"], &["b"]]);
    let outdated = build_pdf(&[&["a"]]);
    let last = Mutex::new(Vec::new());

    Comparator::lopdf()
        .with_extract_options(ExtractOptions::new().sequential())
        .compare_bytes(&latest, &outdated, &|role, progress| {
            last.lock().unwrap().push((role, progress))
        })
        .unwrap();

    let last = last.into_inner().unwrap();
    for role in DocumentRole::ALL {
        let final_report = last
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, p)| *p)
            .last()
            .unwrap();
        assert!(matches!(final_report, ExtractProgress::Pages { .. }));
        assert_eq!(final_report.percent(), 100);
    }
}

#[test]
fn test_report_from_compared_pdfs() {
    let latest = build_pdf(&[&["Intro."], &["Alpha.", "Beta."]]);
    let outdated = build_pdf(&[&["Intro."], &[]]);

    let comparison = Comparator::lopdf()
        .with_diff_options(DiffOptions::default())
        .compare_bytes(&latest, &outdated, &|_, _| {})
        .unwrap();
    assert_eq!(ComparisonStatus::finished(&comparison), ComparisonStatus::Ready);

    let at = chrono::Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let text = report::to_text(&comparison.records, at);
    assert_eq!(
        text,
        "PDF Diff Export\nGenerated: 2025-01-02T03:04:05.000Z\n\n\
         Items unique to the latest PDF:\n\n\
         Page 2: 2 new sentences. Example: Alpha.\n"
    );
}

#[tokio::test]
async fn test_compare_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let latest = dir.path().join("latest.pdf");
    let outdated = dir.path().join("outdated.pdf");
    std::fs::write(&latest, build_pdf(&[&["Kept line.", "Brand new line."]])).unwrap();
    std::fs::write(&outdated, build_pdf(&[&["Kept line."]])).unwrap();

    let records = pdfdiff::compare_files(&latest, &outdated).await.unwrap();
    assert_eq!(records, vec![DifferenceRecord::new(1, "Brand new line.", 1)]);
}

#[tokio::test]
async fn test_compare_files_reports_loading() {
    let dir = tempfile::tempdir().unwrap();
    let latest = dir.path().join("latest.pdf");
    let outdated = dir.path().join("outdated.pdf");
    let latest_pdf = build_pdf(&[&["Same."]]);
    std::fs::write(&latest, &latest_pdf).unwrap();
    std::fs::write(&outdated, build_pdf(&[&["Same."]])).unwrap();

    let loads = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&loads);
    let comparison = Comparator::lopdf()
        .compare_files(
            &latest,
            &outdated,
            Arc::new(move |role: DocumentRole, progress: ExtractProgress| {
                if let ExtractProgress::Loading { loaded, total } = progress {
                    sink.lock().unwrap().push((role, loaded, total));
                }
            }),
        )
        .await
        .unwrap();

    assert!(comparison.is_empty());
    let size = latest_pdf.len() as u64;
    assert!(loads
        .lock()
        .unwrap()
        .contains(&(DocumentRole::Latest, size, size)));
}
