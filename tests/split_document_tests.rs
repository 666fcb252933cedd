mod common;

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;

use common::{make_pdf, read_zip, source_indices, FixedText};
use nominas_split::{
    build_archive, split_document, split_source, ArchiveEntry, EntryStatus, GroupingMode, NoopObserver,
    ProgressEvent, RunContext, SourceDocument, SplitError, SplitOptions, TextEngine,
};

fn grouped() -> SplitOptions {
    SplitOptions { mode: GroupingMode::Grouped, ..SplitOptions::default() }
}

fn progress_values(events: &[ProgressEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress(f) => Some(*f),
            _ => None,
        })
        .collect()
}

#[test]
fn grouped_run_merges_named_pages_and_isolates_unnamed() {
    let source = SourceDocument::load(make_pdf(3)).unwrap();
    let text = FixedText(vec![
        Some("TRABAJADOR\nANA LOPEZ\nPERSONAL\n31 MAR 24"),
        Some("PAGINA SIN NOMBRE"),
        Some("TRABAJADOR\nANA LOPEZ\nPERSONAL"),
    ]);
    let opts = grouped();
    let mut events: Vec<ProgressEvent> = Vec::new();
    let mut ctx = RunContext::new(&opts, &mut events);
    let result = split_source(&source, &text, &mut ctx).unwrap();

    let entries = read_zip(&result.archive);
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["ANA_LOPEZ.pdf", "PAGE_2.pdf"]);
    assert_eq!(source_indices(&entries[0].1), vec![0, 2]);
    assert_eq!(source_indices(&entries[1].1), vec![1]);

    assert_eq!(result.report.entries[0].pages, vec![1, 3]);
    assert_eq!(result.report.entries[0].status, EntryStatus::Named);
    assert_eq!(result.report.entries[1].status, EntryStatus::Fallback);
    assert_eq!(result.report.download_name, "nominas_2024-03.zip");
    assert_eq!(result.report.page_count, 3);
}

#[test]
fn flat_run_suffixes_duplicate_names() {
    let source = SourceDocument::load(make_pdf(2)).unwrap();
    let text = FixedText(vec![Some("DNI 12345678A\n1 MAR 24"), Some("DNI 12345678A\n1 MAR 24")]);
    let opts = SplitOptions::default();
    let mut observer = NoopObserver;
    let mut ctx = RunContext::new(&opts, &mut observer);
    let result = split_source(&source, &text, &mut ctx).unwrap();

    let entries = read_zip(&result.archive);
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["NOMINA_2024-03_12345678A.pdf", "NOMINA_2024-03_12345678A_2.pdf"]);
    assert_eq!(source_indices(&entries[0].1), vec![0]);
    assert_eq!(source_indices(&entries[1].1), vec![1]);
}

#[test]
fn failed_text_extraction_degrades_to_fallback_names() {
    let source = SourceDocument::load(make_pdf(3)).unwrap();
    let text = FixedText(vec![None, Some("DNI 87654321Z 2 ENE 25"), None]);
    let opts = SplitOptions::default();
    let mut observer = NoopObserver;
    let mut ctx = RunContext::new(&opts, &mut observer);
    let result = split_source(&source, &text, &mut ctx).unwrap();

    let names: Vec<String> = read_zip(&result.archive).into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        vec!["NOMINA_0000-00_SIN_DNI.pdf", "NOMINA_2025-01_87654321Z.pdf", "NOMINA_0000-00_SIN_DNI_2.pdf"]
    );
    assert_eq!(result.report.period.as_str(), "2025-01");
}

#[test]
fn period_folder_prefixes_every_entry() {
    let source = SourceDocument::load(make_pdf(2)).unwrap();
    let text = FixedText(vec![Some("DNI 12345678A 1 OCT 24"), Some("DNI 11111111H 1 OCT 24")]);
    let opts = SplitOptions { period_folder: true, ..SplitOptions::default() };
    let mut observer = NoopObserver;
    let mut ctx = RunContext::new(&opts, &mut observer);
    let result = split_source(&source, &text, &mut ctx).unwrap();

    let names: Vec<String> = read_zip(&result.archive).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["2024-10/NOMINA_2024-10_12345678A.pdf", "2024-10/NOMINA_2024-10_11111111H.pdf"]);
}

#[test]
fn progress_is_monotonic_and_reaches_one_exactly_once() {
    let source = SourceDocument::load(make_pdf(4)).unwrap();
    let text = FixedText(vec![Some(""); 4]);
    let opts = SplitOptions::default();
    let mut events: Vec<ProgressEvent> = Vec::new();
    {
        let mut ctx = RunContext::new(&opts, &mut events);
        let result = split_source(&source, &text, &mut ctx).unwrap();
        assert_eq!(read_zip(&result.archive).len(), 4);
    }

    assert_eq!(events[0], ProgressEvent::PageCount(4));
    let reads = events.iter().filter(|e| matches!(e, ProgressEvent::PageRead { .. })).count();
    assert_eq!(reads, 4);

    let progress = progress_values(&events);
    assert_eq!(progress, vec![0.25, 0.5, 0.75, 1.0]);
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(progress.iter().filter(|&&f| f == 1.0).count(), 1);
}

#[test]
fn every_entry_is_a_distinct_valid_pdf() {
    let source = SourceDocument::load(make_pdf(5)).unwrap();
    let text = FixedText(vec![Some("DNI 12345678A"); 5]);
    let opts = SplitOptions::default();
    let mut observer = NoopObserver;
    let mut ctx = RunContext::new(&opts, &mut observer);
    let result = split_source(&source, &text, &mut ctx).unwrap();

    let entries = read_zip(&result.archive);
    assert_eq!(entries.len(), 5);
    let unique: HashSet<&String> = entries.iter().map(|(n, _)| n).collect();
    assert_eq!(unique.len(), 5);
    for (i, (_, pdf)) in entries.iter().enumerate() {
        assert_eq!(source_indices(pdf), vec![i]);
    }
}

#[test]
fn unreadable_document_fails_before_any_group() {
    let mut events: Vec<ProgressEvent> = Vec::new();
    let err = split_document(b"definitely not a pdf".to_vec(), &SplitOptions::default(), &mut events)
        .err()
        .expect("should fail");
    assert!(matches!(err, SplitError::Parse(_) | SplitError::EncryptedPdf(_)), "got {:?}", err);
    assert!(events.is_empty());
}

#[test]
fn encrypted_document_is_rejected_before_any_event() {
    use lopdf::{Dictionary, Document, Object, StringFormat};

    let mut doc = Document::load_mem(&make_pdf(2)).unwrap();
    let encrypt = Dictionary::from_iter(vec![
        ("Filter", Object::Name(b"Standard".to_vec())),
        ("V", Object::Integer(1)),
        ("R", Object::Integer(2)),
        ("O", Object::String(vec![0u8; 32], StringFormat::Hexadecimal)),
        ("U", Object::String(vec![0u8; 32], StringFormat::Hexadecimal)),
        ("P", Object::Integer(-44)),
    ]);
    doc.trailer.set("Encrypt", Object::Dictionary(encrypt));
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();

    let mut events: Vec<ProgressEvent> = Vec::new();
    let err = split_document(bytes, &grouped(), &mut events).err().expect("should fail");
    assert!(matches!(err, SplitError::EncryptedPdf(_)), "got {:?}", err);
    assert!(err.to_string().starts_with("EncryptedPDF"));
    assert!(events.is_empty());
}

#[test]
fn bad_entry_aborts_whole_archive() {
    let source = SourceDocument::load(make_pdf(2)).unwrap();
    let entries = vec![
        ArchiveEntry { path: "OK.pdf".into(), pages: vec![0] },
        ArchiveEntry { path: "BROKEN.pdf".into(), pages: vec![7] },
    ];
    let opts = SplitOptions::default();
    let mut observer = NoopObserver;
    let mut ctx = RunContext::new(&opts, &mut observer);
    match build_archive(&source, &entries, &mut ctx) {
        Err(SplitError::Serialize { name, .. }) => assert_eq!(name, "BROKEN.pdf"),
        other => panic!("expected Serialize error, got {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn cancellation_stops_between_groups() {
    let source = SourceDocument::load(make_pdf(2)).unwrap();
    let text = FixedText(vec![Some(""), Some("")]);
    let opts = SplitOptions::default();
    let flag = AtomicBool::new(true);
    let mut observer = NoopObserver;
    let mut ctx = RunContext::new(&opts, &mut observer).with_cancel(&flag);
    match split_source(&source, &text, &mut ctx) {
        Err(SplitError::Cancelled { processed, total }) => {
            assert_eq!(processed, 0);
            assert_eq!(total, 2);
        }
        other => panic!("expected Cancelled, got ok={}", other.is_ok()),
    }
}

#[test]
fn split_document_with_lopdf_engine_emits_one_entry_per_page() {
    let opts = SplitOptions { text_engine: TextEngine::Lopdf, ..SplitOptions::default() };
    let result = split_document(make_pdf(3), &opts, &mut NoopObserver).unwrap();
    let entries = read_zip(&result.archive);
    assert_eq!(entries.len(), 3);
    assert_eq!(result.report.entries.len(), 3);
    let unique: HashSet<&String> = entries.iter().map(|(n, _)| n).collect();
    assert_eq!(unique.len(), 3);
}

#[test]
fn empty_page_list_still_completes() {
    let source = SourceDocument::load(make_pdf(1)).unwrap();
    let opts = SplitOptions::default();
    let mut events: Vec<ProgressEvent> = Vec::new();
    {
        let mut ctx = RunContext::new(&opts, &mut events);
        let bytes = build_archive(&source, &[], &mut ctx).unwrap();
        assert!(read_zip(&bytes).is_empty());
    }
    assert_eq!(progress_values(&events), vec![1.0]);
}

#[test]
fn open_reports_missing_file() {
    let err = SourceDocument::open(std::path::Path::new("./no/such/lote.pdf")).err().expect("should fail");
    assert!(matches!(err, SplitError::FileNotFound(_)));
}

#[test]
fn open_reads_pdf_from_disk() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("lote.pdf");
    std::fs::write(&path, make_pdf(3)).unwrap();
    let source = SourceDocument::open(&path).unwrap();
    assert_eq!(source.page_count(), 3);
}
