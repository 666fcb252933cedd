//! One run: read pages, group them, name the groups, build the archive.
//!
//! Everything a run mutates (the filename counters, the observer, the
//! cancellation flag) lives in [`RunContext`], so independent runs never
//! share state.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::archive::{build_archive, ArchiveEntry};
use crate::config::SplitOptions;
use crate::error::SplitError;
use crate::extract::PeriodKey;
use crate::grouping::{detect_run_period, group_pages, Group, GroupingMode, SourcePage};
use crate::naming::FilenameResolver;
use crate::source::{text_extractor, SourceDocument, TextExtractor};

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    PageCount(usize),
    /// 0-based page that was just read, out of `total`.
    PageRead { index: usize, total: usize },
    Progress(f64),
}

/// Receives run notifications. Every method defaults to a no-op.
pub trait RunObserver {
    fn on_page_count(&mut self, _total: usize) {}

    fn on_page_read(&mut self, _index: usize, _total: usize) {}

    /// Monotonically increasing, ends at exactly 1.0.
    fn on_progress(&mut self, _fraction: f64) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

impl RunObserver for Vec<ProgressEvent> {
    fn on_page_count(&mut self, total: usize) {
        self.push(ProgressEvent::PageCount(total));
    }

    fn on_page_read(&mut self, index: usize, total: usize) {
        self.push(ProgressEvent::PageRead { index, total });
    }

    fn on_progress(&mut self, fraction: f64) {
        self.push(ProgressEvent::Progress(fraction));
    }
}

pub struct RunContext<'a> {
    options: &'a SplitOptions,
    resolver: FilenameResolver,
    observer: &'a mut dyn RunObserver,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> RunContext<'a> {
    pub fn new(options: &'a SplitOptions, observer: &'a mut dyn RunObserver) -> Self {
        RunContext { options, resolver: FilenameResolver::new(), observer, cancel: None }
    }

    /// Abort between groups once `flag` becomes true.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn options(&self) -> &'a SplitOptions {
        self.options
    }

    /// Reset the filename counters for a run whose period is `period`.
    pub fn begin_naming(&mut self, period: &PeriodKey) {
        self.resolver = if self.options.period_folder {
            FilenameResolver::with_folder(period.as_str())
        } else {
            FilenameResolver::new()
        };
    }

    pub fn resolve(&mut self, base_key: &str) -> String {
        self.resolver.resolve(base_key)
    }

    pub(crate) fn report_progress(&mut self, processed: usize, total: usize) {
        let fraction = if total == 0 { 1.0 } else { processed as f64 / total as f64 };
        self.observer.on_progress(fraction);
    }

    pub(crate) fn check_cancelled(&self, processed: usize, total: usize) -> Result<(), SplitError> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(SplitError::Cancelled { processed, total }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Named from an extracted ID or worker name.
    Named,
    /// Named from a placeholder or a synthetic page key.
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub path: String,
    /// 1-based page numbers, as a reader would count them.
    pub pages: Vec<usize>,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: GroupingMode,
    pub period: PeriodKey,
    pub page_count: usize,
    pub download_name: String,
    pub entries: Vec<EntryReport>,
}

pub struct RunResult {
    pub archive: Vec<u8>,
    pub report: RunReport,
}

/// Read every page's text. Extraction errors become empty text.
pub fn read_pages(source: &SourceDocument, extractor: &dyn TextExtractor, ctx: &mut RunContext<'_>) -> Vec<SourcePage> {
    let total = source.page_count();
    ctx.observer.on_page_count(total);
    let mut pages = Vec::with_capacity(total);
    for index in 0..total {
        let text = match extractor.page_text(source, index) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("page {}: {} text extraction failed: {}", index + 1, extractor.name(), e);
                String::new()
            }
        };
        ctx.observer.on_page_read(index, total);
        pages.push(SourcePage { index, text });
    }
    pages
}

/// Give every group its unique archive path, in group order.
pub fn resolve_groups(groups: &[Group], ctx: &mut RunContext<'_>) -> Vec<ArchiveEntry> {
    groups
        .iter()
        .map(|g| ArchiveEntry { path: ctx.resolve(&g.key), pages: g.pages.clone() })
        .collect()
}

pub fn download_name(archive_prefix: &str, period: &PeriodKey) -> String {
    format!("{}_{}.zip", archive_prefix, period)
}

/// Split an already loaded document using `extractor` for page text.
pub fn split_source(
    source: &SourceDocument,
    extractor: &dyn TextExtractor,
    ctx: &mut RunContext<'_>,
) -> Result<RunResult, SplitError> {
    let pages = read_pages(source, extractor, ctx);
    let period = detect_run_period(&pages);
    let mode = ctx.options().mode;
    let groups = group_pages(&pages, mode, &ctx.options().name_prefix);

    ctx.begin_naming(&period);
    let entries = resolve_groups(&groups, ctx);
    let archive = build_archive(source, &entries, ctx)?;

    let report = RunReport {
        mode,
        download_name: download_name(&ctx.options().archive_prefix, &period),
        period,
        page_count: pages.len(),
        entries: entries
            .iter()
            .zip(&groups)
            .map(|(entry, group)| EntryReport {
                path: entry.path.clone(),
                pages: entry.pages.iter().map(|p| p + 1).collect(),
                status: if group.identified { EntryStatus::Named } else { EntryStatus::Fallback },
            })
            .collect(),
    };
    Ok(RunResult { archive, report })
}

/// Whole run from raw PDF bytes, picking the text engine from `options`.
pub fn split_document(
    bytes: Vec<u8>,
    options: &SplitOptions,
    observer: &mut dyn RunObserver,
) -> Result<RunResult, SplitError> {
    let source = SourceDocument::load(bytes)?;
    let extractor = text_extractor(options.text_engine, &source);
    let mut ctx = RunContext::new(options, observer);
    split_source(&source, extractor.as_ref(), &mut ctx)
}
