//! Split a batch payslip PDF into one PDF per worker record and bundle the
//! results into a zip archive.
//!
//! Pages are read best-effort, identity and period fields are pulled out
//! with regexes (a miss always degrades to a fallback value), pages are
//! grouped per page or per worker name, every group gets a collision-free
//! name, and each group is written as its own PDF into a deflate zip.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod files;
pub mod grouping;
pub mod naming;
pub mod normalize;
pub mod pipeline;
pub mod source;

pub use archive::{build_archive, ArchiveEntry};
pub use config::{load_config, parse_config, validate_options, ConfigError, SplitConfig, SplitOptions};
pub use error::{SplitError, TextError};
pub use extract::{
    extract_national_id, extract_period, extract_worker_name, month_code, national_id_or_fallback,
    period_or_fallback, Extracted, PeriodKey, NO_ID,
};
pub use files::{emit_files, enumerate_pdfs, sha256_hex, slugify, unique_slug, EmitError, EmitPaths, EnumerateError};
pub use grouping::{
    detect_run_period, group_by_worker, group_flat, group_pages, page_key, Group, GroupingMode, SourcePage,
};
pub use naming::FilenameResolver;
pub use normalize::{normalize, PLACEHOLDER_NAME};
pub use pipeline::{
    download_name, read_pages, resolve_groups, split_document, split_source, EntryReport, EntryStatus,
    NoopObserver, ProgressEvent, RunContext, RunObserver, RunReport, RunResult,
};
pub use source::{check_deps, text_extractor, DepsResult, LopdfText, PopplerText, SourceDocument, TextEngine, TextExtractor};
