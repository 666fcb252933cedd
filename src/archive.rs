use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::SplitError;
use crate::pipeline::RunContext;
use crate::source::SourceDocument;

/// One output document: where it goes in the archive and which pages it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    /// 0-based, ascending.
    pub pages: Vec<usize>,
}

/// Write each entry's pages as its own PDF into a deflate zip, in order.
///
/// Reports `processed / total` after every entry; the last report is exactly
/// 1.0. An empty entry list still reports 1.0 once. Any serialization failure
/// aborts the run and no bytes are returned.
pub fn build_archive(
    source: &SourceDocument,
    entries: &[ArchiveEntry],
    ctx: &mut RunContext<'_>,
) -> Result<Vec<u8>, SplitError> {
    let total = entries.len();
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for (done, entry) in entries.iter().enumerate() {
        ctx.check_cancelled(done, total)?;

        let pdf = source.extract_pages(&entry.pages).map_err(|message| SplitError::Serialize {
            name: entry.path.clone(),
            message,
        })?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(entry.path.as_str(), options)?;
        zip.write_all(&pdf).map_err(|e| SplitError::Archive(e.to_string()))?;
        log::debug!("wrote {} ({} pages, {} bytes)", entry.path, entry.pages.len(), pdf.len());

        ctx.report_progress(done + 1, total);
    }
    if total == 0 {
        ctx.report_progress(0, 0);
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
