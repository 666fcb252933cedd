//! Source document loading, per-page text reading and page extraction.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use lopdf::Document;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{SplitError, TextError};

/// A parsed, unencrypted PDF plus the bytes it was read from.
pub struct SourceDocument {
    bytes: Vec<u8>,
    doc: Document,
}

impl SourceDocument {
    /// Parse a whole PDF held in memory. Corrupt and encrypted files are rejected.
    pub fn load(bytes: Vec<u8>) -> Result<Self, SplitError> {
        let doc = Document::load_mem(&bytes).map_err(|e| {
            let msg = e.to_string();
            let lower = msg.to_lowercase();
            if lower.contains("encrypt") || lower.contains("password") {
                SplitError::EncryptedPdf(msg)
            } else {
                SplitError::Parse(msg)
            }
        })?;
        if doc.is_encrypted() {
            return Err(SplitError::EncryptedPdf("document has an /Encrypt dictionary".into()));
        }
        Ok(SourceDocument { bytes, doc })
    }

    pub fn open(path: &Path) -> Result<Self, SplitError> {
        if !path.exists() {
            return Err(SplitError::FileNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path).map_err(|e| SplitError::Parse(format!("{}: {}", path.display(), e)))?;
        Self::load(bytes)
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Serialize a new PDF holding only `pages` (0-based, ascending).
    pub fn extract_pages(&self, pages: &[usize]) -> Result<Vec<u8>, String> {
        let total = self.page_count();
        if pages.is_empty() {
            return Err("no pages requested".into());
        }
        if let Some(bad) = pages.iter().find(|&&p| p >= total) {
            return Err(format!("page {} does not exist (document has {} pages)", bad + 1, total));
        }

        let keep: HashSet<u32> = pages.iter().map(|&p| (p + 1) as u32).collect();
        let mut out = self.doc.clone();
        let mut drop: Vec<u32> = (1..=total as u32).filter(|n| !keep.contains(n)).collect();
        drop.reverse();
        for page_num in drop {
            out.delete_pages(&[page_num]);
        }
        out.prune_objects();
        out.compress();

        let mut buffer = Vec::new();
        out.save_to(&mut buffer).map_err(|e| format!("save failed: {}", e))?;
        Ok(buffer)
    }
}

/// Best-effort text of one page. Errors are absorbed by the caller.
pub trait TextExtractor {
    fn name(&self) -> &'static str;

    fn page_text(&self, source: &SourceDocument, index: usize) -> Result<String, TextError>;
}

/// In-process extraction through lopdf's content stream decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfText;

impl TextExtractor for LopdfText {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn page_text(&self, source: &SourceDocument, index: usize) -> Result<String, TextError> {
        source
            .document()
            .extract_text(&[(index + 1) as u32])
            .map_err(|e| TextError::Lopdf(e.to_string()))
    }
}

/// Poppler's `pdftotext -layout`, one invocation per page, run against a
/// temporary copy of the source bytes.
pub struct PopplerText {
    file: NamedTempFile,
}

impl PopplerText {
    pub fn for_document(source: &SourceDocument) -> Result<Self, TextError> {
        let mut file = NamedTempFile::new().map_err(|e| TextError::Poppler(e.to_string()))?;
        file.write_all(source.bytes()).map_err(|e| TextError::Poppler(e.to_string()))?;
        file.flush().map_err(|e| TextError::Poppler(e.to_string()))?;
        Ok(PopplerText { file })
    }
}

impl TextExtractor for PopplerText {
    fn name(&self) -> &'static str {
        "poppler"
    }

    fn page_text(&self, _source: &SourceDocument, index: usize) -> Result<String, TextError> {
        let page = (index + 1).to_string();
        let out = Command::new("pdftotext")
            .arg("-layout")
            .arg("-nopgbrk")
            .arg("-q")
            .arg("-f")
            .arg(&page)
            .arg("-l")
            .arg(&page)
            .arg(self.file.path())
            .arg("-")
            .output()
            .map_err(|e| TextError::Poppler(e.to_string()))?;
        if !out.status.success() {
            return Err(TextError::Poppler(format!("pdftotext failed on page {}", page)));
        }
        Ok(String::from_utf8_lossy(&out.stdout).to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEngine {
    /// Poppler when `pdftotext` is on PATH, lopdf otherwise.
    #[default]
    Auto,
    Lopdf,
    Poppler,
}

impl std::str::FromStr for TextEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(TextEngine::Auto),
            "lopdf" => Ok(TextEngine::Lopdf),
            "poppler" => Ok(TextEngine::Poppler),
            other => Err(format!("unknown text engine: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepsResult {
    /// Optional external tools that were not found on PATH.
    pub missing: Vec<String>,
}

impl DepsResult {
    pub fn has_poppler(&self) -> bool {
        !self.missing.iter().any(|m| m == "pdftotext")
    }
}

/// Check optional CLI dependencies. lopdf is always available, so nothing
/// here is required; `pdftotext` only improves text quality.
pub fn check_deps() -> DepsResult {
    let mut missing = Vec::new();
    if which::which("pdftotext").is_err() {
        missing.push("pdftotext".to_string());
    }
    DepsResult { missing }
}

/// Pick the extractor for `engine`, degrading to lopdf when Poppler is
/// unavailable or its temp copy cannot be written.
pub fn text_extractor(engine: TextEngine, source: &SourceDocument) -> Box<dyn TextExtractor> {
    if engine == TextEngine::Lopdf {
        return Box::new(LopdfText);
    }
    let has_poppler = check_deps().has_poppler();
    if engine == TextEngine::Poppler || has_poppler {
        if !has_poppler {
            log::warn!("pdftotext not found on PATH, falling back to lopdf text extraction");
            return Box::new(LopdfText);
        }
        match PopplerText::for_document(source) {
            Ok(p) => return Box::new(p),
            Err(e) => log::warn!("cannot prepare pdftotext input ({}), falling back to lopdf", e),
        }
    }
    Box::new(LopdfText)
}
