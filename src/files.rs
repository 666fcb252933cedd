//! Batch input discovery and atomic output writing for the CLI.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globwalk::GlobWalkerBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("NoFilesFound")]
    NoFilesFound { guidance: String },
}

/// Enumerate PDFs using a glob pattern (e.g., "./input/**/*.pdf").
/// Returns a sorted list of paths.
pub fn enumerate_pdfs(glob_pattern: &str) -> Result<Vec<PathBuf>, EnumerateError> {
    let (root, pat) = split_glob_root(glob_pattern);
    let mut paths: Vec<PathBuf> = GlobWalkerBuilder::from_patterns(&root, &[pat.as_str()])
        .case_insensitive(true)
        .follow_links(false)
        .build()
        .map_err(|_| EnumerateError::NoFilesFound { guidance: folder_guidance(glob_pattern) })?
        .filter_map(|e| e.ok())
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.is_file())
        .collect();

    paths.sort();
    if paths.is_empty() {
        return Err(EnumerateError::NoFilesFound { guidance: folder_guidance(glob_pattern) });
    }
    Ok(paths)
}

/// Walk from the deepest literal directory of the pattern instead of `/` or `.`.
fn split_glob_root(pattern: &str) -> (PathBuf, String) {
    let is_glob = |s: &str| s.contains(['*', '?', '[', '{']);
    let absolute = Path::new(pattern).is_absolute();
    let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    let literal = parts.iter().take_while(|s| !is_glob(s)).count().min(parts.len().saturating_sub(1));

    let mut root = PathBuf::from(if absolute { "/" } else { "." });
    for part in &parts[..literal] {
        root.push(part);
    }
    (root, parts[literal..].join("/"))
}

fn folder_guidance(pattern: &str) -> String {
    format!(
        "No se encontraron PDF con el patrón {}\n\
         Coloque los lotes de nóminas en ./input/, por ejemplo:\n  \
         ./input/2024-03/nominas_marzo.pdf\n\
         o indique otro patrón como primer argumento.",
        pattern
    )
}

/// Lowercase ASCII slug for a file stem, `doc` when nothing survives.
pub fn slugify(base: &str) -> String {
    let mut out = String::with_capacity(base.len());
    let mut prev_dash = true;
    for ch in base.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "doc".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `slug`, or `slug-1`, `slug-2`, ... whichever is not yet in `used`.
pub fn unique_slug(slug: String, used: &mut HashSet<String>) -> String {
    if used.insert(slug.clone()) {
        return slug;
    }
    let mut i = 1;
    loop {
        let candidate = format!("{}-{}", slug, i);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        i += 1;
    }
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("WriteFailed: {0}")]
    WriteFailed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitPaths {
    pub archive_path: String,
    pub report_path: String,
}

/// Atomically write `<stem>.zip` and `<stem>.report.json` into `outdir`.
pub fn emit_files(archive: &[u8], report: &serde_json::Value, outdir: &Path, stem: &str) -> Result<EmitPaths, EmitError> {
    std::fs::create_dir_all(outdir).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    let archive_path = outdir.join(format!("{}.zip", stem));
    let report_path = outdir.join(format!("{}.report.json", stem));

    let pid = std::process::id();
    let archive_tmp = outdir.join(format!("{}.zip.tmp.{}", stem, pid));
    let report_tmp = outdir.join(format!("{}.report.json.tmp.{}", stem, pid));

    std::fs::write(&archive_tmp, archive).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    let report_bytes = serde_json::to_vec_pretty(report).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    std::fs::write(&report_tmp, report_bytes).map_err(|e| EmitError::WriteFailed(e.to_string()))?;

    std::fs::rename(&archive_tmp, &archive_path).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    std::fs::rename(&report_tmp, &report_path).map_err(|e| EmitError::WriteFailed(e.to_string()))?;

    Ok(EmitPaths {
        archive_path: archive_path.to_string_lossy().to_string(),
        report_path: report_path.to_string_lossy().to_string(),
    })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    out.iter().map(|b| format!("{:02x}", b)).collect()
}
