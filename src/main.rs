use std::collections::HashSet;
use std::path::{Path, PathBuf};

use nominas_split::cli::parse_args;
use nominas_split::{
    check_deps, emit_files, enumerate_pdfs, load_config, sha256_hex, slugify, split_document, unique_slug,
    validate_options, EnumerateError, GroupingMode, RunObserver, SplitConfig, SplitError, TextEngine,
};

const DEFAULT_CONFIG: &str = "nominas.yaml";

fn config_error(file: &str, error: String) -> ! {
    eprintln!("{}", serde_json::json!({ "tool": "load_config", "file": file, "error": error, "error_code": 3 }));
    std::process::exit(3);
}

/// Streams run progress to stderr as JSON lines.
struct JsonProgress {
    file: String,
}

impl RunObserver for JsonProgress {
    fn on_page_count(&mut self, total: usize) {
        eprintln!("{}", serde_json::json!({ "tool": "read_pages", "file": self.file, "pages": total }));
    }

    fn on_page_read(&mut self, index: usize, total: usize) {
        log::debug!("{}: processing page {} of {}", self.file, index + 1, total);
    }

    fn on_progress(&mut self, fraction: f64) {
        eprintln!("{}", serde_json::json!({ "tool": "build_archive", "file": self.file, "progress": fraction }));
    }
}

fn main() {
    pretty_env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args).unwrap_or_else(|e| config_error("<args>", e));

    // 1) Config: explicit path, else ./nominas.yaml when present, else defaults
    let config_path = cli.config.clone().or_else(|| Path::new(DEFAULT_CONFIG).exists().then(|| DEFAULT_CONFIG.to_string()));
    let mut cfg = match &config_path {
        Some(p) => match load_config(Path::new(p)) {
            Ok(c) => c,
            Err(e) => config_error(p, e.to_string()),
        },
        None => SplitConfig::default(),
    };
    let cfg_label = config_path.clone().unwrap_or_else(|| "<defaults>".to_string());
    if let Some(m) = &cli.mode {
        cfg.split.mode = m.parse::<GroupingMode>().unwrap_or_else(|e| config_error(&cfg_label, e));
    }
    if let Some(e) = &cli.engine {
        cfg.split.text_engine = e.parse::<TextEngine>().unwrap_or_else(|e| config_error(&cfg_label, e));
    }
    if let Some(pf) = cli.period_folder {
        cfg.split.period_folder = pf;
    }
    if let Some(o) = &cli.out {
        cfg.output = Some(o.clone());
    }
    if let Some(i) = &cli.input {
        cfg.input = Some(i.clone());
    }
    if let Err(e) = validate_options(&cfg.split) {
        config_error(&cfg_label, e.to_string());
    }
    eprintln!(
        "{}",
        serde_json::json!({
            "tool": "load_config",
            "file": cfg_label,
            "status": "ok",
            "input_glob": cfg.input_glob(),
            "output_dir": cfg.output_dir(),
            "options": cfg.split,
        })
    );

    // 2) Optional text tooling
    let deps = check_deps();
    eprintln!("{}", serde_json::json!({ "tool": "check_deps", "status": "ok", "missing": deps.missing }));

    // 3) Inputs
    let input_glob = cfg.input_glob();
    let files = match enumerate_pdfs(&input_glob) {
        Ok(files) => files,
        Err(EnumerateError::NoFilesFound { guidance }) => {
            eprintln!("{}", serde_json::json!({ "tool": "enumerate_pdfs", "error": "NoFilesFound", "error_code": 1 }));
            eprintln!("{}", guidance);
            std::process::exit(1);
        }
    };
    eprintln!("{}", serde_json::json!({ "tool": "enumerate_pdfs", "count": files.len() }));

    // 4) One archive per input document
    let outdir = PathBuf::from(cfg.output_dir());
    let mut used_stems: HashSet<String> = HashSet::new();
    for file in files {
        let label = file.display().to_string();
        let bytes = match std::fs::read(&file) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{}", serde_json::json!({ "tool": "split_document", "file": label, "error": e.to_string(), "error_code": 1 }));
                std::process::exit(1);
            }
        };

        let mut progress = JsonProgress { file: label.clone() };
        let result = match split_document(bytes, &cfg.split, &mut progress) {
            Ok(r) => r,
            Err(err) => {
                let code = match err {
                    SplitError::FileNotFound(_) | SplitError::EncryptedPdf(_) | SplitError::Parse(_) => 1,
                    SplitError::Serialize { .. } | SplitError::Archive(_) | SplitError::Cancelled { .. } => 4,
                };
                eprintln!("{}", serde_json::json!({ "tool": "split_document", "file": label, "error": err.to_string(), "error_code": code }));
                std::process::exit(code);
            }
        };
        eprintln!(
            "{}",
            serde_json::json!({
                "tool": "split_document",
                "file": label,
                "period": result.report.period,
                "entries": result.report.entries.len(),
            })
        );

        let base = result.report.download_name.trim_end_matches(".zip");
        let stem = unique_slug(slugify(base), &mut used_stems);
        let mut report = match serde_json::to_value(&result.report) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{}", serde_json::json!({ "tool": "emit_files", "file": label, "error": e.to_string(), "error_code": 6 }));
                std::process::exit(6);
            }
        };
        if let Some(obj) = report.as_object_mut() {
            obj.insert("source".to_string(), serde_json::json!(label));
            obj.insert("archive_sha256".to_string(), serde_json::json!(sha256_hex(&result.archive)));
        }

        match emit_files(&result.archive, &report, &outdir, &stem) {
            Ok(paths) => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "tool": "emit_files",
                        "file": label,
                        "archive_path": paths.archive_path,
                        "report_path": paths.report_path,
                    })
                );
            }
            Err(e) => {
                eprintln!("{}", serde_json::json!({ "tool": "emit_files", "file": label, "error": e.to_string(), "error_code": 6 }));
                std::process::exit(6);
            }
        }
    }
}
