use std::collections::{HashMap, HashSet};

use crate::normalize::normalize;

/// Per-run archive path allocator.
///
/// The first base name seen becomes `base.pdf`; repeats become `base_2.pdf`,
/// `base_3.pdf`, ... If a candidate was already handed out (a literal
/// `X_2` base after two `X`s), the counter keeps going until it is free.
#[derive(Debug, Default)]
pub struct FilenameResolver {
    folder: Option<String>,
    counts: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl FilenameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every resolved path is placed under `folder/`.
    pub fn with_folder(folder: impl AsRef<str>) -> Self {
        FilenameResolver { folder: Some(normalize(folder.as_ref())), ..Self::default() }
    }

    pub fn folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }

    pub fn resolve(&mut self, base_key: &str) -> String {
        let base = normalize(base_key);
        let mut n = self.counts.get(&base).copied().unwrap_or(0) + 1;
        let mut candidate = self.candidate(&base, n);
        while self.issued.contains(&candidate) {
            n += 1;
            candidate = self.candidate(&base, n);
        }
        self.counts.insert(base, n);
        self.issued.insert(candidate.clone());
        candidate
    }

    fn candidate(&self, base: &str, n: usize) -> String {
        let file = if n == 1 { format!("{}.pdf", base) } else { format!("{}_{}.pdf", base, n) };
        match &self.folder {
            Some(folder) => format!("{}/{}", folder, file),
            None => file,
        }
    }
}
