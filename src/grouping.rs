//! Page to output-document assignment.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::extract::{extract_national_id, extract_worker_name, period_or_fallback, PeriodKey, NO_ID};
use crate::normalize::normalize;

/// One page of the source document and whatever text could be read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    /// 0-based position in the source document.
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    /// One output document per source page.
    #[default]
    Flat,
    /// One output document per distinct worker name.
    Grouped,
}

impl FromStr for GroupingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(GroupingMode::Flat),
            "grouped" => Ok(GroupingMode::Grouped),
            other => Err(format!("unknown grouping mode: {}", other)),
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingMode::Flat => f.write_str("flat"),
            GroupingMode::Grouped => f.write_str("grouped"),
        }
    }
}

/// Pages that end up in the same output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Base name before collision handling, e.g. `NOMINA_2024-03_12345678A`,
    /// `ANA_LOPEZ` or `Page_2`.
    pub key: String,
    /// Ascending 0-based page indices.
    pub pages: Vec<usize>,
    /// False when the key came from a placeholder or synthetic value.
    pub identified: bool,
}

/// Synthetic key for a page whose worker name could not be read.
/// Mixed case, so it never equals a normalized name.
pub fn page_key(index: usize) -> String {
    format!("Page_{}", index + 1)
}

/// Flat mode: every page is its own group, named `<prefix>_<period>_<id>`.
pub fn group_flat(pages: &[SourcePage], name_prefix: &str) -> Vec<Group> {
    pages
        .iter()
        .map(|page| {
            let id = extract_national_id(&page.text);
            let identified = id.is_matched();
            let id = id.unwrap_or_else(|| NO_ID.to_string());
            let period = period_or_fallback(&page.text);
            log::debug!("page {}: id={} period={}", page.index + 1, id, period);
            Group {
                key: format!("{}_{}_{}", name_prefix, period, id),
                pages: vec![page.index],
                identified,
            }
        })
        .collect()
}

/// Grouped mode: pages sharing a normalized worker name are merged, in
/// first-appearance order. Pages without a name stay alone under [`page_key`].
pub fn group_by_worker(pages: &[SourcePage]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();

    for page in pages {
        let (key, identified) = match extract_worker_name(&page.text).matched() {
            Some(name) => (normalize(&name), true),
            None => (page_key(page.index), false),
        };
        log::debug!("page {}: group key {}", page.index + 1, key);
        match slot_by_key.get(&key) {
            Some(&slot) => groups[slot].pages.push(page.index),
            None => {
                slot_by_key.insert(key.clone(), groups.len());
                groups.push(Group { key, pages: vec![page.index], identified });
            }
        }
    }

    groups
}

pub fn group_pages(pages: &[SourcePage], mode: GroupingMode, name_prefix: &str) -> Vec<Group> {
    match mode {
        GroupingMode::Flat => group_flat(pages, name_prefix),
        GroupingMode::Grouped => group_by_worker(pages),
    }
}

/// Period of the whole run: the first page that carries one, else `0000-00`.
pub fn detect_run_period(pages: &[SourcePage]) -> PeriodKey {
    pages
        .iter()
        .map(|p| period_or_fallback(&p.text))
        .find(|k| !k.is_unknown())
        .unwrap_or_else(PeriodKey::unknown)
}

