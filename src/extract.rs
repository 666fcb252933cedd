//! Best-effort field extraction from raw payslip page text.
//!
//! Every extractor is a pure function returning [`Extracted`]: the first
//! match wins and a miss is a normal outcome, never an error.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Sentinel used when no national ID is found on a page.
pub const NO_ID: &str = "SIN_DNI";

static WORKER_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"TRABAJADOR[ \t]*\r?\n\s*([A-ZÁÉÍÓÚÜÑ][A-ZÁÉÍÓÚÜÑ ]{4,})\s+PERSONAL").unwrap()
});
static NATIONAL_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([XYZ]?[0-9]{7,8}[A-Z])\b").unwrap());
static PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{1,2}\s+([A-ZÁÉÍÓÚ]{3})\s+([0-9]{2})").unwrap());

const MONTHS: [(&str, &str); 12] = [
    ("ENE", "01"),
    ("FEB", "02"),
    ("MAR", "03"),
    ("ABR", "04"),
    ("MAY", "05"),
    ("JUN", "06"),
    ("JUL", "07"),
    ("AGO", "08"),
    ("SEP", "09"),
    ("OCT", "10"),
    ("NOV", "11"),
    ("DIC", "12"),
];

/// Outcome of one extractor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<T> {
    Matched(T),
    Fallback,
}

impl<T> Extracted<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Extracted::Matched(_))
    }

    pub fn matched(self) -> Option<T> {
        match self {
            Extracted::Matched(v) => Some(v),
            Extracted::Fallback => None,
        }
    }

    pub fn unwrap_or_else(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Extracted::Matched(v) => v,
            Extracted::Fallback => fallback(),
        }
    }
}

/// A `YYYY-MM` pay period. Always seven characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PeriodKey(String);

impl PeriodKey {
    pub const UNKNOWN: &'static str = "0000-00";

    pub fn unknown() -> Self {
        PeriodKey(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map a Spanish three-letter month abbreviation to `"01"`..`"12"`.
pub fn month_code(abbrev: &str) -> Option<&'static str> {
    MONTHS.iter().find(|(m, _)| *m == abbrev).map(|(_, code)| *code)
}

/// Worker name printed between the `TRABAJADOR` label line and the `PERSONAL` marker.
pub fn extract_worker_name(text: &str) -> Extracted<String> {
    match WORKER_NAME_RE.captures(text) {
        Some(cap) => {
            let name = cap[1].trim();
            if name.is_empty() {
                Extracted::Fallback
            } else {
                Extracted::Matched(name.to_string())
            }
        }
        None => Extracted::Fallback,
    }
}

/// First DNI/NIE-shaped token, e.g. `12345678A` or `X1234567B`.
pub fn extract_national_id(text: &str) -> Extracted<String> {
    match NATIONAL_ID_RE.captures(text) {
        Some(cap) => Extracted::Matched(cap[1].to_uppercase()),
        None => Extracted::Fallback,
    }
}

/// National ID or [`NO_ID`].
pub fn national_id_or_fallback(text: &str) -> String {
    extract_national_id(text).unwrap_or_else(|| NO_ID.to_string())
}

/// Period from the first `<day> <MON> <yy>` fragment. Later fragments are
/// ignored, and an unknown month on the first one is a miss.
pub fn extract_period(text: &str) -> Extracted<PeriodKey> {
    let Some(cap) = PERIOD_RE.captures(text) else {
        return Extracted::Fallback;
    };
    match month_code(&cap[1]) {
        Some(month) => Extracted::Matched(PeriodKey(format!("20{}-{}", &cap[2], month))),
        None => Extracted::Fallback,
    }
}

/// Period or `"0000-00"`.
pub fn period_or_fallback(text: &str) -> PeriodKey {
    extract_period(text).unwrap_or_else(PeriodKey::unknown)
}
