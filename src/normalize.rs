use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Returned whenever a value normalizes to nothing.
pub const PLACEHOLDER_NAME: &str = "SIN_NOMBRE";

/// Turn free text into an uppercase, accent-free token usable as a file name.
/// Keeps only `A-Z`, `0-9`, `_` and `-`; whitespace runs become one `_`.
/// Never returns an empty string.
pub fn normalize(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let mut kept = String::with_capacity(upper.len());
    for ch in upper.nfd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_whitespace() {
            kept.push(' ');
        } else if ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_' || ch == '-' {
            kept.push(ch);
        }
    }

    let token = kept.split_whitespace().collect::<Vec<_>>().join("_");
    if token.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        token
    }
}
