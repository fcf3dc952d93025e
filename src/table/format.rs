use once_cell::sync::Lazy;
use regex::Regex;

/// Conversion specifiers understood by the target's reduced printf. `R` and
/// `F` are the firmware's fixed-point and double conversions.
static FORMAT_SPEC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%+\d*(?:\.\d+)?[cdfiksuxRF]").expect("format spec pattern"));

/// Check that every `%` in a format string belongs to a recognized
/// conversion specifier (or a literal `%%`).
///
/// The count of matched specifiers must equal the count of `%` signs net of
/// `%%` pairs; a stray `%!` or a trailing `%` fails the check.
pub fn specifiers_consistent(format: &str) -> bool {
    let percents = format.matches('%').count() - 2 * format.matches("%%").count();
    let matched = FORMAT_SPEC
        .find_iter(format)
        .filter(|m| !m.as_str().starts_with("%%"))
        .count();
    matched == percents
}

/// The conversion specifiers of a format string, in order, `%%` excluded.
pub fn specifiers(format: &str) -> Vec<&str> {
    FORMAT_SPEC
        .find_iter(format)
        .filter(|m| !m.as_str().starts_with("%%"))
        .map(|m| m.as_str())
        .collect()
}
