use crate::lexer::{Region, RegionKind};

use super::types::{CallError, CallErrorKind, CallSite, FormatArg};

/// Regions overlapping the half-open byte range `start..end`.
fn overlapping(regions: &[Region], start: usize, end: usize) -> &[Region] {
    let first = regions.partition_point(|r| r.end <= start);
    let last = regions.partition_point(|r| r.start < end);
    // An empty argument span selects no regions.
    &regions[first..last.max(first)]
}

/// Assemble a recognized call's first argument into its logical format
/// string.
///
/// The first argument ends at the first Code-region comma at parenthesis
/// depth zero; commas inside strings or nested calls do not count. Adjacent
/// string literals concatenate with no separator, matching the C rule, with
/// intervening comments and whitespace skipped. Escape sequences are kept
/// verbatim: the table must store exactly what a downstream decoder will
/// interpret. Everything after the first comma is captured opaquely.
pub fn assemble_format(
    buf: &str,
    regions: &[Region],
    call: &CallSite,
) -> Result<FormatArg, CallError> {
    let b = buf.as_bytes();
    let fail = |kind| CallError {
        line: call.line,
        identifier: call.spec.name.clone(),
        kind,
    };

    // Locate the comma terminating the first argument, if any.
    let mut depth = 0u32;
    let mut comma = None;
    'search: for r in overlapping(regions, call.arg_start, call.arg_end) {
        if r.kind != RegionKind::Code {
            continue;
        }
        for k in r.start.max(call.arg_start)..r.end.min(call.arg_end) {
            match b[k] {
                b'(' => depth += 1,
                b')' => depth -= 1,
                b',' if depth == 0 => {
                    comma = Some(k);
                    break 'search;
                }
                _ => {}
            }
        }
    }
    let first_end = comma.unwrap_or(call.arg_end);

    let mut format = String::new();
    let mut span: Option<(usize, usize)> = None;
    for r in overlapping(regions, call.arg_start, first_end) {
        match r.kind {
            RegionKind::StringLiteral => {
                format.push_str(r.literal_content(buf));
                span = Some((span.map_or(r.start, |(s, _)| s), r.end));
            }
            RegionKind::LineComment | RegionKind::BlockComment => {}
            RegionKind::CharLiteral => return Err(fail(CallErrorKind::NonStringFirstArg)),
            RegionKind::Code => {
                let from = r.start.max(call.arg_start);
                let to = r.end.min(first_end);
                if b[from..to].iter().any(|c| !c.is_ascii_whitespace()) {
                    return Err(fail(CallErrorKind::NonStringFirstArg));
                }
            }
        }
    }
    let (span_start, span_end) = span.ok_or_else(|| fail(CallErrorKind::NonStringFirstArg))?;

    let remainder = comma
        .map(|c| buf[c + 1..call.arg_end].to_string())
        .unwrap_or_default();
    Ok(FormatArg {
        format,
        span_start,
        span_end,
        remainder,
    })
}
