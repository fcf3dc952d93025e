use crate::calls::{CallSite, FormatArg};

/// One byte-range replacement in a source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Splices for one registered call: the identifier rename (when the
/// configured replacement differs) and the format-string span becoming the
/// decimal id, optionally preceded by the numeric severity level so the
/// reduced-signature runtime macro receives it explicitly.
pub fn splices_for_call(
    call: &CallSite,
    arg: &FormatArg,
    id: u32,
    emit_level_arg: bool,
) -> Vec<Splice> {
    let mut splices = Vec::with_capacity(2);
    if call.spec.replacement != call.spec.name {
        splices.push(Splice {
            start: call.name_start,
            end: call.name_end,
            text: call.spec.replacement.clone(),
        });
    }
    let text = if emit_level_arg {
        format!("{}, {}", call.spec.level.code(), id)
    } else {
        id.to_string()
    };
    splices.push(Splice {
        start: arg.span_start,
        end: arg.span_end,
        text,
    });
    splices
}

/// Copy `buf` with each splice's range replaced by its text.
///
/// Splices must be sorted by start and non-overlapping; applying them in
/// order makes later offsets absorb the length deltas of earlier
/// replacements, so no fixed offset map is needed. All bytes outside the
/// spliced ranges are copied verbatim.
pub fn apply_splices(buf: &str, splices: &[Splice]) -> String {
    let mut out = String::with_capacity(buf.len());
    let mut pos = 0;
    for s in splices {
        debug_assert!(s.start >= pos && s.end >= s.start);
        out.push_str(&buf[pos..s.start]);
        out.push_str(&s.text);
        pos = s.end;
    }
    out.push_str(&buf[pos..]);
    out
}
