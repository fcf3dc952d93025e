use thiserror::Error;

use super::{Region, RegionKind};

/// A literal or comment was still open when the buffer ended.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: unterminated {what}")]
pub struct LexError {
    pub line: usize,
    pub what: &'static str,
}

fn line_at(buf: &str, offset: usize) -> usize {
    buf.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Classify the next region of `buf` starting at `pos`.
///
/// Pure function of `(buf, pos)`: returns the region and leaves advancing to
/// `region.end` to the caller. `Ok(None)` at end of buffer. All region
/// boundaries fall on ASCII delimiter bytes, so slicing at them is safe for
/// UTF-8 content in comments and strings.
pub fn next_region(buf: &str, pos: usize) -> Result<Option<Region>, LexError> {
    let b = buf.as_bytes();
    if pos >= b.len() {
        return Ok(None);
    }
    match b[pos] {
        b'/' if b.get(pos + 1) == Some(&b'/') => Ok(Some(line_comment(b, pos))),
        b'/' if b.get(pos + 1) == Some(&b'*') => block_comment(buf, pos).map(Some),
        b'"' => literal(buf, pos, RegionKind::StringLiteral, "string literal").map(Some),
        b'\'' => literal(buf, pos, RegionKind::CharLiteral, "character literal").map(Some),
        _ => Ok(Some(code(b, pos))),
    }
}

fn line_comment(b: &[u8], pos: usize) -> Region {
    let mut i = pos + 2;
    while i < b.len() {
        if b[i] == b'\n' {
            // A trailing backslash continues the comment onto the next line,
            // matching preprocessor line-continuation semantics.
            let continued = b[i - 1] == b'\\' || (b[i - 1] == b'\r' && i >= 2 && b[i - 2] == b'\\');
            if !continued {
                break;
            }
        }
        i += 1;
    }
    Region {
        kind: RegionKind::LineComment,
        start: pos,
        end: i,
    }
}

fn block_comment(buf: &str, pos: usize) -> Result<Region, LexError> {
    let b = buf.as_bytes();
    let mut i = pos + 2;
    while i + 1 < b.len() {
        if b[i] == b'*' && b[i + 1] == b'/' {
            return Ok(Region {
                kind: RegionKind::BlockComment,
                start: pos,
                end: i + 2,
            });
        }
        i += 1;
    }
    Err(LexError {
        line: line_at(buf, pos),
        what: "block comment",
    })
}

fn literal(buf: &str, pos: usize, kind: RegionKind, what: &'static str) -> Result<Region, LexError> {
    let b = buf.as_bytes();
    let quote = b[pos];
    let unterminated = || LexError {
        line: line_at(buf, pos),
        what,
    };
    let mut i = pos + 1;
    loop {
        if i >= b.len() {
            return Err(unterminated());
        }
        match b[i] {
            b'\\' => {
                // The escaped byte is consumed verbatim and can never close
                // the literal. A backslash-newline pair is rejected the same
                // way a bare newline is.
                if i + 1 >= b.len() || b[i + 1] == b'\n' {
                    return Err(unterminated());
                }
                i += 2;
            }
            b'\n' => return Err(unterminated()),
            c if c == quote => {
                return Ok(Region {
                    kind,
                    start: pos,
                    end: i + 1,
                })
            }
            _ => i += 1,
        }
    }
}

fn code(b: &[u8], pos: usize) -> Region {
    let mut i = pos;
    while i < b.len() {
        match b[i] {
            b'"' | b'\'' => break,
            b'/' if matches!(b.get(i + 1), Some(b'/') | Some(b'*')) => break,
            _ => i += 1,
        }
    }
    // The dispatch in next_region guarantees i > pos here.
    Region {
        kind: RegionKind::Code,
        start: pos,
        end: i,
    }
}

/// Lazy left-to-right iteration of [`next_region`] over a whole buffer.
///
/// Finite and non-restartable; after yielding an error the iterator is
/// exhausted.
pub struct Regions<'a> {
    buf: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Regions<'a> {
    pub fn new(buf: &'a str) -> Self {
        Regions {
            buf,
            pos: 0,
            failed: false,
        }
    }
}

impl Iterator for Regions<'_> {
    type Item = Result<Region, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match next_region(self.buf, self.pos) {
            Ok(Some(region)) => {
                self.pos = region.end;
                Some(Ok(region))
            }
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
