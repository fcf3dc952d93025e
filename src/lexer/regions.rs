/// Classification of one span of source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Code,
    LineComment,
    BlockComment,
    StringLiteral,
    CharLiteral,
}

/// A classified span over a source buffer.
///
/// Regions produced by the scanner are contiguous, non-overlapping and cover
/// the buffer left to right. `start` is inclusive, `end` exclusive. A string
/// or char literal region includes both quote bytes; a block comment includes
/// its closing `*/`; a line comment ends before its newline, which belongs to
/// the following code region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn text<'a>(&self, buf: &'a str) -> &'a str {
        &buf[self.start..self.end]
    }

    /// Content of a string or char literal without the delimiting quotes,
    /// escape sequences left verbatim.
    pub fn literal_content<'a>(&self, buf: &'a str) -> &'a str {
        debug_assert!(matches!(
            self.kind,
            RegionKind::StringLiteral | RegionKind::CharLiteral
        ));
        &buf[self.start + 1..self.end - 1]
    }
}

/// Byte offset to 1-based line number translation for one buffer.
#[derive(Debug)]
pub struct LineMap {
    starts: Vec<usize>,
}

impl LineMap {
    pub fn new(buf: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in buf.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        LineMap { starts }
    }

    pub fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }
}
