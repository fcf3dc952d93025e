use std::collections::HashMap;

use crate::config::{Config, MacroSpec};
use crate::lexer::{LineMap, Region, RegionKind};

use super::types::{CallError, CallErrorKind, CallSite};

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Lazy scan of a classified buffer for recognized logging calls.
///
/// Only Code regions are inspected, so an identifier spelled inside a string
/// literal or comment can never trigger recognition, and parentheses inside
/// nested strings or comments never contribute to the balance. After an
/// error the iterator is exhausted.
pub struct CallSites<'a> {
    buf: &'a str,
    regions: &'a [Region],
    lines: &'a LineMap,
    macros: HashMap<&'a str, &'a MacroSpec>,
    ri: usize,
    pos: usize,
    failed: bool,
}

impl<'a> CallSites<'a> {
    pub fn new(
        buf: &'a str,
        regions: &'a [Region],
        config: &'a Config,
        lines: &'a LineMap,
    ) -> Self {
        CallSites {
            buf,
            regions,
            lines,
            macros: config.macro_map(),
            ri: 0,
            pos: 0,
            failed: false,
        }
    }

    /// Parse one call starting from its already-matched identifier and
    /// opening parenthesis, leaving the scan position just past the `;`.
    fn parse_call(
        &mut self,
        name_start: usize,
        name_end: usize,
        spec: MacroSpec,
        open_pos: usize,
    ) -> Result<CallSite, CallError> {
        let b = self.buf.as_bytes();
        let line = self.lines.line(name_start);
        let fail = |kind| CallError {
            line,
            identifier: spec.name.clone(),
            kind,
        };

        let arg_start = open_pos + 1;

        // Balance parentheses, counting Code-region bytes only.
        let mut depth = 1u32;
        let mut arg_end = None;
        let mut idx = self.ri;
        'balance: while idx < self.regions.len() {
            let r = self.regions[idx];
            if r.kind == RegionKind::Code {
                for k in r.start.max(arg_start)..r.end {
                    match b[k] {
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                arg_end = Some(k);
                                break 'balance;
                            }
                        }
                        _ => {}
                    }
                }
            }
            idx += 1;
        }
        let arg_end = arg_end.ok_or_else(|| fail(CallErrorKind::UnclosedCall))?;

        // The `;` may be separated from the `)` by blank lines and comments,
        // all of which are skipped. Anything else is a malformed call.
        let mut terminator = None;
        let mut from = arg_end + 1;
        let mut tidx = idx;
        'terminator: while tidx < self.regions.len() {
            let r = self.regions[tidx];
            match r.kind {
                RegionKind::Code => {
                    for k in r.start.max(from)..r.end {
                        if b[k] == b';' {
                            terminator = Some(k);
                            break 'terminator;
                        }
                        if !b[k].is_ascii_whitespace() {
                            return Err(fail(CallErrorKind::UnexpectedToken));
                        }
                    }
                }
                RegionKind::LineComment | RegionKind::BlockComment => {}
                RegionKind::StringLiteral | RegionKind::CharLiteral => {
                    return Err(fail(CallErrorKind::UnexpectedToken));
                }
            }
            tidx += 1;
            from = 0;
        }
        let terminator = terminator.ok_or_else(|| fail(CallErrorKind::MissingTerminator))?;

        self.ri = tidx;
        self.pos = terminator + 1;
        Ok(CallSite {
            spec,
            line,
            name_start,
            name_end,
            arg_start,
            arg_end,
            terminator,
        })
    }
}

impl Iterator for CallSites<'_> {
    type Item = Result<CallSite, CallError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let b = self.buf.as_bytes();
        loop {
            while self.ri < self.regions.len() && self.regions[self.ri].end <= self.pos {
                self.ri += 1;
            }
            let region = *self.regions.get(self.ri)?;
            if region.kind != RegionKind::Code {
                self.pos = region.end;
                continue;
            }

            let mut i = self.pos.max(region.start);
            while i < region.end {
                if is_ident_start(b[i]) && (i == 0 || !is_ident(b[i - 1])) {
                    let mut j = i + 1;
                    while j < region.end && is_ident(b[j]) {
                        j += 1;
                    }
                    if let Some(&spec) = self.macros.get(&self.buf[i..j]) {
                        // The `(` must follow within the same code region
                        // across whitespace only.
                        let mut k = j;
                        while k < region.end && b[k].is_ascii_whitespace() {
                            k += 1;
                        }
                        if k < region.end && b[k] == b'(' {
                            let spec = spec.clone();
                            return match self.parse_call(i, j, spec, k) {
                                Ok(call) => Some(Ok(call)),
                                Err(e) => {
                                    self.failed = true;
                                    Some(Err(e))
                                }
                            };
                        }
                    }
                    i = j;
                } else {
                    i += 1;
                }
            }
            self.pos = region.end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Regions;

    fn scan(buf: &str) -> Result<Vec<CallSite>, CallError> {
        let config = Config::default();
        let lines = LineMap::new(buf);
        let regions: Vec<Region> = Regions::new(buf).map(|r| r.unwrap()).collect();
        CallSites::new(buf, &regions, &config, &lines).collect()
    }

    #[test]
    fn finds_a_simple_call() {
        let calls = scan("    log_info(\"hello\");\n").unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].identifier(), "log_info");
        assert_eq!(calls[0].line, 1);
    }

    #[test]
    fn identifier_inside_string_is_not_a_call() {
        let calls = scan("static String woops = \"log_info(\";\n").unwrap();
        assert!(calls.is_empty());
    }

    #[test]
    fn identifier_inside_comment_is_not_a_call() {
        let calls = scan("// log_info(\"in a comment\");\n/* log_info(\"also\"); */\n").unwrap();
        assert!(calls.is_empty());
    }

    #[test]
    fn lookalike_identifier_passes_through() {
        let calls = scan("log_inf(\"blah\", \")\", \"more\");\n").unwrap();
        assert!(calls.is_empty());
        let calls = scan("my_log_info(\"not ours\");\n").unwrap();
        assert!(calls.is_empty());
    }

    #[test]
    fn paren_inside_string_does_not_close_call() {
        let calls = scan("log_info(\"this is for alan); so there!\");\n").unwrap();
        assert_eq!(calls.len(), 1);
        let buf = "log_info(\"Test %u for alan); so there!\",\n    2);\n";
        let calls = scan(buf).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(&buf[calls[0].arg_end..=calls[0].terminator], ");");
    }

    #[test]
    fn two_calls_on_one_line() {
        let calls = scan("log_info(\"first\"); log_info(\"second %u\", 1234);\n").unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].terminator < calls[1].name_start);
        assert_eq!(calls[0].line, 1);
        assert_eq!(calls[1].line, 1);
    }

    #[test]
    fn terminator_after_block_comment() {
        let buf = "log_info(\"then a standard comment on a middle line\")\n/* evil comment */\n;\n";
        let calls = scan(buf).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(buf.as_bytes()[calls[0].terminator], b';');
    }

    #[test]
    fn terminator_after_line_comment() {
        let buf = "log_info(\"then a backslash comment on a middle line\")\n// comment\n;\n";
        assert_eq!(scan(buf).unwrap().len(), 1);
    }

    #[test]
    fn terminator_after_blank_lines() {
        let buf = "log_info(\"then a empty line in the middle line\")\n\n;\n";
        assert_eq!(scan(buf).unwrap().len(), 1);
    }

    #[test]
    fn call_spanning_lines_with_trailing_comment() {
        let buf = "log_info(\n    \"\\t back off = %u, time between spikes %u\",\n    random_backoff, time_between_spikes); // And a Comment\n";
        let calls = scan(buf).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].line, 1);
    }

    #[test]
    fn missing_terminator_is_an_error() {
        let err = scan("log_info(\"no semicolon\")\n").unwrap_err();
        assert_eq!(err.kind, CallErrorKind::MissingTerminator);
        assert_eq!(err.line, 1);
        assert_eq!(err.identifier, "log_info");
    }

    #[test]
    fn unclosed_call_is_an_error() {
        let err = scan("x();\nlog_info(\"never closed\"\n").unwrap_err();
        assert_eq!(err.kind, CallErrorKind::UnclosedCall);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn stray_token_before_terminator_is_an_error() {
        let err = scan("log_info(\"x\") fluff;\n").unwrap_err();
        assert_eq!(err.kind, CallErrorKind::UnexpectedToken);
    }

    #[test]
    fn comment_before_call_on_same_line() {
        let calls = scan("/* comment */ log_info(\"comment before\");\n").unwrap();
        assert_eq!(calls.len(), 1);
    }
}
