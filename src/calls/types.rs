use thiserror::Error;

use crate::config::{Level, MacroSpec};

/// One recognized invocation of a logging identifier.
///
/// All offsets are absolute byte positions in the source buffer: `arg_start`
/// is the byte after the opening `(`, `arg_end` the offset of the balancing
/// `)`, `terminator` the offset of the statement `;`. The terminator may sit
/// many lines after the call, with comments and blank lines in between.
#[derive(Debug, Clone)]
pub struct CallSite {
    pub spec: MacroSpec,
    /// 1-based line of the identifier.
    pub line: usize,
    pub name_start: usize,
    pub name_end: usize,
    pub arg_start: usize,
    pub arg_end: usize,
    pub terminator: usize,
}

impl CallSite {
    pub fn identifier(&self) -> &str {
        &self.spec.name
    }

    pub fn level(&self) -> Level {
        self.spec.level
    }
}

/// The assembled first argument of a call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatArg {
    /// Concatenation of the string-literal pieces, escapes kept verbatim.
    pub format: String,
    /// Opening quote of the first literal.
    pub span_start: usize,
    /// Byte after the closing quote of the last literal.
    pub span_end: usize,
    /// Everything after the first top-level comma up to the closing `)`,
    /// opaque and copied through unmodified. Empty for a one-argument call.
    pub remainder: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CallErrorKind {
    #[error("no closing parenthesis before end of file")]
    UnclosedCall,
    #[error("no terminating `;` before end of file")]
    MissingTerminator,
    #[error("unexpected token between `)` and `;`")]
    UnexpectedToken,
    #[error("first argument is not a string literal")]
    NonStringFirstArg,
}

/// A structurally broken call. Fatal for the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {identifier}: {kind}")]
pub struct CallError {
    pub line: usize,
    pub identifier: String,
    pub kind: CallErrorKind,
}
