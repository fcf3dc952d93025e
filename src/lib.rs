//! Build-time miniaturiser for C logging calls.
//!
//! Scans embedded-firmware C source for calls to lightweight logging macros,
//! replaces each call's literal format string with a compact numeric id, and
//! emits a side table mapping ids back to severity, source location and the
//! original format string. Program memory on the target is too scarce to
//! hold the strings, so only the integer travels at runtime; a host-side
//! reader reconstructs the log line from the table.
//!
//! The pipeline is [`lexer`] → [`calls`] → [`table`] → [`rewrite`], driven
//! per file by [`convert`].

pub mod calls;
pub mod config;
pub mod convert;
pub mod error;
pub mod lexer;
pub mod rewrite;
pub mod table;
