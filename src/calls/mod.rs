mod assembler;
mod recognizer;
mod types;

pub use assembler::assemble_format;
pub use recognizer::CallSites;
pub use types::{CallError, CallErrorKind, CallSite, FormatArg};
