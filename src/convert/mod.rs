use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::calls::{assemble_format, CallError, CallSites};
use crate::config::Config;
use crate::error::{ConvertError, Result};
use crate::lexer::{LineMap, Region, Regions};
use crate::rewrite::{apply_splices, splices_for_call};
use crate::table::MessageTable;

/// File extensions the directory driver converts; everything else is
/// skipped with a warning.
pub const ALLOWED_EXTENSIONS: &[&str] = &["c", "cpp", "h"];

fn malformed(file: &str, e: CallError) -> ConvertError {
    ConvertError::MalformedCall {
        file: file.to_string(),
        line: e.line,
        identifier: e.identifier,
        reason: e.kind.to_string(),
    }
}

/// Run the full pipeline over one in-memory buffer.
///
/// Classifies the buffer into regions, recognizes call sites, assembles and
/// registers each format string, and splices the assigned ids back in.
/// Returns the rewritten text and the number of calls converted. A buffer
/// with no recognized calls comes back byte-identical.
pub fn convert_source(
    buf: &str,
    file: &str,
    config: &Config,
    table: &MessageTable,
) -> Result<(String, usize)> {
    let lines = LineMap::new(buf);
    let regions: Vec<Region> = Regions::new(buf)
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| ConvertError::UnterminatedLiteral {
            file: file.to_string(),
            line: e.line,
            what: e.what,
        })?;

    let mut splices = Vec::new();
    let mut calls = 0;
    for call in CallSites::new(buf, &regions, config, &lines) {
        let call = call.map_err(|e| malformed(file, e))?;
        let arg = assemble_format(buf, &regions, &call).map_err(|e| malformed(file, e))?;
        let id = table.register(call.level(), &arg.format, file, call.line)?;
        splices.extend(splices_for_call(&call, &arg, id, config.emit_level_arg));
        calls += 1;
    }
    Ok((apply_splices(buf, &splices), calls))
}

/// Convert a single file, writing the rewritten source to `dest`.
pub fn convert_file(
    src: &Path,
    dest: &Path,
    config: &Config,
    table: &MessageTable,
) -> Result<usize> {
    let label = src.display().to_string();
    let buf = fs::read_to_string(src).map_err(|e| ConvertError::io(&*label, e))?;
    let (out, calls) = convert_source(&buf, &label, config, table)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ConvertError::io(parent.display().to_string(), e))?;
    }
    fs::write(dest, out).map_err(|e| ConvertError::io(dest.display().to_string(), e))?;
    debug!(file = %label, calls, "converted");
    Ok(calls)
}

/// Mirror a source tree into `dest`, converting every file with an allowed
/// extension.
///
/// Files are visited in sorted path order so id assignment is reproducible
/// run to run; a build system invoking per-file conversions in parallel owns
/// that ordering discipline itself.
pub fn convert_dir(src: &Path, dest: &Path, config: &Config, table: &MessageTable) -> Result<usize> {
    let mut total = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| src.display().to_string());
            ConvertError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ALLOWED_EXTENSIONS.contains(&extension) {
            warn!(file = %path.display(), "skipping unexpected file");
            continue;
        }
        let rel = path.strip_prefix(src).expect("walked path under root");
        total += convert_file(path, &dest.join(rel), config, table)?;
    }
    info!(source = %src.display(), calls = total, "directory converted");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Level;

    #[test]
    fn buffer_without_calls_is_copied_verbatim() {
        let config = Config::default();
        let table = MessageTable::new(&config);
        let buf = "static void use(void);\n/* log-free */\n";
        let (out, calls) = convert_source(buf, "plain.c", &config, &table).unwrap();
        assert_eq!(out, buf);
        assert_eq!(calls, 0);
        assert!(table.is_empty());
    }

    #[test]
    fn table_records_file_and_line() {
        let config = Config::default();
        let table = MessageTable::new(&config);
        let buf = "void f(void) {\n    log_error(\"went wrong: %d\", rc);\n}\n";
        convert_source(buf, "src/fault.c", &config, &table).unwrap();
        let entries = table.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::Error);
        assert_eq!(entries[0].file, "src/fault.c");
        assert_eq!(entries[0].line, 2);
        assert_eq!(entries[0].format, "went wrong: %d");
    }

    #[test]
    fn unterminated_literal_carries_file_and_line() {
        let config = Config::default();
        let table = MessageTable::new(&config);
        let err = convert_source("int a;\nchar *s = \"open\n", "bad.c", &config, &table)
            .unwrap_err();
        match err {
            ConvertError::UnterminatedLiteral { file, line, what } => {
                assert_eq!(file, "bad.c");
                assert_eq!(line, 2);
                assert_eq!(what, "string literal");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn malformed_call_carries_file_and_line() {
        let config = Config::default();
        let table = MessageTable::new(&config);
        let err = convert_source("\n\nlog_info(\"no end\")\n", "bad.c", &config, &table)
            .unwrap_err();
        match err {
            ConvertError::MalformedCall {
                file,
                line,
                identifier,
                ..
            } => {
                assert_eq!(file, "bad.c");
                assert_eq!(line, 3);
                assert_eq!(identifier, "log_info");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn same_buffer_twice_keeps_ids_increasing() {
        let config = Config::default();
        let table = MessageTable::new(&config);
        let buf = "log_info(\"once\");\nlog_info(\"twice\");\n";
        convert_source(buf, "a.c", &config, &table).unwrap();
        convert_source(buf, "a.c", &config, &table).unwrap();
        let ids: Vec<u32> = table.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn rewritten_output_rescans_clean() {
        let config = Config::default();
        let table = MessageTable::new(&config);
        let buf = "log_info(\"first\"); log_info(\"second %u\", 1234);\n";
        let (out, calls) = convert_source(buf, "a.c", &config, &table).unwrap();
        assert_eq!(calls, 2);

        let again = MessageTable::new(&config);
        let (unchanged, recalls) = convert_source(&out, "a.c", &config, &again).unwrap();
        assert_eq!(recalls, 0);
        assert_eq!(unchanged, out);
    }
}
