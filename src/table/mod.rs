mod format;

pub use format::{specifiers, specifiers_consistent};

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config::{Config, Level};
use crate::error::{ConvertError, Result};

/// One registered message: everything the host-side decoder needs to turn an
/// emitted id plus runtime arguments back into a readable log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    pub id: u32,
    pub level: Level,
    pub file: String,
    pub line: usize,
    pub format: String,
}

#[derive(Debug)]
struct Inner {
    next: u32,
    entries: Vec<MessageEntry>,
}

/// Build-wide id allocator and message store.
///
/// Ids are handed out sequentially from a monotonic counter in registration
/// order; two call sites with identical format strings still get distinct
/// ids, keeping every id traceable to one source location. The table is
/// shared across all files of a build, so allocation is mutex-guarded while
/// per-file scans stay lock-free. Reproducible id assignment is the caller's
/// responsibility: process files in a stable order.
#[derive(Debug)]
pub struct MessageTable {
    inner: Mutex<Inner>,
    bits: u8,
    max_id: u32,
}

impl MessageTable {
    pub fn new(config: &Config) -> Self {
        MessageTable {
            inner: Mutex::new(Inner {
                next: config.id_base,
                entries: Vec::new(),
            }),
            bits: config.id_bits,
            max_id: config.max_id(),
        }
    }

    /// Validate the format string and allocate the next id for it.
    pub fn register(&self, level: Level, format: &str, file: &str, line: usize) -> Result<u32> {
        if !specifiers_consistent(format) {
            return Err(ConvertError::InvalidFormat {
                file: file.to_string(),
                line,
                format: format.to_string(),
            });
        }
        let mut inner = self.inner.lock().expect("table lock poisoned");
        if inner.next > self.max_id {
            return Err(ConvertError::TableOverflow { bits: self.bits });
        }
        let id = inner.next;
        inner.next += 1;
        inner.entries.push(MessageEntry {
            id,
            level,
            file: file.to_string(),
            line,
            format: format.to_string(),
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("table lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in id order.
    pub fn entries(&self) -> Vec<MessageEntry> {
        self.inner
            .lock()
            .expect("table lock poisoned")
            .entries
            .clone()
    }

    /// Serialize as one record per line: `id\tLEVEL\tfile:line\tformat`.
    ///
    /// The format string is the last field, so a raw tab inside a C string
    /// literal cannot shift fields; raw newlines cannot occur in one.
    pub fn write_tsv<W: Write>(&self, mut w: W) -> io::Result<()> {
        for e in self.entries() {
            writeln!(w, "{}\t{}\t{}:{}\t{}", e.id, e.level, e.file, e.line, e.format)?;
        }
        Ok(())
    }

    /// Rebuild a table from a previous build's TSV so a new run can append
    /// to it; the counter resumes past the highest id seen.
    pub fn read_tsv<R: BufRead>(config: &Config, r: R, path: &str) -> Result<Self> {
        let table = MessageTable::new(config);
        {
            let mut inner = table.inner.lock().expect("table lock poisoned");
            for (n, line) in r.lines().enumerate() {
                let line = line.map_err(|e| ConvertError::io(path, e))?;
                if line.is_empty() {
                    continue;
                }
                let entry = parse_record(&line).ok_or_else(|| ConvertError::BadTableRecord {
                    path: path.to_string(),
                    line: n + 1,
                })?;
                inner.next = inner.next.max(entry.id + 1);
                inner.entries.push(entry);
            }
        }
        Ok(table)
    }
}

fn parse_record(line: &str) -> Option<MessageEntry> {
    let mut fields = line.splitn(4, '\t');
    let id = fields.next()?.parse().ok()?;
    let level = fields.next()?.parse::<Level>().ok()?;
    let location = fields.next()?;
    let format = fields.next()?.to_string();
    let (file, line_no) = location.rsplit_once(':')?;
    Some(MessageEntry {
        id,
        level,
        file: file.to_string(),
        line: line_no.parse().ok()?,
        format,
    })
}
