use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Severity implied by which logging identifier was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Numeric encoding used when the level is inserted as a call argument.
    /// Values match the wire levels of the target's logging runtime.
    pub fn code(self) -> u8 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warn => 30,
            Level::Error => 40,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            _ => Err(()),
        }
    }
}

/// One recognized logging identifier: the name matched in source, the level
/// it implies, and the reduced-signature macro name written in its place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroSpec {
    pub name: String,
    pub level: Level,
    pub replacement: String,
}

impl MacroSpec {
    fn new(name: &str, level: Level, replacement: &str) -> Self {
        MacroSpec {
            name: name.to_string(),
            level,
            replacement: replacement.to_string(),
        }
    }
}

/// Engine configuration, loaded once at startup.
///
/// The recognized-identifier set is an explicit table rather than pattern
/// matching: an identifier absent from it (`log_inf`, say) is simply not a
/// call site and passes through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub macros: Vec<MacroSpec>,
    /// First id handed out by a fresh message table.
    pub id_base: u32,
    /// Width of the integer the id must fit at the call site, 16 or 32 bits.
    pub id_bits: u8,
    /// Insert the numeric severity level as an extra leading argument.
    pub emit_level_arg: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            macros: vec![
                MacroSpec::new("log_debug", Level::Debug, "log_mini_debug"),
                MacroSpec::new("log_info", Level::Info, "log_mini_info"),
                MacroSpec::new("log_warning", Level::Warn, "log_mini_warning"),
                MacroSpec::new("log_error", Level::Error, "log_mini_error"),
            ],
            id_base: 1,
            id_bits: 32,
            emit_level_arg: false,
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConvertError::io(path.display().to_string(), e))?;
        serde_json::from_str(&text).map_err(|source| ConvertError::Config {
            path: path.display().to_string(),
            source,
        })
    }

    /// Name -> spec lookup used by the recognizer.
    pub fn macro_map(&self) -> HashMap<&str, &MacroSpec> {
        self.macros.iter().map(|m| (m.name.as_str(), m)).collect()
    }

    /// Largest id the configured encoding width can carry.
    pub fn max_id(&self) -> u32 {
        if self.id_bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.id_bits) - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_recognizes_the_four_macros() {
        let config = Config::default();
        let map = config.macro_map();
        assert_eq!(map["log_info"].level, Level::Info);
        assert_eq!(map["log_warning"].replacement, "log_mini_warning");
        assert!(!map.contains_key("log_inf"));
    }

    #[test]
    fn parses_json_overrides() {
        let config: Config = serde_json::from_str(
            r#"{
                "macros": [{"name": "trace", "level": "DEBUG", "replacement": "trace_id"}],
                "id_bits": 16,
                "emit_level_arg": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.macros.len(), 1);
        assert_eq!(config.macros[0].level, Level::Debug);
        assert_eq!(config.id_base, 1);
        assert_eq!(config.max_id(), 0xFFFF);
        assert!(config.emit_level_arg);
    }

    #[test]
    fn level_round_trips_through_str() {
        for level in [Level::Debug, Level::Info, Level::Warn, Level::Error] {
            assert_eq!(level.as_str().parse::<Level>(), Ok(level));
        }
    }
}
