//! Import configuration from environment variables

use std::env;

use crate::error::ImportError;

const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ImportConfig {
    /// Pretty-print the JSON output
    pub pretty: bool,

    /// Largest input file accepted, in bytes
    pub max_bytes: u64,

    /// Keep rejected-move diagnostics in the output
    pub keep_diagnostics: bool,
}

impl ImportConfig {
    pub fn from_env() -> Result<Self, ImportError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ImportError> {
        Ok(Self {
            pretty: flag(&var, "PGN_IMPORT_PRETTY", false)?,
            max_bytes: match var("PGN_IMPORT_MAX_BYTES") {
                Some(v) => v
                    .trim()
                    .parse()
                    .map_err(|_| ImportError::Config(format!("PGN_IMPORT_MAX_BYTES is not a number: {v}")))?,
                None => DEFAULT_MAX_BYTES,
            },
            keep_diagnostics: flag(&var, "PGN_IMPORT_KEEP_DIAGNOSTICS", true)?,
        })
    }
}

fn flag(var: impl Fn(&str) -> Option<String>, name: &str, default: bool) -> Result<bool, ImportError> {
    match var(name) {
        Some(v) => parse_flag(&v).ok_or_else(|| ImportError::Config(format!("{name} must be true or false, got {v}"))),
        None => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ImportConfig::from_vars(|_| None).unwrap();
        assert!(!config.pretty);
        assert_eq!(config.max_bytes, DEFAULT_MAX_BYTES);
        assert!(config.keep_diagnostics);
    }

    #[test]
    fn test_reads_overrides() {
        let config = ImportConfig::from_vars(|name| match name {
            "PGN_IMPORT_MAX_BYTES" => Some("2048".to_string()),
            "PGN_IMPORT_KEEP_DIAGNOSTICS" => Some("false".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.max_bytes, 2048);
        assert!(!config.keep_diagnostics);

        let err = ImportConfig::from_vars(|name| (name == "PGN_IMPORT_MAX_BYTES").then(|| "lots".to_string()));
        assert!(matches!(err, Err(ImportError::Config(_))));
    }
}
