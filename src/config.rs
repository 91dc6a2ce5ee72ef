//! Environment-driven settings.

use std::env;
use std::path::PathBuf;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    File,
    Stdout,
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise
    Auto,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// Model directory or artifact file
    pub model_path: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Honoured in debug builds only
    pub allow_unverified_model: bool,
}

pub fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let model_path = lookup("STROKESENSE_MODEL_PATH").unwrap_or_else(|| "models".to_string());

        let log_mode = lookup("STROKESENSE_LOG_MODE")
            .map(|v| LogMode::parse(&v))
            .unwrap_or(LogMode::Auto);

        let log_file =
            lookup("STROKESENSE_LOG_FILE").unwrap_or_else(|| "strokesense.log".to_string());

        let allow_unverified_model = cfg!(debug_assertions)
            && lookup("STROKESENSE_ALLOW_UNVERIFIED_MODEL")
                .map(|v| parse_bool(&v))
                .unwrap_or(false);

        Settings {
            model_path: model_path.into(),
            log_mode,
            log_file: log_file.into(),
            allow_unverified_model,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
