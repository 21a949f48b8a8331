//! Errors shared by the grvlfinder crates
//!
//! [`Error`] carries an [`ErrorCode`], optional context and a suggestion for the
//! rider. Codes group into an [`ErrorCategory`], which also decides the process exit
//! code of the command line tool.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Broad kind of failure, one per thousand of [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Reading or writing files
    Io,
    /// Configuration file problems
    Configuration,
    /// Response cache problems
    Cache,
    /// Rejected input
    Validation,
}

impl ErrorCategory {
    /// Process exit code for failures of this kind
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Configuration => exit_codes::CONFIG_ERROR,
            Self::Validation => exit_codes::VALIDATION_ERROR,
            Self::Io | Self::Cache => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Io => "IO",
            Self::Configuration => "Configuration",
            Self::Cache => "Cache",
            Self::Validation => "Validation",
        })
    }
}

/// Stable numeric code, shown as `E2001` and friends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Other file system failure
    Io = 2000,
    /// A file does not exist
    FileNotFound = 2001,
    /// A file may not be read or written
    PermissionDenied = 2002,

    /// Other configuration failure
    Config = 3000,
    /// An explicitly named configuration file does not exist
    ConfigNotFound = 3001,
    /// The configuration file is not valid TOML for the schema
    ConfigParse = 3002,
    /// A setting is out of range
    InvalidConfigValue = 3004,
    /// The configuration could not be serialized
    ConfigWrite = 3005,

    /// The cache directory is unusable
    Cache = 4000,

    /// Rejected command input
    Validation = 6000,
    /// JSON that does not match the expected shape
    InvalidJson = 6002,
}

impl ErrorCode {
    /// Numeric value
    #[must_use]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Group the code belongs to
    #[must_use]
    pub fn category(self) -> ErrorCategory {
        match self {
            Self::Io | Self::FileNotFound | Self::PermissionDenied => ErrorCategory::Io,
            Self::Config
            | Self::ConfigNotFound
            | Self::ConfigParse
            | Self::InvalidConfigValue
            | Self::ConfigWrite => ErrorCategory::Configuration,
            Self::Cache => ErrorCategory::Cache,
            Self::Validation | Self::InvalidJson => ErrorCategory::Validation,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Failure with a code, optional context and a hint for the rider
#[derive(Error, Debug)]
pub struct Error {
    /// What went wrong, as a code
    pub code: ErrorCode,
    /// What went wrong, in words
    pub message: String,
    /// What was being done at the time
    pub context: Option<String>,
    /// How to fix it
    pub suggestion: Option<String>,
    /// Underlying failure
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(context) = &self.context {
            write!(f, "\n  Context: {context}")?;
        }
        match &self.suggestion {
            Some(suggestion) => write!(f, "\n  Suggestion: {suggestion}"),
            None => Ok(()),
        }
    }
}

impl Error {
    /// Error with `code` and `message` and nothing else
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Set what was being done
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    /// Set a hint for the rider
    #[must_use]
    pub fn with_suggestion(self, suggestion: impl Into<String>) -> Self {
        Self {
            suggestion: Some(suggestion.into()),
            ..self
        }
    }

    /// Keep the underlying failure
    #[must_use]
    pub fn with_source(self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..self
        }
    }

    /// Group of this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// JSON-friendly copy for `--format json`
    #[must_use]
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code.to_string(),
            category: self.category(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(ToString::to_string),
        }
    }

    /// Configuration failure without a more specific code
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, message)
    }

    /// `--config` names a file that does not exist
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().display();
        Self::new(ErrorCode::ConfigNotFound, format!("Configuration file not found: {path}"))
            .with_suggestion("Run `grvlfinder config init` or pass --config with an existing file")
    }

    /// Setting `key` holds an unusable `value`
    pub fn invalid_config_value(key: &str, value: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidConfigValue, format!("Invalid value for {key}: {value}"))
    }

    /// Cache directory failure
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Cache, message)
    }

    /// Rejected command input
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }
}

/// Serialized form of an [`Error`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Code as displayed, e.g. `E3004`
    pub code: String,
    /// Group of the code
    pub category: ErrorCategory,
    /// What went wrong
    pub message: String,
    /// What was being done
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// How to fix it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Underlying failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result with the shared [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes of the command line tool
pub mod exit_codes {
    /// Everything worked
    pub const SUCCESS: i32 = 0;
    /// Any failure without a more specific code
    pub const FAILURE: i32 = 1;
    /// Bad arguments or input files
    pub const VALIDATION_ERROR: i32 = 2;
    /// Bad configuration file
    pub const CONFIG_ERROR: i32 = 3;
    /// A map service failed or refused
    pub const SERVICE_ERROR: i32 = 4;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::Io,
        };
        Self::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorCode::InvalidJson, format!("JSON error: {err}")).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorCode::ConfigParse, format!("TOML parse error: {err}")).with_source(err)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::new(ErrorCode::ConfigWrite, format!("TOML write error: {err}")).with_source(err)
    }
}

/// Context and suggestions on a [`Result`]
pub trait ResultExt<T> {
    /// Set what was being done when this fails
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Set a hint for the rider when this fails
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_display_with_prefix() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::InvalidConfigValue.to_string(), "E3004");
    }

    #[test]
    fn test_categories_decide_exit_codes() {
        assert_eq!(ErrorCode::ConfigParse.category(), ErrorCategory::Configuration);
        assert_eq!(ErrorCategory::Configuration.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(ErrorCode::Validation.category().exit_code(), exit_codes::VALIDATION_ERROR);
        assert_eq!(ErrorCode::Cache.category().exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_display_includes_context_and_suggestion() {
        let err = Error::config_not_found("/tmp/ride.toml").with_context("While loading profile");

        assert_eq!(err.code, ErrorCode::ConfigNotFound);
        let text = err.to_string();
        assert!(text.starts_with("[E3001] Configuration file not found: /tmp/ride.toml"));
        assert!(text.contains("Context: While loading profile"));
        assert!(text.contains("Suggestion: Run `grvlfinder config init`"));
    }

    #[test]
    fn test_report_skips_missing_fields() {
        let report = Error::cache("Cache directory is read-only").to_report();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["code"], "E4000");
        assert_eq!(json["category"], "Cache");
        assert!(json.get("context").is_none());
    }

    #[test]
    fn test_result_ext_adds_suggestion() {
        let result: Result<()> = Err(Error::validation("bad weight"));
        let err = result.with_suggestion("Use an integer").unwrap_err();
        assert_eq!(err.suggestion.as_deref(), Some("Use an integer"));
    }

    #[test]
    fn test_io_errors_map_by_kind() {
        let missing: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(missing.code, ErrorCode::FileNotFound);

        let other: Error = std::io::Error::other("disk full").into();
        assert_eq!(other.code, ErrorCode::Io);
        assert!(other.source.is_some());
    }
}
