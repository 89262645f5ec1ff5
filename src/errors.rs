/*!
 * Error types for the asstools application.
 *
 * Fatal problems abort the processing of a single subtitle file and are
 * represented by `AssError`. Everything else is a `Diagnostic`: a warning
 * that travels alongside successful output so the caller can surface it.
 */

use std::fmt;

use thiserror::Error;

/// Errors that make a single subtitle file unprocessable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssError {
    /// The raw bytes could not be decoded by any candidate codec
    #[error("Encoding not supported: none of [{tried}] could decode the file")]
    EncodingUnsupported {
        /// Comma separated list of the codecs that were attempted
        tried: String,
    },

    /// A non-header line appeared before the first `[Section]` header
    #[error("Content before first section header at line {line}")]
    ContentBeforeFirstSection {
        /// 1-based line number of the offending line
        line: usize,
    },

    /// An events section has no `Format:` line ahead of its first event
    #[error("Missing Format line in section {section}")]
    FormatLineMissing {
        /// Header of the section, brackets included
        section: String,
    },

    /// The grouping field is not declared by the `Format:` line
    #[error("Field '{field}' is not declared by the Format line")]
    UnknownField {
        /// Requested field name
        field: String,
    },
}

/// Errors raised while loading or validating the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value violates the configuration schema
    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue {
        /// Dotted path of the offending key
        key: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Ass(#[from] AssError),

    /// Error from configuration handling
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

/// Kinds of non-fatal conditions reported while processing a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// An event line had fewer separators than its Format line requires
    FieldCountMismatch,
    /// Filter values and name tails could not be paired one to one
    FilterNameTailArityMismatch,
    /// Renaming by number was requested but the base name has no digits
    NoDigitsForRename,
    /// A `Key: value` line in an events section is not a known event type
    UnknownEventLine,
    /// The document does not contain any event
    NoEvents,
    /// A filter value matched no event, so no file is produced for it
    EmptyGroup,
    /// Two outputs resolved to the same file name
    DuplicateOutputName,
    /// Some characters cannot be represented in the output encoding
    UnmappableCharacters,
}

impl DiagnosticKind {
    /// Stable identifier used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FieldCountMismatch => "FieldCountMismatch",
            Self::FilterNameTailArityMismatch => "FilterNameTailArityMismatch",
            Self::NoDigitsForRename => "NoDigitsForRename",
            Self::UnknownEventLine => "UnknownEventLine",
            Self::NoEvents => "NoEvents",
            Self::EmptyGroup => "EmptyGroup",
            Self::DuplicateOutputName => "DuplicateOutputName",
            Self::UnmappableCharacters => "UnmappableCharacters",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A warning produced while processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong
    pub kind: DiagnosticKind,

    /// The file (or other unit) the diagnostic refers to
    pub file_context: String,

    /// Human readable details
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(kind: DiagnosticKind, file_context: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            file_context: file_context.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file_context.is_empty() {
            write!(f, "[{}] {}", self.kind, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.kind, self.file_context, self.message)
        }
    }
}
