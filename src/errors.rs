use std::fmt;
use thiserror::Error;

/// Where in the input an error was detected.
///
/// Textual scripts report 1-based line numbers, binary streams report the byte offset of
/// the chunk header that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLocation {
    Line(usize),
    Offset(usize),
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(f, "line {}", line),
            Self::Offset(offset) => write!(f, "offset 0x{:X}", offset),
        }
    }
}

/// Error type for model script decoding and generation
///
/// Every variant is terminal for the document being processed: decoders never hand out a
/// partially populated model. Each variant carries a machine-readable code via [`MdsError::code`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MdsError {
    // ========== I/O ERRORS (1000-1099) ==========
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        io_kind: Option<std::io::ErrorKind>,
    },

    /// Error reading file contents
    #[error("Failed to read file {path}: {reason}")]
    FileReadError { path: String, reason: String },

    /// Permission denied when accessing file
    #[error("Permission denied accessing file: {path}")]
    PermissionDenied { path: String },

    /// The output sink rejected a write
    #[error("Failed to write output: {reason}")]
    WriteFailure { reason: String },

    // ========== BINARY FORMAT ERRORS (2000-2099) ==========
    /// A recognized chunk whose payload does not match its declared length or layout
    #[error("Malformed chunk 0x{tag:04X} at offset {offset}: {reason}")]
    MalformedChunk {
        tag: u16,
        offset: usize,
        reason: String,
    },

    /// The stream ended in the middle of a chunk
    #[error("Truncated stream at offset {offset}: needed {needed} bytes, only {available} available")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        available: usize,
    },

    // ========== TEXT GRAMMAR ERRORS (3000-3099) ==========
    /// A token of the wrong shape for its position
    #[error("Unexpected token on line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// A declaration keyword outside the supported grammar
    #[error("Unknown keyword '{keyword}' on line {line}")]
    UnknownKeyword { line: usize, keyword: String },

    /// A declaration with too many or too few arguments
    #[error("Wrong number of arguments for {declaration} on line {line}: {reason}")]
    ArityMismatch {
        line: usize,
        declaration: String,
        reason: String,
    },

    /// Source text that is not valid UTF-8
    #[error("Invalid text encoding at byte offset {offset}")]
    InvalidTextEncoding { offset: usize },

    // ========== VALUE ERRORS (4000-4099) ==========
    /// A flag, fight mode or direction outside the known tables
    #[error("Invalid value '{value}' for {field} at {location}")]
    InvalidEnumValue {
        field: String,
        value: String,
        location: SourceLocation,
    },

    // ========== MEMORY AND RESOURCE ERRORS (6000-6099) ==========
    /// Data size exceeds configured limits
    #[error("Data size exceeds limit for {field}: {size} (limit: {limit})")]
    DataSizeExceedsLimit {
        field: String,
        size: usize,
        limit: usize,
    },

    /// Blocks nested deeper than the configured maximum
    #[error("Block nesting too deep on line {line}: maximum depth {max_depth} exceeded")]
    ParseStackOverflow { line: usize, max_depth: usize },
}

impl MdsError {
    /// Get the error code for machine-readable processing
    pub fn code(&self) -> u16 {
        match self {
            // I/O Errors (1000-1099)
            Self::FileNotFound { .. } => 1001,
            Self::FileReadError { .. } => 1002,
            Self::PermissionDenied { .. } => 1003,
            Self::WriteFailure { .. } => 1004,

            // Binary Format Errors (2000-2099)
            Self::MalformedChunk { .. } => 2001,
            Self::TruncatedStream { .. } => 2002,

            // Text Grammar Errors (3000-3099)
            Self::UnexpectedToken { .. } => 3001,
            Self::UnknownKeyword { .. } => 3002,
            Self::ArityMismatch { .. } => 3003,
            Self::InvalidTextEncoding { .. } => 3004,

            // Value Errors (4000-4099)
            Self::InvalidEnumValue { .. } => 4001,

            // Memory and Resource Errors (6000-6099)
            Self::DataSizeExceedsLimit { .. } => 6001,
            Self::ParseStackOverflow { .. } => 6002,
        }
    }

    /// Get the error category for grouping related errors
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            1000..=1099 => ErrorCategory::IO,
            2000..=2099 => ErrorCategory::BinaryFormat,
            3000..=3099 => ErrorCategory::TextGrammar,
            4000..=4099 => ErrorCategory::Value,
            6000..=6099 => ErrorCategory::MemoryResource,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Source line for textual grammar errors
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnexpectedToken { line, .. }
            | Self::UnknownKeyword { line, .. }
            | Self::ArityMismatch { line, .. }
            | Self::ParseStackOverflow { line, .. } => Some(*line),
            Self::InvalidEnumValue {
                location: SourceLocation::Line(line),
                ..
            } => Some(*line),
            _ => None,
        }
    }

    /// An order-list entry whose index points past its sequence
    pub(crate) fn dangling_element(kind: impl fmt::Debug, index: usize) -> Self {
        Self::WriteFailure {
            reason: format!("{:?} line points to missing index {}", kind, index),
        }
    }

    pub(crate) fn dangling_event(animation: &str, kind: impl fmt::Debug, index: usize) -> Self {
        Self::WriteFailure {
            reason: format!(
                "{:?} event of animation '{}' points to missing index {}",
                kind, animation, index
            ),
        }
    }
}

/// Error categories for grouping related error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    IO,
    BinaryFormat,
    TextGrammar,
    Value,
    MemoryResource,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IO => write!(f, "I/O"),
            Self::BinaryFormat => write!(f, "Binary Format"),
            Self::TextGrammar => write!(f, "Text Grammar"),
            Self::Value => write!(f, "Value"),
            Self::MemoryResource => write!(f, "Memory/Resource"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result type alias for model script operations
pub type MdsResult<T> = Result<T, MdsError>;

impl From<std::io::Error> for MdsError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => MdsError::FileNotFound {
                path: "unknown".to_string(),
                io_kind: Some(err.kind()),
            },
            std::io::ErrorKind::PermissionDenied => MdsError::PermissionDenied {
                path: "unknown".to_string(),
            },
            _ => MdsError::FileReadError {
                path: "unknown".to_string(),
                reason: err.to_string(),
            },
        }
    }
}

impl From<fmt::Error> for MdsError {
    fn from(err: fmt::Error) -> Self {
        MdsError::WriteFailure {
            reason: err.to_string(),
        }
    }
}
