use osaudit_core_types::RunId;
use thiserror::Error;

/// Result type alias using OsAuditError
pub type Result<T> = std::result::Result<T, OsAuditError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, log assertions and exit-code decisions at the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Stream transport
    /// The stream source could not be opened or read
    StreamUnreadable,

    // Stream content
    /// A non-blank line is not a well-formed JSON object
    InvalidRecord,
    /// A single line exceeds the maximum line size
    LineTooLong,

    // Configuration
    /// A classification table document is malformed
    InvalidConfig,

    // Output
    /// Writing the report to its sink failed
    Io,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::StreamUnreadable => "ERR_STREAM_UNREADABLE",
            ExErrorKind::InvalidRecord => "ERR_INVALID_RECORD",
            ExErrorKind::LineTooLong => "ERR_LINE_TOO_LONG",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }

    /// True for failures caused by stream content rather than transport
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, ExErrorKind::InvalidRecord | ExErrorKind::LineTooLong)
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and the file
/// identity / line number needed to point a reader at the offending input.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    line: Option<usize>,
    run_id: Option<RunId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            line: None,
            run_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the identity of the input the error refers to
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add the 1-based physical line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Add run correlation context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(line) = self.line {
            write!(f, " (line: {})", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for osaudit operations
///
/// Only stream reads, configuration loading and report output can fail.
/// Missing or malformed record fields are never errors; they coerce to
/// conservative defaults instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OsAuditError {
    // ===== Stream transport =====
    /// The stream source could not be opened
    #[error("open {path}: {message}")]
    StreamOpen { path: String, message: String },

    /// The stream source failed mid-read
    #[error("read {path}: {message}")]
    StreamRead { path: String, message: String },

    // ===== Stream content =====
    /// A non-blank line is not valid JSON
    #[error("{path}: invalid JSON at line {line}: {message}")]
    InvalidJson {
        path: String,
        line: usize,
        message: String,
    },

    /// A non-blank line is valid JSON but not an object
    #[error("{path}: NDJSON row {line} is not a JSON object")]
    NotAnObject { path: String, line: usize },

    /// A non-blank line is not valid UTF-8
    #[error("{path}: line {line} is not valid UTF-8")]
    InvalidUtf8 { path: String, line: usize },

    /// A line exceeds the maximum single-line size
    #[error("{path}: line {line} exceeds the maximum line size of {limit} bytes")]
    LineTooLong {
        path: String,
        line: usize,
        limit: usize,
    },

    // ===== Configuration =====
    /// Classification tables could not be loaded
    #[error("invalid classification tables ({source_name}): {message}")]
    InvalidConfig {
        source_name: String,
        message: String,
    },

    // ===== Output =====
    /// Writing the rendered report failed
    #[error("write failed: {message}")]
    Output { message: String },

    /// Serialization error (JSON/YAML encoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl OsAuditError {
    /// 1-based line number for content failures
    pub fn line(&self) -> Option<usize> {
        match self {
            OsAuditError::InvalidJson { line, .. }
            | OsAuditError::NotAnObject { line, .. }
            | OsAuditError::InvalidUtf8 { line, .. }
            | OsAuditError::LineTooLong { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Conversion from OsAuditError to the canonical ExError
impl From<OsAuditError> for ExError {
    fn from(err: OsAuditError) -> Self {
        let message = err.to_string();
        match err {
            OsAuditError::StreamOpen { path, .. } | OsAuditError::StreamRead { path, .. } => {
                ExError::new(ExErrorKind::StreamUnreadable)
                    .with_op("read_stream")
                    .with_path(path)
                    .with_message(message)
            }

            OsAuditError::InvalidJson { path, line, .. }
            | OsAuditError::NotAnObject { path, line }
            | OsAuditError::InvalidUtf8 { path, line } => ExError::new(ExErrorKind::InvalidRecord)
                .with_op("read_stream")
                .with_path(path)
                .with_line(line)
                .with_message(message),

            OsAuditError::LineTooLong { path, line, .. } => {
                ExError::new(ExErrorKind::LineTooLong)
                    .with_op("read_stream")
                    .with_path(path)
                    .with_line(line)
                    .with_message(message)
            }

            OsAuditError::InvalidConfig { source_name, .. } => {
                ExError::new(ExErrorKind::InvalidConfig)
                    .with_op("load_classification_tables")
                    .with_path(source_name)
                    .with_message(message)
            }

            OsAuditError::Output { .. } => ExError::new(ExErrorKind::Io)
                .with_op("render_report")
                .with_message(message),

            OsAuditError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from std::io::Error raised while writing output
impl From<std::io::Error> for OsAuditError {
    fn from(err: std::io::Error) -> Self {
        OsAuditError::Output {
            message: err.to_string(),
        }
    }
}
