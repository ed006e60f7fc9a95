use miette::Diagnostic;
use thiserror::Error;

/// Main error type for qrsmith operations.
///
/// The variants map onto the pipeline stages: input validation, base symbol
/// encoding, styling, and export. Styling errors are recoverable (the export
/// orchestrator falls back to the unstyled artifact); the rest surface to the
/// caller.
#[derive(Error, Diagnostic, Debug)]
pub enum QrsmithError {
    #[error("IO error: {0}")]
    #[diagnostic(code(qrsmith::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(qrsmith::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Invalid input: {message}")]
    #[diagnostic(code(qrsmith::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("QR encoding error: {message}")]
    #[diagnostic(code(qrsmith::encode))]
    Encoding { message: String },

    #[error("Styling error: {message}")]
    #[diagnostic(code(qrsmith::style))]
    Styling { message: String },

    #[error("Export error: {message}")]
    #[diagnostic(code(qrsmith::export))]
    Export {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(qrsmith::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl QrsmithError {
    /// Shorthand for an input error without help text.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    /// Shorthand for a styling error.
    pub fn styling(message: impl Into<String>) -> Self {
        Self::Styling {
            message: message.into(),
        }
    }

    /// Shorthand for an export error without help text.
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
            help: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, QrsmithError>;
