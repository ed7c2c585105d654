//! Error types for tumorscope operations.
//!
//! Every failure in the pipeline is fatal: errors carry enough context
//! (file path, stage, parameter) to identify what aborted the run.

use std::fmt;
use std::path::PathBuf;

/// Main error type for tumorscope operations.
///
/// # Examples
///
/// ```
/// use tumorscope::error::TumorscopeError;
///
/// let err = TumorscopeError::DimensionMismatch {
///     expected: "100x12".to_string(),
///     actual: "100x9".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum TumorscopeError {
    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Filesystem failure tied to a specific path.
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Image could not be decoded or encoded.
    Image {
        /// Offending path
        path: PathBuf,
        /// Decoder/encoder message
        message: String,
    },

    /// A class directory or split ended up with no samples.
    EmptyDataset {
        /// Which dataset or split was empty
        context: String,
    },

    /// K-means could not form the requested number of clusters.
    DegenerateClustering {
        /// Requested cluster count
        k: usize,
        /// Description of the failure
        reason: String,
    },

    /// Model used before `fit`.
    NotFitted {
        /// Model name
        model: &'static str,
    },

    /// Configuration file could not be read or parsed.
    Config(String),

    /// A pipeline stage failed.
    Stage {
        /// Stage name, e.g. `augment`
        stage: &'static str,
        /// What went wrong inside the stage
        source: Box<TumorscopeError>,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for TumorscopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TumorscopeError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Matrix dimension mismatch: expected {expected}, got {actual}"
                )
            }
            TumorscopeError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            TumorscopeError::Io { path, source } => {
                write!(f, "I/O error at {}: {source}", path.display())
            }
            TumorscopeError::Image { path, message } => {
                write!(f, "Image error at {}: {message}", path.display())
            }
            TumorscopeError::EmptyDataset { context } => {
                write!(f, "Empty dataset: {context}")
            }
            TumorscopeError::DegenerateClustering { k, reason } => {
                write!(f, "Cannot form {k} clusters: {reason}")
            }
            TumorscopeError::NotFitted { model } => {
                write!(f, "{model} not fitted. Call fit() first.")
            }
            TumorscopeError::Config(msg) => write!(f, "Configuration error: {msg}"),
            TumorscopeError::Stage { stage, source } => {
                write!(f, "Stage '{stage}' failed: {source}")
            }
            TumorscopeError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TumorscopeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TumorscopeError::Io { source, .. } => Some(source),
            TumorscopeError::Stage { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<&str> for TumorscopeError {
    fn from(msg: &str) -> Self {
        TumorscopeError::Other(msg.to_string())
    }
}

impl From<String> for TumorscopeError {
    fn from(msg: String) -> Self {
        TumorscopeError::Other(msg)
    }
}

impl TumorscopeError {
    /// Create an I/O error bound to a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an invalid hyperparameter error.
    #[must_use]
    pub fn invalid_hyperparameter(
        param: &str,
        value: impl fmt::Display,
        constraint: &str,
    ) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Attribute this error to a pipeline stage.
    #[must_use]
    pub fn in_stage(self, stage: &'static str) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Create an empty dataset error
    #[must_use]
    pub fn empty(context: impl Into<String>) -> Self {
        Self::EmptyDataset {
            context: context.into(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, TumorscopeError>;
