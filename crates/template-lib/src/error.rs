//! Error types for the template engine

use thiserror::Error;

/// Errors produced by form editing, import, and submission
///
/// Field validation never produces an error: out-of-range values are
/// reported through [`crate::validation::Validity`] instead.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to parse JSON document: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid template document: {0}")]
    InvalidDocument(String),

    #[error("invalid field path \"{0}\"")]
    InvalidPath(String),

    #[error("{what} index {index} out of range (length {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("field \"{path}\" expects {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
    },

    #[error("{what} count {requested} exceeds the maximum of {max}")]
    CountOutOfRange {
        what: &'static str,
        requested: usize,
        max: usize,
    },

    #[error("cannot remove the only remaining session")]
    LastSession,

    #[error("template has {errors} invalid field(s)")]
    ValidationFailed { errors: usize },

    #[error("unknown workload template \"{0}\"")]
    UnknownTemplate(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse template catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("transport failed: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
