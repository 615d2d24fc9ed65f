//! Error types for the model layer.

/// Errors raised when a block or one of its values would break an invariant.
///
/// These are always reported before any mutation takes place.
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("block must have a namespace or a format")]
    MissingNamespaceAndFormat,

    #[error("invalid {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("subject tag '{value}' cannot be nested inside itself")]
    SubjectCycle { value: String },

    #[error("subject chain of {depth} levels is too deep")]
    SubjectTooDeep { depth: usize },

    #[error("payload codec error ({codec}): {message}")]
    Payload { codec: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
