use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("URL cannot carry path segments: {url}")]
    InvalidUrl { url: String },

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Operation not supported on a remote block: {operation}")]
    Unsupported { operation: &'static str },

    #[error("Operation not available in single access mode: {operation}")]
    NotAvailableInSingleAccess { operation: &'static str },

    #[error("Remote {what} is unavailable")]
    Unavailable { what: &'static str },

    #[error("Model error: {0}")]
    Model(#[from] objmem_model::ModelError),

    #[error("Codec error: {0}")]
    Codec(#[from] objmem_binary::CodecError),

    #[error("Store error: {0}")]
    Store(#[from] objmem_store::StoreError),
}

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_operation() {
        let err = Error::NotAvailableInSingleAccess {
            operation: "export_memory",
        };
        assert!(err.to_string().contains("export_memory"));

        let err = Error::Status {
            status: 500,
            url: "http://x/storage/header".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected status 500 from http://x/storage/header"
        );
    }
}
