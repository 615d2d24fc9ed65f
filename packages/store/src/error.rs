use std::io;
use std::path::PathBuf;

use objmem_binary::CodecError;
use objmem_model::ModelError;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Binary codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Could not access '{}': {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    /// The file suffix names no known memory or block format.
    #[error("Unsupported file format: '{}'", path.display())]
    UnsupportedFormat { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, StoreError>;
