mod parser;
mod properties;

pub use parser::*;
pub use properties::*;

/// Error types for the PLY module.
#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    /// Failed to read PLY file
    #[error("Failed to read PLY file")]
    Io(#[from] std::io::Error),

    /// Failed to deserialize PLY file
    #[error("Failed to deserialize PLY file")]
    Deserialize(#[from] bincode::error::DecodeError),

    /// Unsupported PLY property
    #[error("Unsupported PLY property: {0}")]
    UnsupportedProperty(String),

    /// Only binary little endian files are supported
    #[error("Unsupported PLY format: {0}")]
    UnsupportedFormat(String),

    /// The header is missing mandatory entries
    #[error("Malformed PLY header: {0}")]
    MalformedHeader(&'static str),
}
