//! Error types for pack resolution.

use thiserror::Error;

/// Result type alias using ResolverError.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Failure to load or validate a pack configuration.
///
/// A reload that fails with one of these leaves the previous configuration active.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration source could not be read.
    #[error("Unreadable configuration: {0}")]
    Unreadable(#[from] std::io::Error),

    /// The configuration source is not well-formed JSON of the expected shape.
    #[error("Malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A pack name would escape the textures root.
    #[error("Invalid pack name: {0:?}")]
    InvalidPackName(String),
}

/// Main error type for texture resolution.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Block identifier contains characters that are not allowed in a file name.
    #[error("Invalid block identifier: {0:?}")]
    InvalidIdentifier(String),

    /// I/O error while reading a resolved texture.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode a texture image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl ResolverError {
    /// Whether the lookup was rejected before touching the filesystem.
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, ResolverError::InvalidIdentifier(_))
    }
}
