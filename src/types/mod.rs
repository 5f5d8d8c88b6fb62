//! Shared types used throughout the library.

mod face;

pub use face::Face;

use crate::error::Result;
use crate::pack::texture::TextureData;
use std::path::{Path, PathBuf};

/// Outcome of resolving a block identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolutionResult {
    /// A pack supplied the texture.
    Resolved {
        /// Name of the pack that supplied it.
        pack: String,
        /// Path of the texture file.
        path: PathBuf,
        /// Texture size in pixels declared for the pack.
        size: u32,
    },
    /// No pack supplied the texture; the configured default applies.
    Fallback {
        /// Path of the default texture.
        path: PathBuf,
    },
    /// No pack supplied the texture and no default is configured.
    NotFound,
}

impl ResolutionResult {
    /// Name of the pack that supplied the texture, if any.
    pub fn pack(&self) -> Option<&str> {
        match self {
            ResolutionResult::Resolved { pack, .. } => Some(pack),
            _ => None,
        }
    }

    /// Path of the image to draw, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ResolutionResult::Resolved { path, .. } | ResolutionResult::Fallback { path } => {
                Some(path)
            }
            ResolutionResult::NotFound => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionResult::Resolved { .. })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ResolutionResult::Fallback { .. })
    }

    /// Decode the image this result points at.
    ///
    /// `NotFound` yields a gray placeholder of `placeholder_size` pixels so
    /// rendering can always continue.
    pub fn load_texture_sized(&self, placeholder_size: u32) -> Result<TextureData> {
        match self.path() {
            Some(path) => TextureData::load_from_path(path),
            None => Ok(TextureData::placeholder(placeholder_size)),
        }
    }
}

impl std::fmt::Display for ResolutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionResult::Resolved { pack, path, size } => {
                write!(f, "{} ({}px) {}", pack, size, path.display())
            }
            ResolutionResult::Fallback { path } => write!(f, "fallback {}", path.display()),
            ResolutionResult::NotFound => f.write_str("not found"),
        }
    }
}
