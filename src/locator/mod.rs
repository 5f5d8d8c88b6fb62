//! Candidate path construction and lookup classification.
//!
//! The locator turns a block identifier into an explicit, ordered list of
//! candidate files (one per pack in the search order) and then classifies the
//! first one that exists. Identifiers are sanitized before any path is built so
//! a lookup can never leave the textures root.

pub mod probe;

pub use probe::{FsProbe, Probe, ProbeReport};

use crate::error::{ResolverError, Result};
use crate::pack::{PackConfig, SearchOrder};
use crate::types::{Face, ResolutionResult};
use std::path::PathBuf;
use std::sync::Arc;

/// A file that may hold the texture for a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Pack the file belongs to.
    pub pack: String,
    /// Full path under the textures root.
    pub path: PathBuf,
}

/// Builds and probes candidate texture paths.
#[derive(Clone)]
pub struct TextureLocator {
    textures_root: PathBuf,
    extension: String,
    default_texture: Option<PathBuf>,
    probe: Arc<dyn Probe>,
}

impl std::fmt::Debug for TextureLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureLocator")
            .field("textures_root", &self.textures_root)
            .field("extension", &self.extension)
            .field("default_texture", &self.default_texture)
            .finish()
    }
}

impl TextureLocator {
    pub fn new(
        textures_root: impl Into<PathBuf>,
        extension: impl Into<String>,
        default_texture: Option<PathBuf>,
        probe: Arc<dyn Probe>,
    ) -> Self {
        Self {
            textures_root: textures_root.into(),
            extension: extension.into(),
            default_texture,
            probe,
        }
    }

    pub fn textures_root(&self) -> &std::path::Path {
        &self.textures_root
    }

    pub fn default_texture(&self) -> Option<&std::path::Path> {
        self.default_texture.as_deref()
    }

    /// Candidate paths for `block_id`, one per pack in `order`.
    pub fn probe_paths(&self, block_id: &str, order: &SearchOrder) -> Result<Vec<Candidate>> {
        let name = sanitize_identifier(block_id)?;
        Ok(self.candidates(name, order))
    }

    /// Candidate paths for an already sanitized file stem.
    pub(crate) fn candidates(&self, name: &str, order: &SearchOrder) -> Vec<Candidate> {
        order.iter().map(|pack| self.candidate(pack, name)).collect()
    }

    /// Candidate paths for one face of `block_id`.
    ///
    /// File names are the outer loop so a face-specific texture in any pack
    /// beats a generic one in a higher priority pack.
    pub fn face_probe_paths(
        &self,
        block_id: &str,
        face: Face,
        order: &SearchOrder,
    ) -> Result<Vec<Candidate>> {
        let name = sanitize_identifier(block_id)?;
        Ok(self.face_candidates(name, face, order))
    }

    pub(crate) fn face_candidates(&self, name: &str, face: Face, order: &SearchOrder) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for file_stem in face.candidate_names(name) {
            for pack in order.iter() {
                candidates.push(self.candidate(pack, &file_stem));
            }
        }
        candidates
    }

    fn candidate(&self, pack: &str, file_stem: &str) -> Candidate {
        let file_name = format!("{}.{}", file_stem, self.extension);
        Candidate {
            pack: pack.to_string(),
            path: self.textures_root.join(pack).join(file_name),
        }
    }

    /// Probe candidates in order; the first existing file wins.
    pub fn classify(
        &self,
        candidates: &[Candidate],
        config: &PackConfig,
        report: &mut ProbeReport,
    ) -> ResolutionResult {
        for candidate in candidates {
            report.probes += 1;
            match self.probe.exists(&candidate.path) {
                Ok(true) => {
                    log::debug!("Found {} in pack {}", candidate.path.display(), candidate.pack);
                    return ResolutionResult::Resolved {
                        pack: candidate.pack.clone(),
                        path: candidate.path.clone(),
                        size: config.texture_size_for(&candidate.pack),
                    };
                }
                Ok(false) => {}
                Err(e) => {
                    report.failures += 1;
                    log::warn!(
                        "Probe failed for {} (treating as absent): {}",
                        candidate.path.display(),
                        e
                    );
                }
            }
        }

        match &self.default_texture {
            Some(path) => ResolutionResult::Fallback { path: path.clone() },
            None => ResolutionResult::NotFound,
        }
    }
}

/// Validate a block identifier and return the bare file stem.
///
/// A namespace prefix is stripped ("minecraft:stone" -> "stone"). The remainder
/// must be a single file name made of ASCII alphanumerics, '_', '-' and '.',
/// and may not start with '.'.
pub fn sanitize_identifier(block_id: &str) -> Result<&str> {
    let invalid = || ResolverError::InvalidIdentifier(block_id.to_string());

    let name = match block_id.split_once(':') {
        Some((namespace, name)) => {
            if !is_plain_name(namespace) {
                return Err(invalid());
            }
            name
        }
        None => block_id,
    };

    if is_plain_name(name) {
        Ok(name)
    } else {
        Err(invalid())
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
