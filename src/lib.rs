//! # Pack Resolver
//!
//! A Rust library for resolving Minecraft block identifiers to texture files
//! across a prioritized list of resource packs.
//!
//! ## Overview
//!
//! A JSON configuration names the available packs, their priority and the
//! pack the user selected. Each lookup probes `textures/<pack>/<block>.png`
//! in priority order and falls back to a default texture when no pack has
//! the asset. Results are cached per configuration generation, so a render
//! pass that asks for the same block thousands of times touches the
//! filesystem once.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pack_resolver::{EngineSettings, ResolutionEngine, ResolutionResult};
//!
//! let settings = EngineSettings::new("resource/textures/block")
//!     .with_default_texture("resource/default.png");
//! let engine = ResolutionEngine::load_from_path(settings, "resource/resourcepack.json")?;
//!
//! match engine.resolve("minecraft:stone")? {
//!     ResolutionResult::Resolved { pack, path, size } => { /* draw from pack */ }
//!     ResolutionResult::Fallback { path } => { /* draw the default */ }
//!     ResolutionResult::NotFound => { /* no default configured */ }
//! }
//!
//! // Hot reload after the configuration file changes
//! engine.reload_from_path("resource/resourcepack.json")?;
//! ```

pub mod error;
pub mod types;
pub mod pack;
pub mod locator;
pub mod cache;
pub mod engine;

// Re-export main types for convenience
pub use error::{ConfigError, ResolverError, Result};
pub use types::{Face, ResolutionResult};
pub use pack::{
    ConfigWarning, PackConfig, PackConfigLoader, SearchOrder, SelectedPackPolicy, TextureData,
    DEFAULT_TEXTURE_SIZE,
};
pub use locator::{Candidate, FsProbe, Probe, ProbeReport, TextureLocator};
pub use cache::{CacheEntry, TextureCache};
pub use engine::{ConfigSnapshot, EngineSettings, ResolutionEngine, ResolutionStats};

/// Load a pack configuration from a JSON file.
pub fn load_pack_config<P: AsRef<std::path::Path>>(
    path: P,
) -> std::result::Result<PackConfig, ConfigError> {
    PackConfigLoader::load_from_path(path)
}

/// Load a pack configuration from JSON bytes.
pub fn load_pack_config_from_bytes(data: &[u8]) -> std::result::Result<PackConfig, ConfigError> {
    PackConfigLoader::load(data)
}
