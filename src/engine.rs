//! The resolution engine.
//!
//! Ties the pack configuration, the locator and the cache together behind
//! `resolve`. The active configuration is an immutable [`ConfigSnapshot`]
//! swapped in one step on reload; every snapshot carries a generation number
//! that the cache uses to invalidate lazily.

use crate::cache::TextureCache;
use crate::error::{ConfigError, Result};
use crate::locator::{sanitize_identifier, Candidate, FsProbe, Probe, ProbeReport, TextureLocator};
use crate::pack::{
    PackConfig, PackConfigLoader, SearchOrder, SelectedPackPolicy, TextureData,
    DEFAULT_TEXTURE_SIZE,
};
use crate::types::{Face, ResolutionResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Engine construction settings supplied by the embedding application.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Directory holding one subdirectory per pack.
    pub textures_root: PathBuf,
    /// Image substituted when no pack supplies a texture.
    pub default_texture: Option<PathBuf>,
    /// Texture file extension, without the dot.
    pub extension: String,
    /// How the selected pack is ranked.
    pub policy: SelectedPackPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            textures_root: PathBuf::from("resource/textures/block"),
            default_texture: None,
            extension: "png".to_string(),
            policy: SelectedPackPolicy::default(),
        }
    }
}

impl EngineSettings {
    pub fn new(textures_root: impl Into<PathBuf>) -> Self {
        Self {
            textures_root: textures_root.into(),
            ..Self::default()
        }
    }

    pub fn with_default_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_texture = Some(path.into());
        self
    }

    pub fn with_policy(mut self, policy: SelectedPackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// The configuration in effect for one generation.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    pub config: PackConfig,
    pub search_order: SearchOrder,
    /// 0 while unloaded, incremented by every successful load.
    pub generation: u64,
}

impl ConfigSnapshot {
    pub fn is_loaded(&self) -> bool {
        self.generation > 0
    }
}

/// Resolution counters accumulated since the last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Resolutions satisfied by each pack.
    pub per_pack: BTreeMap<String, u64>,
    /// Resolutions that fell back to the default texture.
    pub fallback: u64,
    /// Resolutions with no pack and no default.
    pub not_found: u64,
    /// Lookups rejected for an invalid identifier.
    pub invalid: u64,
    /// Candidate paths probed on cache misses.
    pub probes: u64,
    /// Probes that failed with an I/O error and were treated as absent.
    pub probe_errors: u64,
}

impl ResolutionStats {
    /// Total successful resolutions of any kind.
    pub fn total(&self) -> u64 {
        self.per_pack.values().sum::<u64>() + self.fallback + self.not_found
    }
}

/// Lock-light counters behind [`ResolutionStats`].
#[derive(Default)]
struct StatsRecorder {
    per_pack: RwLock<HashMap<String, AtomicU64>>,
    fallback: AtomicU64,
    not_found: AtomicU64,
    invalid: AtomicU64,
    probes: AtomicU64,
    probe_errors: AtomicU64,
}

impl StatsRecorder {
    fn record(&self, result: &ResolutionResult) {
        match result {
            ResolutionResult::Resolved { pack, .. } => {
                if let Some(counter) = self.per_pack.read().get(pack) {
                    counter.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                self.per_pack
                    .write()
                    .entry(pack.clone())
                    .or_default()
                    .fetch_add(1, Ordering::Relaxed);
            }
            ResolutionResult::Fallback { .. } => {
                self.fallback.fetch_add(1, Ordering::Relaxed);
            }
            ResolutionResult::NotFound => {
                self.not_found.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn record_probes(&self, report: ProbeReport) {
        self.probes.fetch_add(report.probes, Ordering::Relaxed);
        self.probe_errors.fetch_add(report.failures, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ResolutionStats {
        ResolutionStats {
            per_pack: self
                .per_pack
                .read()
                .iter()
                .map(|(pack, count)| (pack.clone(), count.load(Ordering::Relaxed)))
                .collect(),
            fallback: self.fallback.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
            probe_errors: self.probe_errors.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.per_pack.write().clear();
        for counter in [
            &self.fallback,
            &self.not_found,
            &self.invalid,
            &self.probes,
            &self.probe_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Resolves block identifiers to textures across prioritized packs.
///
/// Shareable across threads; wrap in an `Arc` and call `resolve` from any
/// number of render workers while another thread calls `reload`.
pub struct ResolutionEngine {
    settings: EngineSettings,
    locator: TextureLocator,
    active: RwLock<Arc<ConfigSnapshot>>,
    cache: TextureCache,
    stats: StatsRecorder,
}

impl ResolutionEngine {
    /// Create an unloaded engine that probes the local filesystem.
    ///
    /// Until a configuration is loaded every lookup falls back.
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_probe(settings, Arc::new(FsProbe))
    }

    /// Create an unloaded engine with a custom existence probe.
    pub fn with_probe(settings: EngineSettings, probe: Arc<dyn Probe>) -> Self {
        let locator = TextureLocator::new(
            settings.textures_root.clone(),
            settings.extension.clone(),
            settings.default_texture.clone(),
            probe,
        );
        Self {
            settings,
            locator,
            active: RwLock::new(Arc::new(ConfigSnapshot::default())),
            cache: TextureCache::new(),
            stats: StatsRecorder::default(),
        }
    }

    /// Create an engine and load configuration bytes.
    pub fn load(settings: EngineSettings, data: &[u8]) -> std::result::Result<Self, ConfigError> {
        let engine = Self::new(settings);
        engine.reload(data)?;
        Ok(engine)
    }

    /// Create an engine and load a configuration file.
    pub fn load_from_path<P: AsRef<Path>>(
        settings: EngineSettings,
        path: P,
    ) -> std::result::Result<Self, ConfigError> {
        let engine = Self::new(settings);
        engine.reload_from_path(path)?;
        Ok(engine)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The configuration currently in effect.
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.active.read().clone()
    }

    pub fn generation(&self) -> u64 {
        self.active.read().generation
    }

    pub fn is_loaded(&self) -> bool {
        self.active.read().is_loaded()
    }

    /// Resolve the texture for `block_id`.
    ///
    /// Fails only for identifiers that are not plain file names; a missing
    /// texture degrades to `Fallback` (or `NotFound` without a default).
    pub fn resolve(&self, block_id: &str) -> Result<ResolutionResult> {
        let name = self.sanitize(block_id)?;
        let snapshot = self.snapshot();

        let result = self.cache.get_or_compute(name, snapshot.generation, || {
            let candidates = self.locator.candidates(name, &snapshot.search_order);
            self.classify(&candidates, &snapshot)
        });

        self.stats.record(&result);
        Ok(result)
    }

    /// Resolve the texture for one face of `block_id`.
    pub fn resolve_face(&self, block_id: &str, face: Face) -> Result<ResolutionResult> {
        let name = self.sanitize(block_id)?;
        let snapshot = self.snapshot();
        let key = format!("{}#{}", name, face);

        let result = self.cache.get_or_compute(&key, snapshot.generation, || {
            let candidates = self
                .locator
                .face_candidates(name, face, &snapshot.search_order);
            self.classify(&candidates, &snapshot)
        });

        self.stats.record(&result);
        Ok(result)
    }

    fn sanitize<'a>(&self, block_id: &'a str) -> Result<&'a str> {
        sanitize_identifier(block_id).map_err(|e| {
            self.stats.invalid.fetch_add(1, Ordering::Relaxed);
            log::debug!("Rejected block identifier {:?}", block_id);
            e
        })
    }

    fn classify(&self, candidates: &[Candidate], snapshot: &ConfigSnapshot) -> ResolutionResult {
        let mut report = ProbeReport::default();
        let result = self
            .locator
            .classify(candidates, &snapshot.config, &mut report);
        self.stats.record_probes(report);
        result
    }

    /// Size of the placeholder drawn for `NotFound`: the selected pack's
    /// texture size, or the default when nothing is selected.
    pub fn placeholder_size(&self) -> u32 {
        let snapshot = self.snapshot();
        match snapshot.config.selected_pack() {
            Some(pack) => snapshot.config.texture_size_for(pack),
            None => DEFAULT_TEXTURE_SIZE,
        }
    }

    /// Decode the image for `result`, sizing any placeholder to the active configuration.
    pub fn load_texture(&self, result: &ResolutionResult) -> Result<TextureData> {
        result.load_texture_sized(self.placeholder_size())
    }

    /// Replace the active configuration with one parsed from `data`.
    ///
    /// On error the previous configuration stays in effect.
    pub fn reload(&self, data: &[u8]) -> std::result::Result<(), ConfigError> {
        match PackConfigLoader::load(data) {
            Ok(config) => {
                self.install(config);
                Ok(())
            }
            Err(e) => {
                log::warn!("Rejected pack configuration: {}", e);
                Err(e)
            }
        }
    }

    /// Replace the active configuration with the contents of a file.
    pub fn reload_from_path<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            log::warn!("Cannot read pack configuration {}: {}", path.display(), e);
            ConfigError::from(e)
        })?;
        self.reload(&data)
    }

    fn install(&self, config: PackConfig) {
        let search_order = config.search_order(self.settings.policy);

        let mut active = self.active.write();
        let generation = active.generation + 1;
        log::info!(
            "Pack configuration generation {} active, search order: {:?}",
            generation,
            search_order.packs()
        );
        *active = Arc::new(ConfigSnapshot {
            config,
            search_order,
            generation,
        });
    }

    /// Drop every cached resolution and report packs missing on disk.
    ///
    /// Use after pack directories change without a configuration change.
    pub fn rescan(&self) -> Vec<String> {
        self.cache.clear();

        let snapshot = self.snapshot();
        let missing: Vec<String> = snapshot
            .search_order
            .iter()
            .filter(|pack| !self.settings.textures_root.join(pack).is_dir())
            .map(str::to_string)
            .collect();

        for pack in &missing {
            log::warn!(
                "Pack directory {} is missing; its textures will fall through",
                self.settings.textures_root.join(pack).display()
            );
        }
        missing
    }

    /// Discard all cached resolutions.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached keys, including stale ones.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn stats(&self) -> ResolutionStats {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

impl std::fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("settings", &self.settings)
            .field("generation", &self.generation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;
    use std::sync::Mutex;

    /// Probe backed by an editable set of relative paths.
    #[derive(Default)]
    struct MemoryProbe {
        files: Mutex<Vec<PathBuf>>,
        calls: AtomicU64,
    }

    impl MemoryProbe {
        fn with_files(files: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                files: Mutex::new(files.iter().map(|f| Path::new("/tex").join(f)).collect()),
                calls: AtomicU64::new(0),
            })
        }
    }

    impl Probe for MemoryProbe {
        fn exists(&self, path: &Path) -> io::Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.files.lock().unwrap().iter().any(|f| f == path))
        }
    }

    fn engine(probe: Arc<MemoryProbe>, config: &str) -> ResolutionEngine {
        let settings = EngineSettings::new("/tex").with_default_texture("/default.png");
        let engine = ResolutionEngine::with_probe(settings, probe);
        engine.reload(config.as_bytes()).unwrap();
        engine
    }

    #[test]
    fn test_unloaded_engine_falls_back() {
        let probe = MemoryProbe::with_files(&["A/stone.png"]);
        let engine = ResolutionEngine::with_probe(
            EngineSettings::new("/tex").with_default_texture("/default.png"),
            probe,
        );
        assert!(!engine.is_loaded());
        assert!(engine.resolve("stone").unwrap().is_fallback());
    }

    #[test]
    fn test_namespaced_and_bare_ids_share_entry() {
        let probe = MemoryProbe::with_files(&["A/stone.png"]);
        let engine = engine(Arc::clone(&probe), r#"{"available_packs": ["A"]}"#);

        let bare = engine.resolve("stone").unwrap();
        let namespaced = engine.resolve("minecraft:stone").unwrap();
        assert_eq!(bare, namespaced);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.cached_entries(), 1);
    }

    #[test]
    fn test_failed_reload_keeps_previous_config() {
        let probe = MemoryProbe::with_files(&["A/stone.png"]);
        let engine = engine(probe, r#"{"available_packs": ["A"]}"#);
        let before = engine.snapshot();

        assert!(engine.reload(b"{not json").is_err());
        assert!(engine.reload(br#"{"available_packs": ["../A"]}"#).is_err());

        let after = engine.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(engine.generation(), 1);
        assert_eq!(engine.resolve("stone").unwrap().pack(), Some("A"));
    }

    #[test]
    fn test_resolve_face() {
        let probe = MemoryProbe::with_files(&["B/oak_log_top.png", "A/oak_log.png"]);
        let engine = engine(probe, r#"{"available_packs": ["A", "B"]}"#);

        let top = engine.resolve_face("oak_log", Face::Top).unwrap();
        assert_eq!(top.path(), Some(Path::new("/tex/B/oak_log_top.png")));

        let side = engine.resolve_face("oak_log", Face::Side).unwrap();
        assert_eq!(side.path(), Some(Path::new("/tex/A/oak_log.png")));

        assert_eq!(engine.stats().per_pack.get("A"), Some(&1));
        assert_eq!(engine.stats().per_pack.get("B"), Some(&1));
    }

    #[test]
    fn test_stats_and_reset() {
        let probe = MemoryProbe::with_files(&["A/stone.png"]);
        let engine = engine(probe, r#"{"available_packs": ["A"]}"#);

        engine.resolve("stone").unwrap();
        engine.resolve("stone").unwrap();
        engine.resolve("glass").unwrap();
        assert!(engine.resolve("../../etc/passwd").is_err());

        let stats = engine.stats();
        assert_eq!(stats.per_pack.get("A"), Some(&2));
        assert_eq!(stats.fallback, 1);
        assert_eq!(stats.not_found, 0);
        assert_eq!(stats.invalid, 1);
        assert_eq!(stats.probes, 2);
        assert_eq!(stats.total(), 3);

        engine.reset_stats();
        assert_eq!(engine.stats(), ResolutionStats::default());
    }

    #[test]
    fn test_not_found_placeholder_uses_selected_pack_size() {
        let probe = MemoryProbe::with_files(&[]);
        let engine = ResolutionEngine::with_probe(EngineSettings::new("/tex"), probe);
        assert_eq!(engine.placeholder_size(), DEFAULT_TEXTURE_SIZE);

        engine
            .reload(br#"{"selected_pack": "A", "available_packs": ["A"], "texture_size": {"A": 32}}"#)
            .unwrap();
        let result = engine.resolve("stone").unwrap();
        assert_eq!(result, ResolutionResult::NotFound);

        let texture = engine.load_texture(&result).unwrap();
        assert_eq!(texture, TextureData::placeholder(32));
    }

    #[test]
    fn test_clear_cache_sees_new_files() {
        let probe = MemoryProbe::with_files(&[]);
        let engine = engine(Arc::clone(&probe), r#"{"available_packs": ["A"]}"#);

        assert!(engine.resolve("stone").unwrap().is_fallback());
        probe.files.lock().unwrap().push(PathBuf::from("/tex/A/stone.png"));
        assert!(engine.resolve("stone").unwrap().is_fallback());

        engine.clear_cache();
        assert_eq!(engine.resolve("stone").unwrap().pack(), Some("A"));
    }
}
