//! Pack configuration and search order.
//!
//! A [`PackConfig`] is an immutable snapshot of which packs are available, which
//! one the user selected, and per-pack metadata. It is built by the
//! [`loader`] and replaced wholesale on reload, never edited in place.

pub mod loader;
pub mod texture;

pub use loader::{ConfigWarning, PackConfigLoader};
pub use texture::TextureData;

use std::collections::HashMap;

/// Texture size assumed for packs that do not declare one.
pub const DEFAULT_TEXTURE_SIZE: u32 = 16;

/// How the selected pack is ranked relative to `available_packs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectedPackPolicy {
    /// The selected pack is searched first regardless of its list position.
    #[default]
    Promote,
    /// List order wins; the selected pack is only metadata.
    ListOrder,
}

/// An immutable snapshot of the pack configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackConfig {
    selected_pack: Option<String>,
    available_packs: Vec<String>,
    texture_size: HashMap<String, u32>,
    description: HashMap<String, String>,
}

impl PackConfig {
    /// Assemble a configuration from already validated parts.
    ///
    /// Zero sizes are dropped so lookups fall back to [`DEFAULT_TEXTURE_SIZE`].
    pub fn new(
        selected_pack: Option<String>,
        available_packs: Vec<String>,
        mut texture_size: HashMap<String, u32>,
        description: HashMap<String, String>,
    ) -> Self {
        texture_size.retain(|_, size| *size > 0);
        Self {
            selected_pack: selected_pack.filter(|name| !name.is_empty()),
            available_packs,
            texture_size,
            description,
        }
    }

    pub fn selected_pack(&self) -> Option<&str> {
        self.selected_pack.as_deref()
    }

    /// Packs in listed priority order, highest first.
    pub fn available_packs(&self) -> &[String] {
        &self.available_packs
    }

    /// Texture size declared for `pack`, or [`DEFAULT_TEXTURE_SIZE`].
    pub fn texture_size_for(&self, pack: &str) -> u32 {
        self.texture_size
            .get(pack)
            .copied()
            .unwrap_or(DEFAULT_TEXTURE_SIZE)
    }

    pub fn description_for(&self, pack: &str) -> Option<&str> {
        self.description.get(pack).map(|s| s.as_str())
    }

    /// Derive the order in which packs are probed.
    pub fn search_order(&self, policy: SelectedPackPolicy) -> SearchOrder {
        let promoted = match policy {
            SelectedPackPolicy::Promote => self.selected_pack.as_ref(),
            SelectedPackPolicy::ListOrder => None,
        };

        let mut packs: Vec<String> = Vec::with_capacity(self.available_packs.len() + 1);
        for name in promoted.into_iter().chain(&self.available_packs) {
            if !packs.contains(name) {
                packs.push(name.clone());
            }
        }

        SearchOrder { packs }
    }
}

/// Deduplicated, priority-ordered pack names probed per lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOrder {
    packs: Vec<String>,
}

impl SearchOrder {
    pub fn packs(&self) -> &[String] {
        &self.packs
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.packs.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

/// Check that a pack name is a single plain path component.
pub(crate) fn is_valid_pack_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && !name.contains(':')
}
