//! Block face selection for face-aware lookups.

use serde::{Deserialize, Serialize};

/// The faces a texture can be requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Top,
    Bottom,
    Side,
    Front,
}

impl Face {
    /// Lowercase name used as a texture file suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Face::Top => "top",
            Face::Bottom => "bottom",
            Face::Side => "side",
            Face::Front => "front",
        }
    }

    /// Alternative suffixes a pack may use for this face, tried after the primary one.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Face::Top => &["up"],
            Face::Bottom => &["down"],
            Face::Side => &["all"],
            Face::Front => &["side"],
        }
    }

    /// Texture file stems to try for `block_name`, most specific first.
    ///
    /// "oak_log" + Top -> ["oak_log_top", "oak_log_up", "oak_log"]
    pub fn candidate_names(&self, block_name: &str) -> Vec<String> {
        let mut names = vec![format!("{}_{}", block_name, self.as_str())];
        for alias in self.aliases() {
            let name = format!("{}_{}", block_name, alias);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names.push(block_name.to_string());
        names
    }

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "top" | "up" => Some(Face::Top),
            "bottom" | "down" => Some(Face::Bottom),
            "side" => Some(Face::Side),
            "front" => Some(Face::Front),
            _ => None,
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
