//! Priority tiers for conflict resolution between declarations.

use serde::{Deserialize, Serialize};

/// One of five ordered priority levels.
///
/// Ordering follows declaration strength: `VeryHigh` beats `High` beats
/// `Default` and so on. When two declarations share a composite key, the one
/// with the greater tier wins.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityTier {
    VeryLow,
    Low,
    #[default]
    Default,
    High,
    VeryHigh,
}

impl PriorityTier {
    /// All tiers from strongest to weakest.
    pub const DESCENDING: [PriorityTier; 5] = [
        PriorityTier::VeryHigh,
        PriorityTier::High,
        PriorityTier::Default,
        PriorityTier::Low,
        PriorityTier::VeryLow,
    ];

    /// Parse a marker-file tier name.
    ///
    /// Matching is case- and separator-insensitive: `very-high`, `very_high`,
    /// `VeryHigh`, and `VERYHIGH` all decode to [`PriorityTier::VeryHigh`].
    pub fn from_marker_name(name: &str) -> Option<Self> {
        let squashed: String = name
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        match squashed.as_str() {
            "verylow" => Some(PriorityTier::VeryLow),
            "low" => Some(PriorityTier::Low),
            "default" => Some(PriorityTier::Default),
            "high" => Some(PriorityTier::High),
            "veryhigh" => Some(PriorityTier::VeryHigh),
            _ => None,
        }
    }

    /// Canonical spelling used when rewriting marker files.
    pub fn canonical_name(self) -> &'static str {
        match self {
            PriorityTier::VeryLow => "very-low",
            PriorityTier::Low => "low",
            PriorityTier::Default => "default",
            PriorityTier::High => "high",
            PriorityTier::VeryHigh => "very-high",
        }
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_name())
    }
}
