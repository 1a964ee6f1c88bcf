//! Marker-file grammar: pure decoding of the filename-as-metadata
//! convention.
//!
//! Nothing in this module touches the filesystem; canonicalization renames
//! live in [`crate::canonical`]. That split keeps the grammar testable
//! against plain strings.

use std::path::Path;

use weave_model::{LinkError, PriorityTier, Result};

/// Marker file extensions, one per marker kind.
pub const PRIORITY_EXT: &str = "priority";
pub const CONDITION_EXT: &str = "cond";
pub const ENABLE_EXT: &str = "enable";
pub const DISABLE_EXT: &str = "disable";
pub const REFERENCE_EXT: &str = "ref";
pub const IDENTITY_EXT: &str = "myuid";

/// A marker file name, classified but not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMarker {
    Priority { name: String },
    Condition { name: String },
    Feature { name: String, enabled: bool },
    Reference { target: String },
    /// `token` is `None` for the `_` / `_.myuid` placeholder forms.
    Identity { token: Option<String> },
}

/// Classify a file name as a marker, or `None` for ordinary files.
pub fn classify_marker(file_name: &str) -> Option<RawMarker> {
    if file_name == "_" {
        return Some(RawMarker::Identity { token: None });
    }
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() && ext != IDENTITY_EXT {
        return None;
    }
    match ext {
        PRIORITY_EXT => Some(RawMarker::Priority {
            name: stem.to_string(),
        }),
        CONDITION_EXT => Some(RawMarker::Condition {
            name: stem.to_string(),
        }),
        ENABLE_EXT => Some(RawMarker::Feature {
            name: stem.to_string(),
            enabled: true,
        }),
        DISABLE_EXT => Some(RawMarker::Feature {
            name: stem.to_string(),
            enabled: false,
        }),
        REFERENCE_EXT => Some(RawMarker::Reference {
            target: stem.to_string(),
        }),
        IDENTITY_EXT => Some(RawMarker::Identity {
            token: if stem == "_" || stem.is_empty() {
                None
            } else {
                Some(stem.to_string())
            },
        }),
        _ => None,
    }
}

/// Normalize a marker name: lowercase, separators folded to `-`, runs
/// collapsed, ends trimmed.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_dash = true;
    for ch in raw.chars() {
        let mapped = match ch {
            '_' | ' ' | '-' => '-',
            other => other.to_ascii_lowercase(),
        };
        if mapped == '-' {
            if !last_dash {
                out.push('-');
                last_dash = true;
            }
        } else {
            out.push(mapped);
            last_dash = false;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Decode a priority marker name into a tier.
pub fn decode_tier(name: &str, at: &Path) -> Result<PriorityTier> {
    PriorityTier::from_marker_name(name).ok_or_else(|| LinkError::UnknownTier {
        name: name.to_string(),
        path: at.to_path_buf(),
    })
}

/// Decode a condition marker name into an `(access verb, role)` pair.
///
/// The verb must be one of the category's allowed access verbs; the role is
/// whatever follows it. `ViewAdmin`, `view_admin`, and `view-admin` all
/// decode to `("view", "admin")`.
pub fn decode_condition<'v>(
    name: &str,
    verbs: &[&'v str],
    at: &Path,
) -> Result<(&'v str, String)> {
    let normalized = normalize_name(name);
    for &verb in verbs {
        if let Some(rest) = normalized.strip_prefix(verb) {
            let role = rest.trim_start_matches('-');
            if !role.is_empty() && role.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-') {
                return Ok((verb, role.to_string()));
            }
        }
    }
    Err(LinkError::UnknownCondition {
        name: name.to_string(),
        path: at.to_path_buf(),
    })
}

/// Canonical file name for a condition marker.
pub fn condition_file_name(verb: &str, role: &str) -> String {
    format!("{verb}-{role}.{CONDITION_EXT}")
}

/// Canonical file name for a priority marker.
pub fn priority_file_name(tier: PriorityTier) -> String {
    format!("{}.{PRIORITY_EXT}", tier.canonical_name())
}

/// Canonical file name for a feature marker.
pub fn feature_file_name(name: &str, enabled: bool) -> String {
    let ext = if enabled { ENABLE_EXT } else { DISABLE_EXT };
    format!("{name}.{ext}")
}

/// Canonical file name for an identity marker.
pub fn identity_file_name(token: &str) -> String {
    format!("{token}.{IDENTITY_EXT}")
}
