//! Deterministic declaration-tree walk.
//!
//! `scan` visits one category folder, interprets each qualifying child as an
//! item, decodes marker metadata, validates the category's constraints, and
//! hands a normalized descriptor to the category's callback. Traversal is
//! lexicographic so output is reproducible regardless of filesystem
//! enumeration order.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use weave_model::{ConditionContext, LinkError, MarkerSet, PriorityTier, Result};

use crate::canonical;
use crate::identity;
use crate::marker::{self, RawMarker};

/// Whether item names must, may, or must not be generated identity tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameConstraint {
    MustBeToken,
    MayBeToken,
    MustNotBeToken,
}

/// Which marker kinds a category accepts on its items.
#[derive(Debug, Clone, Copy)]
pub struct MarkerPolicy {
    pub priority: bool,
    pub conditions: bool,
    pub features: bool,
    pub references: bool,
    pub identity: bool,
}

impl MarkerPolicy {
    pub const ALL: Self = Self {
        priority: true,
        conditions: true,
        features: true,
        references: true,
        identity: true,
    };

    pub const NONE: Self = Self {
        priority: false,
        conditions: false,
        features: false,
        references: false,
        identity: false,
    };
}

/// The entry-point file a category looks for inside each item folder.
#[derive(Debug, Clone, Copy)]
pub struct EntryPointRule {
    pub file_name: &'static str,
    pub required: bool,
}

/// Auxiliary data files a category collects from each item folder.
#[derive(Debug, Clone, Copy)]
pub struct DataFileRule {
    pub extension: &'static str,
}

/// Category-specific scanning rules.
#[derive(Debug, Clone)]
pub struct ScanRules {
    /// Category name, used in diagnostics and errors.
    pub category: &'static str,
    pub name_constraint: NameConstraint,
    pub allow: MarkerPolicy,
    pub entry_point: Option<EntryPointRule>,
    pub data_files: Option<DataFileRule>,
    /// Access verbs valid in condition markers for this category.
    pub access_verbs: &'static [&'static str],
    /// Declared features with their default values.
    pub feature_defaults: &'static [(&'static str, bool)],
}

/// Normalized description of one accepted item, as handed to a category.
#[derive(Debug, Clone)]
pub struct ItemDescriptor {
    /// Registry name: the identity token when one exists, else the folder
    /// name.
    pub name: String,
    /// Absolute path of the item folder.
    pub path: PathBuf,
    pub tier: PriorityTier,
    pub conditions: ConditionContext,
    /// Declared defaults overlaid with marker overrides.
    pub features: BTreeMap<String, bool>,
    /// Alias target from a `.ref` marker.
    pub reference: Option<String>,
    pub entry_point: Option<PathBuf>,
    /// Sorted data files matching the category's data-file rule.
    pub data_files: Vec<PathBuf>,
}

/// Walk `root` and invoke `sink` once per qualifying item, in lexicographic
/// order. A missing `root` is not an error: the category simply contributes
/// nothing from this module.
pub fn scan(
    root: &Path,
    rules: &ScanRules,
    sink: &mut dyn FnMut(ItemDescriptor) -> Result<()>,
) -> Result<()> {
    if !root.is_dir() {
        return Ok(());
    }
    let mut names = child_names(root)?;

    // A directory literally named `_` is an anonymous contribution: give it
    // its identity before anything else looks at it.
    if names.iter().any(|name| name == "_") && root.join("_").is_dir() {
        let token = identity::fresh_token();
        canonical::rename_placeholder_dir(root, &token)?;
        for name in &mut names {
            if name == "_" {
                *name = token.clone();
            }
        }
    }

    names.sort();
    for name in names {
        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }
        let path = root.join(&name);
        if !path.is_dir() {
            debug!(file = %path.display(), category = rules.category, "ignoring stray file");
            continue;
        }
        let descriptor = scan_item(&name, &path, rules)?;
        sink(descriptor)?;
    }
    Ok(())
}

fn child_names(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|source| LinkError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LinkError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => debug!(dir = %dir.display(), ?raw, "skipping non-UTF-8 entry"),
        }
    }
    Ok(names)
}

fn scan_item(folder_name: &str, item_dir: &Path, rules: &ScanRules) -> Result<ItemDescriptor> {
    let markers = extract_markers(item_dir, rules)?;
    let name = resolve_name(folder_name, &markers, item_dir)?;
    check_name_constraint(&name, rules, item_dir)?;
    let entry_point = resolve_entry_point(item_dir, &markers, rules)?;
    let data_files = collect_data_files(item_dir, rules)?;

    let mut features: BTreeMap<String, bool> = rules
        .feature_defaults
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect();
    features.extend(markers.features);

    Ok(ItemDescriptor {
        name,
        path: item_dir.to_path_buf(),
        tier: markers.tier.unwrap_or_default(),
        conditions: markers.conditions,
        features,
        reference: markers.reference,
        entry_point,
        data_files,
    })
}

/// Decode and canonicalize every marker file in an item folder.
fn extract_markers(item_dir: &Path, rules: &ScanRules) -> Result<MarkerSet> {
    let mut set = MarkerSet::default();
    let mut names = child_names(item_dir)?;
    names.sort();

    for file_name in names {
        // Only files carry marker metadata; child directories belong to
        // whoever scans one level deeper (list members, for instance).
        if !item_dir.join(&file_name).is_file() {
            continue;
        }
        let Some(raw) = marker::classify_marker(&file_name) else {
            continue;
        };
        let at = item_dir.join(&file_name);
        match raw {
            RawMarker::Priority { name } => {
                require_allowed(rules.allow.priority, "priority", rules, &at)?;
                if set.tier.is_some() {
                    return Err(LinkError::DuplicateMarker {
                        kind: "priority",
                        path: item_dir.to_path_buf(),
                    });
                }
                let tier = marker::decode_tier(&name, &at)?;
                canonical::rename_marker(item_dir, &file_name, &marker::priority_file_name(tier))?;
                set.tier = Some(tier);
            }
            RawMarker::Condition { name } => {
                require_allowed(rules.allow.conditions, "condition", rules, &at)?;
                let (verb, role) = marker::decode_condition(&name, rules.access_verbs, &at)?;
                canonical::rename_marker(
                    item_dir,
                    &file_name,
                    &marker::condition_file_name(verb, &role),
                )?;
                set.conditions.insert(verb, &role);
            }
            RawMarker::Feature { name, enabled } => {
                require_allowed(rules.allow.features, "feature", rules, &at)?;
                let canonical_name = marker::normalize_name(&name);
                if !rules
                    .feature_defaults
                    .iter()
                    .any(|(declared, _)| *declared == canonical_name)
                {
                    return Err(LinkError::UndeclaredFeature {
                        name: canonical_name,
                        category: rules.category.to_string(),
                        path: at,
                    });
                }
                if set.features.contains_key(&canonical_name) {
                    return Err(LinkError::DuplicateMarker {
                        kind: "feature",
                        path: item_dir.to_path_buf(),
                    });
                }
                canonical::rename_marker(
                    item_dir,
                    &file_name,
                    &marker::feature_file_name(&canonical_name, enabled),
                )?;
                set.features.insert(canonical_name, enabled);
            }
            RawMarker::Reference { target } => {
                require_allowed(rules.allow.references, "reference", rules, &at)?;
                if set.reference.is_some() {
                    return Err(LinkError::DuplicateMarker {
                        kind: "reference",
                        path: item_dir.to_path_buf(),
                    });
                }
                set.reference = Some(target);
            }
            RawMarker::Identity { token } => {
                require_allowed(rules.allow.identity, "identity", rules, &at)?;
                if set.identity.is_some() {
                    return Err(LinkError::DuplicateMarker {
                        kind: "identity",
                        path: item_dir.to_path_buf(),
                    });
                }
                let token = match token {
                    Some(token) => {
                        if !identity::is_identity_token(&token) {
                            return Err(LinkError::InvalidIdentityToken { token, path: at });
                        }
                        token
                    }
                    None => {
                        let fresh = identity::fresh_token();
                        canonical::rename_marker(
                            item_dir,
                            &file_name,
                            &marker::identity_file_name(&fresh),
                        )?;
                        fresh
                    }
                };
                set.identity = Some(token);
            }
        }
    }
    Ok(set)
}

fn require_allowed(
    allowed: bool,
    kind: &'static str,
    rules: &ScanRules,
    at: &Path,
) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(LinkError::MarkerNotAllowed {
            kind,
            category: rules.category.to_string(),
            path: at.to_path_buf(),
        })
    }
}

/// The identity token names the item when one exists; otherwise the folder
/// does. A token-shaped folder carrying a different token is a conflict.
fn resolve_name(folder_name: &str, markers: &MarkerSet, item_dir: &Path) -> Result<String> {
    match &markers.identity {
        Some(token) => {
            if identity::is_identity_token(folder_name) && folder_name != token {
                return Err(LinkError::IdentityMismatch {
                    token: token.clone(),
                    name: folder_name.to_string(),
                    path: item_dir.to_path_buf(),
                });
            }
            Ok(token.clone())
        }
        None => Ok(folder_name.to_string()),
    }
}

fn check_name_constraint(name: &str, rules: &ScanRules, item_dir: &Path) -> Result<()> {
    let violation = match rules.name_constraint {
        NameConstraint::MustBeToken if !identity::is_identity_token(name) => {
            Some("name must be a generated identity token")
        }
        NameConstraint::MustNotBeToken if identity::is_identity_token(name) => {
            Some("name must not be a generated identity token")
        }
        _ => None,
    };
    match violation {
        Some(rule) => Err(LinkError::NameConstraint {
            name: name.to_string(),
            rule,
            path: item_dir.to_path_buf(),
        }),
        None => Ok(()),
    }
}

fn resolve_entry_point(
    item_dir: &Path,
    markers: &MarkerSet,
    rules: &ScanRules,
) -> Result<Option<PathBuf>> {
    let Some(rule) = &rules.entry_point else {
        return Ok(None);
    };
    // An alias owns no code of its own.
    if markers.reference.is_some() {
        return Ok(None);
    }
    let path = item_dir.join(rule.file_name);
    if path.is_file() {
        Ok(Some(path))
    } else if rule.required {
        Err(LinkError::MissingEntryPoint {
            expected: rule.file_name.to_string(),
            path: item_dir.to_path_buf(),
        })
    } else {
        Ok(None)
    }
}

fn collect_data_files(item_dir: &Path, rules: &ScanRules) -> Result<Vec<PathBuf>> {
    let Some(rule) = &rules.data_files else {
        return Ok(Vec::new());
    };
    let mut names = child_names(item_dir)?;
    names.sort();
    Ok(names
        .into_iter()
        .filter(|name| {
            !name.starts_with('.')
                && Path::new(name)
                    .extension()
                    .is_some_and(|ext| ext == rule.extension)
        })
        .map(|name| item_dir.join(name))
        .filter(|path| path.is_file())
        .collect())
}
