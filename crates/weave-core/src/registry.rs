//! The per-pass declaration registry.
//!
//! One registry exists per compile pass, owned by the pass and passed
//! explicitly to whoever needs it, never a process-wide global. It is
//! written only during the scan phase and read only during emission.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};
use weave_model::{CompositeKey, Declaration, LinkError, Result};

/// Composite key to winning declaration record, with priority-based
/// conflict resolution on insert.
#[derive(Default)]
pub struct Registry {
    records: BTreeMap<CompositeKey, Declaration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration, resolving key conflicts by priority tier.
    ///
    /// A strictly higher incoming tier replaces the stored record; a lower
    /// or equal tier is discarded (first writer wins on ties). Losing a
    /// conflict is a diagnostic, never an error: module load order must not
    /// become a correctness concern.
    pub fn add(&mut self, record: Declaration) {
        match self.records.get(&record.key) {
            None => {
                debug!(key = %record.key, tier = %record.tier, "registered declaration");
                self.records.insert(record.key.clone(), record);
            }
            Some(existing) if record.tier > existing.tier => {
                warn!(
                    key = %record.key,
                    winner = %record.source.display(),
                    dropped = %existing.source.display(),
                    "higher-priority declaration replaces earlier one"
                );
                self.records.insert(record.key.clone(), record);
            }
            Some(existing) => {
                let reason = if record.tier < existing.tier {
                    "lower priority"
                } else {
                    "same priority, first registration wins"
                };
                warn!(
                    key = %record.key,
                    kept = %existing.source.display(),
                    dropped = %record.source.display(),
                    reason,
                    "duplicate declaration discarded"
                );
            }
        }
    }

    /// Remove and return a record, for categories that merge contributions
    /// instead of replacing them.
    pub fn take(&mut self, key: &CompositeKey) -> Option<Declaration> {
        self.records.remove(key)
    }

    /// Look a key up, optionally asserting the stored record's category.
    ///
    /// A category mismatch is fatal: it means a reference marker is wired at
    /// the wrong kind of declaration. `at` is the referring source path
    /// reported in that error.
    pub fn get(
        &self,
        key: &CompositeKey,
        expected_category: Option<&str>,
        at: &Path,
    ) -> Result<Option<&Declaration>> {
        let Some(record) = self.records.get(key) else {
            return Ok(None);
        };
        if let Some(expected) = expected_category
            && record.category() != expected
        {
            return Err(LinkError::CategoryMismatch {
                key: key.to_string(),
                actual: record.category().to_string(),
                expected: expected.to_string(),
                path: at.to_path_buf(),
            });
        }
        Ok(Some(record))
    }

    /// As [`Registry::get`], but an absent key is fatal.
    pub fn require(
        &self,
        key: &CompositeKey,
        expected_category: Option<&str>,
        at: &Path,
    ) -> Result<&Declaration> {
        self.get(key, expected_category, at)?
            .ok_or_else(|| LinkError::UnresolvedReference {
                key: key.to_string(),
                path: at.to_path_buf(),
            })
    }

    /// All winning records of one category, in key order.
    pub fn of_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = (&'a CompositeKey, &'a Declaration)> + 'a {
        self.records
            .iter()
            .filter(move |(key, _)| key.category == category)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use weave_model::{EntryPayload, Payload, PriorityTier};

    use super::*;

    fn record(name: &str, source: &str, tier: PriorityTier) -> Declaration {
        Declaration {
            key: CompositeKey::item("routes", name),
            source: PathBuf::from(source),
            tier,
            payload: Payload::Entry(EntryPayload::default()),
        }
    }

    #[test]
    fn higher_tier_wins_regardless_of_order() {
        for (first, second) in [
            (PriorityTier::High, PriorityTier::Low),
            (PriorityTier::Low, PriorityTier::High),
        ] {
            let mut registry = Registry::new();
            registry.add(record("home", "/a/routes/home", first));
            registry.add(record("home", "/b/routes/home", second));

            let key = CompositeKey::item("routes", "home");
            let winner = registry
                .require(&key, None, Path::new("/"))
                .expect("home is registered");
            assert_eq!(winner.tier, PriorityTier::High);
        }
    }

    #[test]
    fn equal_tier_keeps_first_registration() {
        let mut registry = Registry::new();
        registry.add(record("home", "/a/routes/home", PriorityTier::Default));
        registry.add(record("home", "/b/routes/home", PriorityTier::Default));

        let key = CompositeKey::item("routes", "home");
        let winner = registry.require(&key, None, Path::new("/")).unwrap();
        assert_eq!(winner.source, PathBuf::from("/a/routes/home"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn category_mismatch_is_fatal() {
        let mut registry = Registry::new();
        registry.add(record("home", "/a/routes/home", PriorityTier::Default));

        let key = CompositeKey::item("routes", "home");
        let err = registry
            .get(&key, Some("actions"), Path::new("/a/actions/x"))
            .unwrap_err();
        assert!(matches!(err, LinkError::CategoryMismatch { .. }));
    }

    #[test]
    fn require_on_absent_key_is_fatal() {
        let registry = Registry::new();
        let key = CompositeKey::item("routes", "missing");
        let err = registry
            .require(&key, None, Path::new("/a/routes/alias"))
            .unwrap_err();
        assert!(matches!(err, LinkError::UnresolvedReference { .. }));
    }

    #[test]
    fn of_category_filters_and_sorts() {
        let mut registry = Registry::new();
        registry.add(record("b", "/m/routes/b", PriorityTier::Default));
        registry.add(record("a", "/m/routes/a", PriorityTier::Default));
        registry.add(Declaration {
            key: CompositeKey::item("actions", "z"),
            source: PathBuf::from("/m/actions/z"),
            tier: PriorityTier::Default,
            payload: Payload::Entry(EntryPayload::default()),
        });

        let names: Vec<&str> = registry
            .of_category("routes")
            .map(|(key, _)| key.name.as_str())
            .collect();
        assert_eq!(names, ["a", "b"]);
    }
}
