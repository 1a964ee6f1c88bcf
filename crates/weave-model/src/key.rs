//! Composite keys identifying declarations within a category namespace.

use serde::Serialize;

/// Unique identifier of a declaration: category plus item name, with an
/// optional list segment for grouped categories.
///
/// Rendered as `category:name` or `category:list:name`. Exactly one winning
/// declaration record exists per key after conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CompositeKey {
    pub category: String,
    pub list: Option<String>,
    pub name: String,
}

impl CompositeKey {
    /// Key for a plain single-item declaration.
    pub fn item(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            list: None,
            name: name.to_string(),
        }
    }

    /// Key for a member of a list group.
    pub fn member(category: &str, list: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            list: Some(list.to_string()),
            name: name.to_string(),
        }
    }
}

impl std::fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.list {
            Some(list) => write!(f, "{}:{}:{}", self.category, list, self.name),
            None => write!(f, "{}:{}", self.category, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(CompositeKey::item("routes", "dashboard").to_string(), "routes:dashboard");
        assert_eq!(
            CompositeKey::member("events", "startup", "warm-cache").to_string(),
            "events:startup:warm-cache"
        );
    }

    #[test]
    fn ordering_is_lexicographic_by_segments() {
        let a = CompositeKey::item("actions", "b");
        let b = CompositeKey::item("routes", "a");
        assert!(a < b);
    }
}
