//! Declaration records produced by category discovery.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::key::CompositeKey;
use crate::markers::ConditionContext;
use crate::tier::PriorityTier;

/// One discovered filesystem item interpreted as a unit of generated wiring.
///
/// Records live only in the in-memory registry of a single compile pass;
/// what persists is the code generated from them.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub key: CompositeKey,
    /// Absolute path of the item folder this record was discovered at.
    pub source: PathBuf,
    pub tier: PriorityTier,
    pub payload: Payload,
}

impl Declaration {
    pub fn category(&self) -> &str {
        &self.key.category
    }
}

/// Category-specific payload of a declaration.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Single-item declaration forwarding to its entry-point file.
    Entry(EntryPayload),
    /// Alias pointing at another registry key instead of owning code.
    Alias { target: CompositeKey },
    /// Member of an ordered list group.
    ListMember(ListMemberPayload),
    /// Merged translation tables for one group.
    Translations(TranslationBundle),
}

#[derive(Debug, Clone, Default)]
pub struct EntryPayload {
    /// Absolute path of the item's entry-point file.
    pub entry_point: PathBuf,
    pub conditions: ConditionContext,
    pub features: BTreeMap<String, bool>,
}

#[derive(Debug, Clone)]
pub struct ListMemberPayload {
    /// Absolute path of the member's entry-point file.
    pub entry_point: PathBuf,
}

/// Raw message tables for one translation group, keyed language-first.
///
/// Templates stay uncompiled here; placeholder parsing happens at emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationBundle {
    /// Language name (file stem) to its message table.
    pub languages: BTreeMap<String, LanguageTable>,
    /// Language used to backfill keys missing from other languages.
    pub default_language: Option<String>,
}

/// Singular and plural message templates for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTable {
    pub singular: BTreeMap<String, String>,
    pub plural: BTreeMap<String, String>,
}

impl TranslationBundle {
    /// Merge a weaker contribution into this one.
    ///
    /// Existing keys and languages win; anything absent is backfilled from
    /// `weaker`, key by key and language by language. The stronger
    /// contribution's default-language choice is kept when it has one.
    pub fn absorb(&mut self, weaker: TranslationBundle) {
        for (language, table) in weaker.languages {
            let own = self.languages.entry(language).or_default();
            for (key, template) in table.singular {
                own.singular.entry(key).or_insert(template);
            }
            for (key, template) in table.plural {
                own.plural.entry(key).or_insert(template);
            }
        }
        if self.default_language.is_none() {
            self.default_language = weaker.default_language;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(singular: &[(&str, &str)]) -> LanguageTable {
        LanguageTable {
            singular: singular
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            plural: BTreeMap::new(),
        }
    }

    #[test]
    fn absorb_keeps_existing_keys() {
        let mut strong = TranslationBundle {
            languages: [("en".to_string(), table(&[("hello", "Hi")]))].into(),
            default_language: Some("en".to_string()),
        };
        let weak = TranslationBundle {
            languages: [(
                "en".to_string(),
                table(&[("hello", "Hello there"), ("bye", "Bye")]),
            )]
            .into(),
            default_language: Some("fr".to_string()),
        };
        strong.absorb(weak);
        let en = &strong.languages["en"];
        assert_eq!(en.singular["hello"], "Hi");
        assert_eq!(en.singular["bye"], "Bye");
        assert_eq!(strong.default_language.as_deref(), Some("en"));
    }

    #[test]
    fn absorb_adds_missing_languages() {
        let mut strong = TranslationBundle {
            languages: [("en".to_string(), table(&[("hello", "Hi")]))].into(),
            default_language: Some("en".to_string()),
        };
        let weak = TranslationBundle {
            languages: [("nl".to_string(), table(&[("hello", "Hoi")]))].into(),
            default_language: None,
        };
        strong.absorb(weak);
        assert_eq!(strong.languages["nl"].singular["hello"], "Hoi");
    }
}
