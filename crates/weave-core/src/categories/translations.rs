//! Translation compilation.
//!
//! `translations/<group>/<lang>.json` files are flat maps from message key
//! to template string; a `*` key prefix marks the plural variant. Groups
//! with the same name contributed by different modules merge key-by-key and
//! language-by-language, the higher-priority contribution winning where
//! both define a key. Each language compiles to an accessor module of
//! callables; an index module maps language names to tables with the
//! default language as fallback.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::debug;
use weave_emit::{InstallTarget, js_ident, js_string};
use weave_model::{
    CompositeKey, Declaration, LanguageTable, LinkError, Payload, Result, TranslationBundle,
};
use weave_scan::{DataFileRule, ItemDescriptor, MarkerPolicy, NameConstraint, ScanRules, scan};

use crate::categories::template::{Segment, parse_template};
use crate::category::{Category, EmitPass, category_roots};
use crate::registry::Registry;

const NAME: &str = "translations";

/// The conventional locale picked as default when a group carries it.
const DEFAULT_LANGUAGE: &str = "en";

pub struct TranslationCategory;

impl TranslationCategory {
    fn rules(&self) -> ScanRules {
        ScanRules {
            category: NAME,
            name_constraint: NameConstraint::MayBeToken,
            allow: MarkerPolicy {
                priority: true,
                identity: true,
                ..MarkerPolicy::NONE
            },
            entry_point: None,
            data_files: Some(DataFileRule { extension: "json" }),
            access_verbs: &[],
            feature_defaults: &[],
        }
    }
}

impl Category for TranslationCategory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Message tables merged per group and compiled per language"
    }

    fn discover(&self, module_dir: &Path, registry: &mut Registry) -> Result<()> {
        let rules = self.rules();
        for root in category_roots(module_dir, NAME) {
            scan(&root, &rules, &mut |item: ItemDescriptor| {
                let bundle = read_bundle(&item)?;
                let key = CompositeKey::item(NAME, &item.name);
                let incoming = Declaration {
                    key: key.clone(),
                    source: item.path.clone(),
                    tier: item.tier,
                    payload: Payload::Translations(bundle),
                };
                // Unlike other categories, same-name groups merge instead
                // of replacing each other.
                match registry.take(&key) {
                    None => registry.add(incoming),
                    Some(existing) => registry.add(merge_contributions(existing, incoming)),
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    fn emit_item(
        &self,
        pass: &mut EmitPass<'_>,
        key: &CompositeKey,
        record: &Declaration,
    ) -> Result<()> {
        let Payload::Translations(bundle) = &record.payload else {
            return Err(LinkError::CategoryMismatch {
                key: key.to_string(),
                actual: record.category().to_string(),
                expected: NAME.to_string(),
                path: record.source.clone(),
            });
        };
        let Some(default_language) = bundle.default_language.clone() else {
            debug!(group = %key.name, "translation group has no languages, nothing to emit");
            return Ok(());
        };

        // Backfill from the default language once per group, not lazily.
        let filled = fill_missing(bundle, &default_language);
        for (language, table) in &filled {
            let inner = format!("{NAME}/{}/{language}", key.name);
            let module = language_module(table, &Syntax::Esm);
            let runtime = language_module(table, &Syntax::Cjs);
            pass.writer.write_module(&inner, &module, Some(&runtime), None)?;
        }

        let languages: Vec<&str> = filled.keys().map(String::as_str).collect();
        let inner = format!("{NAME}/{}/index", key.name);
        let module = index_module(&languages, &default_language, &Syntax::Esm);
        let runtime = index_module(&languages, &default_language, &Syntax::Cjs);
        pass.writer
            .write_module(&inner, &module, Some(&runtime), Some(INDEX_STUB))
    }

    fn end_emission(
        &self,
        pass: &mut EmitPass<'_>,
        items: &[(&CompositeKey, &Declaration)],
    ) -> Result<()> {
        for (key, record) in items {
            let has_languages = matches!(
                &record.payload,
                Payload::Translations(bundle) if !bundle.languages.is_empty()
            );
            if !has_languages {
                continue;
            }
            let binding = js_ident(NAME, &key.name);
            let inner = format!("{NAME}/{}/index", key.name);
            for target in InstallTarget::BOTH {
                pass.install.push_namespace_import(target, &binding, &inner);
                pass.install.push_body(
                    target,
                    &format!(
                        "context.register({}, {}, {}.messagesFor);",
                        js_string(NAME),
                        js_string(&key.name),
                        binding
                    ),
                );
            }
        }
        Ok(())
    }
}

/// Read one group folder's language files into a bundle.
fn read_bundle(item: &ItemDescriptor) -> Result<TranslationBundle> {
    let mut bundle = TranslationBundle::default();
    for file in &item.data_files {
        let Some(language) = file.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let text = fs::read_to_string(file).map_err(|source| LinkError::Read {
            path: file.clone(),
            source,
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|error| LinkError::InvalidBundle {
                message: error.to_string(),
                path: file.clone(),
            })?;
        let Some(map) = value.as_object() else {
            return Err(LinkError::InvalidBundle {
                message: "expected a flat JSON object".to_string(),
                path: file.clone(),
            });
        };
        let mut table = LanguageTable::default();
        for (key, value) in map {
            let Some(template) = value.as_str() else {
                return Err(LinkError::InvalidBundle {
                    message: format!("value for `{key}` is not a string"),
                    path: file.clone(),
                });
            };
            match key.strip_prefix('*') {
                Some(stripped) => table.plural.insert(stripped.to_string(), template.to_string()),
                None => table.singular.insert(key.clone(), template.to_string()),
            };
        }
        bundle.languages.insert(language.to_string(), table);
    }
    bundle.default_language = if bundle.languages.contains_key(DEFAULT_LANGUAGE) {
        Some(DEFAULT_LANGUAGE.to_string())
    } else {
        bundle.languages.keys().next().cloned()
    };
    Ok(bundle)
}

/// Merge two contributions to one group name. The higher tier wins where
/// both define a key; ties favor the earlier registration.
fn merge_contributions(existing: Declaration, incoming: Declaration) -> Declaration {
    let (mut strong, weak) = if incoming.tier > existing.tier {
        (incoming, existing)
    } else {
        (existing, incoming)
    };
    debug!(key = %strong.key, "merged translation contributions");
    let weak_tier = weak.tier;
    if let (Payload::Translations(strong_bundle), Payload::Translations(weak_bundle)) =
        (&mut strong.payload, weak.payload)
    {
        strong_bundle.absorb(weak_bundle);
    }
    strong.tier = strong.tier.max(weak_tier);
    strong
}

/// Copy the default language's templates into every language that lacks a
/// key, per key and per variant.
fn fill_missing(
    bundle: &TranslationBundle,
    default_language: &str,
) -> BTreeMap<String, LanguageTable> {
    let default_table = bundle
        .languages
        .get(default_language)
        .cloned()
        .unwrap_or_default();
    let mut filled = BTreeMap::new();
    for (language, table) in &bundle.languages {
        let mut table = table.clone();
        for (key, template) in &default_table.singular {
            table
                .singular
                .entry(key.clone())
                .or_insert_with(|| template.clone());
        }
        for (key, template) in &default_table.plural {
            table
                .plural
                .entry(key.clone())
                .or_insert_with(|| template.clone());
        }
        filled.insert(language.clone(), table);
    }
    filled
}

enum Syntax {
    Esm,
    Cjs,
}

/// Compile one template into a JavaScript expression over `data`.
fn template_expr(raw: &str) -> String {
    let segments = parse_template(raw);
    if segments.is_empty() {
        return "\"\"".to_string();
    }
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => js_string(text),
            Segment::Placeholder(name) => format!("data[{}]", js_string(name)),
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

fn language_module(table: &LanguageTable, syntax: &Syntax) -> String {
    let mut out = String::from("// Generated by weave. Do not edit.\n");
    out.push_str(
        "const plural = (one, many) => (data, count) => (count > 1 ? many(data) : one(data));\n\n",
    );
    match syntax {
        Syntax::Esm => out.push_str("export const messages = Object.freeze({\n"),
        Syntax::Cjs => out.push_str("module.exports.messages = Object.freeze({\n"),
    }
    let mut keys: BTreeSet<&String> = table.singular.keys().collect();
    keys.extend(table.plural.keys());
    for key in keys {
        let plural_template = table.plural.get(key);
        // A plural variant without a singular one fills in as the singular.
        let Some(singular_template) = table.singular.get(key).or(plural_template) else {
            continue;
        };
        let singular_fn = format!("(data) => {}", template_expr(singular_template));
        let value = match plural_template {
            Some(plural_t) => {
                format!("plural({singular_fn}, (data) => {})", template_expr(plural_t))
            }
            None => singular_fn,
        };
        let _ = writeln!(out, "  {}: {},", js_string(key), value);
    }
    out.push_str("});\n");
    out
}

fn index_module(languages: &[&str], default_language: &str, syntax: &Syntax) -> String {
    let mut out = String::from("// Generated by weave. Do not edit.\n");
    for language in languages {
        let binding = js_ident("lang", language);
        match syntax {
            Syntax::Esm => {
                let _ = writeln!(out, "import * as {binding} from \"./{language}.mjs\";");
            }
            Syntax::Cjs => {
                let _ = writeln!(out, "const {binding} = require(\"./{language}.cjs\");");
            }
        }
    }
    out.push('\n');
    out.push_str("const tables = Object.freeze({\n");
    for language in languages {
        let binding = js_ident("lang", language);
        let _ = writeln!(out, "  {}: {}.messages,", js_string(language), binding);
    }
    out.push_str("});\n");
    let _ = writeln!(out, "const fallback = {};", js_string(default_language));
    out.push('\n');
    match syntax {
        Syntax::Esm => {
            out.push_str("export function messagesFor(language) {\n");
            out.push_str("  return tables[language] ?? tables[fallback];\n");
            out.push_str("}\n");
        }
        Syntax::Cjs => {
            out.push_str("module.exports.messagesFor = function messagesFor(language) {\n");
            out.push_str("  return tables[language] ?? tables[fallback];\n");
            out.push_str("};\n");
        }
    }
    out
}

const INDEX_STUB: &str = "type MessageTable = Readonly<Record<string, (data: Record<string, unknown>, count?: number) => string>>;\n\
                          export declare function messagesFor(language: string): MessageTable;\n";

#[cfg(test)]
mod tests {
    use super::*;

    fn table(singular: &[(&str, &str)], plural: &[(&str, &str)]) -> LanguageTable {
        LanguageTable {
            singular: singular
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            plural: plural
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn template_expr_substitutes_placeholders() {
        assert_eq!(template_expr("Hi %(name)"), "\"Hi \" + data[\"name\"]");
        assert_eq!(template_expr("plain"), "\"plain\"");
        assert_eq!(template_expr(""), "\"\"");
    }

    #[test]
    fn plural_keys_compile_to_dispatch() {
        let table = table(&[("item", "one")], &[("item", "many")]);
        let module = language_module(&table, &Syntax::Esm);
        assert!(module.contains("\"item\": plural((data) => \"one\", (data) => \"many\"),"));
    }

    #[test]
    fn plural_without_singular_fills_in() {
        let table = table(&[], &[("item", "many")]);
        let module = language_module(&table, &Syntax::Esm);
        assert!(module.contains("\"item\": plural((data) => \"many\", (data) => \"many\"),"));
    }

    #[test]
    fn fill_missing_backfills_from_default() {
        let bundle = TranslationBundle {
            languages: [
                ("en".to_string(), table(&[("hello", "Hi %(name)")], &[])),
                ("nl".to_string(), table(&[], &[])),
            ]
            .into(),
            default_language: Some("en".to_string()),
        };
        let filled = fill_missing(&bundle, "en");
        assert_eq!(filled["nl"].singular["hello"], "Hi %(name)");
    }

    #[test]
    fn merge_prefers_higher_tier_defaults() {
        use std::path::PathBuf;
        use weave_model::PriorityTier;

        let low = Declaration {
            key: CompositeKey::item(NAME, "common"),
            source: PathBuf::from("/a"),
            tier: PriorityTier::Low,
            payload: Payload::Translations(TranslationBundle {
                languages: [("fr".to_string(), table(&[("hello", "Salut")], &[]))].into(),
                default_language: Some("fr".to_string()),
            }),
        };
        let high = Declaration {
            key: CompositeKey::item(NAME, "common"),
            source: PathBuf::from("/b"),
            tier: PriorityTier::High,
            payload: Payload::Translations(TranslationBundle {
                languages: [("en".to_string(), table(&[("hello", "Hi")], &[]))].into(),
                default_language: Some("en".to_string()),
            }),
        };
        let merged = merge_contributions(low, high);
        assert_eq!(merged.tier, PriorityTier::High);
        let Payload::Translations(bundle) = merged.payload else {
            panic!("expected translations payload");
        };
        assert_eq!(bundle.default_language.as_deref(), Some("en"));
        assert_eq!(bundle.languages["fr"].singular["hello"], "Salut");
        assert_eq!(bundle.languages["en"].singular["hello"], "Hi");
    }
}
