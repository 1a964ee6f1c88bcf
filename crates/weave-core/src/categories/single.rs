//! Single-item categories: one folder, one declaration, one forwarding
//! module.
//!
//! Both `routes` and `actions` are instances of this shape; they differ
//! only in entry-point file, deployment target, access verbs, and declared
//! features.

use std::fmt::Write as _;
use std::path::Path;

use weave_emit::{InstallTarget, js_ident, js_string};
use weave_model::{
    CompositeKey, ConditionContext, Declaration, EntryPayload, LinkError, Payload, Result,
};
use weave_scan::{EntryPointRule, ItemDescriptor, MarkerPolicy, NameConstraint, ScanRules, scan};

use crate::category::{Category, EmitPass, category_roots};
use crate::registry::Registry;

enum Syntax {
    Esm,
    Cjs,
}

pub struct SingleItemCategory {
    name: &'static str,
    description: &'static str,
    entry_file: &'static str,
    target: InstallTarget,
    access_verbs: &'static [&'static str],
    feature_defaults: &'static [(&'static str, bool)],
}

impl SingleItemCategory {
    /// Client-side pages, one per route name.
    pub fn routes() -> Self {
        Self {
            name: "routes",
            description: "Client route pages, one folder per route",
            entry_file: "page.mjs",
            target: InstallTarget::Client,
            access_verbs: &["view"],
            feature_defaults: &[("caching", true), ("prefetch", false)],
        }
    }

    /// Server actions invoked by name.
    pub fn actions() -> Self {
        Self {
            name: "actions",
            description: "Server actions invoked by name",
            entry_file: "action.mjs",
            target: InstallTarget::Server,
            access_verbs: &["invoke", "manage"],
            feature_defaults: &[("audit", false)],
        }
    }

    fn rules(&self) -> ScanRules {
        ScanRules {
            category: self.name,
            name_constraint: NameConstraint::MayBeToken,
            allow: MarkerPolicy::ALL,
            entry_point: Some(EntryPointRule {
                file_name: self.entry_file,
                required: true,
            }),
            data_files: None,
            access_verbs: self.access_verbs,
            feature_defaults: self.feature_defaults,
        }
    }

    fn inner_path(&self, name: &str) -> String {
        format!("{}/{}", self.name, name)
    }

    fn entry_module(&self, key: &CompositeKey, record: &Declaration, entry: &EntryPayload, syntax: &Syntax) -> String {
        let mut out = String::from("// Generated by weave. Do not edit.\n");
        let entry_path = js_string(&entry.entry_point.display().to_string());
        match syntax {
            Syntax::Esm => {
                let _ = writeln!(out, "export {{ default }} from {entry_path};");
                out.push_str("export const meta = Object.freeze({\n");
            }
            Syntax::Cjs => {
                let _ = writeln!(out, "module.exports = require({entry_path});");
                out.push_str("module.exports.meta = Object.freeze({\n");
            }
        }
        self.meta_common(&mut out, key, record);
        let _ = writeln!(out, "  access: {},", render_access(&entry.conditions));
        let _ = writeln!(out, "  features: {},", render_features(entry));
        out.push_str("});\n");
        out
    }

    fn alias_module(&self, key: &CompositeKey, record: &Declaration, target: &CompositeKey, syntax: &Syntax) -> String {
        let mut out = String::from("// Generated by weave. Do not edit.\n");
        match syntax {
            Syntax::Esm => {
                let _ = writeln!(out, "export {{ default }} from \"./{}.mjs\";", target.name);
                out.push_str("export const meta = Object.freeze({\n");
            }
            Syntax::Cjs => {
                let _ = writeln!(out, "module.exports = require(\"./{}.cjs\");", target.name);
                out.push_str("module.exports.meta = Object.freeze({\n");
            }
        }
        self.meta_common(&mut out, key, record);
        let _ = writeln!(out, "  aliasOf: {},", js_string(&target.name));
        out.push_str("});\n");
        out
    }

    fn meta_common(&self, out: &mut String, key: &CompositeKey, record: &Declaration) {
        let _ = writeln!(out, "  name: {},", js_string(&key.name));
        let _ = writeln!(out, "  category: {},", js_string(self.name));
        let _ = writeln!(out, "  priority: {},", js_string(record.tier.canonical_name()));
    }
}

const STUB: &str = "declare const handler: unknown;\n\
                    export default handler;\n\
                    export declare const meta: Readonly<Record<string, unknown>>;\n";

impl Category for SingleItemCategory {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn discover(&self, module_dir: &Path, registry: &mut Registry) -> Result<()> {
        let rules = self.rules();
        for root in category_roots(module_dir, self.name) {
            scan(&root, &rules, &mut |item: ItemDescriptor| {
                let ItemDescriptor {
                    name,
                    path,
                    tier,
                    conditions,
                    features,
                    reference,
                    entry_point,
                    ..
                } = item;
                let key = CompositeKey::item(self.name, &name);
                let payload = if let Some(target) = &reference {
                    Payload::Alias {
                        target: CompositeKey::item(self.name, target),
                    }
                } else if let Some(entry_point) = entry_point {
                    Payload::Entry(EntryPayload {
                        entry_point,
                        conditions,
                        features,
                    })
                } else {
                    return Err(LinkError::MissingEntryPoint {
                        expected: self.entry_file.to_string(),
                        path,
                    });
                };
                registry.add(Declaration {
                    key,
                    source: path,
                    tier,
                    payload,
                });
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
        let inner = self.inner_path(&key.name);
        let (module, runtime) = match &record.payload {
            Payload::Entry(entry) => (
                self.entry_module(key, record, entry, &Syntax::Esm),
                self.entry_module(key, record, entry, &Syntax::Cjs),
            ),
            Payload::Alias { target } => {
                // The target must exist and be one of ours before we wire a
                // forwarding module at it.
                pass.registry.require(target, Some(self.name), &record.source)?;
                (
                    self.alias_module(key, record, target, &Syntax::Esm),
                    self.alias_module(key, record, target, &Syntax::Cjs),
                )
            }
            _ => {
                return Err(LinkError::CategoryMismatch {
                    key: key.to_string(),
                    actual: record.category().to_string(),
                    expected: self.name.to_string(),
                    path: record.source.clone(),
                });
            }
        };
        pass.writer.write_module(&inner, &module, Some(&runtime), Some(STUB))
    }

    fn end_emission(
        &self,
        pass: &mut EmitPass<'_>,
        items: &[(&CompositeKey, &Declaration)],
    ) -> Result<()> {
        for (key, _) in items {
            let binding = js_ident(self.name, &key.name);
            pass.install
                .push_import(self.target, &binding, &self.inner_path(&key.name));
            pass.install.push_body(
                self.target,
                &format!(
                    "context.register({}, {}, {});",
                    js_string(self.name),
                    js_string(&key.name),
                    binding
                ),
            );
        }
        Ok(())
    }
}

fn render_access(conditions: &ConditionContext) -> String {
    if conditions.is_empty() {
        return "{}".to_string();
    }
    let entries: Vec<String> = conditions
        .iter()
        .map(|(verb, roles)| {
            let roles: Vec<String> = roles.iter().map(|role| js_string(role)).collect();
            format!("{}: [{}]", js_string(verb), roles.join(", "))
        })
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

fn render_features(entry: &EntryPayload) -> String {
    if entry.features.is_empty() {
        return "{}".to_string();
    }
    let entries: Vec<String> = entry
        .features
        .iter()
        .map(|(name, value)| format!("{}: {}", js_string(name), value))
        .collect();
    format!("{{ {} }}", entries.join(", "))
}
