//! Grouped-list categories: many contributors, one ordered sequence.
//!
//! `events/<list>/<member>/listener.mjs` declares one member of the list
//! named by its parent folder. Members contributed by every module merge
//! into a single sequence ordered tier-major (very-high first) and then
//! lexicographically by member name within a tier.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use weave_emit::{InstallTarget, js_ident, js_string};
use weave_model::{
    CompositeKey, Declaration, LinkError, ListMemberPayload, Payload, Result,
};
use weave_scan::{EntryPointRule, ItemDescriptor, MarkerPolicy, NameConstraint, ScanRules, scan};

use crate::category::{Category, EmitPass, category_roots};
use crate::registry::Registry;

pub struct ListCategory {
    name: &'static str,
    member_entry: &'static str,
    /// Lists that must exist even when no folder declares a member, so
    /// downstream lookups never miss ("shadow lists").
    required_lists: &'static [&'static str],
    target: InstallTarget,
}

impl ListCategory {
    /// Server event listeners grouped under stable event names.
    pub fn events() -> Self {
        Self {
            name: "events",
            member_entry: "listener.mjs",
            required_lists: &["startup", "shutdown"],
            target: InstallTarget::Server,
        }
    }

    fn list_rules(&self) -> ScanRules {
        ScanRules {
            category: self.name,
            name_constraint: NameConstraint::MayBeToken,
            allow: MarkerPolicy {
                identity: true,
                ..MarkerPolicy::NONE
            },
            entry_point: None,
            data_files: None,
            access_verbs: &[],
            feature_defaults: &[],
        }
    }

    fn member_rules(&self) -> ScanRules {
        ScanRules {
            category: self.name,
            name_constraint: NameConstraint::MayBeToken,
            allow: MarkerPolicy {
                priority: true,
                references: true,
                identity: true,
                ..MarkerPolicy::NONE
            },
            entry_point: Some(EntryPointRule {
                file_name: self.member_entry,
                required: true,
            }),
            data_files: None,
            access_verbs: &[],
            feature_defaults: &[],
        }
    }

    /// Resolve a member's entry point, following a single alias hop.
    fn member_entry_point(
        &self,
        registry: &Registry,
        record: &Declaration,
    ) -> Result<PathBuf> {
        match &record.payload {
            Payload::ListMember(member) => Ok(member.entry_point.clone()),
            Payload::Alias { target } => {
                let resolved = registry.require(target, Some(self.name), &record.source)?;
                match &resolved.payload {
                    Payload::ListMember(member) => Ok(member.entry_point.clone()),
                    _ => Err(LinkError::UnresolvedReference {
                        key: target.to_string(),
                        path: record.source.clone(),
                    }),
                }
            }
            _ => Err(LinkError::CategoryMismatch {
                key: record.key.to_string(),
                actual: record.category().to_string(),
                expected: self.name.to_string(),
                path: record.source.clone(),
            }),
        }
    }

    fn list_module(&self, list: &str, entries: &[PathBuf], syntax: &Syntax) -> String {
        let mut out = String::from("// Generated by weave. Do not edit.\n");
        for (index, entry) in entries.iter().enumerate() {
            let spec = js_string(&entry.display().to_string());
            match syntax {
                Syntax::Esm => {
                    let _ = writeln!(out, "import listener_{index} from {spec};");
                }
                Syntax::Cjs => {
                    let _ = writeln!(out, "const listener_{index} = require({spec});");
                }
            }
        }
        out.push('\n');
        let bindings: Vec<String> = (0..entries.len())
            .map(|index| format!("listener_{index}"))
            .collect();
        let listeners = format!("Object.freeze([{}])", bindings.join(", "));
        let event = format!(
            "Object.freeze({{ name: {}, listeners }})",
            js_string(list)
        );
        match syntax {
            Syntax::Esm => {
                let _ = writeln!(out, "export const listeners = {listeners};");
                let _ = writeln!(out, "export const event = {event};");
            }
            Syntax::Cjs => {
                let _ = writeln!(out, "const listeners = {listeners};");
                let _ = writeln!(out, "module.exports.listeners = listeners;");
                let _ = writeln!(out, "module.exports.event = {event};");
            }
        }
        out
    }
}

enum Syntax {
    Esm,
    Cjs,
}

impl Category for ListCategory {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "Ordered event listener lists merged across modules"
    }

    fn discover(&self, module_dir: &Path, registry: &mut Registry) -> Result<()> {
        let list_rules = self.list_rules();
        let member_rules = self.member_rules();
        for root in category_roots(module_dir, self.name) {
            scan(&root, &list_rules, &mut |list_item: ItemDescriptor| {
                let list_name = list_item.name;
                scan(&list_item.path, &member_rules, &mut |member: ItemDescriptor| {
                    let ItemDescriptor {
                        name,
                        path,
                        tier,
                        reference,
                        entry_point,
                        ..
                    } = member;
                    let key = CompositeKey::member(self.name, &list_name, &name);
                    let payload = if let Some(target) = &reference {
                        Payload::Alias {
                            target: CompositeKey::member(self.name, &list_name, target),
                        }
                    } else if let Some(entry_point) = entry_point {
                        Payload::ListMember(ListMemberPayload { entry_point })
                    } else {
                        return Err(LinkError::MissingEntryPoint {
                            expected: self.member_entry.to_string(),
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
                })
            })?;
        }
        Ok(())
    }

    /// Members emit nothing on their own; whole lists are the emission
    /// unit, built in [`Category::end_emission`].
    fn emit_item(
        &self,
        _pass: &mut EmitPass<'_>,
        _key: &CompositeKey,
        _record: &Declaration,
    ) -> Result<()> {
        Ok(())
    }

    fn end_emission(
        &self,
        pass: &mut EmitPass<'_>,
        items: &[(&CompositeKey, &Declaration)],
    ) -> Result<()> {
        let mut lists: BTreeMap<String, Vec<(&CompositeKey, &Declaration)>> = BTreeMap::new();
        for list in self.required_lists {
            lists.entry((*list).to_string()).or_default();
        }
        for &(key, record) in items {
            if let Some(list) = &key.list {
                lists.entry(list.clone()).or_default().push((key, record));
            }
        }

        for (list_name, members) in &mut lists {
            members.sort_by_key(|(key, record)| (Reverse(record.tier), key.name.clone()));
            let mut entries = Vec::with_capacity(members.len());
            for (_, record) in members.iter() {
                entries.push(self.member_entry_point(pass.registry, record)?);
            }

            let inner = format!("{}/{}", self.name, list_name);
            let module = self.list_module(list_name, &entries, &Syntax::Esm);
            let runtime = self.list_module(list_name, &entries, &Syntax::Cjs);
            pass.writer.write_module(&inner, &module, Some(&runtime), None)?;

            let binding = js_ident(self.name, list_name);
            pass.install.push_namespace_import(self.target, &binding, &inner);
            pass.install.push_body(
                self.target,
                &format!(
                    "context.attach({}, {}, {}.event);",
                    js_string(self.name),
                    js_string(list_name),
                    binding
                ),
            );
        }
        Ok(())
    }
}
