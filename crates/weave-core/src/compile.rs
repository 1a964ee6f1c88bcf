//! The compile orchestrator.
//!
//! One `compile` call is one pass: gate check, fresh registry, per-module
//! discovery across hooks and categories, three-phase emission per
//! category, installation assembly, stamp commit. Everything runs on one
//! logical task in deterministic order; the registry is the only shared
//! mutable structure and it is owned right here.

use tracing::{info, info_span};

use weave_emit::{InstallAssembly, ModuleWriter};
use weave_model::{CategoryCount, CompileReport, CompositeKey, Declaration, LinkOptions, Result};

use crate::categories::{ListCategory, SingleItemCategory, TranslationCategory};
use crate::category::{Category, EmitPass};
use crate::gate::Gate;
use crate::hooks::{AssetRootHook, ManifestHook, ModuleHook};
use crate::registry::Registry;

/// Everything a compile pass needs, assembled by the host application.
pub struct LinkerConfig {
    pub options: LinkOptions,
    /// Category processors, in processing order.
    pub categories: Vec<Box<dyn Category>>,
    /// Module-level hooks, run before category discovery per module.
    pub module_hooks: Vec<Box<dyn ModuleHook>>,
}

impl LinkerConfig {
    /// A config with no categories or hooks registered.
    pub fn new(options: LinkOptions) -> Self {
        Self {
            options,
            categories: Vec::new(),
            module_hooks: Vec::new(),
        }
    }

    /// The standard category and hook set.
    pub fn with_default_set(options: LinkOptions) -> Self {
        Self {
            options,
            categories: vec![
                Box::new(SingleItemCategory::routes()),
                Box::new(SingleItemCategory::actions()),
                Box::new(ListCategory::events()),
                Box::new(TranslationCategory),
            ],
            module_hooks: vec![Box::new(ManifestHook), Box::new(AssetRootHook)],
        }
    }
}

/// Run one full compile pass.
///
/// All-or-nothing: the first malformed item aborts with a [`weave_model::LinkError`]
/// before the stamp is committed, so the next invocation retries in full.
pub fn compile(config: &LinkerConfig) -> Result<CompileReport> {
    let options = &config.options;
    let gate = Gate::new(&options.output_root);
    if gate.should_skip(&options.module_roots, options.force) {
        info!("nothing changed since the last link, skipping");
        return Ok(CompileReport::skipped());
    }

    let _span = info_span!("link").entered();

    // Scan phase: the registry is written here and only here.
    let mut registry = Registry::new();
    let mut install = InstallAssembly::new();
    for module_dir in &options.module_roots {
        let _span = info_span!("module", dir = %module_dir.display()).entered();
        for hook in &config.module_hooks {
            hook.run(module_dir, &mut install)?;
        }
        for category in &config.categories {
            category.discover(module_dir, &mut registry)?;
        }
    }
    info!(declarations = registry.len(), "scan complete");

    // Emission phase: the registry is read-only from here on.
    let mut writer = ModuleWriter::new(&options.output_root, options.dry_run);
    let mut counts = Vec::new();
    for category in &config.categories {
        let items: Vec<(&CompositeKey, &Declaration)> =
            registry.of_category(category.name()).collect();
        counts.push(CategoryCount {
            category: category.name().to_string(),
            items: items.len(),
        });
        let mut pass = EmitPass {
            registry: &registry,
            writer: &mut writer,
            install: &mut install,
        };
        category.begin_emission(&mut pass)?;
        for (key, record) in &items {
            category.emit_item(&mut pass, key, record)?;
        }
        category.end_emission(&mut pass, &items)?;
    }
    install.apply(&mut writer)?;

    if !options.dry_run {
        gate.commit()?;
    }
    info!(
        written = writer.written(),
        unchanged = writer.unchanged(),
        "link pass complete"
    );
    Ok(CompileReport {
        skipped: false,
        modules_written: writer.written(),
        modules_unchanged: writer.unchanged(),
        categories: counts,
        dry_run: options.dry_run,
    })
}
