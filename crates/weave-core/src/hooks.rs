//! Module-level hooks.
//!
//! Hooks run once per scanned module directory, before any category
//! discovery, in the order the host configured them.

use std::path::Path;

use weave_emit::{InstallAssembly, InstallTarget, js_string};
use weave_model::Result;

/// Per-module processing that is not tied to any one category.
pub trait ModuleHook {
    fn name(&self) -> &'static str;

    fn run(&self, module_dir: &Path, install: &mut InstallAssembly) -> Result<()>;
}

/// Registers every scanned module's name into both installation
/// entrypoints, so the host can enumerate what was linked.
pub struct ManifestHook;

impl ModuleHook for ManifestHook {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn run(&self, module_dir: &Path, install: &mut InstallAssembly) -> Result<()> {
        let name = module_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| module_dir.display().to_string());
        for target in InstallTarget::BOTH {
            install.push_body(target, &format!("context.modules.push({});", js_string(&name)));
        }
        Ok(())
    }
}

/// Registers a module's `assets/` directory with the server install when
/// one exists.
pub struct AssetRootHook;

impl ModuleHook for AssetRootHook {
    fn name(&self) -> &'static str {
        "asset-root"
    }

    fn run(&self, module_dir: &Path, install: &mut InstallAssembly) -> Result<()> {
        let assets = module_dir.join("assets");
        if assets.is_dir() {
            install.push_body(
                InstallTarget::Server,
                &format!(
                    "context.assetRoots.push({});",
                    js_string(&assets.display().to_string())
                ),
            );
        }
        Ok(())
    }
}
