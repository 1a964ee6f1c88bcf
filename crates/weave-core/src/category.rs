//! The category-processor contract.
//!
//! A category knows how to discover its declarations in a module tree and
//! how to emit generated code for the winners. Categories are registered in
//! a flat, host-configured list; the engine never subclasses or dispatches
//! beyond this trait.

use std::path::{Path, PathBuf};

use weave_emit::{InstallAssembly, ModuleWriter};
use weave_model::{CompositeKey, Declaration, Result};

use crate::registry::Registry;

/// Folder grouping additional category folders inside a module root.
pub const ALIAS_ROOT: &str = "aliases";

/// Emission-phase state handed to category hooks: the (now read-only)
/// registry, the idempotent writer, and the installation-assembly buffers.
pub struct EmitPass<'a> {
    pub registry: &'a Registry,
    pub writer: &'a mut ModuleWriter,
    pub install: &'a mut InstallAssembly,
}

/// One declaration category (routes, actions, events, translations, …).
///
/// Emission happens in three phases so a category can batch cross-item work
/// (such as building one import block covering every item) around per-item
/// module generation. Any malformed item aborts the whole compile; the
/// generated program is never partially wired.
pub trait Category {
    fn name(&self) -> &'static str;

    /// Human-readable description, for host tooling.
    fn description(&self) -> &'static str {
        "declaration category"
    }

    /// Scan one module directory and register every accepted item.
    fn discover(&self, module_dir: &Path, registry: &mut Registry) -> Result<()>;

    fn begin_emission(&self, _pass: &mut EmitPass<'_>) -> Result<()> {
        Ok(())
    }

    /// Emit generated module(s) for one winning declaration.
    fn emit_item(
        &self,
        pass: &mut EmitPass<'_>,
        key: &CompositeKey,
        record: &Declaration,
    ) -> Result<()>;

    /// Called once after every item of this category, with all winners in
    /// key order.
    fn end_emission(
        &self,
        _pass: &mut EmitPass<'_>,
        _items: &[(&CompositeKey, &Declaration)],
    ) -> Result<()> {
        Ok(())
    }
}

/// The two places a category's folder may live inside a module root.
pub fn category_roots(module_dir: &Path, category: &str) -> [PathBuf; 2] {
    [
        module_dir.join(category),
        module_dir.join(ALIAS_ROOT).join(category),
    ]
}
