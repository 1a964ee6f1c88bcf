//! The Weave linker engine.
//!
//! Ties the scanner and the emitter together: the per-pass registry with its
//! conflict-resolution rules, the pluggable category-processor contract, the
//! representative category implementations, module-level hooks, the
//! incremental gate, and the `compile` orchestrator.

pub mod categories;
pub mod category;
pub mod compile;
pub mod gate;
pub mod hooks;
pub mod registry;

pub use categories::{ListCategory, SingleItemCategory, TranslationCategory};
pub use category::{Category, EmitPass, category_roots};
pub use compile::{LinkerConfig, compile};
pub use gate::{FORCE_ENV, Gate};
pub use hooks::{AssetRootHook, ManifestHook, ModuleHook};
pub use registry::Registry;
