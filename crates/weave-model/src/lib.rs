//! Core data model for the Weave linker.
//!
//! This crate defines the pure types shared by the scanner, registry, and
//! emitter: priority tiers, composite keys, declaration records, marker
//! metadata, linker errors, and run options. It performs no I/O.

pub mod declaration;
pub mod error;
pub mod key;
pub mod markers;
pub mod options;
pub mod report;
pub mod tier;

pub use declaration::{Declaration, EntryPayload, LanguageTable, ListMemberPayload, Payload, TranslationBundle};
pub use error::{LinkError, Result};
pub use key::CompositeKey;
pub use markers::{ConditionContext, MarkerSet};
pub use options::LinkOptions;
pub use report::{CategoryCount, CompileReport};
pub use tier::PriorityTier;
