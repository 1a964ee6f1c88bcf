//! Filesystem scanning for the Weave linker.
//!
//! This crate turns the on-disk declaration convention into normalized item
//! descriptors:
//!
//! - **marker**: pure decoding of marker file names (no I/O)
//! - **canonical**: the isolated rename side effects that rewrite markers to
//!   their canonical spelling
//! - **identity**: generated stable identity tokens
//! - **scanner**: the deterministic directory walk driving a category's
//!   item callback

pub mod canonical;
pub mod identity;
pub mod marker;
pub mod scanner;

pub use identity::{fresh_token, is_identity_token};
pub use marker::{RawMarker, classify_marker, normalize_name};
pub use scanner::{
    DataFileRule, EntryPointRule, ItemDescriptor, MarkerPolicy, NameConstraint, ScanRules, scan,
};
