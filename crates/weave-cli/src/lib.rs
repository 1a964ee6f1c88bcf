//! Shared CLI infrastructure for the `weave` binary.

pub mod logging;
