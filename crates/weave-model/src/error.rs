//! The linker error type.
//!
//! Every variant carries the filesystem path of the offending item, so the
//! CLI can always point at the input that caused the abort. Inner engine
//! code returns these as ordinary `Result` values; only the top-level
//! orchestrator turns one into a process exit.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    // Grammar errors: malformed or unknown marker content.
    #[error("unknown priority tier `{name}` ({path})")]
    UnknownTier { name: String, path: PathBuf },

    #[error("unknown condition `{name}` ({path})")]
    UnknownCondition { name: String, path: PathBuf },

    #[error("feature `{name}` is not declared by category `{category}` ({path})")]
    UndeclaredFeature {
        name: String,
        category: String,
        path: PathBuf,
    },

    #[error("more than one {kind} marker in one folder ({path})")]
    DuplicateMarker { kind: &'static str, path: PathBuf },

    #[error("{kind} markers are not allowed in category `{category}` ({path})")]
    MarkerNotAllowed {
        kind: &'static str,
        category: String,
        path: PathBuf,
    },

    // Structural errors: the tree itself violates the convention.
    #[error("missing entry point `{expected}` ({path})")]
    MissingEntryPoint { expected: String, path: PathBuf },

    #[error("identity token `{token}` does not match folder name `{name}` ({path})")]
    IdentityMismatch {
        token: String,
        name: String,
        path: PathBuf,
    },

    #[error("malformed identity token `{token}` ({path})")]
    InvalidIdentityToken { token: String, path: PathBuf },

    #[error("item name `{name}` violates the category naming rule: {rule} ({path})")]
    NameConstraint {
        name: String,
        rule: &'static str,
        path: PathBuf,
    },

    #[error("invalid translation bundle: {message} ({path})")]
    InvalidBundle { message: String, path: PathBuf },

    // Reference errors: a `.ref` marker pointing nowhere useful.
    #[error("reference to unknown key `{key}` ({path})")]
    UnresolvedReference { key: String, path: PathBuf },

    #[error("key `{key}` belongs to category `{actual}`, expected `{expected}` ({path})")]
    CategoryMismatch {
        key: String,
        actual: String,
        expected: String,
        path: PathBuf,
    },

    // I/O failures, always wrapped with the path being touched.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rename {path}: {source}")]
    Rename {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LinkError {
    /// The source path this error points at.
    pub fn path(&self) -> &Path {
        match self {
            LinkError::UnknownTier { path, .. }
            | LinkError::UnknownCondition { path, .. }
            | LinkError::UndeclaredFeature { path, .. }
            | LinkError::DuplicateMarker { path, .. }
            | LinkError::MarkerNotAllowed { path, .. }
            | LinkError::MissingEntryPoint { path, .. }
            | LinkError::IdentityMismatch { path, .. }
            | LinkError::InvalidIdentityToken { path, .. }
            | LinkError::NameConstraint { path, .. }
            | LinkError::InvalidBundle { path, .. }
            | LinkError::UnresolvedReference { path, .. }
            | LinkError::CategoryMismatch { path, .. }
            | LinkError::Read { path, .. }
            | LinkError::Write { path, .. }
            | LinkError::Rename { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_includes_path() {
        let err = LinkError::UnknownTier {
            name: "urgent".to_string(),
            path: PathBuf::from("/mod/routes/home/urgent.priority"),
        };
        let text = err.to_string();
        assert!(text.contains("urgent"));
        assert!(text.contains("/mod/routes/home/urgent.priority"));
    }

    #[test]
    fn path_accessor_covers_io_variants() {
        let err = LinkError::Write {
            path: PathBuf::from("/out/modules/a.mjs"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(err.path(), Path::new("/out/modules/a.mjs"));
    }
}
