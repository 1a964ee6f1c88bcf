//! Result summary of one compile pass.

use serde::Serialize;

/// Item count for one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: String,
    /// Winning declarations after conflict resolution.
    pub items: usize,
}

/// What a compile pass did, for the CLI summary and machine consumers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompileReport {
    /// True when the incremental gate short-circuited the whole pass.
    pub skipped: bool,
    /// Generated files whose content changed and were written.
    pub modules_written: usize,
    /// Generated files already up to date on disk.
    pub modules_unchanged: usize,
    /// Winning declarations per category, in category order.
    pub categories: Vec<CategoryCount>,
    /// True when this was a dry run (nothing persisted).
    pub dry_run: bool,
}

impl CompileReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn total_items(&self) -> usize {
        self.categories.iter().map(|c| c.items).sum()
    }
}
