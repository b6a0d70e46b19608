use runway_core::TransactionSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pipeline::StatementError;

/// How statements are located and read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Leading pages holding account metadata rather than transactions.
    pub skip_pages: usize,
    /// File extension of statement documents, matched case-insensitively.
    pub extension: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            skip_pages: 2,
            extension: "pdf".to_string(),
        }
    }
}

impl ExtractConfig {
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }
}

/// Expenses read from a single statement.
#[derive(Debug, Clone)]
pub struct ParsedStatement {
    pub path: PathBuf,
    /// Pages past the skipped prefix that yielded any text.
    pub pages_with_text: usize,
    pub transactions: TransactionSet,
}

/// A statement that contributed nothing to a batch, and why.
#[derive(Debug)]
pub struct DocumentIssue {
    pub path: PathBuf,
    pub error: StatementError,
}

/// Everything read from a statement directory.
#[derive(Debug)]
pub struct BatchReport {
    pub dir: PathBuf,
    /// Expenses from every usable statement, in document then line order.
    pub transactions: TransactionSet,
    /// Statements that contributed at least one expense.
    pub documents_read: usize,
    pub issues: Vec<DocumentIssue>,
}

impl BatchReport {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            transactions: TransactionSet::new(),
            documents_read: 0,
            issues: Vec::new(),
        }
    }

    /// An empty batch is the "no usable data" outcome.
    pub fn ensure_usable(&self) -> Result<(), StatementError> {
        if self.transactions.is_empty() {
            return Err(StatementError::NoTransactionsFound(self.dir.clone()));
        }
        Ok(())
    }
}
