use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use runway_core::TransactionSet;

use crate::extract::parse_page;
use crate::source::{PageSource, SourceError};
use crate::types::{BatchReport, DocumentIssue, ExtractConfig, ParsedStatement};

#[derive(Debug, Error)]
pub enum StatementError {
    #[error("Cannot list statement directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unreadable document {}: {source}", path.display())]
    DocumentUnreadable {
        path: PathBuf,
        #[source]
        source: SourceError,
    },
    #[error("No transactions found in {}", .0.display())]
    NoTransactionsFound(PathBuf),
}

/// Orchestrates: open → skip cover pages → parse lines, per document and
/// per directory. Documents are handled one at a time, in file-name order.
pub struct StatementPipeline<S: PageSource> {
    source: S,
    config: ExtractConfig,
}

impl<S: PageSource> StatementPipeline<S> {
    pub fn new(source: S, config: ExtractConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Page text of a statement past the skipped cover pages, read lazily.
    /// Pages that yield no text are passed over.
    pub fn pages(&self, path: &Path) -> Result<impl Iterator<Item = String>, StatementError> {
        let reader = self
            .source
            .open(path)
            .map_err(|source| StatementError::DocumentUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let count = reader.page_count();

        Ok((self.config.skip_pages..count).filter_map(move |index| {
            match reader.page_text(index) {
                Ok(text) if !text.trim().is_empty() => Some(text),
                Ok(_) => None,
                Err(e) => {
                    debug!("Skipping page without text: {e}");
                    None
                }
            }
        }))
    }

    /// Read every expense line from one statement.
    pub fn process_file(&self, path: &Path) -> Result<ParsedStatement, StatementError> {
        let mut transactions = TransactionSet::new();
        let mut pages_with_text = 0;

        for page in self.pages(path)? {
            pages_with_text += 1;
            for tx in parse_page(&page) {
                transactions.push(tx);
            }
        }

        if !transactions.is_empty() {
            info!(
                "Found {} transactions in {}",
                transactions.len(),
                display_name(path)
            );
        }

        Ok(ParsedStatement {
            path: path.to_path_buf(),
            pages_with_text,
            transactions,
        })
    }

    /// Read every statement in `dir` and concatenate their expenses.
    ///
    /// Unreadable or empty statements are recorded as issues and skipped.
    /// Only a directory that cannot be listed is an error.
    pub fn process_dir(&self, dir: &Path) -> Result<BatchReport, StatementError> {
        let documents = self.list_documents(dir)?;
        let mut report = BatchReport::new(dir);

        if documents.is_empty() {
            warn!(
                "No .{} statements found in {}",
                self.config.extension,
                dir.display()
            );
            return Ok(report);
        }

        for path in documents {
            info!("Reading transactions from {}", display_name(&path));
            match self.process_file(&path) {
                Ok(parsed) if parsed.transactions.is_empty() => {
                    warn!("No transactions read from {}", display_name(&path));
                    report.issues.push(DocumentIssue {
                        error: StatementError::NoTransactionsFound(path.clone()),
                        path,
                    });
                }
                Ok(parsed) => {
                    report.documents_read += 1;
                    report.transactions.extend(parsed.transactions);
                }
                Err(error) => {
                    warn!("{error}");
                    report.issues.push(DocumentIssue { path, error });
                }
            }
        }

        if report.transactions.is_empty() {
            warn!("No transactions found in {}", dir.display());
        }

        Ok(report)
    }

    fn list_documents(&self, dir: &Path) -> Result<Vec<PathBuf>, StatementError> {
        let io_err = |source: std::io::Error| StatementError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut documents = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && self.config.matches(&path) {
                documents.push(path);
            }
        }
        documents.sort();
        Ok(documents)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
