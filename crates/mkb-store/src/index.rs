//! Whole-store index regeneration
//!
//! `INDEX.md` is a derived artifact: one markdown document listing every
//! stored document grouped by category. It is fully regenerated on every
//! run — never incrementally updated — and is idempotent except for the
//! embedded "last updated" timestamp. Each write replaces the whole file,
//! so concurrent regenerations race benignly (last writer wins).

use crate::category::Category;
use crate::error::StoreError;
use crate::store::KnowledgeBase;
use crate::INDEX_FILENAME;
use chrono::Local;
use std::fs;
use std::path::PathBuf;

/// Regenerates `INDEX.md` from the current folder contents
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    kb: KnowledgeBase,
}

impl IndexBuilder {
    #[inline]
    #[must_use]
    pub fn new(kb: KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Rewrite the index file and return its path relative to the root.
    pub fn rebuild(&self) -> Result<PathBuf, StoreError> {
        let content = self.render(&Local::now().format("%Y-%m-%d %H:%M:%S").to_string())?;
        let abs = self.kb.base_path().join(INDEX_FILENAME);
        fs::write(&abs, content).map_err(|e| StoreError::io(&abs, e))?;
        tracing::info!("index regenerated");
        Ok(PathBuf::from(INDEX_FILENAME))
    }

    /// Render the index body with the given "last updated" stamp.
    ///
    /// Split out from [`rebuild`](Self::rebuild) so idempotence can be
    /// checked without the timestamp in the way.
    pub fn render(&self, last_updated: &str) -> Result<String, StoreError> {
        let mut out = String::from("# Knowledge Base Index\n\n");
        out.push_str(&format!("*Last updated: {last_updated}*\n\n"));

        let mut total = 0usize;
        for category in Category::ALL {
            out.push_str(&format!("## {}\n", category.heading()));
            out.push_str(&format!("*{}*\n\n", category.description()));

            let files = self.kb.list(category)?;
            if files.is_empty() {
                out.push_str("*No documents yet*\n");
            } else {
                total += files.len();
                for rel in &files {
                    let name = rel
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or_default();
                    let title = name.trim_end_matches(".md").replace('_', " ");
                    out.push_str(&format!("- [{title}]({})\n", rel.display()));
                }
            }
            out.push('\n');
        }

        out.push_str(&format!("\n---\n**Total Documents: {total}**\n"));
        Ok(out)
    }
}
