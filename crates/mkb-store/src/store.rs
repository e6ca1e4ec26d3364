//! The knowledge base store
//!
//! All operations take and return paths *relative to the store root*
//! (`<category>/<file>.md`), which is also the shape the HTTP API and the
//! index use. Lookups scan the filesystem directly on every call.

use crate::category::Category;
use crate::document::{Document, Metadata};
use crate::error::StoreError;
use crate::INDEX_FILENAME;
use chrono::{DateTime, Local, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Filesystem-backed document store over the fixed category folders
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    base: PathBuf,
}

/// One search result with a preview of the matching lines
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Path relative to the store root
    pub path: PathBuf,
    /// File name
    pub name: String,
    /// Up to three matching lines, truncated
    pub preview: String,
}

/// Listing entry for recent-documents queries
#[derive(Debug, Clone, Serialize)]
pub struct DocEntry {
    /// Path relative to the store root
    pub path: PathBuf,
    /// File name
    pub name: String,
    /// Last modification time
    pub modified: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
}

/// Per-category document counts and sizes
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryStats {
    pub count: usize,
    pub size_bytes: u64,
    pub description: &'static str,
}

/// Whole-store statistics
#[derive(Debug, Clone, Serialize)]
pub struct KbStats {
    pub total_documents: usize,
    pub total_size_bytes: u64,
    pub categories: IndexMap<&'static str, CategoryStats>,
}

impl KnowledgeBase {
    /// Open a store at `base`, creating the category folder structure.
    ///
    /// Idempotent: existing folders and documents are left untouched.
    pub fn open(base: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base = base.into();
        for category in Category::ALL {
            let dir = base.join(category.folder());
            fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        }
        tracing::debug!(base = %base.display(), "knowledge base opened");
        Ok(Self { base })
    }

    /// Store root directory
    #[inline]
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base
    }

    /// Absolute folder for a category
    #[must_use]
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.base.join(category.folder())
    }

    /// Add a document under `category`.
    ///
    /// The filename is derived from the current local time (second
    /// resolution) and the title with spaces replaced by underscores; a
    /// same-second duplicate title silently overwrites the earlier file.
    /// `created`, `category` and `title` are injected into the metadata.
    ///
    /// Returns the new document's path relative to the store root.
    pub fn add_document(
        &self,
        category: Category,
        title: &str,
        body: &str,
        mut metadata: Metadata,
    ) -> Result<PathBuf, StoreError> {
        let now = Local::now();
        metadata.insert("created".into(), now.to_rfc3339().into());
        metadata.insert("category".into(), category.folder().into());
        metadata.insert("title".into(), title.into());

        let filename = format!(
            "{}_{}.md",
            now.format("%Y%m%d_%H%M%S"),
            title.replace([' ', '/'], "_")
        );
        let rel = PathBuf::from(category.folder()).join(filename);
        let abs = self.base.join(&rel);

        let text = Document::render(title, body, &metadata);
        fs::write(&abs, text).map_err(|e| StoreError::io(&abs, e))?;
        tracing::info!(path = %rel.display(), %category, "document added");
        Ok(rel)
    }

    /// Read a document's full text. `NotFound` if absent.
    pub fn get_document(&self, rel: &Path) -> Result<String, StoreError> {
        let abs = self.resolve(rel)?;
        if !abs.is_file() {
            return Err(StoreError::NotFound(rel.to_path_buf()));
        }
        fs::read_to_string(&abs).map_err(|e| StoreError::io(&abs, e))
    }

    /// Read and parse a document, tolerating both header conventions.
    pub fn read_document(&self, rel: &Path) -> Result<Document, StoreError> {
        let text = self.get_document(rel)?;
        let mut doc = Document::parse(&text);
        if doc.category.is_none() {
            doc.category = rel
                .components()
                .next()
                .and_then(|c| c.as_os_str().to_str())
                .and_then(|s| s.parse().ok());
        }
        Ok(doc)
    }

    /// Delete a document. Absent files are Ok (idempotent delete).
    pub fn delete(&self, rel: &Path) -> Result<(), StoreError> {
        let abs = self.resolve(rel)?;
        match fs::remove_file(&abs) {
            Ok(()) => {
                tracing::info!(path = %rel.display(), "document deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&abs, e)),
        }
    }

    /// Move a document into another category folder, keeping its filename.
    pub fn relocate(&self, rel: &Path, category: Category) -> Result<PathBuf, StoreError> {
        let abs = self.resolve(rel)?;
        if !abs.is_file() {
            return Err(StoreError::NotFound(rel.to_path_buf()));
        }
        let name = abs
            .file_name()
            .ok_or_else(|| StoreError::NotFound(rel.to_path_buf()))?;
        let new_rel = PathBuf::from(category.folder()).join(name);
        let new_abs = self.base.join(&new_rel);
        if new_abs == abs {
            return Ok(new_rel);
        }
        fs::rename(&abs, &new_abs).map_err(|e| StoreError::io(&new_abs, e))?;
        tracing::info!(from = %rel.display(), to = %new_rel.display(), "document relocated");
        Ok(new_rel)
    }

    /// Case-insensitive substring search over full document text.
    ///
    /// Scans every `.md` file under the target scope on every call; the
    /// index artifact is not part of the scope.
    pub fn search(
        &self,
        query: &str,
        category: Option<Category>,
    ) -> Result<Vec<PathBuf>, StoreError> {
        let needle = query.to_lowercase();
        let mut results = Vec::new();
        for rel in self.scoped_files(category)? {
            let abs = self.base.join(&rel);
            let text = fs::read_to_string(&abs).map_err(|e| StoreError::io(&abs, e))?;
            if text.to_lowercase().contains(&needle) {
                results.push(rel);
            }
        }
        Ok(results)
    }

    /// Search with previews of the matching lines.
    pub fn search_hits(
        &self,
        query: &str,
        category: Option<Category>,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let needle = query.to_lowercase();
        let mut hits = Vec::new();
        for rel in self.scoped_files(category)? {
            let abs = self.base.join(&rel);
            let text = fs::read_to_string(&abs).map_err(|e| StoreError::io(&abs, e))?;
            if !text.to_lowercase().contains(&needle) {
                continue;
            }
            let preview: String = text
                .lines()
                .filter(|l| l.to_lowercase().contains(&needle))
                .take(3)
                .collect::<Vec<_>>()
                .join("\n")
                .chars()
                .take(500)
                .collect();
            let name = rel
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            hits.push(SearchHit {
                path: rel,
                name,
                preview,
            });
        }
        Ok(hits)
    }

    /// List a category's documents, sorted by filename descending
    /// (newest first given the timestamp prefix).
    pub fn list(&self, category: Category) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.category_dir(category);
        let mut names = Vec::new();
        let entries = fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.ends_with(".md") && name != INDEX_FILENAME {
                names.push(name.to_string());
            }
        }
        names.sort_by(|a, b| b.cmp(a));
        Ok(names
            .into_iter()
            .map(|n| PathBuf::from(category.folder()).join(n))
            .collect())
    }

    /// Newest documents by modification time, across one category or all.
    pub fn recent(
        &self,
        category: Option<Category>,
        limit: usize,
    ) -> Result<Vec<DocEntry>, StoreError> {
        let mut entries = Vec::new();
        for rel in self.scoped_files(category)? {
            let abs = self.base.join(&rel);
            let meta = fs::metadata(&abs).map_err(|e| StoreError::io(&abs, e))?;
            let modified = meta
                .modified()
                .map_err(|e| StoreError::io(&abs, e))?
                .into();
            let name = rel
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            entries.push(DocEntry {
                path: rel,
                name,
                modified,
                size: meta.len(),
            });
        }
        entries.sort_by(|a, b| b.modified.cmp(&a.modified));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Per-category counts and sizes plus totals.
    pub fn stats(&self) -> Result<KbStats, StoreError> {
        let mut categories = IndexMap::new();
        let mut total_documents = 0;
        let mut total_size_bytes = 0;
        for category in Category::ALL {
            let mut stats = CategoryStats {
                description: category.description(),
                ..Default::default()
            };
            for rel in self.scoped_files(Some(category))? {
                let abs = self.base.join(&rel);
                let meta = fs::metadata(&abs).map_err(|e| StoreError::io(&abs, e))?;
                stats.count += 1;
                stats.size_bytes += meta.len();
            }
            total_documents += stats.count;
            total_size_bytes += stats.size_bytes;
            categories.insert(category.folder(), stats);
        }
        Ok(KbStats {
            total_documents,
            total_size_bytes,
            categories,
        })
    }

    /// Documents whose modification time is older than `days` days.
    pub fn outdated(&self, days: u64) -> Result<Vec<PathBuf>, StoreError> {
        let cutoff = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
        let mut out = Vec::new();
        for rel in self.scoped_files(None)? {
            let abs = self.base.join(&rel);
            let meta = fs::metadata(&abs).map_err(|e| StoreError::io(&abs, e))?;
            if meta.modified().map_err(|e| StoreError::io(&abs, e))? < cutoff {
                out.push(rel);
            }
        }
        Ok(out)
    }

    /// Documents whose filename marks them as failed-generation artifacts.
    pub fn find_error_documents(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut out = Vec::new();
        for rel in self.scoped_files(None)? {
            let name = rel
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_lowercase();
            if name.contains("error") {
                out.push(rel);
            }
        }
        Ok(out)
    }

    /// All `.md` files under the scope, relative to the store root.
    fn scoped_files(&self, category: Option<Category>) -> Result<Vec<PathBuf>, StoreError> {
        let categories: Vec<Category> = match category {
            Some(c) => vec![c],
            None => Category::ALL.to_vec(),
        };
        let mut files = Vec::new();
        for category in categories {
            let dir = self.category_dir(category);
            let entries = fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };
                if name.ends_with(".md") && name != INDEX_FILENAME {
                    files.push(PathBuf::from(category.folder()).join(name));
                }
            }
        }
        Ok(files)
    }

    /// Reject traversal outside the store root.
    fn resolve(&self, rel: &Path) -> Result<PathBuf, StoreError> {
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(StoreError::OutsideBase(rel.to_path_buf()));
        }
        Ok(self.base.join(rel))
    }
}
