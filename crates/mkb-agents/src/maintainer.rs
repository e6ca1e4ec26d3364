//! Maintenance operations
//!
//! Index regeneration plus the one analysis that reads the whole store: a
//! knowledge-gap report generated from the current index and persisted
//! under `architecture`.

use crate::error::PipelineError;
use mkb_generate::{GenerationRequest, Generator};
use mkb_store::{Category, IndexBuilder, KnowledgeBase, Metadata, INDEX_FILENAME};
use std::path::PathBuf;
use std::sync::Arc;

const GAPS_TITLE: &str = "Knowledge Gap Analysis";

/// Store maintenance: index regeneration and gap analysis
pub struct Maintainer {
    kb: KnowledgeBase,
    generator: Arc<dyn Generator>,
}

impl Maintainer {
    #[must_use]
    pub fn new(kb: KnowledgeBase, generator: Arc<dyn Generator>) -> Self {
        Self { kb, generator }
    }

    /// Regenerate `INDEX.md`.
    pub fn rebuild_index(&self) -> Result<PathBuf, PipelineError> {
        Ok(IndexBuilder::new(self.kb.clone()).rebuild()?)
    }

    /// Ask the generator which topics the store is missing and persist the
    /// analysis under `architecture`.
    ///
    /// # Errors
    ///
    /// Unlike the pipeline stages there is no fallback artifact here;
    /// generation failures propagate.
    pub async fn analyze_gaps(&self) -> Result<PathBuf, PipelineError> {
        let index = match self.kb.get_document(std::path::Path::new(INDEX_FILENAME)) {
            Ok(text) => text,
            // A store that was never indexed still has an answer.
            Err(_) => IndexBuilder::new(self.kb.clone()).render("never")?,
        };

        let prompt = format!(
            "Below is the index of a blockchain research knowledge base \
             focused on Midnight and Cardano. Identify the most important \
             missing or under-covered topics and suggest concrete research \
             tasks, in markdown.\n\n{index}"
        );
        let analysis = self
            .generator
            .generate(&GenerationRequest::new(prompt))
            .await?;

        let mut metadata = Metadata::new();
        metadata.insert("type".into(), "gap_analysis".into());
        let path = self
            .kb
            .add_document(Category::Architecture, GAPS_TITLE, &analysis, metadata)?;
        tracing::info!(path = %path.display(), "gap analysis persisted");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkb_generate::{GenerationError, StubGenerator};
    use tempfile::TempDir;

    fn temp_kb() -> (TempDir, KnowledgeBase) {
        let dir = TempDir::new().unwrap();
        let kb = KnowledgeBase::open(dir.path().join("kb")).unwrap();
        (dir, kb)
    }

    #[tokio::test]
    async fn gap_analysis_lands_under_architecture() {
        let (_dir, kb) = temp_kb();
        kb.add_document(Category::Midnight, "Dust", "notes", Metadata::new())
            .unwrap();
        let stub = Arc::new(StubGenerator::always("## Gaps\n\n- governance coverage"));
        let maintainer = Maintainer::new(kb.clone(), Arc::clone(&stub) as Arc<dyn Generator>);
        maintainer.rebuild_index().unwrap();

        let path = maintainer.analyze_gaps().await.unwrap();
        assert!(path.starts_with("architecture"));
        // The prompt carried the real index.
        assert!(stub.prompts()[0].contains("Knowledge Base Index"));

        let doc = kb.read_document(&path).unwrap();
        assert_eq!(doc.title, "Knowledge Gap Analysis");
        assert!(doc.body.contains("governance"));
    }

    #[tokio::test]
    async fn gap_analysis_propagates_generation_failure() {
        let (_dir, kb) = temp_kb();
        let stub = Arc::new(StubGenerator::script([Err(GenerationError::Api {
            status: 500,
            message: "overloaded".into(),
        })]));
        let maintainer = Maintainer::new(kb, stub);

        let err = maintainer.analyze_gaps().await.unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
    }
}
