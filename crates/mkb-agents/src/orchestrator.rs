//! The research → synthesize → index pipeline
//!
//! Stages run sequentially and each one persists its output before the
//! next starts, so a crash between stages loses nothing already written.
//! Generation failures never escape: stage 1 degrades to a fallback
//! finding, stage 2 to an error document, and stage 3 is pure store work.

use crate::curator::ResearchCurator;
use crate::error::PipelineError;
use crate::writer::DocumentationWriter;
use mkb_generate::Generator;
use mkb_store::{Category, IndexBuilder, KnowledgeBase};
use std::path::PathBuf;
use std::sync::Arc;

/// Default documentation style when the caller does not pick one.
pub const DEFAULT_DOC_TYPE: &str = "technical_summary";
/// Default audience when the caller does not pick one.
pub const DEFAULT_AUDIENCE: &str = "technical";

/// Everything one pipeline run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Stage-1 research document
    pub research_path: PathBuf,
    /// Stage-2 documentation (or error) document
    pub documentation_path: PathBuf,
    /// Category the documentation was filed under
    pub category: Category,
    /// Regenerated index
    pub index_path: PathBuf,
}

/// Runs the three pipeline stages in order
pub struct Orchestrator {
    kb: KnowledgeBase,
    curator: ResearchCurator,
    writer: DocumentationWriter,
}

impl Orchestrator {
    #[must_use]
    pub fn new(kb: KnowledgeBase, generator: Arc<dyn Generator>) -> Self {
        Self {
            curator: ResearchCurator::new(kb.clone(), Arc::clone(&generator)),
            writer: DocumentationWriter::new(kb.clone(), generator),
            kb,
        }
    }

    /// Replace the writer, e.g. to inject a zero-delay retry policy.
    #[must_use]
    pub fn with_writer(mut self, writer: DocumentationWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Run the full pipeline for `topic`.
    ///
    /// # Errors
    ///
    /// Only store I/O failures propagate.
    pub async fn research_and_document(
        &self,
        topic: &str,
        context: &str,
        source_url: &str,
        doc_type: &str,
        audience: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        tracing::info!(topic, "pipeline started");

        let research_path = self.curator.research(topic, context).await?;
        let (documentation_path, category) = self
            .writer
            .synthesize(topic, source_url, &research_path, doc_type, audience)
            .await?;
        let index_path = IndexBuilder::new(self.kb.clone()).rebuild()?;

        tracing::info!(topic, %category, "pipeline finished");
        Ok(PipelineOutcome {
            research_path,
            documentation_path,
            category,
            index_path,
        })
    }
}
