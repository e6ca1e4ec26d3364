//! Synthesis stage
//!
//! Reads the persisted research back from disk, asks the generator for a
//! documentation artifact through the retry policy, and persists whatever
//! comes out. Exhausted retries produce an error-typed document that embeds
//! the raw research so nothing is lost.

use crate::error::PipelineError;
use mkb_classify::Classifier;
use mkb_generate::{GenerationRequest, Generator, RetryPolicy};
use mkb_store::{Category, KnowledgeBase, Metadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const AGENT_NAME: &str = "DocumentationWriter";
const DEFAULT_TITLE: &str = "Documentation";
const ERROR_TITLE: &str = "Documentation (Error)";

/// Characters of research content fed to the classifier.
const CLASSIFY_CONTEXT_CHARS: usize = 500;

/// Synthesizes research documents into categorized documentation
pub struct DocumentationWriter {
    kb: KnowledgeBase,
    generator: Arc<dyn Generator>,
    classifier: Classifier,
    retry: RetryPolicy,
}

impl DocumentationWriter {
    #[must_use]
    pub fn new(kb: KnowledgeBase, generator: Arc<dyn Generator>) -> Self {
        Self {
            kb,
            generator,
            classifier: Classifier::new(),
            retry: RetryPolicy::new(),
        }
    }

    /// With a non-default retry policy. For tests.
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Synthesize documentation from the research at `research_path`.
    ///
    /// Returns the documentation path and its classified category.
    ///
    /// # Errors
    ///
    /// Only store I/O failures propagate; an exhausted generation is
    /// persisted as an error document instead.
    pub async fn synthesize(
        &self,
        topic: &str,
        source_url: &str,
        research_path: &Path,
        doc_type: &str,
        audience: &str,
    ) -> Result<(PathBuf, Category), PipelineError> {
        let research = self.kb.read_document(research_path)?;
        let classify_context: String = research.body.chars().take(CLASSIFY_CONTEXT_CHARS).collect();
        let category = self.classifier.classify(topic, &classify_context, source_url);

        let prompt = synthesis_prompt(topic, &research.body, doc_type, audience);
        let request = GenerationRequest::new(prompt);

        let mut metadata = Metadata::new();
        metadata.insert("topic".into(), topic.into());
        metadata.insert("written_by".into(), AGENT_NAME.into());
        metadata.insert("doc_type".into(), doc_type.into());
        metadata.insert("audience".into(), audience.into());

        match self.retry.run(self.generator.as_ref(), &request).await {
            Ok(output) => {
                metadata.insert("type".into(), "documentation".into());
                let title = extract_title(&output).unwrap_or(DEFAULT_TITLE).to_string();
                let path = self.kb.add_document(category, &title, &output, metadata)?;
                tracing::info!(topic, %category, path = %path.display(), "documentation persisted");
                Ok((path, category))
            }
            Err(e) => {
                tracing::warn!(topic, error = %e, "synthesis failed, writing error document");
                metadata.insert("type".into(), "error".into());
                metadata.insert("error".into(), e.to_string().into());
                let body = format!(
                    "## Synthesis Failed\n\n\
                     Documentation generation for **{topic}** failed: {e}\n\n\
                     The raw research is preserved below.\n\n---\n\n{}",
                    research.body
                );
                let path = self.kb.add_document(category, ERROR_TITLE, &body, metadata)?;
                Ok((path, category))
            }
        }
    }
}

/// First `# ` heading of the generated output, when there is one.
fn extract_title(output: &str) -> Option<&str> {
    output
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("# "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn synthesis_prompt(topic: &str, research: &str, doc_type: &str, audience: &str) -> String {
    format!(
        "Write a {doc_type} document for a {audience} audience about the \
         topic below, based strictly on the research findings. Start with a \
         markdown `# ` title line.\n\n\
         Topic: {topic}\n\nResearch findings:\n\n{research}"
    )
}
