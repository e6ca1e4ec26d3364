//! Research stage
//!
//! One generation call per topic. A failed call never aborts the pipeline:
//! the curator writes a fallback finding labeled as such, so the synthesis
//! stage always has a research document to read back.

use crate::error::PipelineError;
use mkb_generate::{GenerationRequest, Generator};
use mkb_store::{Category, KnowledgeBase, Metadata};
use std::path::PathBuf;
use std::sync::Arc;

const AGENT_NAME: &str = "ResearchCurator";
const FALLBACK_NAME: &str = "Fallback";

/// Gathers research findings for a topic and persists them under `research`
pub struct ResearchCurator {
    kb: KnowledgeBase,
    generator: Arc<dyn Generator>,
}

impl ResearchCurator {
    #[must_use]
    pub fn new(kb: KnowledgeBase, generator: Arc<dyn Generator>) -> Self {
        Self { kb, generator }
    }

    /// Research `topic` and persist the findings.
    ///
    /// Returns the research document's path relative to the store root.
    ///
    /// # Errors
    ///
    /// Only store I/O failures propagate; generation failures degrade to a
    /// fallback document.
    pub async fn research(&self, topic: &str, context: &str) -> Result<PathBuf, PipelineError> {
        let prompt = research_prompt(topic, context);
        let request = GenerationRequest::new(prompt);

        let mut metadata = Metadata::new();
        metadata.insert("type".into(), "research".into());
        metadata.insert("topic".into(), topic.into());
        if !context.is_empty() {
            metadata.insert("context".into(), context.into());
        }

        let body = match self.generator.generate(&request).await {
            Ok(findings) => {
                metadata.insert("researched_by".into(), AGENT_NAME.into());
                findings
            }
            Err(e) => {
                tracing::warn!(topic, error = %e, "research generation failed, writing fallback");
                metadata.insert("researched_by".into(), FALLBACK_NAME.into());
                fallback_body(topic, context, &e.to_string())
            }
        };

        let title = format!("Research: {topic}");
        let path = self
            .kb
            .add_document(Category::Research, &title, &body, metadata)?;
        tracing::info!(topic, path = %path.display(), "research persisted");
        Ok(path)
    }
}

fn research_prompt(topic: &str, context: &str) -> String {
    let mut prompt = format!(
        "Research the following topic and provide comprehensive findings \
         in markdown.\n\nTopic: {topic}\n"
    );
    if !context.is_empty() {
        prompt.push_str(&format!("Context: {context}\n"));
    }
    prompt.push_str(
        "\nCover: key concepts, current state, technical details, \
         relationships to Midnight and Cardano where relevant, and open \
         questions. Cite sources where known.",
    );
    prompt
}

fn fallback_body(topic: &str, context: &str, error: &str) -> String {
    format!(
        "## Research Findings (Fallback)\n\n\
         Automated research for **{topic}** was unavailable.\n\n\
         - Context: {context}\n\
         - Error: {error}\n\n\
         This placeholder preserves the request so the topic can be \
         revisited manually.",
        context = if context.is_empty() { "(none)" } else { context },
    )
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
    async fn persists_findings_under_research() {
        let (_dir, kb) = temp_kb();
        let stub = Arc::new(StubGenerator::always("## Findings\n\nDust is the fee asset."));
        let curator = ResearchCurator::new(kb.clone(), stub);

        let path = curator.research("Midnight dust", "fee model").await.unwrap();
        assert!(path.starts_with("research"));

        let doc = kb.read_document(&path).unwrap();
        assert_eq!(doc.title, "Research: Midnight dust");
        assert!(doc.body.contains("fee asset"));
        assert_eq!(
            doc.metadata.get("researched_by").and_then(|v| v.as_str()),
            Some("ResearchCurator")
        );
    }

    #[tokio::test]
    async fn generation_failure_degrades_to_fallback() {
        let (_dir, kb) = temp_kb();
        let stub = Arc::new(StubGenerator::script([Err(GenerationError::Connectivity(
            "refused".into(),
        ))]));
        let curator = ResearchCurator::new(kb.clone(), stub);

        let path = curator.research("Unreachable topic", "").await.unwrap();
        let doc = kb.read_document(&path).unwrap();
        assert_eq!(
            doc.metadata.get("researched_by").and_then(|v| v.as_str()),
            Some("Fallback")
        );
        assert!(doc.body.contains("refused"));
    }

    #[tokio::test]
    async fn prompt_includes_topic_and_context() {
        let (_dir, kb) = temp_kb();
        let stub = Arc::new(StubGenerator::always("findings"));
        let curator = ResearchCurator::new(kb, Arc::clone(&stub) as Arc<dyn Generator>);

        curator.research("zk rollups", "scaling").await.unwrap();
        let prompts = stub.prompts();
        assert!(prompts[0].contains("zk rollups"));
        assert!(prompts[0].contains("scaling"));
    }
}
