//! Testing utilities for the MKB workspace
//!
//! Shared fixtures: temporary knowledge bases, seeded documents, canned
//! generator scripts.

#![allow(missing_docs)]

use mkb_generate::{GenerationError, StubGenerator};
use mkb_store::{Category, KnowledgeBase, Metadata};
use mkb_tasks::{InMemoryTaskRepository, ResearchTask, TaskId, TaskRepository, TaskStatus};
use std::path::PathBuf;
use tempfile::TempDir;

/// A knowledge base in a temporary directory. Dropping it removes the
/// files, so keep the fixture alive for the duration of the test.
pub struct TempKb {
    pub dir: TempDir,
    pub kb: KnowledgeBase,
}

pub fn temp_kb() -> TempKb {
    let dir = TempDir::new().unwrap();
    let kb = KnowledgeBase::open(dir.path().join("knowledge_base")).unwrap();
    TempKb { dir, kb }
}

/// Seed one document per given category, titled after the category.
pub fn seed_documents(kb: &KnowledgeBase, categories: &[Category]) -> Vec<PathBuf> {
    categories
        .iter()
        .map(|&category| {
            kb.add_document(
                category,
                &format!("{} Notes", category.heading()),
                &format!("Seed content for {category}."),
                Metadata::new(),
            )
            .unwrap()
        })
        .collect()
}

/// A generator scripted for one successful pipeline run: research findings
/// followed by a titled documentation artifact.
pub fn pipeline_script(research: &str, doc_title: &str) -> StubGenerator {
    StubGenerator::script([
        Ok(research.to_string()),
        Ok(format!("# {doc_title}\n\nGenerated body.")),
    ])
}

/// A generator whose every call fails with a connectivity error.
pub fn unreachable_generator(calls: usize) -> StubGenerator {
    StubGenerator::script(
        (0..calls).map(|_| Err(GenerationError::Connectivity("connection refused".into()))),
    )
}

/// Insert a task and walk it to `status` through legal transitions.
pub async fn task_in_status(
    repo: &InMemoryTaskRepository,
    topic: &str,
    status: TaskStatus,
) -> TaskId {
    let task = ResearchTask::new(topic);
    let id = task.id;
    repo.insert(task).await.unwrap();
    match status {
        TaskStatus::Pending => {}
        TaskStatus::Approved => {
            repo.update_status(id, TaskStatus::Approved).await.unwrap();
        }
        TaskStatus::Denied => {
            repo.update_status(id, TaskStatus::Denied).await.unwrap();
        }
        TaskStatus::Processing => {
            repo.update_status(id, TaskStatus::Approved).await.unwrap();
            repo.update_status(id, TaskStatus::Processing).await.unwrap();
        }
        TaskStatus::Completed => {
            repo.update_status(id, TaskStatus::Approved).await.unwrap();
            repo.update_status(id, TaskStatus::Processing).await.unwrap();
            repo.set_completed(id).await.unwrap();
        }
        TaskStatus::Error => {
            repo.update_status(id, TaskStatus::Approved).await.unwrap();
            repo.update_status(id, TaskStatus::Processing).await.unwrap();
            repo.set_error(id, "scripted failure".into()).await.unwrap();
        }
    }
    id
}
