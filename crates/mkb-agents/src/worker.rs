//! Background task consumer
//!
//! A single loop: claim the oldest approved task, run the pipeline, file
//! the outputs under the detected category, regenerate the index, record
//! the outcome. Failures mark the task `error` and the loop keeps going;
//! nothing here panics or exits on a bad task. Shutdown is a watch channel
//! so the loop ends between tasks, never mid-task.

use crate::orchestrator::{Orchestrator, DEFAULT_AUDIENCE, DEFAULT_DOC_TYPE};
use mkb_classify::Classifier;
use mkb_store::{IndexBuilder, KnowledgeBase};
use mkb_tasks::{ResearchTask, TaskRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Worker tuning
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Sleep between polls when the queue is empty
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl WorkerConfig {
    /// With a non-default poll interval.
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// The single consumer of approved research tasks
pub struct Worker {
    kb: KnowledgeBase,
    repo: Arc<dyn TaskRepository>,
    orchestrator: Orchestrator,
    classifier: Classifier,
    config: WorkerConfig,
}

impl Worker {
    #[must_use]
    pub fn new(
        kb: KnowledgeBase,
        repo: Arc<dyn TaskRepository>,
        orchestrator: Orchestrator,
        config: WorkerConfig,
    ) -> Self {
        Self {
            kb,
            repo,
            orchestrator,
            classifier: Classifier::new(),
            config,
        }
    }

    /// Run until `shutdown` flips to true.
    ///
    /// Claimed tasks always finish; the shutdown check sits between tasks.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(poll_secs = self.config.poll_interval.as_secs_f64(), "worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.repo.next_approved().await {
                Some(task) => self.process(task).await,
                None => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                        _ = shutdown.changed() => {}
                    }
                }
            }
        }
        tracing::info!("worker stopped");
    }

    /// Run the pipeline for one claimed task and record the outcome.
    async fn process(&self, task: ResearchTask) {
        tracing::info!(task = %task.id, topic = %task.topic, "task claimed");
        match self.execute(&task).await {
            Ok(()) => {
                if let Err(e) = self.repo.set_completed(task.id).await {
                    tracing::error!(task = %task.id, error = %e, "could not mark task completed");
                }
            }
            Err(message) => {
                tracing::warn!(task = %task.id, error = %message, "task failed");
                if let Err(e) = self.repo.set_error(task.id, message).await {
                    tracing::error!(task = %task.id, error = %e, "could not mark task failed");
                }
            }
        }
    }

    async fn execute(&self, task: &ResearchTask) -> Result<(), String> {
        let category = self
            .classifier
            .classify(&task.topic, &task.context, &task.source_url);

        let outcome = self
            .orchestrator
            .research_and_document(
                &task.topic,
                &task.context,
                &task.source_url,
                DEFAULT_DOC_TYPE,
                DEFAULT_AUDIENCE,
            )
            .await
            .map_err(|e| e.to_string())?;

        // File both artifacts under the task-level category, then refresh
        // the index so it never points at the old locations.
        self.kb
            .relocate(&outcome.research_path, category)
            .map_err(|e| e.to_string())?;
        self.kb
            .relocate(&outcome.documentation_path, category)
            .map_err(|e| e.to_string())?;
        IndexBuilder::new(self.kb.clone())
            .rebuild()
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkb_generate::StubGenerator;
    use mkb_tasks::{InMemoryTaskRepository, TaskStatus};
    use tempfile::TempDir;

    fn temp_kb() -> (TempDir, KnowledgeBase) {
        let dir = TempDir::new().unwrap();
        let kb = KnowledgeBase::open(dir.path().join("kb")).unwrap();
        (dir, kb)
    }

    async fn wait_for_terminal(
        repo: &InMemoryTaskRepository,
        id: mkb_tasks::TaskId,
    ) -> TaskStatus {
        for _ in 0..200 {
            let status = repo.get(id).await.unwrap().status;
            if status.is_terminal() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task never reached a terminal state");
    }

    #[tokio::test]
    async fn approved_task_runs_to_completed_with_relocated_documents() {
        let (_dir, kb) = temp_kb();
        let stub = Arc::new(StubGenerator::script([
            Ok("midnight research findings".to_string()),
            Ok("# Midnight Notes\n\nbody".to_string()),
        ]));
        let repo = Arc::new(InMemoryTaskRepository::new());

        let task = ResearchTask::new("Midnight privacy features");
        let id = task.id;
        repo.insert(task).await.unwrap();
        repo.update_status(id, TaskStatus::Approved).await.unwrap();

        let worker = Worker::new(
            kb.clone(),
            Arc::clone(&repo) as Arc<dyn TaskRepository>,
            Orchestrator::new(kb.clone(), stub),
            WorkerConfig::default().with_poll_interval(Duration::from_millis(10)),
        );
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { worker.run(rx).await });

        let status = wait_for_terminal(&repo, id).await;
        assert_eq!(status, TaskStatus::Completed);

        // Both artifacts ended up under the task-level category.
        let hits = kb.search("midnight", Some(mkb_store::Category::Midnight)).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(repo.get(id).await.unwrap().completed_at.is_some());

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn pending_tasks_are_left_alone() {
        let (_dir, kb) = temp_kb();
        let repo = Arc::new(InMemoryTaskRepository::new());
        let task = ResearchTask::new("untouched");
        let id = task.id;
        repo.insert(task).await.unwrap();

        let worker = Worker::new(
            kb.clone(),
            Arc::clone(&repo) as Arc<dyn TaskRepository>,
            Orchestrator::new(kb, Arc::new(StubGenerator::always("x"))),
            WorkerConfig::default().with_poll_interval(Duration::from_millis(10)),
        );
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { worker.run(rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(repo.get(id).await.unwrap().status, TaskStatus::Pending);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let (_dir, kb) = temp_kb();
        let repo = Arc::new(InMemoryTaskRepository::new());
        let worker = Worker::new(
            kb.clone(),
            Arc::clone(&repo) as Arc<dyn TaskRepository>,
            Orchestrator::new(kb, Arc::new(StubGenerator::always("x"))),
            WorkerConfig::default().with_poll_interval(Duration::from_millis(10)),
        );
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { worker.run(rx).await });

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker did not stop")
            .unwrap();
    }
}
