//! Task storage
//!
//! [`TaskRepository`] is the async seam between the HTTP surface, the CLI,
//! and the worker. [`InMemoryTaskRepository`] keeps tasks in a concurrent
//! map; `next_approved` is the worker's claim operation and flips the
//! oldest approved task to processing under that task's own map entry, so
//! two workers can never claim the same task.

use crate::error::TaskError;
use crate::status::TaskStatus;
use crate::task::{ResearchTask, TaskId};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

/// Async task storage
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Store a new task.
    ///
    /// # Errors
    ///
    /// Fails with [`TaskError::Invalid`] when the topic is empty.
    async fn insert(&self, task: ResearchTask) -> Result<(), TaskError>;

    /// Fetch one task.
    async fn get(&self, id: TaskId) -> Result<ResearchTask, TaskError>;

    /// All tasks, newest first.
    async fn all(&self) -> Vec<ResearchTask>;

    /// Move a task to `to`, enforcing the lifecycle table.
    async fn update_status(&self, id: TaskId, to: TaskStatus) -> Result<ResearchTask, TaskError>;

    /// Mark a processing task completed, stamping `completed_at`.
    async fn set_completed(&self, id: TaskId) -> Result<ResearchTask, TaskError>;

    /// Mark a processing task failed, recording `message`.
    async fn set_error(&self, id: TaskId, message: String) -> Result<ResearchTask, TaskError>;

    /// Remove a task. Removing an absent task is not an error.
    async fn delete(&self, id: TaskId);

    /// Claim the oldest approved task, flipping it to processing.
    ///
    /// Returns `None` when nothing is approved.
    async fn next_approved(&self) -> Option<ResearchTask>;
}

/// Concurrent in-process [`TaskRepository`]
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: DashMap<TaskId, ResearchTask>,
}

impl InMemoryTaskRepository {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_transition(
        &self,
        id: TaskId,
        to: TaskStatus,
    ) -> Result<ResearchTask, TaskError> {
        let mut entry = self.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        let from = entry.status;
        if !from.can_transition_to(to) {
            return Err(TaskError::IllegalTransition { id, from, to });
        }
        entry.status = to;
        if to.is_terminal() {
            entry.completed_at = Some(Utc::now());
        }
        tracing::info!(task = %id, %from, %to, "task transition");
        Ok(entry.clone())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: ResearchTask) -> Result<(), TaskError> {
        if task.topic.trim().is_empty() {
            return Err(TaskError::Invalid("topic must not be empty".into()));
        }
        tracing::info!(task = %task.id, topic = %task.topic, "task queued");
        self.tasks.insert(task.id, task);
        Ok(())
    }

    async fn get(&self, id: TaskId) -> Result<ResearchTask, TaskError> {
        self.tasks
            .get(&id)
            .map(|t| t.clone())
            .ok_or(TaskError::NotFound(id))
    }

    async fn all(&self) -> Vec<ResearchTask> {
        let mut tasks: Vec<ResearchTask> = self.tasks.iter().map(|t| t.clone()).collect();
        tasks.sort_by(|a, b| b.id.cmp(&a.id));
        tasks
    }

    async fn update_status(&self, id: TaskId, to: TaskStatus) -> Result<ResearchTask, TaskError> {
        self.apply_transition(id, to)
    }

    async fn set_completed(&self, id: TaskId) -> Result<ResearchTask, TaskError> {
        self.apply_transition(id, TaskStatus::Completed)
    }

    async fn set_error(&self, id: TaskId, message: String) -> Result<ResearchTask, TaskError> {
        self.apply_transition(id, TaskStatus::Error)?;
        let mut entry = self.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        entry.error = Some(message);
        Ok(entry.clone())
    }

    async fn delete(&self, id: TaskId) {
        self.tasks.remove(&id);
    }

    async fn next_approved(&self) -> Option<ResearchTask> {
        // Oldest first by ULID order. Claiming re-checks the status under
        // the entry lock, so a concurrent claim simply moves to the next
        // candidate.
        let mut candidates: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Approved)
            .map(|t| t.id)
            .collect();
        candidates.sort();

        for id in candidates {
            if let Ok(task) = self.apply_transition(id, TaskStatus::Processing) {
                return Some(task);
            }
        }
        None
    }
}
