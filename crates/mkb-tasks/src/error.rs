//! Task queue errors

use crate::status::TaskStatus;
use crate::task::TaskId;
use thiserror::Error;

/// Errors from the task repository
#[derive(Debug, Error)]
pub enum TaskError {
    /// No task with this id
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Requested status change violates the lifecycle table
    #[error("illegal transition for task {id}: {from} -> {to}")]
    IllegalTransition {
        /// Task whose transition was rejected
        id: TaskId,
        /// Current state
        from: TaskStatus,
        /// Requested state
        to: TaskStatus,
    },

    /// Submitted task is not acceptable
    #[error("invalid task: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_transition_names_both_states() {
        let id = TaskId::new();
        let err = TaskError::IllegalTransition {
            id,
            from: TaskStatus::Pending,
            to: TaskStatus::Completed,
        };
        let text = err.to_string();
        assert!(text.contains("pending -> completed"));
        assert!(text.contains(&id.to_string()));
    }
}
