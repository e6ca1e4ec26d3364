//! Task lifecycle state machine
//!
//! ```text
//! pending ──▶ approved ──▶ processing ──▶ completed
//!    │                          │
//!    └──▶ denied                └──▶ error
//! ```
//!
//! `denied`, `completed`, and `error` are terminal. Every status change
//! goes through [`TaskStatus::allowed_transitions`]; anything else is an
//! illegal transition.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a research task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Submitted, awaiting a human decision
    Pending,
    /// Cleared for the worker
    Approved,
    /// Rejected by a human, terminal
    Denied,
    /// Claimed by the worker
    Processing,
    /// Worker finished, terminal
    Completed,
    /// Worker failed, terminal
    Error,
}

impl TaskStatus {
    /// States reachable from `self` in one step.
    #[must_use]
    pub fn allowed_transitions(self) -> Vec<TaskStatus> {
        match self {
            Self::Pending => vec![Self::Approved, Self::Denied],
            Self::Approved => vec![Self::Processing],
            Self::Processing => vec![Self::Completed, Self::Error],
            Self::Denied | Self::Completed | Self::Error => vec![],
        }
    }

    /// Whether `to` is a legal next state.
    #[inline]
    #[must_use]
    pub fn can_transition_to(self, to: TaskStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Whether no further transitions exist.
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Lowercase wire name, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_branches_to_approved_or_denied() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Approved));
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Denied));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Processing));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
    }

    #[test]
    fn approved_only_moves_to_processing() {
        assert_eq!(
            TaskStatus::Approved.allowed_transitions(),
            vec![TaskStatus::Processing]
        );
    }

    #[test]
    fn processing_ends_in_completed_or_error() {
        assert!(TaskStatus::Processing.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::Processing.can_transition_to(TaskStatus::Error));
        assert!(!TaskStatus::Processing.can_transition_to(TaskStatus::Approved));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in [TaskStatus::Denied, TaskStatus::Completed, TaskStatus::Error] {
            assert!(status.is_terminal());
        }
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Approved.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
    }

    #[test]
    fn wire_names_are_lowercase() {
        assert_eq!(TaskStatus::Pending.to_string(), "pending");
        assert_eq!(TaskStatus::Processing.to_string(), "processing");
        assert_eq!(TaskStatus::Error.to_string(), "error");
    }
}
