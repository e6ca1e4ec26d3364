//! Research task queue
//!
//! Tasks are research requests waiting for a human decision and then for
//! the background worker:
//! - [`TaskId`] — sortable ULID identity, creation-ordered
//! - [`TaskStatus`] — the lifecycle state machine with an explicit
//!   transition table
//! - [`ResearchTask`] — the queued request itself
//! - [`TaskRepository`] — async storage seam, with
//!   [`InMemoryTaskRepository`] as the concurrent in-process implementation

pub mod error;
pub mod repo;
pub mod status;
pub mod task;

pub use error::TaskError;
pub use repo::{InMemoryTaskRepository, TaskRepository};
pub use status::TaskStatus;
pub use task::{ResearchTask, TaskId};
