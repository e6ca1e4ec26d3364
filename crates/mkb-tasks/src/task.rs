//! Task identity and record

use crate::status::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Unique, creation-ordered task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Ulid);

impl TaskId {
    /// Fresh identifier stamped with the current time.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse from its canonical string form.
    ///
    /// # Errors
    ///
    /// Fails when `s` is not a valid ULID.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ulid::from_string(s).map(Self)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A queued research request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchTask {
    /// Identity, also the queue ordering key
    pub id: TaskId,
    /// What to research
    pub topic: String,
    /// Free-form context supplied alongside the topic
    pub context: String,
    /// Where the request came from, e.g. `manual` or `web`
    pub source_type: String,
    /// Optional source link
    pub source_url: String,
    /// Lifecycle state
    pub status: TaskStatus,
    /// Submission time
    pub created_at: DateTime<Utc>,
    /// Set when the task reaches a terminal working state
    pub completed_at: Option<DateTime<Utc>>,
    /// Failure detail, set only in the error state
    pub error: Option<String>,
}

impl ResearchTask {
    /// New pending task for `topic`.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            topic: topic.into(),
            context: String::new(),
            source_type: "manual".to_string(),
            source_url: String::new(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    /// With submission context.
    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// With a source label.
    #[inline]
    #[must_use]
    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = source_type.into();
        self
    }

    /// With a source link.
    #[inline]
    #[must_use]
    pub fn with_source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = source_url.into();
        self
    }
}
