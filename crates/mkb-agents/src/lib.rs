//! Agents and the research pipeline
//!
//! Three narrowly scoped agents plus the machinery around them:
//! - [`ResearchCurator`] — gathers findings on a topic, degrading to a
//!   labeled fallback document when generation fails
//! - [`DocumentationWriter`] — synthesizes persisted research into a
//!   documentation artifact, retrying transient generation failures
//! - [`Maintainer`] — index regeneration and knowledge-gap analysis
//! - [`Orchestrator`] — the sequential research → synthesize → index
//!   pipeline over the three
//! - [`Worker`] — the single background consumer of approved tasks

pub mod curator;
pub mod error;
pub mod maintainer;
pub mod orchestrator;
pub mod worker;
pub mod writer;

pub use curator::ResearchCurator;
pub use error::PipelineError;
pub use maintainer::Maintainer;
pub use orchestrator::{Orchestrator, PipelineOutcome};
pub use worker::{Worker, WorkerConfig};
pub use writer::DocumentationWriter;
