//! Read-only candidate/job repository.
//!
//! The chat panel never owns data; it asks a repository for jobs and
//! candidate pools. `InMemoryRepository` serves the bundled fixtures.

pub mod memory;
pub mod traits;

pub use memory::InMemoryRepository;
pub use traits::{CandidateRepository, PipelineSummary};
