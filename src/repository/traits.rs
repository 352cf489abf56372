//! `CandidateRepository` trait: the query surface the co-pilot depends on.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::RepositoryError;
use crate::model::{Candidate, Job, SourceKey};

/// Per-source candidate counts used by the panel greeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub talent_match: usize,
    pub syndication: usize,
    pub auto_sourcing: usize,
    /// Highest match score across all pools, if any candidate exists.
    pub top_score: Option<u8>,
}

/// Backend-agnostic read access to jobs and sourced candidates.
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    /// All open jobs.
    async fn jobs(&self) -> Result<Vec<Job>, RepositoryError>;

    /// Look up a job by id.
    async fn job(&self, job_id: &str) -> Result<Job, RepositoryError>;

    /// Candidates found by one sourcing pool for a job.
    async fn candidates_by_source(
        &self,
        job_id: &str,
        source: SourceKey,
    ) -> Result<Vec<Candidate>, RepositoryError>;

    /// Consolidated candidates: every pool, highest match score first.
    ///
    /// Ties keep pool order (talent match, syndication, auto sourcing).
    async fn all_candidates(&self, job_id: &str) -> Result<Vec<Candidate>, RepositoryError> {
        let mut all = Vec::new();
        for source in SourceKey::ALL {
            all.extend(self.candidates_by_source(job_id, source).await?);
        }
        all.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        Ok(all)
    }

    /// Counts per pool plus the top consolidated score.
    async fn summary(&self, job_id: &str) -> Result<PipelineSummary, RepositoryError> {
        let talent_match = self
            .candidates_by_source(job_id, SourceKey::TalentMatch)
            .await?;
        let syndication = self
            .candidates_by_source(job_id, SourceKey::Syndication)
            .await?;
        let auto_sourcing = self
            .candidates_by_source(job_id, SourceKey::AutoSourcing)
            .await?;
        let top_score = talent_match
            .iter()
            .chain(&syndication)
            .chain(&auto_sourcing)
            .map(|c| c.match_score)
            .max();
        Ok(PipelineSummary {
            talent_match: talent_match.len(),
            syndication: syndication.len(),
            auto_sourcing: auto_sourcing.len(),
            top_score,
        })
    }
}
