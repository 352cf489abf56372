//! In-memory repository seeded with demo fixtures.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::model::{Candidate, Job, SourceKey};

use super::traits::CandidateRepository;

/// Repository holding jobs and per-source candidate pools in memory.
///
/// Pools are shared by every job; the job id only has to exist.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    jobs: Vec<Job>,
    pools: HashMap<SourceKey, Vec<Candidate>>,
}

impl InMemoryRepository {
    pub fn new(jobs: Vec<Job>, pools: HashMap<SourceKey, Vec<Candidate>>) -> Self {
        Self { jobs, pools }
    }

    /// Repository seeded with the demo jobs and candidate pools.
    pub fn with_fixtures() -> Self {
        let mut pools = HashMap::new();
        pools.insert(SourceKey::TalentMatch, talent_match_pool());
        pools.insert(SourceKey::Syndication, syndication_pool());
        pools.insert(SourceKey::AutoSourcing, auto_sourcing_pool());
        Self::new(fixture_jobs(), pools)
    }

    fn require_job(&self, job_id: &str) -> Result<&Job, RepositoryError> {
        self.jobs
            .iter()
            .find(|j| j.id == job_id)
            .ok_or_else(|| RepositoryError::JobNotFound {
                id: job_id.to_string(),
            })
    }
}

#[async_trait]
impl CandidateRepository for InMemoryRepository {
    async fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.jobs.clone())
    }

    async fn job(&self, job_id: &str) -> Result<Job, RepositoryError> {
        self.require_job(job_id).cloned()
    }

    async fn candidates_by_source(
        &self,
        job_id: &str,
        source: SourceKey,
    ) -> Result<Vec<Candidate>, RepositoryError> {
        self.require_job(job_id)?;
        Ok(self.pools.get(&source).cloned().unwrap_or_default())
    }
}

#[allow(clippy::too_many_arguments)]
fn job(
    id: &str,
    title: &str,
    department: &str,
    location: &str,
    experience: &str,
    salary: &str,
    description: &str,
    skills: &[&str],
) -> Job {
    Job {
        id: id.into(),
        title: title.into(),
        department: department.into(),
        location: location.into(),
        employment_type: "Full-time".into(),
        experience: experience.into(),
        salary: salary.into(),
        description: description.into(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

fn fixture_jobs() -> Vec<Job> {
    vec![
        job(
            "job-001",
            "Senior Software Engineer",
            "Engineering",
            "Bengaluru",
            "5-8 years",
            "30-45 LPA",
            "Build scalable distributed systems and microservices on the core platform team, and lead technical design for complex features.",
            &["Go", "Kubernetes", "PostgreSQL", "gRPC", "AWS"],
        ),
        job(
            "job-002",
            "Product Manager",
            "Product",
            "Hyderabad",
            "4-7 years",
            "25-40 LPA",
            "Own the product lifecycle for the AI-powered analytics platform alongside engineering, design, and data science.",
            &["Product Strategy", "Data Analytics", "Agile", "SQL", "Figma"],
        ),
        job(
            "job-003",
            "Frontend Engineer",
            "Engineering",
            "Bengaluru",
            "3-5 years",
            "20-32 LPA",
            "Build performant user interfaces for the SaaS platform with React, TypeScript, and the design system.",
            &["React", "TypeScript", "Tailwind CSS", "Next.js", "Figma"],
        ),
        job(
            "job-004",
            "DevOps Engineer",
            "Infrastructure",
            "Hyderabad",
            "4-6 years",
            "22-35 LPA",
            "Run CI/CD pipelines and cloud infrastructure for production systems with a 99.99% uptime target.",
            &["AWS", "Terraform", "Docker", "Kubernetes", "Jenkins"],
        ),
        job(
            "job-005",
            "Data Scientist",
            "Data Science",
            "Bengaluru",
            "3-6 years",
            "25-38 LPA",
            "Build recommendation models covering NLP, deep learning, and real-time prediction at scale.",
            &["Python", "TensorFlow", "NLP", "SQL", "Spark"],
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn candidate(
    id: &str,
    name: &str,
    current_role: &str,
    experience: &str,
    match_score: u8,
    skills: &[&str],
    source: &str,
    last_active: &str,
    status: &str,
) -> Candidate {
    Candidate {
        id: id.into(),
        name: name.into(),
        current_role: current_role.into(),
        experience: experience.into(),
        match_score,
        skills: skills.iter().map(|s| s.to_string()).collect(),
        source: source.into(),
        last_active: last_active.into(),
        status: status.into(),
    }
}

fn talent_match_pool() -> Vec<Candidate> {
    let db = "Internal DB";
    vec![
        candidate(
            "tm-001",
            "Arjun Krishnamurthy",
            "Staff Engineer at Flipkart",
            "7 years",
            94,
            &["Go", "Kubernetes", "Distributed Systems"],
            db,
            "2 days ago",
            "Available",
        ),
        candidate(
            "tm-002",
            "Priya Sharma",
            "Senior SDE at Amazon",
            "6 years",
            91,
            &["Java", "AWS", "Microservices"],
            db,
            "1 week ago",
            "Open to opportunities",
        ),
        candidate(
            "tm-003",
            "Rahul Menon",
            "Tech Lead at Razorpay",
            "8 years",
            88,
            &["Go", "PostgreSQL", "gRPC"],
            db,
            "3 days ago",
            "Available",
        ),
        candidate(
            "tm-004",
            "Deepika Nair",
            "Platform Engineer at Swiggy",
            "5 years",
            85,
            &["Python", "Kubernetes", "AWS"],
            db,
            "5 days ago",
            "Passively looking",
        ),
        candidate(
            "tm-005",
            "Vikram Reddy",
            "SDE-3 at Google",
            "6 years",
            82,
            &["C++", "Distributed Systems", "ML"],
            db,
            "1 day ago",
            "Available",
        ),
        candidate(
            "tm-006",
            "Ananya Gupta",
            "Backend Lead at Zerodha",
            "7 years",
            79,
            &["Go", "Redis", "PostgreSQL"],
            db,
            "4 days ago",
            "Open to opportunities",
        ),
    ]
}

fn syndication_pool() -> Vec<Candidate> {
    let applicant = "Active applicant";
    vec![
        candidate(
            "sy-001",
            "Karthik Iyer",
            "Senior Developer at Infosys",
            "6 years",
            87,
            &["Java", "Spring Boot", "AWS"],
            "Naukri",
            "Applied 3 days ago",
            applicant,
        ),
        candidate(
            "sy-002",
            "Sneha Patel",
            "SDE-2 at TCS",
            "5 years",
            83,
            &["Python", "Docker", "Kubernetes"],
            "Indeed",
            "Applied 1 day ago",
            applicant,
        ),
        candidate(
            "sy-003",
            "Mohammed Ali",
            "Full Stack Dev at Wipro",
            "4 years",
            80,
            &["React", "Node.js", "MongoDB"],
            "Naukri",
            "Applied 5 days ago",
            applicant,
        ),
        candidate(
            "sy-004",
            "Ritu Verma",
            "Software Engineer at Mindtree",
            "5 years",
            77,
            &["Java", "Microservices", "AWS"],
            "LinkedIn Jobs",
            "Applied 2 days ago",
            applicant,
        ),
        candidate(
            "sy-005",
            "Aditya Kulkarni",
            "DevOps at HCL",
            "6 years",
            75,
            &["Terraform", "AWS", "CI/CD"],
            "Indeed",
            "Applied 4 days ago",
            applicant,
        ),
    ]
}

fn auto_sourcing_pool() -> Vec<Candidate> {
    let li = "LinkedIn";
    vec![
        candidate(
            "as-001",
            "Meera Joshi",
            "Principal Engineer at Microsoft",
            "9 years",
            96,
            &["Go", "Azure", "Distributed Systems"],
            li,
            "Active on LinkedIn",
            "Not actively looking",
        ),
        candidate(
            "as-002",
            "Sanjay Hegde",
            "Staff SWE at Uber",
            "8 years",
            92,
            &["Go", "Kubernetes", "gRPC"],
            li,
            "Active on LinkedIn",
            "Open to work",
        ),
        candidate(
            "as-003",
            "Nandini Rao",
            "Tech Lead at Atlassian",
            "7 years",
            89,
            &["Java", "AWS", "PostgreSQL"],
            li,
            "Updated profile recently",
            "Not actively looking",
        ),
        candidate(
            "as-004",
            "Rohan Das",
            "Senior SDE at Oracle",
            "6 years",
            84,
            &["Java", "Cloud", "Microservices"],
            li,
            "Active on LinkedIn",
            "Open to work",
        ),
        candidate(
            "as-005",
            "Kavitha Subramaniam",
            "Architect at ThoughtWorks",
            "10 years",
            81,
            &["Go", "Python", "System Design"],
            li,
            "Active on LinkedIn",
            "Not actively looking",
        ),
        candidate(
            "as-006",
            "Amit Banerjee",
            "SDE-3 at Meta",
            "7 years",
            78,
            &["C++", "Python", "ML Infrastructure"],
            li,
            "Active on LinkedIn",
            "Open to work",
        ),
        candidate(
            "as-007",
            "Lakshmi Venkatesh",
            "Platform Lead at Stripe",
            "8 years",
            76,
            &["Ruby", "Go", "AWS"],
            li,
            "Updated profile recently",
            "Not actively looking",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn consolidated_is_sorted_by_score() {
        let repo = InMemoryRepository::with_fixtures();
        let all = repo.all_candidates("job-001").await.unwrap();
        assert_eq!(all.len(), 18);
        assert_eq!(all[0].name, "Meera Joshi");
        assert!(all.windows(2).all(|w| w[0].match_score >= w[1].match_score));
    }

    #[tokio::test]
    async fn summary_counts_each_pool() {
        let repo = InMemoryRepository::with_fixtures();
        let summary = repo.summary("job-001").await.unwrap();
        assert_eq!(summary.talent_match, 6);
        assert_eq!(summary.syndication, 5);
        assert_eq!(summary.auto_sourcing, 7);
        assert_eq!(summary.top_score, Some(96));
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let repo = InMemoryRepository::with_fixtures();
        let err = repo
            .candidates_by_source("job-999", SourceKey::TalentMatch)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::JobNotFound { .. }));
        assert!(repo.job("job-999").await.is_err());
    }

    #[tokio::test]
    async fn empty_repository_has_no_top_score() {
        let repo = InMemoryRepository::new(fixture_jobs(), HashMap::new());
        let summary = repo.summary("job-002").await.unwrap();
        assert_eq!(summary.top_score, None);
        assert!(repo.all_candidates("job-002").await.unwrap().is_empty());
    }
}
