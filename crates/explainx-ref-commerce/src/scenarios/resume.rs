//! Resume selection.
//!
//! Candidates come either from an uploaded file (already parsed) or from the
//! seeded mock generator. Both go through the same traced screening pipeline.

use serde::Serialize;

use explainx_core::TraceContext;

use crate::{
    functions::resume::{process_applications, Application, JobDescription, ScoredCandidate},
    mock_data::generate_applications,
};

/// Applicants simulated when the caller does not say how many.
pub const DEFAULT_SIMULATION_COUNT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateSource {
    Upload(Vec<Application>),
    Simulation { count: usize, seed: u64 },
}

impl CandidateSource {
    /// Short label reported in the selection result.
    pub fn label(&self) -> &'static str {
        match self {
            CandidateSource::Upload(_) => "upload",
            CandidateSource::Simulation { .. } => "simulation",
        }
    }

    /// The `SOURCE:` line shown above the report.
    pub fn note(&self) -> String {
        match self {
            CandidateSource::Upload(apps) => {
                format!("Processed {} candidates from uploaded file", apps.len())
            }
            CandidateSource::Simulation { count, .. } => {
                format!("Generated {} mock applications", count)
            }
        }
    }

    fn into_applications(self) -> Vec<Application> {
        match self {
            CandidateSource::Upload(apps) => apps,
            CandidateSource::Simulation { count, seed } => generate_applications(count, seed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResult {
    pub top_candidates: Vec<ScoredCandidate>,
    pub total_processed: usize,
    pub source: &'static str,
}

/// Screen every candidate from `source` against `jd`.
pub fn select_candidates(ctx: &TraceContext, jd: &JobDescription, source: CandidateSource) -> SelectionResult {
    let label = source.label();
    let applications = source.into_applications();
    let top_candidates = process_applications(ctx, &applications, jd);

    SelectionResult {
        top_candidates,
        total_processed: applications.len(),
        source: label,
    }
}

#[cfg(test)]
mod tests {
    use explainx_core::TraceContext;

    use super::*;

    fn jd() -> JobDescription {
        JobDescription { domain: "backend".to_string(), min_experience: 2.0, salary_budget: 120_000.0 }
    }

    #[test]
    fn source_labels_and_notes() {
        let upload = CandidateSource::Upload(Vec::new());
        assert_eq!(upload.label(), "upload");
        assert_eq!(upload.note(), "Processed 0 candidates from uploaded file");

        let sim = CandidateSource::Simulation { count: 40, seed: 1 };
        assert_eq!(sim.label(), "simulation");
        assert_eq!(sim.note(), "Generated 40 mock applications");
    }

    #[test]
    fn simulation_is_screened_in_six_calls() {
        let ctx = TraceContext::new();
        let result = select_candidates(&ctx, &jd(), CandidateSource::Simulation { count: 250, seed: 11 });
        assert_eq!(result.total_processed, 250);
        assert_eq!(result.source, "simulation");
        assert!(result.top_candidates.len() <= 10);
        assert_eq!(ctx.drain().len(), 6);
    }

    #[test]
    fn empty_upload_yields_no_candidates() {
        let ctx = TraceContext::new();
        let result = select_candidates(&ctx, &jd(), CandidateSource::Upload(Vec::new()));
        assert_eq!(result.total_processed, 0);
        assert!(result.top_candidates.is_empty());
    }
}
