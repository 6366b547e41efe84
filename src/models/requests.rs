use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::{Candidate, MatchingParams, SolverKind, Sponsor};

/// Request to run the matching engine over two tables
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignmentRequest {
    #[validate(length(max = 5000), custom(function = "sponsor_ids_present"))]
    pub sponsors: Vec<Sponsor>,
    #[validate(length(max = 5000), custom(function = "candidate_ids_present"))]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    #[validate(nested)]
    pub options: AssignmentOptions,
}

/// Per-request overrides of the configured matching settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AssignmentOptions {
    #[serde(alias = "max_candidates_per_sponsor", rename = "maxCandidatesPerSponsor")]
    #[validate(range(min = 0, max = 100))]
    pub max_candidates_per_sponsor: Option<usize>,
    #[serde(alias = "restrict_timezone", rename = "restrictTimezone")]
    pub restrict_timezone: Option<bool>,
    pub solver: Option<SolverKind>,
    /// Include the side-by-side review listing in the response
    #[serde(default, rename = "includeReview")]
    pub include_review: bool,
}

impl AssignmentOptions {
    /// Apply the overrides on top of configured parameters
    pub fn apply(&self, base: &MatchingParams) -> MatchingParams {
        let mut params = base.clone();
        if let Some(max) = self.max_candidates_per_sponsor {
            params.max_candidates_per_sponsor = max;
        }
        if let Some(restrict) = self.restrict_timezone {
            params.restrict_timezone = restrict;
        }
        if let Some(solver) = self.solver {
            params.solver = solver;
        }
        params
    }
}

fn sponsor_ids_present(sponsors: &[Sponsor]) -> Result<(), ValidationError> {
    if sponsors.iter().any(|s| s.id().trim().is_empty()) {
        return Err(ValidationError::new("blank_sponsor_id"));
    }
    Ok(())
}

fn candidate_ids_present(candidates: &[Candidate]) -> Result<(), ValidationError> {
    if candidates.iter().any(|c| c.id.trim().is_empty()) {
        return Err(ValidationError::new("blank_candidate_id"));
    }
    Ok(())
}
