use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::core::ExclusionReasons;
use crate::models::domain::{Skipped, SolverKind, SponsorAssignment, Unassigned};
use crate::report::ReviewRow;

/// Response for the assignment endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentResponse {
    #[serde(rename = "runId")]
    pub run_id: uuid::Uuid,
    #[serde(rename = "generatedAt")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub solver: SolverKind,
    pub assignments: Vec<SponsorAssignment>,
    pub unassigned: Vec<Unassigned>,
    pub skipped: Vec<Skipped>,
    #[serde(rename = "totalScore")]
    pub total_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<Vec<ReviewRow>>,
}

/// Excluded candidates of one sponsor
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityEntry {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub reasons: ExclusionReasons,
}

/// Response for the eligibility endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityResponse {
    /// Sponsor identifier → excluded candidates; empty list when none
    pub excluded: BTreeMap<String, Vec<EligibilityEntry>>,
    #[serde(rename = "excludedPairs")]
    pub excluded_pairs: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
