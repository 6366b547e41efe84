// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AffiliationSource, Assignment, Candidate, MatchingParams, Participant, ProfileField, Role,
    ScoringParams, Skipped, SolverKind, Sponsor, SponsorAssignment, Unassigned, UnassignedReason,
    default_candidate_fields, default_levels, default_sponsor_fields, default_stop_words,
};
pub use requests::{AssignmentOptions, AssignmentRequest};
pub use responses::{AssignmentResponse, EligibilityEntry, EligibilityResponse, ErrorResponse, HealthResponse};
