//! Mentor Match - capacity-bounded sponsor/candidate matching engine
//!
//! This library pairs sponsors (mentors) with candidates (mentees). It builds
//! an eligibility relation, scores profile similarity with TF-IDF and cosine,
//! and solves the capacity-constrained assignment exactly with min-cost flow.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod report;
pub mod routes;

// Re-export commonly used types
pub use crate::core::{build_eligibility, score_profiles, solve, EligibilityRelation, MatchOutcome, Matcher, ScoreMatrix};
pub use error::MatchError;
pub use models::{Assignment, Candidate, MatchingParams, Participant, SolverKind, Sponsor, SponsorAssignment};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let outcome = Matcher::default().run(&[], &[]).unwrap();
        assert_eq!(outcome.assignment.assigned_count(), 0);
        assert_eq!(outcome.solver, SolverKind::Optimal);
    }
}
