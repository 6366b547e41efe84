// Core algorithm exports
pub mod eligibility;
pub mod matcher;
pub mod profile;
pub mod similarity;
pub mod solver;
pub mod timezone;

pub use eligibility::{build_eligibility, EligibilityRelation, ExclusionReasons, SeniorityLadder};
pub use matcher::{MatchOutcome, Matcher};
pub use profile::{build_profile, build_profiles, validate_field_lists};
pub use similarity::{score_profiles, ScoreMatrix};
pub use solver::{solve, Placement};
pub use timezone::parse_offset;
