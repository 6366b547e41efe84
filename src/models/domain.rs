use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A programme participant, as loaded from one row of a sponsor or candidate table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Seniority level name, ranked through the configured ladder
    pub level: String,
    /// Institution tokens (employer, degree-granting body, ...)
    #[serde(default)]
    pub affiliations: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Raw time zone text such as `UTC+2` or `-5`
    #[serde(default)]
    pub timezone: Option<String>,
    /// Topical fields used to build the profile
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Participant {
    pub fn attribute(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(String::as_str)
    }
}

/// A participant offering guidance, with a bounded number of candidate slots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sponsor {
    #[serde(flatten)]
    pub participant: Participant,
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl Sponsor {
    pub fn id(&self) -> &str {
        &self.participant.id
    }

    /// Capacity after applying the programme-wide cap
    pub fn effective_capacity(&self, max_per_sponsor: usize) -> usize {
        match self.capacity {
            Some(own) => (own as usize).min(max_per_sponsor),
            None => max_per_sponsor,
        }
    }
}

/// A participant seeking guidance
pub type Candidate = Participant;

/// Which side of the programme a participant belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Sponsor,
    Candidate,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Sponsor => write!(f, "sponsor"),
            Role::Candidate => write!(f, "candidate"),
        }
    }
}

/// Candidates assigned to one sponsor, with the parallel list of similarity scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsorAssignment {
    #[serde(rename = "sponsorId")]
    pub sponsor_id: String,
    #[serde(rename = "candidateIds")]
    pub candidate_ids: Vec<String>,
    pub scores: Vec<f64>,
}

impl SponsorAssignment {
    pub fn empty(sponsor_id: impl Into<String>) -> Self {
        Self {
            sponsor_id: sponsor_id.into(),
            candidate_ids: Vec::new(),
            scores: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidate_ids.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedReason {
    /// Every sponsor is forbidden for this candidate
    NoEligibleSponsor,
    /// Eligible sponsors exist but their slots went to other candidates
    CapacityExhausted,
}

/// A candidate the solver could not place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unassigned {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub reason: UnassignedReason,
}

/// A candidate removed before matching because of its level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skipped {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub level: String,
}

/// Terminal output of one matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// One entry per sponsor, in sponsor identifier order
    pub sponsors: Vec<SponsorAssignment>,
    pub unassigned: Vec<Unassigned>,
}

impl Assignment {
    pub fn total_score(&self) -> f64 {
        self.sponsors.iter().flat_map(|s| s.scores.iter()).sum()
    }

    pub fn assigned_count(&self) -> usize {
        self.sponsors.iter().map(|s| s.candidate_ids.len()).sum()
    }

    pub fn for_sponsor(&self, sponsor_id: &str) -> Option<&SponsorAssignment> {
        self.sponsors.iter().find(|s| s.sponsor_id == sponsor_id)
    }

    /// Sponsor a candidate was placed with, if any
    pub fn sponsor_of(&self, candidate_id: &str) -> Option<&str> {
        self.sponsors
            .iter()
            .find(|s| s.candidate_ids.iter().any(|c| c == candidate_id))
            .map(|s| s.sponsor_id.as_str())
    }
}

/// Solver strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    /// Min-cost max-flow: maximum coverage, then maximum total similarity
    #[default]
    Optimal,
    /// Highest remaining score first; can be strictly suboptimal
    Greedy,
}

/// Where affiliation tokens come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffiliationSource {
    #[default]
    Institutions,
    EmailDomain,
}

/// One (field, repeat-count) entry of a profile field list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileField {
    pub field: String,
    #[serde(default = "default_repeat")]
    pub repeat: usize,
}

impl ProfileField {
    pub fn new(field: impl Into<String>, repeat: usize) -> Self {
        Self {
            field: field.into(),
            repeat,
        }
    }
}

fn default_repeat() -> usize { 1 }

/// Engine parameters resolved from settings and per-request overrides
#[derive(Debug, Clone)]
pub struct MatchingParams {
    pub max_candidates_per_sponsor: usize,
    pub restrict_timezone: bool,
    pub max_timezone_gap_hours: i32,
    pub solver: SolverKind,
    pub affiliation_source: AffiliationSource,
    pub skip_candidate_levels: Vec<String>,
    pub levels: BTreeMap<String, u8>,
    pub sponsor_fields: Vec<ProfileField>,
    pub candidate_fields: Vec<ProfileField>,
    pub scoring: ScoringParams,
}

/// Term weighting parameters
#[derive(Debug, Clone)]
pub struct ScoringParams {
    pub min_token_len: usize,
    pub max_document_frequency: Option<f64>,
    pub stop_words: Vec<String>,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            min_token_len: 2,
            max_document_frequency: None,
            stop_words: default_stop_words(),
        }
    }
}

pub fn default_stop_words() -> Vec<String> {
    ["and", "or", "the", "of", "in", "on", "for", "to", "a", "an", "with", "nan"]
        .iter()
        .map(|w| w.to_string())
        .collect()
}

pub fn default_levels() -> BTreeMap<String, u8> {
    [
        ("Undergraduate", 1),
        ("Masters", 2),
        ("Predoctoral", 2),
        ("PhD", 3),
        ("Postdoc", 4),
        ("Research Scientist", 5),
        ("Assistant Professor", 5),
        ("Associate Professor", 6),
        ("Professor", 7),
        ("Emeritus", 7),
    ]
    .iter()
    .map(|(name, rank)| (name.to_string(), *rank))
    .collect()
}

const TOPICAL_FIELDS: &[&str] = &[
    "main_research_area_1",
    "main_research_area_2",
    "main_topic",
    "mt_health",
    "mt_career",
    "second_topic",
    "st_career",
    "st_health",
];

pub fn default_sponsor_fields() -> Vec<ProfileField> {
    TOPICAL_FIELDS.iter().map(|f| ProfileField::new(*f, 1)).collect()
}

/// Candidates weigh their primary research area twice
pub fn default_candidate_fields() -> Vec<ProfileField> {
    TOPICAL_FIELDS
        .iter()
        .map(|f| {
            let repeat = if *f == "main_research_area_1" { 2 } else { 1 };
            ProfileField::new(*f, repeat)
        })
        .collect()
}

impl Default for MatchingParams {
    fn default() -> Self {
        Self {
            max_candidates_per_sponsor: 2,
            restrict_timezone: false,
            max_timezone_gap_hours: 5,
            solver: SolverKind::Optimal,
            affiliation_source: AffiliationSource::Institutions,
            skip_candidate_levels: vec!["Predoctoral".to_string()],
            levels: default_levels(),
            sponsor_fields: default_sponsor_fields(),
            candidate_fields: default_candidate_fields(),
            scoring: ScoringParams::default(),
        }
    }
}
