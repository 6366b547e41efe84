use crate::core::timezone::{offset_gap, parse_offset};
use crate::error::{MatchError, Result};
use crate::models::{AffiliationSource, Candidate, MatchingParams, Participant, Role, Sponsor};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Which rules forbid a sponsor/candidate pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionReasons {
    pub affiliation: bool,
    pub seniority: bool,
    pub timezone: bool,
}

impl ExclusionReasons {
    #[inline]
    pub fn any(&self) -> bool {
        self.affiliation || self.seniority || self.timezone
    }
}

/// Ordered seniority scale, looked up case-insensitively
#[derive(Debug, Clone)]
pub struct SeniorityLadder {
    ranks: BTreeMap<String, u8>,
}

impl SeniorityLadder {
    pub fn new(levels: &BTreeMap<String, u8>) -> Self {
        Self {
            ranks: levels
                .iter()
                .map(|(name, rank)| (normalize_level(name), *rank))
                .collect(),
        }
    }

    pub fn rank(&self, level: &str) -> Option<u8> {
        self.ranks.get(&normalize_level(level)).copied()
    }

    /// Rank of a participant, or a configuration error naming it
    pub fn rank_of(&self, role: Role, participant: &Participant) -> Result<u8> {
        self.rank(&participant.level)
            .ok_or_else(|| MatchError::UnknownSeniorityLevel {
                role,
                id: participant.id.clone(),
                level: participant.level.clone(),
            })
    }
}

/// Whether a level name appears in a list of level names
pub fn level_listed(level: &str, list: &[String]) -> bool {
    let level = normalize_level(level);
    list.iter().any(|l| normalize_level(l) == level)
}

fn normalize_level(level: &str) -> String {
    level.trim().to_lowercase()
}

/// Affiliation tokens of a participant under the configured source
pub fn affiliation_tokens(participant: &Participant, source: AffiliationSource) -> BTreeSet<String> {
    match source {
        AffiliationSource::Institutions => participant
            .affiliations
            .iter()
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect(),
        AffiliationSource::EmailDomain => participant
            .email
            .as_deref()
            .and_then(email_domain)
            .into_iter()
            .collect(),
    }
}

/// Institutional domain of an address; `.com` domains are treated as personal
pub fn email_domain(address: &str) -> Option<String> {
    let domain = address.rsplit('@').next()?.trim().to_lowercase();
    if domain.is_empty() || domain.ends_with(".com") || !address.contains('@') {
        return None;
    }
    Some(domain)
}

/// Per-participant facts computed once before the pair loop
struct SideFacts {
    ranks: Vec<u8>,
    affiliations: Vec<BTreeSet<String>>,
    offsets: Vec<Option<i32>>,
}

impl SideFacts {
    fn collect<'a, I>(role: Role, participants: I, ladder: &SeniorityLadder, params: &MatchingParams) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Participant>,
    {
        let mut facts = SideFacts {
            ranks: Vec::new(),
            affiliations: Vec::new(),
            offsets: Vec::new(),
        };

        for participant in participants {
            facts.ranks.push(ladder.rank_of(role, participant)?);
            facts
                .affiliations
                .push(affiliation_tokens(participant, params.affiliation_source));

            let offset = if params.restrict_timezone {
                parse_offset(participant.timezone.as_deref()).map_err(|value| {
                    MatchError::MalformedTimezone {
                        role,
                        id: participant.id.clone(),
                        value,
                    }
                })?
            } else {
                None
            };
            facts.offsets.push(offset);
        }

        Ok(facts)
    }
}

/// Exclusion decision for every (sponsor, candidate) pair, indexed by position
#[derive(Debug, Clone)]
pub struct EligibilityRelation {
    sponsor_ids: Vec<String>,
    candidate_ids: Vec<String>,
    cells: Vec<ExclusionReasons>,
}

impl EligibilityRelation {
    pub fn sponsor_count(&self) -> usize {
        self.sponsor_ids.len()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_ids.len()
    }

    pub fn sponsor_id(&self, sponsor: usize) -> &str {
        &self.sponsor_ids[sponsor]
    }

    pub fn candidate_id(&self, candidate: usize) -> &str {
        &self.candidate_ids[candidate]
    }

    #[inline]
    pub fn reasons(&self, sponsor: usize, candidate: usize) -> ExclusionReasons {
        self.cells[sponsor * self.candidate_ids.len() + candidate]
    }

    #[inline]
    pub fn is_excluded(&self, sponsor: usize, candidate: usize) -> bool {
        self.reasons(sponsor, candidate).any()
    }

    pub fn eligible_candidates(&self, sponsor: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.candidate_ids.len()).filter(move |&c| !self.is_excluded(sponsor, c))
    }

    pub fn has_eligible_sponsor(&self, candidate: usize) -> bool {
        (0..self.sponsor_ids.len()).any(|s| !self.is_excluded(s, candidate))
    }

    /// Excluded candidate identifiers of one sponsor; empty when none
    pub fn excluded_ids(&self, sponsor: usize) -> BTreeSet<&str> {
        (0..self.candidate_ids.len())
            .filter(|&c| self.is_excluded(sponsor, c))
            .map(|c| self.candidate_ids[c].as_str())
            .collect()
    }

    /// Sponsor identifier → excluded candidate identifiers
    pub fn to_map(&self) -> BTreeMap<String, BTreeSet<String>> {
        (0..self.sponsor_ids.len())
            .map(|s| {
                let excluded = self
                    .excluded_ids(s)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (self.sponsor_ids[s].clone(), excluded)
            })
            .collect()
    }

    pub fn excluded_pair_count(&self) -> usize {
        self.cells.iter().filter(|r| r.any()).count()
    }
}

/// Evaluate the affiliation, seniority and (optionally) time zone rules for every pair
///
/// Each side's ranks, affiliation tokens and offsets are derived once;
/// the pair loop only compares precomputed values.
pub fn build_eligibility(
    sponsors: &[Sponsor],
    candidates: &[Candidate],
    params: &MatchingParams,
) -> Result<EligibilityRelation> {
    let ladder = SeniorityLadder::new(&params.levels);

    let sponsor_facts = SideFacts::collect(
        Role::Sponsor,
        sponsors.iter().map(|s| &s.participant),
        &ladder,
        params,
    )?;
    let candidate_facts = SideFacts::collect(Role::Candidate, candidates, &ladder, params)?;

    let mut cells = Vec::with_capacity(sponsors.len() * candidates.len());

    for s in 0..sponsors.len() {
        for c in 0..candidates.len() {
            let affiliation = !sponsor_facts.affiliations[s].is_disjoint(&candidate_facts.affiliations[c]);
            let seniority = candidate_facts.ranks[c] >= sponsor_facts.ranks[s];
            let timezone = params.restrict_timezone
                && match (sponsor_facts.offsets[s], candidate_facts.offsets[c]) {
                    (Some(a), Some(b)) => offset_gap(a, b) > i64::from(params.max_timezone_gap_hours),
                    _ => false,
                };

            cells.push(ExclusionReasons {
                affiliation,
                seniority,
                timezone,
            });
        }
    }

    Ok(EligibilityRelation {
        sponsor_ids: sponsors.iter().map(|s| s.id().to_string()).collect(),
        candidate_ids: candidates.iter().map(|c| c.id.clone()).collect(),
        cells,
    })
}
