use crate::core::{
    eligibility::{build_eligibility, level_listed, EligibilityRelation},
    profile::{build_profiles, validate_field_lists},
    similarity::{score_profiles, ScoreMatrix},
    solver::solve,
};
use crate::error::{MatchError, Result};
use crate::models::{
    Assignment, Candidate, MatchingParams, Role, Skipped, SolverKind, Sponsor, SponsorAssignment,
    Unassigned,
};
use std::collections::BTreeSet;

/// Result of one matching run
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub assignment: Assignment,
    /// Candidates removed before matching because of their level
    pub skipped: Vec<Skipped>,
    pub solver: SolverKind,
    pub excluded_pairs: usize,
}

/// Tables after level skipping, sorted by identifier
struct Arenas {
    sponsors: Vec<Sponsor>,
    candidates: Vec<Candidate>,
    skipped: Vec<Skipped>,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Configuration checks (field lists, identifiers)
/// 2. Eligibility relation (affiliation, seniority, time zone)
/// 3. Profile building and similarity scoring
/// 4. Capacity-bounded assignment
#[derive(Debug, Clone)]
pub struct Matcher {
    params: MatchingParams,
}

impl Matcher {
    pub fn new(params: MatchingParams) -> Self {
        Self { params }
    }

    pub fn with_default_params() -> Self {
        Self {
            params: MatchingParams::default(),
        }
    }

    pub fn params(&self) -> &MatchingParams {
        &self.params
    }

    /// Match candidates to sponsors
    ///
    /// # Arguments
    /// * `sponsors` - Full sponsor table
    /// * `candidates` - Full candidate table
    ///
    /// # Returns
    /// MatchOutcome with one entry per sponsor (possibly empty) and every
    /// candidate that could not be placed
    pub fn run(&self, sponsors: &[Sponsor], candidates: &[Candidate]) -> Result<MatchOutcome> {
        validate_field_lists(&self.params.sponsor_fields, &self.params.candidate_fields)?;
        let arenas = self.prepare(sponsors, candidates)?;

        tracing::info!(
            sponsors = arenas.sponsors.len(),
            candidates = arenas.candidates.len(),
            skipped = arenas.skipped.len(),
            "Starting matching run"
        );

        // Stage 2: eligibility
        let eligibility = build_eligibility(&arenas.sponsors, &arenas.candidates, &self.params)?;
        let excluded_pairs = eligibility.excluded_pair_count();
        tracing::debug!(excluded_pairs, "Eligibility relation built");

        // Stage 3: profiles and scores
        let sponsor_profiles = build_profiles(
            arenas.sponsors.iter().map(|s| &s.participant),
            &self.params.sponsor_fields,
        );
        let candidate_profiles = build_profiles(&arenas.candidates, &self.params.candidate_fields);
        let scores = score_profiles(&sponsor_profiles, &candidate_profiles, &self.params.scoring)
            .masked(&eligibility);

        // Stage 4: assignment
        let capacities: Vec<usize> = arenas
            .sponsors
            .iter()
            .map(|s| s.effective_capacity(self.params.max_candidates_per_sponsor))
            .collect();
        let assignment = self.assign(&arenas, &scores, &eligibility, &capacities);

        if !assignment.unassigned.is_empty() {
            tracing::warn!(
                unassigned = assignment.unassigned.len(),
                "Some candidates could not be placed"
            );
        }
        tracing::info!(
            assigned = assignment.assigned_count(),
            total_score = assignment.total_score(),
            solver = ?self.params.solver,
            "Matching run complete"
        );

        Ok(MatchOutcome {
            assignment,
            skipped: arenas.skipped,
            solver: self.params.solver,
            excluded_pairs,
        })
    }

    /// Eligibility relation over the same arenas `run` would use
    pub fn eligibility(&self, sponsors: &[Sponsor], candidates: &[Candidate]) -> Result<EligibilityRelation> {
        let arenas = self.prepare(sponsors, candidates)?;
        build_eligibility(&arenas.sponsors, &arenas.candidates, &self.params)
    }

    fn prepare(&self, sponsors: &[Sponsor], candidates: &[Candidate]) -> Result<Arenas> {
        ensure_unique(Role::Sponsor, sponsors.iter().map(|s| s.id()))?;
        ensure_unique(Role::Candidate, candidates.iter().map(|c| c.id.as_str()))?;

        let (mut active, skipped): (Vec<Candidate>, Vec<Candidate>) = candidates
            .iter()
            .cloned()
            .partition(|c| !level_listed(&c.level, &self.params.skip_candidate_levels));

        let mut sponsors = sponsors.to_vec();
        sponsors.sort_by(|a, b| a.id().cmp(b.id()));
        active.sort_by(|a, b| a.id.cmp(&b.id));

        let mut skipped: Vec<Skipped> = skipped
            .into_iter()
            .map(|c| Skipped {
                candidate_id: c.id,
                level: c.level,
            })
            .collect();
        skipped.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));

        Ok(Arenas {
            sponsors,
            candidates: active,
            skipped,
        })
    }

    fn assign(
        &self,
        arenas: &Arenas,
        scores: &ScoreMatrix,
        eligibility: &EligibilityRelation,
        capacities: &[usize],
    ) -> Assignment {
        let placement = solve(self.params.solver, scores, eligibility, capacities);

        let sponsors = arenas
            .sponsors
            .iter()
            .zip(placement.per_sponsor)
            .map(|(sponsor, chosen)| {
                let mut entry = SponsorAssignment::empty(sponsor.id());
                for (c, score) in chosen {
                    entry.candidate_ids.push(arenas.candidates[c].id.clone());
                    entry.scores.push(score);
                }
                entry
            })
            .collect();

        let unassigned = placement
            .unassigned
            .into_iter()
            .map(|(c, reason)| Unassigned {
                candidate_id: arenas.candidates[c].id.clone(),
                reason,
            })
            .collect();

        Assignment {
            sponsors,
            unassigned,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_params()
    }
}

fn ensure_unique<'a>(role: Role, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(MatchError::DuplicateIdentifier {
                role,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
