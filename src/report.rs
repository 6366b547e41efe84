//! Turns an assignment back into participant-level rows for review.

use crate::core::SeniorityLadder;
use crate::models::{Assignment, Candidate, Participant, Sponsor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Sponsor,
    Candidate,
    Separator,
}

/// One line of the side-by-side review listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRow {
    pub kind: RowKind,
    #[serde(rename = "sponsorId")]
    pub sponsor_id: String,
    #[serde(rename = "participantId", skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u8>,
    #[serde(default)]
    pub affiliations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ReviewRow {
    fn participant(kind: RowKind, sponsor_id: &str, p: &Participant, score: Option<f64>, ladder: &SeniorityLadder) -> Self {
        Self {
            kind,
            sponsor_id: sponsor_id.to_string(),
            participant_id: Some(p.id.clone()),
            score,
            name: p.name.clone(),
            level: Some(p.level.clone()),
            rank: ladder.rank(&p.level),
            affiliations: p.affiliations.clone(),
            timezone: p.timezone.clone(),
            attributes: p.attributes.clone(),
        }
    }

    fn separator(sponsor_id: &str) -> Self {
        Self {
            kind: RowKind::Separator,
            sponsor_id: sponsor_id.to_string(),
            participant_id: None,
            score: None,
            name: None,
            level: None,
            rank: None,
            affiliations: Vec::new(),
            timezone: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// Programmatic listing: one row per sponsor with `;`-joined ids and scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRow {
    #[serde(rename = "sponsorId")]
    pub sponsor_id: String,
    #[serde(rename = "candidateIds")]
    pub candidate_ids: String,
    pub scores: String,
}

/// Sponsor row, then each assigned candidate with its score, then a separator
pub fn review_rows(
    assignment: &Assignment,
    sponsors: &[Sponsor],
    candidates: &[Candidate],
    ladder: &SeniorityLadder,
) -> Vec<ReviewRow> {
    let sponsor_index: HashMap<&str, &Sponsor> = sponsors.iter().map(|s| (s.id(), s)).collect();
    let candidate_index: HashMap<&str, &Candidate> = candidates.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut rows = Vec::new();
    for entry in &assignment.sponsors {
        let Some(sponsor) = sponsor_index.get(entry.sponsor_id.as_str()) else {
            tracing::warn!(sponsor_id = %entry.sponsor_id, "Assignment references unknown sponsor");
            continue;
        };
        rows.push(ReviewRow::participant(
            RowKind::Sponsor,
            &entry.sponsor_id,
            &sponsor.participant,
            None,
            ladder,
        ));

        for (candidate_id, score) in entry.candidate_ids.iter().zip(&entry.scores) {
            match candidate_index.get(candidate_id.as_str()) {
                Some(candidate) => rows.push(ReviewRow::participant(
                    RowKind::Candidate,
                    &entry.sponsor_id,
                    candidate,
                    Some(*score),
                    ladder,
                )),
                None => tracing::warn!(%candidate_id, "Assignment references unknown candidate"),
            }
        }

        rows.push(ReviewRow::separator(&entry.sponsor_id));
    }
    rows
}

pub fn list_rows(assignment: &Assignment) -> Vec<ListRow> {
    assignment
        .sponsors
        .iter()
        .map(|entry| ListRow {
            sponsor_id: entry.sponsor_id.clone(),
            candidate_ids: entry.candidate_ids.join(";"),
            scores: entry
                .scores
                .iter()
                .map(|s| format!("{:.4}", s))
                .collect::<Vec<_>>()
                .join(";"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_levels, SponsorAssignment};

    fn person(id: &str, level: &str) -> Participant {
        Participant {
            id: id.to_string(),
            level: level.to_string(),
            ..Default::default()
        }
    }

    fn fixture() -> (Assignment, Vec<Sponsor>, Vec<Candidate>) {
        let assignment = Assignment {
            sponsors: vec![
                SponsorAssignment {
                    sponsor_id: "A".to_string(),
                    candidate_ids: vec!["2".to_string(), "1".to_string()],
                    scores: vec![0.75, 0.5],
                },
                SponsorAssignment::empty("B"),
            ],
            unassigned: vec![],
        };
        let sponsors = vec![
            Sponsor { participant: person("A", "Professor"), capacity: None },
            Sponsor { participant: person("B", "Postdoc"), capacity: None },
        ];
        let candidates = vec![person("1", "PhD"), person("2", "Masters")];
        (assignment, sponsors, candidates)
    }

    #[test]
    fn test_review_rows_layout() {
        let (assignment, sponsors, candidates) = fixture();
        let ladder = SeniorityLadder::new(&default_levels());
        let rows = review_rows(&assignment, &sponsors, &candidates, &ladder);

        let kinds: Vec<RowKind> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RowKind::Sponsor,
                RowKind::Candidate,
                RowKind::Candidate,
                RowKind::Separator,
                RowKind::Sponsor,
                RowKind::Separator,
            ]
        );
        assert_eq!(rows[1].participant_id.as_deref(), Some("2"));
        assert_eq!(rows[1].score, Some(0.75));
        assert_eq!(rows[0].rank, Some(7));
    }

    #[test]
    fn test_list_rows_joins_ids_and_scores() {
        let (assignment, _, _) = fixture();
        let rows = list_rows(&assignment);

        assert_eq!(rows[0].candidate_ids, "2;1");
        assert_eq!(rows[0].scores, "0.7500;0.5000");
        assert_eq!(rows[1].candidate_ids, "");
    }
}
