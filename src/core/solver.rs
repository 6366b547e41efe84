use crate::core::eligibility::EligibilityRelation;
use crate::core::similarity::ScoreMatrix;
use crate::models::{SolverKind, UnassignedReason};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Fixed-point resolution applied to similarity scores
const SCORE_SCALE: f64 = 1_000_000.0;

/// Solver output expressed in arena positions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    /// Per sponsor: (candidate position, score), best score first
    pub per_sponsor: Vec<Vec<(usize, f64)>>,
    pub unassigned: Vec<(usize, UnassignedReason)>,
}

impl Placement {
    pub fn assigned_count(&self) -> usize {
        self.per_sponsor.iter().map(Vec::len).sum()
    }

    pub fn total_score(&self) -> f64 {
        self.per_sponsor.iter().flatten().map(|(_, s)| s).sum()
    }
}

/// Place candidates under sponsors without breaking eligibility or capacity
///
/// Positions must follow identifier order on both sides: ties are broken
/// in favour of the lower sponsor position.
pub fn solve(
    kind: SolverKind,
    scores: &ScoreMatrix,
    eligibility: &EligibilityRelation,
    capacities: &[usize],
) -> Placement {
    let chosen = match kind {
        SolverKind::Optimal => solve_min_cost_flow(scores, eligibility, capacities),
        SolverKind::Greedy => solve_greedy(scores, eligibility, capacities),
    };
    finish(chosen, scores, eligibility)
}

/// Greedy fallback: repeatedly take the highest remaining eligible score
///
/// Runs in O(P log P) for P eligible pairs but may be strictly suboptimal,
/// both in coverage and in total similarity.
fn solve_greedy(
    scores: &ScoreMatrix,
    eligibility: &EligibilityRelation,
    capacities: &[usize],
) -> Vec<Option<usize>> {
    let mut pairs: Vec<(usize, usize)> = (0..scores.rows())
        .flat_map(|s| eligibility.eligible_candidates(s).map(move |c| (s, c)))
        .collect();
    pairs.sort_by(|a, b| {
        scores
            .get(b.0, b.1)
            .partial_cmp(&scores.get(a.0, a.1))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
            .then_with(|| a.1.cmp(&b.1))
    });

    let mut remaining = capacities.to_vec();
    let mut owner = vec![None; scores.cols()];
    for (s, c) in pairs {
        if remaining[s] > 0 && owner[c].is_none() {
            owner[c] = Some(s);
            remaining[s] -= 1;
        }
    }
    owner
}

#[derive(Debug, Clone)]
struct Edge {
    to: usize,
    rev: usize,
    cap: i64,
    cost: i128,
}

/// Residual network for successive shortest paths
struct FlowNetwork {
    graph: Vec<Vec<Edge>>,
}

impl FlowNetwork {
    fn new(nodes: usize) -> Self {
        Self {
            graph: vec![Vec::new(); nodes],
        }
    }

    fn add_edge(&mut self, from: usize, to: usize, cap: i64, cost: i128) -> usize {
        let forward = self.graph[from].len();
        let backward = self.graph[to].len() + usize::from(from == to);
        self.graph[from].push(Edge { to, rev: backward, cap, cost });
        self.graph[to].push(Edge { to: from, rev: forward, cap: 0, cost: -cost });
        forward
    }

    /// Min-cost max-flow with Dijkstra on reduced costs
    ///
    /// All initial costs are non-negative so the potentials start at zero.
    fn run(&mut self, source: usize, sink: usize) -> i64 {
        let n = self.graph.len();
        let mut potential = vec![0i128; n];
        let mut flow = 0;

        loop {
            let mut dist = vec![i128::MAX; n];
            let mut prev: Vec<Option<(usize, usize)>> = vec![None; n];
            let mut heap = BinaryHeap::new();
            dist[source] = 0;
            heap.push(Reverse((0i128, source)));

            while let Some(Reverse((d, u))) = heap.pop() {
                if d > dist[u] {
                    continue;
                }
                for (i, e) in self.graph[u].iter().enumerate() {
                    if e.cap <= 0 {
                        continue;
                    }
                    let next = d + e.cost + potential[u] - potential[e.to];
                    if next < dist[e.to] {
                        dist[e.to] = next;
                        prev[e.to] = Some((u, i));
                        heap.push(Reverse((next, e.to)));
                    }
                }
            }

            if dist[sink] == i128::MAX {
                break;
            }
            for v in 0..n {
                if dist[v] != i128::MAX {
                    potential[v] += dist[v];
                }
            }

            let mut push = i64::MAX;
            let mut v = sink;
            while let Some((u, i)) = prev[v] {
                push = push.min(self.graph[u][i].cap);
                v = u;
            }
            let mut v = sink;
            while let Some((u, i)) = prev[v] {
                let rev = self.graph[u][i].rev;
                self.graph[u][i].cap -= push;
                self.graph[v][rev].cap += push;
                v = u;
            }
            flow += push;
        }

        flow
    }
}

/// Exact solver over source → sponsor → candidate → sink
///
/// Finds a maximum placement, and among those the one with the largest
/// total similarity; remaining ties go to lower sponsor positions.
fn solve_min_cost_flow(
    scores: &ScoreMatrix,
    eligibility: &EligibilityRelation,
    capacities: &[usize],
) -> Vec<Option<usize>> {
    let sponsors = scores.rows();
    let candidates = scores.cols();
    let source = 0;
    let sink = sponsors + candidates + 1;
    let sponsor_node = |s: usize| 1 + s;
    let candidate_node = |c: usize| 1 + sponsors + c;

    // Each unit of flow crosses exactly one sponsor→candidate edge, so the
    // tie penalty summed over a whole placement stays below one score step
    let tie_weight = (sponsors as i128) * (candidates as i128) + 1;
    let scale = SCORE_SCALE as i128;

    let mut network = FlowNetwork::new(sink + 1);
    let mut pair_edges: Vec<(usize, usize, usize)> = Vec::new();

    for s in 0..sponsors {
        if capacities[s] == 0 {
            continue;
        }
        network.add_edge(source, sponsor_node(s), capacities[s] as i64, 0);
        for c in eligibility.eligible_candidates(s) {
            let weight = (scores.get(s, c).clamp(0.0, 1.0) * SCORE_SCALE).round() as i128;
            let cost = (scale - weight) * tie_weight + s as i128;
            let index = network.add_edge(sponsor_node(s), candidate_node(c), 1, cost);
            pair_edges.push((s, c, index));
        }
    }
    for c in 0..candidates {
        network.add_edge(candidate_node(c), sink, 1, 0);
    }

    let flow = network.run(source, sink);
    tracing::debug!(flow, pairs = pair_edges.len(), "Min-cost flow finished");

    let mut owner = vec![None; candidates];
    for (s, c, index) in pair_edges {
        if network.graph[sponsor_node(s)][index].cap == 0 {
            owner[c] = Some(s);
        }
    }
    owner
}

fn finish(owner: Vec<Option<usize>>, scores: &ScoreMatrix, eligibility: &EligibilityRelation) -> Placement {
    let mut per_sponsor: Vec<Vec<(usize, f64)>> = vec![Vec::new(); scores.rows()];
    let mut unassigned = Vec::new();

    for (c, slot) in owner.into_iter().enumerate() {
        match slot {
            Some(s) => per_sponsor[s].push((c, scores.get(s, c))),
            None if eligibility.has_eligible_sponsor(c) => {
                unassigned.push((c, UnassignedReason::CapacityExhausted))
            }
            None => unassigned.push((c, UnassignedReason::NoEligibleSponsor)),
        }
    }

    for list in per_sponsor.iter_mut() {
        list.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
    }

    Placement {
        per_sponsor,
        unassigned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::eligibility::build_eligibility;
    use crate::models::{MatchingParams, Participant, Sponsor};

    fn sponsors(n: usize) -> Vec<Sponsor> {
        (0..n)
            .map(|i| Sponsor {
                participant: Participant {
                    id: format!("s{}", i),
                    level: "Professor".to_string(),
                    ..Default::default()
                },
                capacity: None,
            })
            .collect()
    }

    fn candidates(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|i| Participant {
                id: format!("c{}", i),
                level: "PhD".to_string(),
                ..Default::default()
            })
            .collect()
    }

    fn matrix(rows: &[&[f64]]) -> ScoreMatrix {
        let mut m = ScoreMatrix::zeros(rows.len(), rows.first().map_or(0, |r| r.len()));
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                m.set(r, c, *v);
            }
        }
        m
    }

    fn open_relation(s: usize, c: usize) -> EligibilityRelation {
        build_eligibility(&sponsors(s), &candidates(c), &MatchingParams::default()).unwrap()
    }

    #[test]
    fn test_optimal_beats_greedy() {
        // Greedy grabs (0,0)=0.9 and is left with 0.1; optimal takes 0.8 + 0.7
        let scores = matrix(&[&[0.9, 0.8], &[0.7, 0.1]]);
        let rel = open_relation(2, 2);

        let greedy = solve(SolverKind::Greedy, &scores, &rel, &[1, 1]);
        let optimal = solve(SolverKind::Optimal, &scores, &rel, &[1, 1]);

        assert!((greedy.total_score() - 1.0).abs() < 1e-9);
        assert!((optimal.total_score() - 1.5).abs() < 1e-9);
        assert_eq!(optimal.per_sponsor[0], vec![(1, 0.8)]);
        assert_eq!(optimal.per_sponsor[1], vec![(0, 0.7)]);
    }

    #[test]
    fn test_coverage_before_score() {
        // Sponsor 0 could take both high scores, but capacity 1 each
        // forces one candidate per sponsor even at zero similarity
        let scores = matrix(&[&[0.9, 0.9], &[0.0, 0.0]]);
        let rel = open_relation(2, 2);

        let placement = solve(SolverKind::Optimal, &scores, &rel, &[1, 1]);
        assert_eq!(placement.assigned_count(), 2);
        assert!(placement.unassigned.is_empty());
    }

    #[test]
    fn test_capacity_respected_and_shortfall_reported() {
        let scores = matrix(&[&[0.5, 0.6, 0.7]]);
        let rel = open_relation(1, 3);

        for kind in [SolverKind::Optimal, SolverKind::Greedy] {
            let placement = solve(kind, &scores, &rel, &[2]);
            assert_eq!(placement.per_sponsor[0], vec![(2, 0.7), (1, 0.6)]);
            assert_eq!(placement.unassigned, vec![(0, UnassignedReason::CapacityExhausted)]);
        }
    }

    #[test]
    fn test_ties_go_to_lower_sponsor() {
        let scores = matrix(&[&[0.5], &[0.5]]);
        let rel = open_relation(2, 1);

        for kind in [SolverKind::Optimal, SolverKind::Greedy] {
            let placement = solve(kind, &scores, &rel, &[1, 1]);
            assert_eq!(placement.per_sponsor[0], vec![(0, 0.5)]);
            assert!(placement.per_sponsor[1].is_empty());
        }
    }

    #[test]
    fn test_zero_capacity_and_empty_inputs() {
        let scores = matrix(&[&[0.5]]);
        let rel = open_relation(1, 1);
        let placement = solve(SolverKind::Optimal, &scores, &rel, &[0]);
        assert!(placement.per_sponsor[0].is_empty());
        assert_eq!(placement.unassigned, vec![(0, UnassignedReason::CapacityExhausted)]);

        let empty = solve(SolverKind::Optimal, &ScoreMatrix::zeros(0, 0), &open_relation(0, 0), &[]);
        assert_eq!(empty, Placement::default());
    }
}
