pub mod rank;
pub mod score;

use serde::{Deserialize, Serialize};

use crate::core::Candidate;

/// Scores of one ring member with a known age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub inv_age: f64,
    pub norm_age: f64,
    pub neglog: f64,
    pub softmax_norm_age: f64,
}

impl ScoreSet {
    /// The Guess-Newest score used for ranking.
    pub fn gnh_score(&self) -> f64 {
        self.norm_age
    }
}

/// A ring member with its scores and newest-first rank, both absent when
/// the age is unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub scores: Option<ScoreSet>,
    pub newest_rank: Option<f64>,
}

/// Score a ring. Members with unknown age take no part in normalization.
pub fn score_ring(candidates: &[Candidate]) -> Vec<ScoredCandidate> {
    let valid: Vec<(usize, u64)> = candidates
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.age_seconds.map(|age| (i, age)))
        .collect();

    let ages: Vec<f64> = valid.iter().map(|&(_, age)| age as f64).collect();
    let raw_ages: Vec<u64> = valid.iter().map(|&(_, age)| age).collect();
    let columns = score::compute_scores(&ages);
    let ranks = rank::average_rank(&raw_ages);

    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|&candidate| ScoredCandidate {
            candidate,
            scores: None,
            newest_rank: None,
        })
        .collect();

    for (k, &(i, _)) in valid.iter().enumerate() {
        scored[i].scores = Some(ScoreSet {
            inv_age: columns.inv_age[k],
            norm_age: columns.norm_age[k],
            neglog: columns.neglog[k],
            softmax_norm_age: columns.softmax_norm_age[k],
        });
        scored[i].newest_rank = Some(ranks[k]);
    }

    tracing::debug!(
        ring_size = candidates.len(),
        known = valid.len(),
        "scored ring"
    );
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aged(global_index: u64, age: Option<u64>) -> Candidate {
        Candidate {
            global_index,
            out_height: age.map(|_| 1),
            out_timestamp: age.map(|a| 10_000_000 - a),
            age_seconds: age,
        }
    }

    #[test]
    fn unknown_members_do_not_skew_normalization() {
        let ring = [
            aged(1, Some(1_000)),
            aged(2, None),
            aged(3, Some(5_000)),
            aged(4, None),
        ];
        let scored = score_ring(&ring);
        assert_eq!(scored.len(), 4);
        assert_eq!(scored[0].scores.unwrap().norm_age, 1.0);
        assert_eq!(scored[2].scores.unwrap().norm_age, 0.0);
        assert!(scored[1].scores.is_none() && scored[1].newest_rank.is_none());
        assert!(scored[3].scores.is_none());
        let total: f64 = scored
            .iter()
            .filter_map(|s| s.scores)
            .map(|s| s.softmax_norm_age)
            .sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn all_unknown_is_not_an_error() {
        let ring = [aged(1, None), aged(2, None), aged(3, None)];
        let scored = score_ring(&ring);
        assert_eq!(scored.len(), 3);
        assert!(scored.iter().all(|s| s.scores.is_none() && s.newest_rank.is_none()));
    }

    #[test]
    fn newest_gets_rank_one() {
        let ring = [
            aged(1, Some(900)),
            aged(2, Some(100)),
            aged(3, None),
            aged(4, Some(100_000)),
        ];
        let scored = score_ring(&ring);
        assert_eq!(scored[1].newest_rank, Some(1.0));
        assert_eq!(scored[0].newest_rank, Some(2.0));
        assert_eq!(scored[3].newest_rank, Some(3.0));
        assert_eq!(scored[1].scores.unwrap().gnh_score(), 1.0);
    }

    #[test]
    fn zero_age_member_scores() {
        let ring = [aged(1, Some(0)), aged(2, Some(86_400))];
        let scored = score_ring(&ring);
        let s = scored[0].scores.unwrap();
        assert!((s.inv_age - 1.0 / 86_400.0).abs() < 1e-15);
        assert!(s.neglog.is_finite());
        assert_eq!(s.norm_age, 1.0);
    }
}
