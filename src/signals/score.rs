/// One day in seconds; smoothing offset for `inv_age` and unit for `neglog`.
pub const DAY_SECONDS: f64 = 86_400.0;

pub const EPS: f64 = 1e-9;

/// Keeps `ln` finite at age 0.
const LOG_FLOOR: f64 = 1e-6;

/// Score columns over the known-age members, one value per age in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreColumns {
    pub inv_age: Vec<f64>,
    pub norm_age: Vec<f64>,
    pub neglog: Vec<f64>,
    pub softmax_norm_age: Vec<f64>,
}

pub fn inv_age(ages: &[f64]) -> Vec<f64> {
    ages.iter().map(|a| 1.0 / (a + DAY_SECONDS)).collect()
}

/// Min-max scaled so the oldest scores 0 and the newest 1.
/// Equal ages carry no information and all score 1.
pub fn norm_age(ages: &[f64]) -> Vec<f64> {
    let min = ages.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range < EPS {
        return vec![1.0; ages.len()];
    }
    ages.iter().map(|a| (max - a) / range).collect()
}

pub fn neglog(ages: &[f64]) -> Vec<f64> {
    ages.iter()
        .map(|a| -(a / DAY_SECONDS + LOG_FLOOR).ln())
        .collect()
}

pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let exps: Vec<f64> = scores.iter().map(|s| s.exp()).collect();
    let sum: f64 = exps.iter().sum::<f64>() + EPS;
    exps.into_iter().map(|e| e / sum).collect()
}

pub fn compute_scores(ages: &[f64]) -> ScoreColumns {
    if ages.is_empty() {
        return ScoreColumns::default();
    }
    let norm_age = norm_age(ages);
    ScoreColumns {
        inv_age: inv_age(ages),
        softmax_norm_age: softmax(&norm_age),
        neglog: neglog(ages),
        norm_age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ages_empty_columns() {
        let cols = compute_scores(&[]);
        assert_eq!(cols, ScoreColumns::default());
        assert!(cols.norm_age.is_empty());
        assert!(cols.inv_age.is_empty());
        assert!(cols.softmax_norm_age.is_empty());
    }

    #[test]
    fn norm_age_endpoints_are_exact() {
        let cols = compute_scores(&[500_000.0, 3_600.0, 9_000_000.0, 86_400.0]);
        assert_eq!(cols.norm_age[2], 0.0);
        assert_eq!(cols.norm_age[1], 1.0);
        assert!(cols.norm_age.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn identical_ages_all_one() {
        let cols = compute_scores(&[42.0, 42.0, 42.0]);
        assert_eq!(cols.norm_age, vec![1.0, 1.0, 1.0]);
        for p in &cols.softmax_norm_age {
            assert!((p - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn single_member_is_degenerate() {
        let cols = compute_scores(&[1_000.0]);
        assert_eq!(cols.norm_age, vec![1.0]);
        assert!((cols.softmax_norm_age[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn softmax_sums_to_one() {
        let ages = [12.0, 86_400.0, 7.0 * 86_400.0, 400.0 * 86_400.0, 3_000.0];
        let cols = compute_scores(&ages);
        let total: f64 = cols.softmax_norm_age.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn inv_age_uses_one_day_offset() {
        let v = inv_age(&[0.0, 86_400.0]);
        assert!((v[0] - 1.0 / 86_400.0).abs() < 1e-15);
        assert!((v[1] - 1.0 / 172_800.0).abs() < 1e-15);
    }

    #[test]
    fn neglog_finite_at_zero_and_decreasing() {
        let v = neglog(&[0.0, 3_600.0, 86_400.0, 10.0 * 86_400.0]);
        assert!(v.iter().all(|x| x.is_finite()));
        assert!((v[0] - 13.815_510_557_964_274).abs() < 1e-9);
        assert!(v.windows(2).all(|w| w[0] > w[1]));
        // one day → -ln(1 + 1e-6)
        assert!(v[2].abs() < 1e-5);
    }
}
