//! Reductions over a [Distribution] for reporting: per-count percentages and the expected
//! number of casts.

use serde::Serialize;

use crate::estimator::monte_carlo::Distribution;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub casts: u32,
    pub count: u64,
    pub percent: f64,
    /// Chance to kill within `casts` casts.
    pub cumulative_percent: f64,
    /// Bar length relative to the most common outcome, 0..=100.
    pub bar_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub trials: u64,
    pub expected_casts: f64,
    pub min_casts: Option<u32>,
    pub max_casts: Option<u32>,
    pub unfinished: u64,
    pub rows: Vec<SummaryRow>,
}

/// `(casts, 100 * count / N)` in ascending cast order.
pub fn percentages(distribution: &Distribution) -> Vec<(u32, f64)> {
    if distribution.trials == 0 {
        return Vec::new();
    }
    let total = distribution.trials as f64;
    distribution
        .counts
        .iter()
        .map(|(&casts, &count)| (casts, count as f64 / total * 100.0))
        .collect()
}

/// `sum(casts * count) / N`; zero for an empty distribution.
pub fn expected_casts(distribution: &Distribution) -> f64 {
    if distribution.trials == 0 {
        return 0.0;
    }
    let total = distribution.trials as f64;
    distribution
        .counts
        .iter()
        .map(|(&casts, &count)| f64::from(casts) * count as f64 / total)
        .sum()
}

pub fn summarize(distribution: &Distribution) -> Summary {
    let pct = percentages(distribution);
    let max_percent = pct.iter().map(|&(_, p)| p).fold(0.0_f64, f64::max);

    let mut cumulative = 0.0;
    let rows = pct
        .into_iter()
        .zip(distribution.counts.values())
        .map(|((casts, percent), &count)| {
            cumulative += percent;
            SummaryRow {
                casts,
                count,
                percent,
                cumulative_percent: cumulative.min(100.0),
                bar_width: if max_percent > 0.0 {
                    percent / max_percent * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    Summary {
        trials: distribution.trials,
        expected_casts: expected_casts(distribution),
        min_casts: distribution.min_casts(),
        max_casts: distribution.max_casts(),
        unfinished: distribution.unfinished,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::TrialOutcome;

    fn distribution(pairs: &[(u32, u64)]) -> Distribution {
        let mut d = Distribution::default();
        for &(casts, count) in pairs {
            for _ in 0..count {
                d.record(TrialOutcome {
                    casts,
                    killed: true,
                });
            }
        }
        d
    }

    #[test]
    fn expected_value_weights_by_count() {
        let d = distribution(&[(2, 1), (3, 3)]);
        assert!((expected_casts(&d) - 2.75).abs() < 1e-12);
    }

    #[test]
    fn percentages_sum_to_hundred() {
        let d = distribution(&[(4, 7), (5, 11), (9, 2)]);
        let total: f64 = percentages(&d).iter().map(|&(_, p)| p).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn summary_rows_are_ascending_with_relative_bars() {
        let d = distribution(&[(6, 10), (4, 30), (5, 60)]);
        let s = summarize(&d);
        let casts: Vec<u32> = s.rows.iter().map(|r| r.casts).collect();
        assert_eq!(casts, vec![4, 5, 6]);
        assert!((s.rows[1].bar_width - 100.0).abs() < 1e-12);
        assert!((s.rows[0].bar_width - 50.0).abs() < 1e-12);
        assert!((s.rows[2].cumulative_percent - 100.0).abs() < 1e-9);
        assert_eq!(s.min_casts, Some(4));
        assert_eq!(s.max_casts, Some(6));
        assert!(s.expected_casts >= 4.0 && s.expected_casts <= 6.0);
    }

    #[test]
    fn empty_distribution_summarizes_to_zero() {
        let s = summarize(&Distribution::default());
        assert_eq!(s.trials, 0);
        assert_eq!(s.expected_casts, 0.0);
        assert!(s.rows.is_empty());
        assert_eq!(s.min_casts, None);
    }
}
