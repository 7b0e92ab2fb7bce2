//! Ranking & benchmark math over an assembled cohort.
//!
//! Lower emissions rank better. Sorting is stable, so ties keep cohort order
//! (self first, then real peers by registration, then synthetic entries).

use std::cmp::Ordering;

use cm_core::entities::CohortEntry;
use cm_core::enums::{Badge, BenchmarkBucket, RankingMetric};
use cm_core::responses::{LeaderboardEntry, SectorThresholds};

/// Where the organization stands within a cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOutcome {
    /// Better-than percentile, 0..=100.
    pub percentile: u8,
    /// 1-based position, `None` when the organization has no value on the metric.
    pub rank_position: Option<u32>,
    /// Members with a value on the metric.
    pub cohort_size: u32,
    pub badge: Option<Badge>,
}

impl RankOutcome {
    const NEUTRAL_PERCENTILE: u8 = 50;
}

/// Value an entry is ranked on, if it has one.
#[must_use]
pub fn metric_value(entry: &CohortEntry, metric: RankingMetric) -> Option<f64> {
    let value = match metric {
        RankingMetric::Intensity => entry.intensity(),
        RankingMetric::Total => entry.total_emissions,
    };
    value.filter(|v| v.is_finite())
}

/// Rankable entries sorted best first, ties in cohort order.
fn sorted<'a>(entries: &'a [CohortEntry], metric: RankingMetric) -> Vec<(&'a CohortEntry, f64)> {
    let mut ranked: Vec<_> = entries
        .iter()
        .filter_map(|e| metric_value(e, metric).map(|v| (e, v)))
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    ranked
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Badge for a 1-based position in a cohort of `size`.
#[must_use]
pub fn badge_for(rank: u32, size: u32) -> Option<Badge> {
    if size == 0 || rank == 0 {
        return None;
    }
    if rank <= (size * 10).div_ceil(100) {
        Some(Badge::Top10)
    } else if rank <= (size * 25).div_ceil(100) {
        Some(Badge::Top25)
    } else {
        None
    }
}

/// Rank the `is_self` entry of `entries` on `metric`.
///
/// An organization without a value on the metric gets the neutral
/// percentile 50 and no position.
#[must_use]
pub fn rank(entries: &[CohortEntry], metric: RankingMetric) -> RankOutcome {
    let ranked = sorted(entries, metric);
    let size = to_u32(ranked.len());

    let Some(position) = ranked.iter().position(|(e, _)| e.is_self) else {
        return RankOutcome {
            percentile: RankOutcome::NEUTRAL_PERCENTILE,
            rank_position: None,
            cohort_size: size,
            badge: None,
        };
    };

    let own = ranked[position].1;
    let worse = ranked.iter().filter(|(_, v)| *v > own).count();
    let rank_position = to_u32(position + 1);

    RankOutcome {
        percentile: percentile(worse, ranked.len()),
        rank_position: Some(rank_position),
        cohort_size: size,
        badge: badge_for(rank_position, size),
    }
}

/// `round(100 × worse / size)`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(worse: usize, size: usize) -> u8 {
    if size == 0 {
        return RankOutcome::NEUTRAL_PERCENTILE;
    }
    (100.0 * worse as f64 / size as f64).round().clamp(0.0, 100.0) as u8
}

/// Sorted leaderboard rows for every rankable entry.
#[must_use]
pub fn leaderboard(entries: &[CohortEntry], metric: RankingMetric) -> Vec<LeaderboardEntry> {
    let ranked = sorted(entries, metric);
    let size = to_u32(ranked.len());
    ranked
        .into_iter()
        .enumerate()
        .map(|(idx, (entry, _))| {
            let rank = to_u32(idx + 1);
            LeaderboardEntry {
                rank,
                label: entry.label.clone(),
                employee_count: entry.employee_count,
                // Every rankable entry has a total.
                total_emissions: entry.total_emissions.unwrap_or_default(),
                intensity: entry.intensity(),
                is_self: entry.is_self,
                is_synthetic: entry.is_synthetic,
                badge: badge_for(rank, size),
            }
        })
        .collect()
}

/// Absolute bucket for a per-employee intensity.
#[must_use]
pub fn bucket(intensity: Option<f64>, thresholds: &SectorThresholds) -> BenchmarkBucket {
    match intensity {
        Some(v) if v.is_finite() && v <= thresholds.excellent => BenchmarkBucket::Excellent,
        Some(v) if v.is_finite() && v <= thresholds.average => BenchmarkBucket::Average,
        Some(v) if v.is_finite() => BenchmarkBucket::High,
        _ => BenchmarkBucket::Unknown,
    }
}

/// Best, mean and worst intensity among the non-self members.
#[must_use]
pub fn peer_spread(entries: &[CohortEntry]) -> (Option<f64>, Option<f64>, Option<f64>) {
    let values: Vec<f64> = entries
        .iter()
        .filter(|e| !e.is_self)
        .filter_map(CohortEntry::intensity)
        .collect();
    if values.is_empty() {
        return (None, None, None);
    }
    let best = values.iter().copied().fold(f64::INFINITY, f64::min);
    let worst = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (Some(best), Some(mean), Some(worst))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn member(label: &str, employees: Option<i64>, total: f64, is_self: bool) -> CohortEntry {
        CohortEntry {
            label: label.into(),
            org_id: None,
            employee_count: employees,
            total_emissions: Some(total),
            is_self,
            is_synthetic: !is_self,
        }
    }

    fn it_demo_with_self(self_total: f64) -> Vec<CohortEntry> {
        vec![
            member("You", Some(100), self_total, true),
            member("Infosys", Some(80_000), 168_000.0, false),
            member("TCS", Some(100_000), 240_000.0, false),
            member("Wipro", Some(70_000), 182_000.0, false),
            member("HCL Technologies", Some(60_000), 138_000.0, false),
            member("Tech Mahindra", Some(50_000), 125_000.0, false),
        ]
    }

    #[rstest]
    #[case(1, 6, Some(Badge::Top10))]
    #[case(2, 6, Some(Badge::Top25))]
    #[case(3, 6, None)]
    #[case(1, 10, Some(Badge::Top10))]
    #[case(2, 10, Some(Badge::Top25))]
    #[case(3, 10, Some(Badge::Top25))]
    #[case(4, 10, None)]
    #[case(2, 20, Some(Badge::Top10))]
    #[case(5, 20, Some(Badge::Top25))]
    #[case(1, 1, Some(Badge::Top10))]
    fn badge_thresholds(#[case] rank: u32, #[case] size: u32, #[case] expected: Option<Badge>) {
        assert_eq!(badge_for(rank, size), expected);
    }

    #[test]
    fn best_in_cohort_gets_top_percentile() {
        let cohort = it_demo_with_self(150.0); // 1.5 per employee
        let outcome = rank(&cohort, RankingMetric::Intensity);
        assert_eq!(outcome.rank_position, Some(1));
        assert_eq!(outcome.cohort_size, 6);
        assert_eq!(outcome.percentile, 83); // 5 of 6 worse
        assert_eq!(outcome.badge, Some(Badge::Top10));
    }

    #[test]
    fn worst_in_cohort_gets_zero() {
        let cohort = it_demo_with_self(1000.0); // 10 per employee
        let outcome = rank(&cohort, RankingMetric::Intensity);
        assert_eq!(outcome.rank_position, Some(6));
        assert_eq!(outcome.percentile, 0);
        assert_eq!(outcome.badge, None);
    }

    #[test]
    fn ties_keep_cohort_order() {
        let cohort = vec![
            member("You", Some(10), 21.0, true),
            member("Twin", Some(10), 21.0, false),
        ];
        let outcome = rank(&cohort, RankingMetric::Intensity);
        assert_eq!(outcome.rank_position, Some(1));
        // Equal values are not "worse".
        assert_eq!(outcome.percentile, 0);

        let board = leaderboard(&cohort, RankingMetric::Intensity);
        assert_eq!(board[0].label, "You");
        assert_eq!(board[1].label, "Twin");
    }

    #[test]
    fn missing_intensity_is_neutral() {
        let mut cohort = it_demo_with_self(150.0);
        cohort[0].employee_count = None;
        let outcome = rank(&cohort, RankingMetric::Intensity);
        assert_eq!(outcome.percentile, 50);
        assert_eq!(outcome.rank_position, None);
        assert_eq!(outcome.cohort_size, 5);
        assert_eq!(outcome.badge, None);
    }

    #[rstest]
    #[case(RankingMetric::Intensity)]
    #[case(RankingMetric::Total)]
    fn no_data_is_neutral_on_every_metric(#[case] metric: RankingMetric) {
        let mut cohort = it_demo_with_self(150.0);
        cohort[0].total_emissions = None;
        let outcome = rank(&cohort, metric);
        assert_eq!(outcome.percentile, 50);
        assert_eq!(outcome.rank_position, None);
        assert_eq!(outcome.badge, None);
        assert!(leaderboard(&cohort, metric).iter().all(|row| !row.is_self));
    }

    #[test]
    fn total_metric_ranks_without_employees() {
        let mut cohort = it_demo_with_self(150.0);
        cohort[0].employee_count = None;
        let outcome = rank(&cohort, RankingMetric::Total);
        assert_eq!(outcome.rank_position, Some(1));
        assert_eq!(outcome.cohort_size, 6);
    }

    #[test]
    fn percentile_is_monotone_in_intensity() {
        let mut last = 100;
        for self_total in [50.0, 150.0, 220.0, 240.0, 255.0, 400.0, 900.0] {
            let outcome = rank(&it_demo_with_self(self_total), RankingMetric::Intensity);
            assert!(
                outcome.percentile <= last,
                "percentile rose from {last} to {} at total {self_total}",
                outcome.percentile
            );
            last = outcome.percentile;
        }
    }

    #[test]
    fn leaderboard_excludes_entries_without_denominator() {
        let mut cohort = it_demo_with_self(150.0);
        cohort.push(member("Org-abc123", Some(0), 99.0, false));
        let board = leaderboard(&cohort, RankingMetric::Intensity);
        assert_eq!(board.len(), 6);
        assert!(board.iter().all(|e| e.label != "Org-abc123"));
        let ranks: Vec<u32> = board.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
    }

    #[rstest]
    #[case(Some(1.9), BenchmarkBucket::Excellent)]
    #[case(Some(2.0), BenchmarkBucket::Excellent)]
    #[case(Some(2.7), BenchmarkBucket::Average)]
    #[case(Some(3.0), BenchmarkBucket::Average)]
    #[case(Some(3.2), BenchmarkBucket::High)]
    #[case(None, BenchmarkBucket::Unknown)]
    fn buckets_use_absolute_thresholds(
        #[case] intensity: Option<f64>,
        #[case] expected: BenchmarkBucket,
    ) {
        let it = SectorThresholds {
            excellent: 2.0,
            good: 2.5,
            average: 3.0,
            needs_improvement: 3.5,
        };
        assert_eq!(bucket(intensity, &it), expected);
    }

    #[test]
    fn peer_spread_skips_self() {
        let cohort = it_demo_with_self(10_000.0);
        let (best, mean, worst) = peer_spread(&cohort);
        assert!((best.unwrap() - 2.1).abs() < 1e-9);
        assert!((worst.unwrap() - 2.6).abs() < 1e-9);
        assert!((mean.unwrap() - 2.38).abs() < 1e-9);
    }
}
