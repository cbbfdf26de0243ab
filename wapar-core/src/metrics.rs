//! Analytics Metrics Engine
//!
//! Pure functions turning raw installation counts into normalized scores.
//! Every function here is total: no I/O, no state, no panics. Degenerate
//! inputs (zero totals, empty country lists) map to `0.0` so dashboard code
//! can compose these without defensive wrapping.

use crate::types::{AnalyticsMetrics, CountryDatum, DiversityRating, PerformanceRating};

/// Install-to-activity conversion rate in percent.
///
/// `monthly_active / total_installations * 100`, or `0` when there are no
/// installations. No upper clamp: if callers report more active users than
/// installations the result exceeds 100 rather than being hidden.
pub fn install_to_activity_rate(monthly_active: u64, total_installations: u64) -> f64 {
    if total_installations == 0 {
        return 0.0;
    }
    monthly_active as f64 / total_installations as f64 * 100.0
}

/// Geographic diversity index in [0, 1), derived from the
/// Herfindahl-Hirschman concentration index.
///
/// Each country's share of `total_installations` is squared and summed
/// (HHI); the index is `1 - HHI`. A single country yields exactly `0`
/// (complete concentration); N equal countries yield `1 - 1/N`. Shares are
/// not renormalized, so pre-aggregation is the caller's business.
pub fn geographic_diversity_index(countries: &[CountryDatum], total_installations: u64) -> f64 {
    if total_installations == 0 || countries.is_empty() {
        return 0.0;
    }
    let total = total_installations as f64;
    let hhi: f64 = countries
        .iter()
        .map(|c| {
            let share = c.count as f64 / total;
            share * share
        })
        .sum();
    1.0 - hhi
}

/// Composite engagement quality score in [0, 2].
///
/// Engagement ratio weighted by geographic spread:
/// `(monthly_active / total_installations) * (1 + diversity_index)`.
/// The theoretical maximum of 2.0 needs 100% engagement and diversity 1;
/// out-of-range inputs are not clamped.
pub fn engagement_quality_score(
    monthly_active: u64,
    total_installations: u64,
    diversity_index: f64,
) -> f64 {
    if total_installations == 0 {
        return 0.0;
    }
    (monthly_active as f64 / total_installations as f64) * (1.0 + diversity_index)
}

/// Market penetration benchmark score in [0, 100].
///
/// Piecewise-linear mapping of the engagement rate `r` onto benchmark
/// bands:
/// - `r >= 50`: `[90, 100]`
/// - `25 <= r < 50`: `[60, 89]`
/// - `r < 25`: `[0, 59]`
///
/// Note the deliberate 1-point jump at `r = 50` (89 approaching from
/// below, 90 at the boundary). That step is part of the published
/// benchmark bands and is pinned by tests; do not smooth it out.
pub fn market_penetration_score(monthly_active: u64, total_installations: u64) -> f64 {
    if total_installations == 0 {
        return 0.0;
    }
    let rate = monthly_active as f64 / total_installations as f64 * 100.0;
    if rate >= 50.0 {
        90.0 + ((rate - 50.0) / 50.0 * 10.0).min(10.0)
    } else if rate >= 25.0 {
        60.0 + (rate - 25.0) / 25.0 * 29.0
    } else {
        rate / 25.0 * 60.0
    }
}

/// Rating band for a penetration/engagement score. Total over all reals.
pub fn performance_rating(score: f64) -> PerformanceRating {
    if score >= 80.0 {
        PerformanceRating {
            label: "Excellent",
            color: "text-green-600",
            bg_color: "bg-green-100",
            indicator: "\u{1F7E2}",
            description: "Outstanding engagement across the installed base",
        }
    } else if score >= 60.0 {
        PerformanceRating {
            label: "Good",
            color: "text-yellow-600",
            bg_color: "bg-yellow-100",
            indicator: "\u{1F7E1}",
            description: "Healthy engagement with room to grow",
        }
    } else if score >= 40.0 {
        PerformanceRating {
            label: "Fair",
            color: "text-orange-600",
            bg_color: "bg-orange-100",
            indicator: "\u{1F7E0}",
            description: "Engagement is lagging the installed base",
        }
    } else {
        PerformanceRating {
            label: "Needs Improvement",
            color: "text-red-600",
            bg_color: "bg-red-100",
            indicator: "\u{1F534}",
            description: "Most installations are inactive",
        }
    }
}

/// Rating band for a geographic diversity index. Total over all reals.
pub fn diversity_rating(index: f64) -> DiversityRating {
    if index >= 0.8 {
        DiversityRating {
            label: "Excellent",
            description: "Installations are spread across many countries",
            color: "text-green-600",
        }
    } else if index >= 0.6 {
        DiversityRating {
            label: "Good",
            description: "Broad geographic spread with some concentration",
            color: "text-yellow-600",
        }
    } else if index >= 0.4 {
        DiversityRating {
            label: "Moderate",
            description: "Usage is concentrated in a handful of countries",
            color: "text-orange-600",
        }
    } else {
        DiversityRating {
            label: "Low",
            description: "Usage is dominated by one or two countries",
            color: "text-red-600",
        }
    }
}

/// Compute all four scores from one set of counts.
///
/// Diversity is computed once and fed into the engagement score rather
/// than recomputed independently.
pub fn calculate_all_metrics(
    monthly_active: u64,
    total_installations: u64,
    countries: &[CountryDatum],
) -> AnalyticsMetrics {
    let diversity = geographic_diversity_index(countries, total_installations);
    AnalyticsMetrics {
        install_to_activity_rate: install_to_activity_rate(monthly_active, total_installations),
        geographic_diversity_index: diversity,
        engagement_quality_score: engagement_quality_score(
            monthly_active,
            total_installations,
            diversity,
        ),
        market_penetration_score: market_penetration_score(monthly_active, total_installations),
    }
}

/// Round half away from zero at `decimals` places.
fn round_fixed(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Format a percentage with a fixed number of decimals and a `%` suffix.
///
/// Rounding is half-away-from-zero: `45.45` at 1 decimal is `"45.5%"`,
/// `45.44` is `"45.4%"`.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, round_fixed(value, decimals))
}

/// Format a score with one decimal place.
pub fn format_score(value: f64) -> String {
    format!("{:.1}", round_fixed(value, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_install_to_activity_rate() {
        assert!(approx(install_to_activity_rate(600, 1000), 60.0));
        assert!(approx(install_to_activity_rate(0, 1000), 0.0));
        // zero-safety: no installations at all
        assert!(approx(install_to_activity_rate(10, 0), 0.0));
        // more active than installed is reported, not clamped
        assert!(approx(install_to_activity_rate(1500, 1000), 150.0));
    }

    #[test]
    fn test_diversity_single_country_is_zero() {
        let countries = vec![CountryDatum::new("US", 1000)];
        assert!(approx(geographic_diversity_index(&countries, 1000), 0.0));
    }

    #[test]
    fn test_diversity_equal_shares() {
        // N equal countries -> 1 - 1/N
        let four: Vec<CountryDatum> = (0..4).map(|i| CountryDatum::new(format!("C{i}"), 250)).collect();
        assert!(approx(geographic_diversity_index(&four, 1000), 0.75));

        let hundred: Vec<CountryDatum> =
            (0..100).map(|i| CountryDatum::new(format!("C{i}"), 10)).collect();
        assert!(approx(geographic_diversity_index(&hundred, 1000), 0.99));
    }

    #[test]
    fn test_diversity_bounds_and_edge_cases() {
        assert!(approx(geographic_diversity_index(&[], 1000), 0.0));
        assert!(approx(
            geographic_diversity_index(&[CountryDatum::new("US", 5)], 0),
            0.0
        ));

        let mixed = vec![
            CountryDatum::new("US", 700),
            CountryDatum::new("DE", 200),
            CountryDatum::new("FR", 100),
        ];
        let index = geographic_diversity_index(&mixed, 1000);
        assert!(index > 0.0 && index < 1.0);
    }

    #[test]
    fn test_engagement_quality_scenario() {
        // 60% engagement at diversity 0.75 -> 0.6 * 1.75 = 1.05
        assert!(approx(engagement_quality_score(600, 1000, 0.75), 1.05));
        assert!(approx(engagement_quality_score(600, 0, 0.75), 0.0));
    }

    #[test]
    fn test_penetration_bands() {
        // r < 25 band
        assert!(approx(market_penetration_score(100, 1000), 10.0 / 25.0 * 60.0));
        // boundary r = 25 -> exactly 60
        assert!(approx(market_penetration_score(250, 1000), 60.0));
        // r >= 50 band start
        let at_fifty = market_penetration_score(500, 1000);
        assert!(at_fifty >= 89.0 && at_fifty < 91.0);
        assert!(approx(at_fifty, 90.0));
        // fully engaged -> 100, capped
        assert!(approx(market_penetration_score(1000, 1000), 100.0));
        assert!(approx(market_penetration_score(2000, 1000), 100.0));
        // zero-safety
        assert!(approx(market_penetration_score(0, 0), 0.0));
    }

    #[test]
    fn test_penetration_discontinuity_at_fifty() {
        // 89 approaching from below, 90 at the boundary. Intentional.
        let just_below = market_penetration_score(49_999, 100_000);
        let at_boundary = market_penetration_score(50_000, 100_000);
        assert!(just_below < 89.0 + 1e-6);
        assert!(approx(at_boundary, 90.0));
        assert!(at_boundary - just_below > 0.9);
    }

    #[test]
    fn test_penetration_monotonic_in_rate() {
        let mut last = -1.0;
        for active in (0..=1000).step_by(25) {
            let score = market_penetration_score(active, 1000);
            assert!(score >= last, "score regressed at active={active}");
            last = score;
        }
    }

    #[test]
    fn test_performance_rating_bands() {
        assert_eq!(performance_rating(95.0).label, "Excellent");
        assert_eq!(performance_rating(80.0).label, "Excellent");
        assert_eq!(performance_rating(79.9).label, "Good");
        assert_eq!(performance_rating(60.0).label, "Good");
        assert_eq!(performance_rating(59.9).label, "Fair");
        assert_eq!(performance_rating(40.0).label, "Fair");
        assert_eq!(performance_rating(39.9).label, "Needs Improvement");
        assert_eq!(performance_rating(-5.0).label, "Needs Improvement");
        // pure lookup: same input, same output
        assert_eq!(performance_rating(72.5), performance_rating(72.5));
    }

    #[test]
    fn test_diversity_rating_bands() {
        assert_eq!(diversity_rating(0.85).label, "Excellent");
        assert_eq!(diversity_rating(0.8).label, "Excellent");
        assert_eq!(diversity_rating(0.7).label, "Good");
        assert_eq!(diversity_rating(0.5).label, "Moderate");
        assert_eq!(diversity_rating(0.1).label, "Low");
    }

    #[test]
    fn test_calculate_all_metrics_composes() {
        let countries: Vec<CountryDatum> =
            (0..4).map(|i| CountryDatum::new(format!("C{i}"), 250)).collect();
        let metrics = calculate_all_metrics(600, 1000, &countries);
        assert!(approx(metrics.install_to_activity_rate, 60.0));
        assert!(approx(metrics.geographic_diversity_index, 0.75));
        // diversity feeds engagement: 0.6 * 1.75
        assert!(approx(metrics.engagement_quality_score, 1.05));
        assert!(approx(metrics.market_penetration_score, 90.0 + 10.0 / 50.0 * 10.0));
    }

    #[test]
    fn test_calculate_all_metrics_zero_total() {
        let metrics = calculate_all_metrics(0, 0, &[]);
        assert!(approx(metrics.install_to_activity_rate, 0.0));
        assert!(approx(metrics.geographic_diversity_index, 0.0));
        assert!(approx(metrics.engagement_quality_score, 0.0));
        assert!(approx(metrics.market_penetration_score, 0.0));
    }

    #[test]
    fn test_format_percentage_rounding() {
        assert_eq!(format_percentage(45.45, 1), "45.5%");
        assert_eq!(format_percentage(45.44, 1), "45.4%");
        assert_eq!(format_percentage(100.0, 0), "100%");
        assert_eq!(format_percentage(0.125, 2), "0.13%");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(1.05), "1.1");
        assert_eq!(format_score(89.94), "89.9");
        assert_eq!(format_score(0.0), "0.0");
    }
}
