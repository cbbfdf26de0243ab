//! Market Comparison Utilities
//!
//! Pure functions comparing the two tracked applications against each
//! other (share of the combined install base, leader, growth). Same
//! zero-safe posture as the metrics engine: denominator of zero degrades
//! to `0`, with one documented exception in [`growth_rate`].

use serde::Serialize;

/// Outcome of a head-to-head market comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketLeader {
    /// Name of the leading application, or "Tie"
    pub leader: String,
    /// Share-point margin between the two, in percent
    pub margin: f64,
    /// Whether the totals are exactly equal
    pub is_tie: bool,
}

/// Raw totals and shares packaged for a comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketShareChartData {
    /// Application names, in input order
    pub labels: Vec<String>,
    /// Raw installation totals, in input order
    pub data: Vec<u64>,
    /// Each application's share of the combined total, in percent
    pub percentages: Vec<f64>,
}

/// One application's share of the whole market, in percent.
pub fn market_share(app_total: u64, total_market: u64) -> f64 {
    if total_market == 0 {
        return 0.0;
    }
    app_total as f64 / total_market as f64 * 100.0
}

/// Signed difference between two applications' shares of their combined
/// total, in percent. `0` when both totals are zero.
pub fn market_share_difference(a_total: u64, b_total: u64) -> f64 {
    let combined = a_total + b_total;
    market_share(a_total, combined) - market_share(b_total, combined)
}

/// Determine which application leads the combined install base.
///
/// A tie requires exact equality of the raw totals; otherwise the margin
/// is the absolute share-point difference.
pub fn market_leader(a_total: u64, a_name: &str, b_total: u64, b_name: &str) -> MarketLeader {
    if a_total == b_total {
        return MarketLeader {
            leader: "Tie".to_string(),
            margin: 0.0,
            is_tie: true,
        };
    }
    let leader = if a_total > b_total { a_name } else { b_name };
    MarketLeader {
        leader: leader.to_string(),
        margin: market_share_difference(a_total, b_total).abs(),
        is_tie: false,
    }
}

/// Period-over-period growth in percent.
///
/// With no prior baseline (`previous == 0`) the result is `Some(100.0)`
/// when anything grew and `None` when there is nothing to compare. The
/// `None` is the "insufficient data" sentinel the dashboard renders, and
/// is deliberately not `0`.
pub fn growth_rate(current: u64, previous: u64) -> Option<f64> {
    if previous == 0 {
        return if current > 0 { Some(100.0) } else { None };
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}

/// Package totals and shares for the comparison chart. No computation
/// beyond [`market_share`] applied to each side.
pub fn market_share_chart_data(
    a_total: u64,
    a_name: &str,
    b_total: u64,
    b_name: &str,
) -> MarketShareChartData {
    let combined = a_total + b_total;
    MarketShareChartData {
        labels: vec![a_name.to_string(), b_name.to_string()],
        data: vec![a_total, b_total],
        percentages: vec![market_share(a_total, combined), market_share(b_total, combined)],
    }
}
