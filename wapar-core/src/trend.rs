//! Trend & Growth Engine
//!
//! Pure functions over an ordered slice of [`DataSnapshot`]s as the store
//! hands them out (append order, which callers keep chronological). None
//! of these touch the store; insufficient history degrades to `None`
//! rather than an error, which the dashboard renders as "insufficient
//! data".

use crate::types::{Confidence, DataSnapshot, GrowthRate, GrowthVelocity, TrendDirection, TrendProjection};
use chrono::{DateTime, Duration, Months, Utc};
use serde::Serialize;

/// All period growth rates plus velocity, each independently `None` when
/// its own preconditions are unmet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthMetrics {
    /// Trailing 24-hour growth
    pub daily: Option<GrowthRate>,
    /// Trailing 7-day growth
    pub weekly: Option<GrowthRate>,
    /// Trailing calendar-month growth
    pub monthly: Option<GrowthRate>,
    /// Velocity and acceleration classification
    pub velocity: Option<GrowthVelocity>,
}

/// Growth of `current` over `previous` with the given period label.
pub fn growth_rate_between(
    current: &DataSnapshot,
    previous: &DataSnapshot,
    period: &str,
) -> GrowthRate {
    let absolute = current.total_installations as i64 - previous.total_installations as i64;
    let value = if previous.total_installations > 0 {
        absolute as f64 / previous.total_installations as f64 * 100.0
    } else {
        0.0
    };
    GrowthRate {
        value,
        period: period.to_string(),
        absolute,
        is_positive: absolute >= 0,
    }
}

/// The snapshot whose timestamp is closest to `target`.
///
/// Linear scan; ties keep the first snapshot encountered. `None` only for
/// an empty slice.
pub fn find_snapshot_near_date(
    snapshots: &[DataSnapshot],
    target: DateTime<Utc>,
) -> Option<&DataSnapshot> {
    let mut best: Option<(&DataSnapshot, Duration)> = None;
    for snapshot in snapshots {
        let distance = (snapshot.timestamp - target).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((snapshot, distance)),
        }
    }
    best.map(|(snapshot, _)| snapshot)
}

/// Growth over the trailing 24 hours: latest snapshot vs. the one nearest
/// to a day earlier. Requires at least 2 snapshots.
pub fn daily_growth_rate(snapshots: &[DataSnapshot]) -> Option<GrowthRate> {
    growth_rate_for_offset(snapshots, Duration::days(1), "24h")
}

/// Growth over the trailing 7 days. Requires at least 2 snapshots.
pub fn weekly_growth_rate(snapshots: &[DataSnapshot]) -> Option<GrowthRate> {
    growth_rate_for_offset(snapshots, Duration::days(7), "7d")
}

/// Growth over the trailing calendar month. Requires at least 2 snapshots.
///
/// The reference date is one calendar month back; chrono clamps to the
/// last valid day of the shorter target month (Mar 31 - 1 month = Feb 28
/// or 29). Accepted quirk of the date library's rollover rule.
pub fn monthly_growth_rate(snapshots: &[DataSnapshot]) -> Option<GrowthRate> {
    if snapshots.len() < 2 {
        return None;
    }
    let latest = snapshots.last()?;
    let target = latest.timestamp.checked_sub_months(Months::new(1))?;
    let previous = find_snapshot_near_date(snapshots, target)?;
    Some(growth_rate_between(latest, previous, "30d"))
}

fn growth_rate_for_offset(
    snapshots: &[DataSnapshot],
    offset: Duration,
    period: &str,
) -> Option<GrowthRate> {
    if snapshots.len() < 2 {
        return None;
    }
    let latest = snapshots.last()?;
    let previous = find_snapshot_near_date(snapshots, latest.timestamp - offset)?;
    Some(growth_rate_between(latest, previous, period))
}

/// Installs per day between two snapshots; `0` when no time has elapsed.
fn installs_per_day(latest: &DataSnapshot, earlier: &DataSnapshot) -> f64 {
    let days = (latest.timestamp - earlier.timestamp).num_seconds() as f64 / 86_400.0;
    if days <= 0.0 {
        return 0.0;
    }
    (latest.total_installations as f64 - earlier.total_installations as f64) / days
}

/// Compare the trailing week's install rate against the full-history
/// average. Requires at least 3 snapshots.
///
/// Classification uses a band of 10% of the average rate. When the
/// average is zero or negative that band collapses toward zero, so even a
/// tiny positive acceleration registers as accelerating; that matches the
/// published dashboard behavior and is not special-cased.
pub fn growth_velocity(snapshots: &[DataSnapshot]) -> Option<GrowthVelocity> {
    if snapshots.len() < 3 {
        return None;
    }
    let latest = snapshots.last()?;
    let week_ago = find_snapshot_near_date(snapshots, latest.timestamp - Duration::days(7))?;
    let current_rate = installs_per_day(latest, week_ago);
    let average_rate = installs_per_day(latest, snapshots.first()?);
    let acceleration = current_rate - average_rate;

    let trend = if acceleration > 0.1 * average_rate {
        TrendDirection::Accelerating
    } else if acceleration < -0.1 * average_rate {
        TrendDirection::Decelerating
    } else {
        TrendDirection::Steady
    };

    Some(GrowthVelocity {
        current_rate,
        average_rate,
        acceleration,
        trend,
    })
}

/// Project when `target_total` installations will be reached at the
/// trailing 30-day rate. Requires at least 2 snapshots.
///
/// `None` when the milestone is already reached or the trailing rate is
/// flat or negative (nothing sane to extrapolate). Confidence is a
/// function of sample count alone, not goodness-of-fit.
pub fn project_milestone(snapshots: &[DataSnapshot], target_total: u64) -> Option<TrendProjection> {
    if snapshots.len() < 2 {
        return None;
    }
    let latest = snapshots.last()?;
    if latest.total_installations >= target_total {
        return None;
    }
    let month_ago = find_snapshot_near_date(snapshots, latest.timestamp - Duration::days(30))?;
    let daily_rate = installs_per_day(latest, month_ago);
    if daily_rate <= 0.0 {
        return None;
    }

    let remaining = (target_total - latest.total_installations) as f64;
    let days_to_milestone = (remaining / daily_rate).ceil() as i64;
    let confidence = if snapshots.len() > 30 {
        Confidence::High
    } else if snapshots.len() > 14 {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    Some(TrendProjection {
        projected_date: latest.timestamp + Duration::days(days_to_milestone),
        days_to_milestone,
        confidence,
    })
}

/// Compute all growth metrics in one pass over the same snapshot slice.
pub fn all_growth_metrics(snapshots: &[DataSnapshot]) -> GrowthMetrics {
    GrowthMetrics {
        daily: daily_growth_rate(snapshots),
        weekly: weekly_growth_rate(snapshots),
        monthly: monthly_growth_rate(snapshots),
        velocity: growth_velocity(snapshots),
    }
}
