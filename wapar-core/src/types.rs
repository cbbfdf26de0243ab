//! Domain types for the WAPAR analytics core.
//!
//! Field names serialize in the camelCase spelling the dashboard and the
//! export envelope use on the wire (`totalInstallations`, `iCloudDocker`,
//! `countryToCount`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Installations attributed to a single country.
///
/// Callers are expected to pre-aggregate per country, but nothing here
/// requires it: the diversity computation simply sums whatever it is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDatum {
    /// ISO country code (e.g., "US", "DE")
    #[serde(rename = "countryCode")]
    pub country_code: String,
    /// Installations attributed to this country
    pub count: u64,
}

impl CountryDatum {
    /// Convenience constructor.
    pub fn new(country_code: impl Into<String>, count: u64) -> Self {
        Self {
            country_code: country_code.into(),
            count,
        }
    }
}

/// Full state of the tracked deployments at one point in time.
///
/// Created by the ingestion side at most once per day and owned by the
/// [`SnapshotStore`](crate::store::SnapshotStore); never mutated in place,
/// only superseded by a newer snapshot or evicted by retention policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSnapshot {
    /// When this snapshot was taken (serialized as RFC 3339 / ISO-8601)
    pub timestamp: DateTime<Utc>,
    /// Total installations across both applications
    pub total_installations: u64,
    /// Installations active in the last month
    pub monthly_active: u64,
    /// iCloud Docker installations
    #[serde(rename = "iCloudDocker")]
    pub icloud_docker: u64,
    /// HA Bouncie installations
    #[serde(rename = "haBouncie")]
    pub ha_bouncie: u64,
    /// Per-country installation breakdown
    pub country_to_count: Vec<CountryDatum>,
}

/// Normalized scores computed from a single snapshot's counts.
///
/// Transient: recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsMetrics {
    /// Install-to-activity conversion, percent in [0, 100]
    pub install_to_activity_rate: f64,
    /// Herfindahl-based geographic diversity, [0, 1)
    pub geographic_diversity_index: f64,
    /// Composite engagement quality, [0, 2]
    pub engagement_quality_score: f64,
    /// Benchmark market penetration, [0, 100]
    pub market_penetration_score: f64,
}

/// Growth between two snapshots over a labeled period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRate {
    /// Relative growth in percent (0 when the baseline is 0)
    pub value: f64,
    /// Period label, e.g. "24h", "7d", "30d"
    pub period: String,
    /// Absolute installation delta
    pub absolute: i64,
    /// Whether the delta is non-negative
    pub is_positive: bool,
}

/// Direction of the growth trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Recent rate meaningfully above the long-run average
    Accelerating,
    /// Recent rate meaningfully below the long-run average
    Decelerating,
    /// Within 10% of the long-run average
    Steady,
}

impl TrendDirection {
    /// Display string for dashboards and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Accelerating => "accelerating",
            TrendDirection::Decelerating => "decelerating",
            TrendDirection::Steady => "steady",
        }
    }
}

/// Installation velocity comparing recent and long-run growth.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthVelocity {
    /// Installs per day over the trailing week
    pub current_rate: f64,
    /// Installs per day over the full recorded history
    pub average_rate: f64,
    /// `current_rate - average_rate`
    pub acceleration: f64,
    /// Classified trend direction
    pub trend: TrendDirection,
}

/// Confidence in a milestone projection, derived from sample count alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// More than 30 snapshots of history
    High,
    /// More than 14 snapshots of history
    Medium,
    /// 14 or fewer snapshots
    Low,
}

impl Confidence {
    /// Display string for dashboards and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Projected date for reaching an installation milestone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendProjection {
    /// Projected date the milestone is reached
    pub projected_date: DateTime<Utc>,
    /// Whole days until the milestone at the current rate
    pub days_to_milestone: i64,
    /// Confidence band for the projection
    pub confidence: Confidence,
}

/// Dashboard rating band for a penetration/engagement score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRating {
    /// Band label, e.g. "Excellent"
    pub label: &'static str,
    /// Foreground color class
    pub color: &'static str,
    /// Background color class
    pub bg_color: &'static str,
    /// Emoji indicator
    pub indicator: &'static str,
    /// One-line description of the band
    pub description: &'static str,
}

/// Dashboard rating band for a geographic diversity index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiversityRating {
    /// Band label, e.g. "Moderate"
    pub label: &'static str,
    /// One-line description of the band
    pub description: &'static str,
    /// Foreground color class
    pub color: &'static str,
}
