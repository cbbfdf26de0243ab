//! Integration tests for the snapshot store and analytics pipeline
//!
//! These exercise the end-to-end flow the dashboard relies on: snapshots
//! saved to a file-backed store, trend analysis over the stored history,
//! and export/import round trips through the transfer adapter.

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;
use wapar_core::metrics::calculate_all_metrics;
use wapar_core::store::{FileBackend, SnapshotStore};
use wapar_core::transfer::{export_json, import_json, merge_snapshots};
use wapar_core::trend::{all_growth_metrics, project_milestone};
use wapar_core::types::{Confidence, CountryDatum, DataSnapshot, TrendDirection};
use wapar_core::StorageConfig;

fn snapshot_at(timestamp: chrono::DateTime<Utc>, total: u64, active: u64) -> DataSnapshot {
    DataSnapshot {
        timestamp,
        total_installations: total,
        monthly_active: active,
        icloud_docker: total * 7 / 10,
        ha_bouncie: total - total * 7 / 10,
        country_to_count: vec![
            CountryDatum::new("US", total / 2),
            CountryDatum::new("DE", total / 4),
            CountryDatum::new("FR", total / 4),
        ],
    }
}

fn file_store(dir: &TempDir) -> SnapshotStore {
    let backend = FileBackend::open(dir.path()).expect("create file backend");
    let config = StorageConfig {
        // keep fixed historical test dates inside the retention window
        retention_days: 100_000,
        ..StorageConfig::default()
    };
    SnapshotStore::new(Box::new(backend), config)
}

#[test]
fn test_snapshots_survive_store_reopen() {
    let dir = TempDir::new().unwrap();
    let now = Utc::now();

    let store = file_store(&dir);
    for day in (0..5).rev() {
        assert!(store.save_snapshot(&snapshot_at(
            now - Duration::days(day),
            1000 + (5 - day as u64) * 10,
            600,
        )));
    }
    drop(store);

    // a fresh store over the same directory sees the same history
    let reopened = file_store(&dir);
    let history = reopened.all_snapshots();
    assert_eq!(history.len(), 5);
    assert_eq!(reopened.latest_snapshot().unwrap().timestamp, history[4].timestamp);
}

#[test]
fn test_daily_collection_flow_with_advisory_check() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    let noon = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    // first snapshot of the day goes in
    assert!(store.should_save_snapshot(noon));
    assert!(store.save_snapshot(&snapshot_at(noon, 1000, 600)));

    // a heartbeat later the same day is advised against, but the raw save
    // still succeeds if a caller ignores the advisory
    let later = noon + Duration::minutes(5);
    assert!(!store.should_save_snapshot(later));
    assert!(store.save_snapshot(&snapshot_at(later, 1001, 600)));
    assert_eq!(store.all_snapshots().len(), 2);
}

#[test]
fn test_trend_pipeline_over_stored_history() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    // 40 days of steady +10/day growth
    for day in 0..40 {
        store.save_snapshot(&snapshot_at(
            base + Duration::days(day),
            1000 + day as u64 * 10,
            600 + day as u64 * 5,
        ));
    }

    let history = store.all_snapshots();
    let growth = all_growth_metrics(&history);

    let daily = growth.daily.expect("daily growth");
    assert_eq!(daily.absolute, 10);
    assert!(daily.is_positive);

    let weekly = growth.weekly.expect("weekly growth");
    assert_eq!(weekly.absolute, 70);

    let velocity = growth.velocity.expect("velocity");
    assert_eq!(velocity.trend, TrendDirection::Steady);

    let projection =
        project_milestone(&history, 2000).expect("projection with positive growth");
    assert_eq!(projection.confidence, Confidence::High);
    assert!(projection.days_to_milestone > 0);
}

#[test]
fn test_metrics_from_latest_snapshot() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.save_snapshot(&snapshot_at(Utc::now(), 1000, 600));

    let latest = store.latest_snapshot().unwrap();
    let metrics = calculate_all_metrics(
        latest.monthly_active,
        latest.total_installations,
        &latest.country_to_count,
    );

    assert!((metrics.install_to_activity_rate - 60.0).abs() < 1e-9);
    // 1/2, 1/4, 1/4 split -> HHI 0.375, diversity 0.625
    assert!((metrics.geographic_diversity_index - 0.625).abs() < 1e-9);
    assert!((metrics.engagement_quality_score - 0.6 * 1.625).abs() < 1e-9);
    assert!(metrics.market_penetration_score >= 89.0);
}

#[test]
fn test_export_import_merge_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    for day in 0..10 {
        store.save_snapshot(&snapshot_at(base + Duration::days(day), 1000 + day as u64, 600));
    }

    let history = store.all_snapshots();
    let exported = export_json(&history).unwrap();
    let imported = import_json(&exported).unwrap();
    assert_eq!(imported, history);

    // merging an overlapping import back into the stored history keeps
    // one entry per timestamp and stays sorted
    let merged = merge_snapshots(history.clone(), imported);
    assert_eq!(merged, history);
}

#[test]
fn test_clear_all_removes_backing_file_contents() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.save_snapshot(&snapshot_at(Utc::now(), 1000, 600));
    assert_eq!(store.storage_stats().snapshot_count, 1);

    store.clear_all();
    assert!(store.all_snapshots().is_empty());
    assert_eq!(store.storage_stats().snapshot_count, 0);
}
