//! Import/export adapter for snapshot history.
//!
//! Export produces a versioned JSON envelope or a fixed-column CSV;
//! import validates every candidate record and is the one boundary in
//! this crate that rejects loudly: import is user-initiated, so silent
//! data loss must surface as an error instead of being swallowed.

use crate::error::{Error, Result};
use crate::types::DataSnapshot;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Envelope format version.
pub const EXPORT_VERSION: &str = "1.0";

/// CSV header row. The last column is the number of distinct country
/// entries, not an installation total.
pub const CSV_HEADER: &str =
    "Timestamp,Total Installations,Monthly Active,iCloud Docker,HA Bouncie,Country Count";

/// Serialize snapshots into the versioned JSON envelope
/// `{version, exportDate, snapshotCount, snapshots}`.
pub fn export_json(snapshots: &[DataSnapshot]) -> Result<String> {
    let envelope = serde_json::json!({
        "version": EXPORT_VERSION,
        "exportDate": Utc::now(),
        "snapshotCount": snapshots.len(),
        "snapshots": snapshots,
    });
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Serialize snapshots into CSV with the fixed six-column header.
pub fn export_csv(snapshots: &[DataSnapshot]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for snapshot in snapshots {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            snapshot.timestamp.to_rfc3339(),
            snapshot.total_installations,
            snapshot.monthly_active,
            snapshot.icloud_docker,
            snapshot.ha_bouncie,
            snapshot.country_to_count.len(),
        ));
    }
    out
}

/// Parse a JSON envelope back into snapshots.
///
/// Individually invalid records (missing fields, wrong primitive types)
/// are discarded; the whole import fails only for malformed JSON, a
/// missing or non-list `snapshots` key, or zero surviving records.
pub fn import_json(data: &str) -> Result<Vec<DataSnapshot>> {
    let envelope: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| Error::Import(format!("not valid JSON: {e}")))?;

    let candidates = envelope
        .get("snapshots")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::Import("missing 'snapshots' list in envelope".to_string()))?;

    let mut snapshots = Vec::with_capacity(candidates.len());
    let mut discarded = 0usize;
    for candidate in candidates {
        match serde_json::from_value::<DataSnapshot>(candidate.clone()) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(_) => discarded += 1,
        }
    }

    if discarded > 0 {
        tracing::warn!(discarded, "Discarded invalid records during import");
    }
    if snapshots.is_empty() {
        return Err(Error::Import(
            "no valid snapshots found in import file".to_string(),
        ));
    }
    Ok(snapshots)
}

/// Merge two snapshot lists, deduplicating by exact timestamp equality.
///
/// On a timestamp conflict the snapshot with the larger
/// `total_installations` wins. The result is sorted ascending by
/// timestamp; this is the one place ordering is guaranteed rather than
/// inherited from append order.
pub fn merge_snapshots(a: Vec<DataSnapshot>, b: Vec<DataSnapshot>) -> Vec<DataSnapshot> {
    let mut merged: BTreeMap<DateTime<Utc>, DataSnapshot> = BTreeMap::new();
    for snapshot in a.into_iter().chain(b) {
        match merged.get(&snapshot.timestamp) {
            Some(existing) if existing.total_installations >= snapshot.total_installations => {}
            _ => {
                merged.insert(snapshot.timestamp, snapshot);
            }
        }
    }
    merged.into_values().collect()
}
