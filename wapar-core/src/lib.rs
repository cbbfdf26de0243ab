//! # wapar-core
//!
//! Analytics core for the WAPAR installation telemetry dashboard, which
//! tracks installations and usage of iCloud Docker and HA Bouncie.
//!
//! This library provides:
//! - Pure metric computations (conversion, geographic diversity,
//!   engagement quality, market penetration benchmarking)
//! - Head-to-head market comparison between the two applications
//! - A bounded, retention-governed historical snapshot store
//! - Trend, velocity, and milestone-projection analysis over snapshot
//!   history
//! - Import/export of snapshot history (JSON envelope, CSV)
//!
//! Ingestion (the HTTP API collecting heartbeats) and dashboard rendering
//! live elsewhere; this crate only computes and persists.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wapar_core::metrics::calculate_all_metrics;
//! use wapar_core::store::default_store;
//! use wapar_core::trend::all_growth_metrics;
//!
//! let history = default_store().all_snapshots();
//! if let Some(latest) = history.last() {
//!     let metrics = calculate_all_metrics(
//!         latest.monthly_active,
//!         latest.total_installations,
//!         &latest.country_to_count,
//!     );
//!     let growth = all_growth_metrics(&history);
//!     println!("{:?} {:?}", metrics, growth.weekly);
//! }
//! ```

// Re-export commonly used items at the crate root
pub use config::{Config, StorageConfig};
pub use error::{Error, Result};
pub use store::{default_store, SnapshotStore};
pub use types::*;

// Public modules
pub mod compare;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod store;
pub mod transfer;
pub mod trend;
pub mod types;
