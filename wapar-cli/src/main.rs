//! wapar - installation analytics CLI
//!
//! Inspect the collected snapshot history: computed metrics, growth
//! trends, storage stats, and history import/export.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use wapar_core::compare::{growth_rate, market_leader, market_share_chart_data};
use wapar_core::metrics::{
    calculate_all_metrics, diversity_rating, format_percentage, format_score, performance_rating,
};
use wapar_core::store::{FileBackend, SnapshotStore};
use wapar_core::transfer::{export_csv, export_json, import_json, merge_snapshots};
use wapar_core::trend::{all_growth_metrics, project_milestone};
use wapar_core::types::GrowthRate;
use wapar_core::Config;

const ICLOUD_DOCKER: &str = "iCloud Docker";
const HA_BOUNCIE: &str = "HA Bouncie";

#[derive(Parser, Debug)]
#[command(name = "wapar")]
#[command(about = "WAPAR installation analytics")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show computed metrics and growth trends for the stored history
    Report {
        /// Emit the report as JSON instead of formatted text
        #[arg(long)]
        json: bool,

        /// Project when this installation total will be reached
        #[arg(long)]
        milestone: Option<u64>,
    },
    /// Show snapshot store statistics
    Stats,
    /// Export the snapshot history
    Export {
        /// Export format: json or csv
        #[arg(long, default_value = "json")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<std::path::PathBuf>,
    },
    /// Import a previously exported JSON history file
    Import {
        /// Path to the export file
        file: std::path::PathBuf,

        /// Replace the stored history instead of merging into it
        #[arg(long)]
        replace: bool,
    },
    /// Remove all stored snapshots
    Clear,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = wapar_core::logging::init(&config.logging).ok();

    let backend =
        FileBackend::open(Config::data_dir()).context("failed to open snapshot storage")?;
    let store = SnapshotStore::new(Box::new(backend), config.storage.clone());

    match args.command {
        Command::Report { json, milestone } => report(&store, json, milestone),
        Command::Stats => stats(&store),
        Command::Export { format, output } => export(&store, &format, output.as_deref()),
        Command::Import { file, replace } => import(&store, &file, replace),
        Command::Clear => {
            store.clear_all();
            println!("Snapshot history cleared.");
            Ok(())
        }
    }
}

fn format_growth(rate: &Option<GrowthRate>) -> String {
    match rate {
        Some(rate) => format!(
            "{}{} ({:+} installs)",
            if rate.is_positive { "+" } else { "" },
            format_percentage(rate.value, 1),
            rate.absolute
        ),
        None => "insufficient data".to_string(),
    }
}

fn report(store: &SnapshotStore, json: bool, milestone: Option<u64>) -> Result<()> {
    let history = store.all_snapshots();
    let Some(latest) = history.last() else {
        println!("No snapshot history recorded yet.");
        return Ok(());
    };

    let metrics = calculate_all_metrics(
        latest.monthly_active,
        latest.total_installations,
        &latest.country_to_count,
    );
    let growth = all_growth_metrics(&history);
    let leader = market_leader(
        latest.icloud_docker,
        ICLOUD_DOCKER,
        latest.ha_bouncie,
        HA_BOUNCIE,
    );
    let projection = milestone.and_then(|target| project_milestone(&history, target));

    if json {
        let report = serde_json::json!({
            "generatedAt": Utc::now(),
            "latestSnapshot": latest,
            "metrics": metrics,
            "growth": growth,
            "marketLeader": leader,
            "chart": market_share_chart_data(
                latest.icloud_docker,
                ICLOUD_DOCKER,
                latest.ha_bouncie,
                HA_BOUNCIE,
            ),
            "milestone": projection,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let penetration = performance_rating(metrics.market_penetration_score);
    let diversity = diversity_rating(metrics.geographic_diversity_index);

    println!();
    println!("WAPAR ANALYTICS ({} snapshots)", history.len());
    println!();
    println!("  Installations: {:<8} Monthly active: {}", latest.total_installations, latest.monthly_active);
    println!(
        "  Activity rate: {:<8} Engagement quality: {}",
        format_percentage(metrics.install_to_activity_rate, 1),
        format_score(metrics.engagement_quality_score)
    );
    println!(
        "  Penetration:   {} {} ({})",
        penetration.indicator,
        format_score(metrics.market_penetration_score),
        penetration.label
    );
    println!(
        "  Diversity:     {} ({})",
        format_score(metrics.geographic_diversity_index),
        diversity.label
    );
    println!();
    println!("GROWTH");
    println!("  24h: {}", format_growth(&growth.daily));
    println!("  7d:  {}", format_growth(&growth.weekly));
    println!("  30d: {}", format_growth(&growth.monthly));
    if let Some(velocity) = &growth.velocity {
        println!(
            "  Velocity: {:.1}/day vs {:.1}/day average ({})",
            velocity.current_rate,
            velocity.average_rate,
            velocity.trend.as_str()
        );
    }
    println!();
    println!("MARKET");
    if leader.is_tie {
        println!("  {} and {} are tied.", ICLOUD_DOCKER, HA_BOUNCIE);
    } else {
        println!(
            "  {} leads by {} share points.",
            leader.leader,
            format_score(leader.margin)
        );
    }
    if history.len() >= 2 {
        let previous = &history[history.len() - 2];
        let icloud = growth_rate(latest.icloud_docker, previous.icloud_docker);
        let bouncie = growth_rate(latest.ha_bouncie, previous.ha_bouncie);
        let delta = |g: Option<f64>| match g {
            Some(v) => format_percentage(v, 1),
            None => "n/a".to_string(),
        };
        println!(
            "  Since previous snapshot: {} {}, {} {}",
            ICLOUD_DOCKER,
            delta(icloud),
            HA_BOUNCIE,
            delta(bouncie)
        );
    }
    if let Some(target) = milestone {
        println!();
        match projection {
            Some(projection) => println!(
                "MILESTONE: {} installs in ~{} days ({}, {} confidence)",
                target,
                projection.days_to_milestone,
                projection.projected_date.format("%Y-%m-%d"),
                projection.confidence.as_str()
            ),
            None => println!("MILESTONE: {} - insufficient data to project", target),
        }
    }
    println!();
    Ok(())
}

fn stats(store: &SnapshotStore) -> Result<()> {
    let stats = store.storage_stats();
    println!("Snapshots: {}", stats.snapshot_count);
    match (stats.oldest_snapshot, stats.newest_snapshot) {
        (Some(oldest), Some(newest)) => {
            println!("Oldest:    {}", oldest.format("%Y-%m-%d %H:%M UTC"));
            println!("Newest:    {}", newest.format("%Y-%m-%d %H:%M UTC"));
        }
        _ => println!("Oldest:    -\nNewest:    -"),
    }
    println!("Size:      {} KB", stats.estimated_size_kb);
    Ok(())
}

fn export(
    store: &SnapshotStore,
    format: &str,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let history = store.all_snapshots();
    let content = match format {
        "json" => export_json(&history).context("failed to serialize history")?,
        "csv" => export_csv(&history),
        other => anyhow::bail!("Unknown export format: {}. Use 'json' or 'csv'", other),
    };

    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported {} snapshots to {}", history.len(), path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn import(store: &SnapshotStore, file: &std::path::Path, replace: bool) -> Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let imported = import_json(&data).context("import failed")?;
    let imported_count = imported.len();

    let merged = if replace {
        merge_snapshots(imported, Vec::new())
    } else {
        merge_snapshots(store.all_snapshots(), imported)
    };

    store.clear_all();
    let mut saved = 0usize;
    for snapshot in &merged {
        if store.save_snapshot(snapshot) {
            saved += 1;
        }
    }

    println!(
        "Imported {} snapshots ({} stored after merge and retention).",
        imported_count, saved
    );
    Ok(())
}
