use clap::{Parser, Subcommand};
use hs_app::{query, AppResult, StatsJobOptions, StatsJobRequest};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hs-cli")]
#[command(about = "Hydrostat CLI - hydraulic network statistics tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a network model file
    Validate {
        /// Path to the model YAML or JSON file
        model_path: PathBuf,
    },
    /// Compute statistics from a results file into a SQLite store
    Run {
        /// Path to the model YAML or JSON file
        model_path: PathBuf,
        /// Path to the results JSON file
        results_path: PathBuf,
        /// Path to the statistics SQLite database
        store_path: PathBuf,
        /// Recompute even when inputs are unchanged
        #[arg(long)]
        force: bool,
    },
    /// Show which result variable fed each stored field
    Sources {
        /// Path to the statistics SQLite database
        store_path: PathBuf,
    },
    /// Show row counts per statistics table
    Summary {
        /// Path to the statistics SQLite database
        store_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { model_path } => cmd_validate(&model_path),
        Commands::Run {
            model_path,
            results_path,
            store_path,
            force,
        } => cmd_run(&model_path, &results_path, &store_path, force),
        Commands::Sources { store_path } => cmd_sources(&store_path),
        Commands::Summary { store_path } => cmd_summary(&store_path),
    }
}

fn cmd_validate(model_path: &Path) -> AppResult<()> {
    println!("Validating model: {}", model_path.display());
    let model = hs_app::load_network_model(model_path)?;
    let summary = hs_app::summarize_model(&model);
    println!("✓ Model '{}' is valid", summary.name);
    println!(
        "  Manholes: {}, Pipes: {}, Weirs: {}, Pumps: {}",
        summary.manhole_count, summary.pipe_count, summary.weir_count, summary.pump_count
    );
    Ok(())
}

fn cmd_run(
    model_path: &Path,
    results_path: &Path,
    store_path: &Path,
    force: bool,
) -> AppResult<()> {
    println!("Computing statistics into: {}", store_path.display());

    let request = StatsJobRequest {
        model_path,
        results_path,
        store_path,
        options: StatsJobOptions {
            force,
            ..StatsJobOptions::default()
        },
    };

    let response = hs_app::ensure_stats(&request)?;

    if response.skipped {
        println!(
            "✓ Inputs unchanged, keeping stored statistics: {}",
            response.fingerprint
        );
        if let Some(completed_at) = &response.completed_at {
            println!("  Last computed: {}", completed_at);
        }
        return Ok(());
    }

    println!("✓ Statistics computed: {}", response.fingerprint);
    if let Some(summary) = &response.summary {
        println!("  Manholes:  {}", summary.manholes);
        println!("  Flowlines: {}", summary.flowlines);
        println!("  Pipes:     {}", summary.pipes);
        println!("  Weirs:     {}", summary.weirs);
        println!("  Pumps:     {}", summary.pumps);
        println!("  Sources:   {}", summary.sources);
    }

    print_timing_summary(&response.timing);
    Ok(())
}

fn print_timing_summary(timing: &hs_app::JobTiming) {
    let total = timing.total_time_s.max(1.0e-12);
    let model_pct = 100.0 * timing.load_model_time_s / total;
    let results_pct = 100.0 * timing.load_results_time_s / total;
    let stats_pct = 100.0 * timing.stats_time_s / total;

    println!("\nTiming summary:");
    println!(
        "  Load model:   {:.3}s ({:.1}%)",
        timing.load_model_time_s, model_pct
    );
    println!(
        "  Load results: {:.3}s ({:.1}%)",
        timing.load_results_time_s, results_pct
    );
    println!(
        "  Statistics:   {:.3}s ({:.1}%)",
        timing.stats_time_s, stats_pct
    );
    println!("  Total:        {:.3}s", timing.total_time_s);
}

fn cmd_sources(store_path: &Path) -> AppResult<()> {
    let sources = query::list_stat_sources(store_path)?;

    if sources.is_empty() {
        println!("No stat sources recorded");
    } else {
        println!("Stat sources ({} rows):", sources.len());
        for row in sources {
            let origin = if row.from_aggregate {
                "aggregate"
            } else {
                "accumulated"
            };
            let timestep = row
                .timestep
                .map(|dt| format!("{:.1}s", dt))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {}.{} <- {} ({}, timestep {})",
                row.table_name, row.field_name, row.input_param, origin, timestep
            );
        }
    }
    Ok(())
}

fn cmd_summary(store_path: &Path) -> AppResult<()> {
    let summary = query::summarize_store(store_path)?;

    println!("Statistics store: {}", store_path.display());
    for (table, count) in &summary.table_counts {
        println!("  {:<16} {:>6} rows", table, count);
    }
    if let Some(completed_at) = &summary.completed_at {
        println!("  Computed at: {}", completed_at);
    }
    if let Some(fingerprint) = &summary.fingerprint {
        println!("  Fingerprint: {}", fingerprint);
    }
    Ok(())
}
