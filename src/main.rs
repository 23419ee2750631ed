//! `ringscope` - token ring analyzer.
//!
//! # Usage
//!
//! ```text
//! ringscope stats ring.txt                        # ring statistics
//! ringscope rebalance ring.txt --max-movements 5  # advice, movements, cost
//! ringscope datacenters ring.txt                  # one analysis per datacenter
//! ringscope history mon.txt tue.txt wed.txt       # first vs last snapshot
//! ringscope history *.txt --trends                # series and trends
//! ringscope -c ringscope.toml -v rebalance ring.txt
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use clap::{Parser, Subcommand};
use ringscope::cluster::{self, MultiDatacenterAnalysis};
use ringscope::history::{HistoricalAnalyzer, RingSnapshot};
use ringscope::report::{self, RebalancingExport};
use ringscope::{AnalyzerConfig, Error, RebalancingAdvisor, Result, RingAnalysis};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ringscope",
    version,
    about = "Token ring analysis and rebalancing advice"
)]
struct Cli {
    /// Path to TOML config file with analyzer thresholds.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print ring statistics.
    Stats {
        /// Path to `nodetool ring` output.
        ring_file: PathBuf,

        /// Also write the full analysis as JSON.
        #[arg(long)]
        export_json: Option<PathBuf>,
    },

    /// Analyze balance and suggest token movements.
    Rebalance {
        /// Path to `nodetool ring` output.
        ring_file: PathBuf,

        /// Maximum number of token movements to suggest.
        #[arg(long)]
        max_movements: Option<usize>,

        /// Write recommendations, movements and cost as JSON.
        #[arg(long)]
        export_json: Option<PathBuf>,
    },

    /// Analyze every datacenter in a listing separately.
    Datacenters {
        /// Path to `nodetool ring` output.
        ring_file: PathBuf,

        /// Also write the per-datacenter analyses as JSON.
        #[arg(long)]
        export_json: Option<PathBuf>,
    },

    /// Compare ring snapshots over time.
    History {
        /// Ring files, at least two.
        #[arg(required = true, num_args = 2..)]
        ring_files: Vec<PathBuf>,

        /// Report series and trends instead of a first/last comparison.
        #[arg(long)]
        trends: bool,

        /// Space snapshots one hour apart in argument order instead of
        /// using file modification times.
        #[arg(long)]
        sequential: bool,

        /// Write the comparison or trend report as JSON.
        #[arg(long)]
        export_json: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "ringscope=debug" } else { "ringscope=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading analyzer config");
            AnalyzerConfig::from_toml_file(path)
        }
        None => Ok(AnalyzerConfig::default()),
    }
}

fn analyze_file(path: &Path, config: &AnalyzerConfig) -> Result<RingAnalysis> {
    let ring = cluster::parse_file(path)?;
    match ring.datacenter {
        Some(dc) => RingAnalysis::analyze_datacenter(dc, ring.entries, config),
        None => RingAnalysis::analyze(ring.entries, config),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Stats {
            ring_file,
            export_json,
        } => {
            let analysis = analyze_file(&ring_file, &config)?;
            report::write_statistics(&mut out, &analysis.statistics)?;
            if let Some(path) = export_json {
                report::write_json_file(&path, &analysis)?;
                writeln!(out, "Analysis exported to: {}", path.display())?;
            }
        }

        Commands::Rebalance {
            ring_file,
            max_movements,
            export_json,
        } => {
            let analysis = analyze_file(&ring_file, &config)?;
            let advisor = RebalancingAdvisor::new(&analysis, &config)?;
            let max_movements = max_movements.unwrap_or(config.default_max_movements);
            let export = RebalancingExport::build(&advisor, max_movements)?;

            report::write_rebalancing_report(&mut out, &export)?;
            if let Some(path) = export_json {
                report::write_json_file(&path, &export)?;
                writeln!(out, "Recommendations exported to: {}", path.display())?;
            }
        }

        Commands::Datacenters {
            ring_file,
            export_json,
        } => {
            let sections = cluster::parse_datacenters_file(&ring_file)?;
            let multi = MultiDatacenterAnalysis::analyze(sections, &config)?;
            report::write_multi_datacenter_summary(&mut out, &multi)?;
            if let Some(path) = export_json {
                report::write_json_file(&path, &multi)?;
                writeln!(out, "Datacenter analysis exported to: {}", path.display())?;
            }
        }

        Commands::History {
            ring_files,
            trends,
            sequential,
            export_json,
        } => {
            if ring_files.len() < 2 {
                return Err(Error::invalid_input("need at least 2 ring files"));
            }

            let mut history = HistoricalAnalyzer::new();
            let base = SystemTime::now();
            let count = ring_files.len() as u64;
            for (i, path) in ring_files.iter().enumerate() {
                let timestamp = sequential
                    .then(|| base - Duration::from_secs(3600 * (count - 1 - i as u64)));
                history.add_snapshot(RingSnapshot::from_file(path, timestamp, &config)?);
            }

            if trends {
                let trend_report = history.detect_trends()?;
                report::write_trends(&mut out, &trend_report)?;
                if let Some(path) = export_json {
                    report::write_json_file(&path, &trend_report)?;
                    writeln!(out, "Trends exported to: {}", path.display())?;
                }
            } else {
                let comparison = history.compare_first_last()?;
                report::write_comparison(&mut out, &comparison)?;
                if let Some(path) = export_json {
                    report::write_json_file(&path, &comparison)?;
                    writeln!(out, "Comparison exported to: {}", path.display())?;
                }
            }
        }
    }

    Ok(())
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "ringscope failed");
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
