//! Arena simulator CLI: batch matches between built-in agents, in memory.
//!
//! Runs through the same orchestrator as the server so timeouts, fallbacks
//! and settlement behave identically; results land as JSONL plus a CSV
//! summary.

mod metrics;
mod output;
mod simulator;
mod types;

use std::path::PathBuf;
use std::time::Instant;

use arena_backend::config::arena::ArenaConfig;
use arena_backend::services::session::SessionRequest;
use clap::Parser;
use metrics::MatchMetrics;
use output::OutputWriter;
use simulator::Simulator;
use tracing::{info, warn};
use types::{AgentType, BiddingArg, OutputFormat, PolicyArg};

#[derive(Parser)]
#[command(name = "arena-sim")]
#[command(about = "Headless Dou Dizhu matches between built-in agents")]
struct Args {
    /// Number of matches to play
    #[arg(short, long, default_value = "1")]
    matches: u32,

    /// Agent for all seats (shortcut to set all 3 seats to the same agent)
    #[arg(long, conflicts_with_all = ["seat0", "seat1", "seat2"])]
    seats: Option<AgentType>,

    /// Agent for seat 0
    #[arg(long, default_value = "heuristic")]
    seat0: AgentType,

    /// Agent for seat 1
    #[arg(long, default_value = "heuristic")]
    seat1: AgentType,

    /// Agent for seat 2
    #[arg(long, default_value = "heuristic")]
    seat2: AgentType,

    /// Session seed; each match derives its own dealing seed from it
    #[arg(long)]
    seed: Option<u64>,

    /// Four-with-two attachment policy
    #[arg(long, default_value = "both")]
    policy: PolicyArg,

    /// Landlord selection
    #[arg(long, default_value = "auto")]
    bidding: BiddingArg,

    /// Ask each seat to double after the bottom is revealed
    #[arg(long)]
    extra_double: bool,

    /// Base score multiplied into settlement
    #[arg(long, default_value = "1")]
    base_score: i64,

    /// Per-decision budget in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Show output summary and file paths
    #[arg(long)]
    show_output: bool,

    /// Output directory for results
    #[arg(long, default_value = "./arena-results")]
    output_dir: PathBuf,

    /// Output format
    #[arg(long, default_value = "jsonl")]
    output_format: OutputFormat,

    /// Compress the JSONL file
    #[arg(long)]
    compress: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Silent by default, only warnings and errors
    let filter = if args.verbose {
        "debug"
    } else if args.show_output {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let seat_types = match args.seats {
        Some(all) => [all; 3],
        None => [args.seat0, args.seat1, args.seat2],
    };

    let mut config = ArenaConfig::from_env()?;
    config.max_matches = config.max_matches.max(args.matches);

    let seed = args.seed.unwrap_or_else(rand::random::<u64>);
    let request = SessionRequest {
        session_id: None,
        agents: seat_types.iter().map(|t| t.spec()).collect(),
        matches: args.matches,
        seed: Some(seed),
        policy: args.policy.into(),
        bidding: args.bidding.into(),
        extra_double: args.extra_double,
        base_score: args.base_score,
        timeout_ms: args.timeout_ms,
        seat_timeouts_ms: None,
    };

    if args.show_output {
        info!(matches = args.matches, seed, seats = ?seat_types, "starting arena simulation");
    }

    let mut output_writer = OutputWriter::new(&args.output_dir, &args.output_format, args.compress)?;

    let start = Instant::now();
    let mut results: Vec<MatchMetrics> = Vec::new();
    let outcome = Simulator::new(config)
        .run(request, |metrics| {
            if let Err(e) = output_writer.write_match(&metrics) {
                warn!("Failed to write metrics for match {}: {}", metrics.match_no, e);
            }
            if args.verbose {
                info!(match_no = metrics.match_no, deltas = ?metrics.result.deltas, "match completed");
            }
            results.push(metrics);
        })
        .await;
    let elapsed = start.elapsed();

    let (jsonl_path, csv_path) = output_writer.output_paths();
    let (jsonl_path, csv_path) = (jsonl_path.cloned(), csv_path.clone());
    output_writer.finish()?;

    if args.show_output {
        if let Some(path) = jsonl_path {
            info!("Detailed results written to: {}", path.display());
        }
        info!("Summary CSV written to: {}", csv_path.display());
        print_summary(&results, &outcome.errors, elapsed, args.matches);
    }

    if !outcome.errors.is_empty() && results.is_empty() {
        return Err(outcome.errors.join("; ").into());
    }
    Ok(())
}

fn print_summary(
    results: &[MatchMetrics],
    errors: &[String],
    elapsed: std::time::Duration,
    total: u32,
) {
    println!("\n=== Simulation Summary ===");
    println!("Matches completed: {}/{}", results.len(), total);
    for e in errors {
        println!("Error: {e}");
    }
    println!("Total time: {elapsed:?}");
    if results.is_empty() {
        return;
    }
    println!("Average time per match: {:?}", elapsed / results.len() as u32);

    let n = results.len() as f64;
    let landlord_wins = results.iter().filter(|m| m.result.landlord_won).count();
    let springs = results.iter().filter(|m| m.result.spring).count();
    println!(
        "Landlord wins: {} ({:.1}%), springs: {}",
        landlord_wins,
        landlord_wins as f64 / n * 100.0,
        springs
    );

    let mut as_landlord = [0u32; 3];
    let mut wins = [0u32; 3];
    let mut fallbacks = [0u32; 3];
    for m in results {
        let landlord = m.result.landlord as usize;
        as_landlord[landlord] += 1;
        for seat in 0..3 {
            let won = if seat == landlord {
                m.result.landlord_won
            } else {
                !m.result.landlord_won
            };
            if won {
                wins[seat] += 1;
            }
        }
        for s in &m.seats {
            fallbacks[s.seat as usize] += s.fallbacks;
        }
    }
    let totals = results.last().map(|m| m.result.totals).unwrap_or_default();
    let agents = &results[0].config.agents;

    println!("\n=== Results by Seat ===");
    for seat in 0..3 {
        println!(
            "Seat {} ({}): total={}, wins={} ({:.1}%), landlord={}, fallbacks={}",
            seat,
            agents.get(seat).map(String::as_str).unwrap_or("?"),
            totals[seat],
            wins[seat],
            wins[seat] as f64 / n * 100.0,
            as_landlord[seat],
            fallbacks[seat]
        );
    }
}
