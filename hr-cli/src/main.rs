#![deny(
    // Overly strict on purpose: the point is to force inline allows, which give reviewers a place
    // to look twice.
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
    clippy::missing_docs_in_private_items,
)]
//! `hrctl`, the command line front-end of the hroute engine.
//!
//! Generates a random weighted digraph, ranks and contracts it, folds every shortcut into a
//! decorated graph and answers random point-to-point queries over it, optionally checking each
//! answer against plain Dijkstra. See binary --help for more information.

mod generator;
mod session;

use anyhow::{
    bail,
    Context,
    Result,
};
use clap::{
    Parser,
    ValueEnum,
};
use hr_core::ContractionVariant;
use tracing::info;

use crate::generator::GraphSpec;
use crate::session::{
    HeuristicKind,
    SessionConfig,
    SessionReport,
};

/// Which contraction builder produces the decorated graph.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantKind {
    /// Keep a full graph snapshot per contraction.
    List,
    /// Keep only the neighbourhood touched by each contraction.
    MemoryEfficient,
}

impl From<VariantKind> for ContractionVariant {
    fn from(kind: VariantKind) -> Self {
        match kind {
            VariantKind::List => Self::List,
            VariantKind::MemoryEfficient => Self::MemoryEfficient,
        }
    }
}

/// How the session summary is printed.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// One line per query plus totals.
    Text,
    /// The whole report as pretty-printed JSON.
    Json,
}

/// hrctl command-line interface: build a contraction hierarchy over a random graph and query it
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of nodes in the generated graph (at least 2).
    #[arg(short, long, default_value_t = 100, value_parser = parse_node_count)]
    nodes: usize,

    /// Average out-degree of the generated graph.
    #[arg(short, long, default_value_t = 3.0, value_parser = parse_degree)]
    degree: f64,

    /// Largest edge weight; weights are whole numbers in 1..=max-weight.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    max_weight: u32,

    /// Seed for graph generation, ranking and query selection. Random when absent.
    #[arg(long)]
    seed: Option<u64>,

    /// Heuristic that orders nodes for contraction.
    #[arg(long, value_enum, default_value_t = HeuristicKind::EdgeDifference)]
    heuristic: HeuristicKind,

    /// Contraction builder used to decorate the graph.
    #[arg(long, value_enum, default_value_t = VariantKind::List)]
    variant: VariantKind,

    /// Number of random source/target queries to answer.
    #[arg(short, long, default_value_t = 10)]
    queries: usize,

    /// Check every answer against plain Dijkstra on the undecorated graph.
    #[arg(long)]
    verify: bool,

    /// Output format of the session summary.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Logging verbosity level (`trace`, `debug`, `info`, `warn`, `error`).
    #[arg(short, long, default_value = "info")]
    verbosity: String,
}

/// Custom parser for `nodes`: contraction needs at least two nodes.
fn parse_node_count(s: &str) -> Result<usize, String> {
    let val: usize = s.parse().map_err(|_| format!("'{s}' isn't a valid node count"))?;
    if val >= 2 {
        Ok(val)
    } else {
        Err(format!("need at least 2 nodes, got: {val}"))
    }
}

/// Custom parser for `degree`: any finite non-negative number.
fn parse_degree(s: &str) -> Result<f64, String> {
    let val: f64 = s.parse().map_err(|_| format!("'{s}' isn't a valid float number"))?;
    if val.is_finite() && val >= 0.0 {
        Ok(val)
    } else {
        Err(format!("degree must be a finite number >= 0, got: {val}"))
    }
}

/// Write the report to stdout in the requested format.
fn print_report(report: &SessionReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serializing session report")?;
            println!("{json}");
        },
        OutputFormat::Text => {
            println!(
                "graph: {} nodes, {} edges; decorated: {} edges ({} shortcuts)",
                report.nodes, report.edges, report.decorated_edges, report.shortcuts
            );
            for outcome in &report.queries {
                let route = &outcome.route;
                if route.is_reachable() {
                    println!("{} -> {}: {} via {:?}", route.source, route.target, route.distance, route.path);
                } else {
                    println!("{} -> {}: unreachable", route.source, route.target);
                }
            }
            println!("{} of {} queries reachable", report.reachable, report.queries.len());
            if report.verified {
                println!("{} mismatches against dijkstra", report.mismatches);
            }
        },
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Conform to crate-standard logging.
    hr_core::logging::setup(&args.verbosity);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, nodes = args.nodes, "Starting session");

    let config = SessionConfig {
        graph: GraphSpec { nodes: args.nodes, degree: args.degree, max_weight: args.max_weight },
        heuristic: args.heuristic,
        variant: args.variant.into(),
        queries: args.queries,
        verify: args.verify,
        seed,
    };
    let report = session::run(&config)?;
    print_report(&report, args.output)?;

    if report.mismatches > 0 {
        bail!("{} of {} queries disagree with dijkstra (seed {seed})", report.mismatches, report.queries.len());
    }
    Ok(())
}
