//! Volta command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use volta_parser::{AnalysisCommand, Error as ParseError, ParseResult};
use volta_solver::{DcAnalysis, TransientAnalysis, TransientSettings};

#[derive(Parser)]
#[command(name = "volta")]
#[command(about = "An interactive SPICE-style circuit simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Input netlist file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Run a DC operating point even when the netlist requests none
    #[arg(short = 'o', long = "op")]
    dc_op: bool,

    /// Transient CSV export target
    #[arg(long, default_value = "transient_results.csv")]
    csv: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let result = volta_parser::load_file(&cli.input)
        .with_context(|| format!("failed to read netlist: {}", cli.input.display()))?;

    if cli.verbose {
        println!("Devices: {}", result.devices.len());
        println!("Nodes: {} (ground included)", result.num_nodes);
        println!("Analysis requests: {}", result.analyses.len());
        println!();
    }

    if cli.dc_op || result.analyses.is_empty() {
        run_dc_op(&result)?;
    }

    for analysis in &result.analyses {
        match analysis {
            AnalysisCommand::Op => run_dc_op(&result)?,
            AnalysisCommand::Tran {
                tstep,
                tstop,
                tstart,
            } => run_transient(&result, *tstep, *tstop, *tstart, &cli.csv)?,
            AnalysisCommand::DcSweep { source, .. } => {
                log::warn!(
                    "{}",
                    ParseError::Unsupported(format!(".dc sweep of {}", source))
                );
            }
            AnalysisCommand::Ac { .. } => {
                log::warn!("{}", ParseError::Unsupported(".ac".to_string()));
            }
        }
    }

    Ok(())
}

fn run_dc_op(result: &ParseResult) -> Result<()> {
    println!("DC Operating Point Analysis");
    println!("===========================");

    let mut dc = DcAnalysis::new(&result.devices, result.num_nodes);
    dc.solve()
        .map_err(|e| anyhow::anyhow!("DC analysis failed: {}", e))?;

    println!("Node voltages:");
    println!("  Node 0 (ground): 0.000 V");
    for node in 1..result.num_nodes {
        println!("  Node {}: {:.3} V", node, dc.node_voltage(node as u32));
    }

    let names: Vec<String> = dc.vsource_names().map(str::to_string).collect();
    if !names.is_empty() {
        println!("Voltage source currents:");
        for name in names {
            println!("  {}: {:.6} A", name, dc.vsource_current(&name));
        }
    }
    println!();
    Ok(())
}

fn run_transient(
    result: &ParseResult,
    tstep: f64,
    tstop: f64,
    tstart: f64,
    csv: &PathBuf,
) -> Result<()> {
    println!("Transient Analysis (.tran {} {} {})", tstep, tstop, tstart);
    println!("==========================================");

    let settings = TransientSettings {
        tstep,
        tstop,
        tstart,
    };
    let mut tran = TransientAnalysis::new(&result.devices, result.num_nodes, settings);
    tran.solve()
        .map_err(|e| anyhow::anyhow!("transient analysis failed: {}", e))?;

    // Header row, then first and last few points.
    print!("{:>14}", "Time");
    for node in 1..result.num_nodes {
        print!("{:>14}", format!("V({})", node));
    }
    println!();

    let points = tran.time_points();
    let shown = 5.min(points.len());
    for point in points.iter().take(shown) {
        print_point(point, result.num_nodes);
    }
    if points.len() > 2 * shown {
        println!("{:>14}", "...");
    }
    if points.len() > shown {
        for point in points.iter().skip(points.len() - shown) {
            print_point(point, result.num_nodes);
        }
    }

    println!();
    println!("{} time points computed.", points.len());

    tran.export_csv(csv)
        .map_err(|e| anyhow::anyhow!("CSV export failed: {}", e))?;
    println!("Results exported to {}", csv.display());
    println!();
    Ok(())
}

fn print_point(point: &volta_solver::TimePoint, num_nodes: usize) {
    print!("{:>14.6e}", point.time);
    for node in 1..num_nodes {
        print!("{:>14.6}", point.node_voltages[node]);
    }
    println!();
}
