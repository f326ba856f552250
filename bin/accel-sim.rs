use accel_sim::simulator::config::config::{to_toml, AcceleratorOverrides};
use accel_sim::simulator::init_log;
use accel_sim::simulator::sim::mode::{RunMode, SimConfig};
use accel_sim::simulator::utils::report::print_report;
use accel_sim::simulator::Simulator;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// accel-sim - low-fidelity analytical ML accelerator simulator
#[derive(Parser, Debug)]
#[command(name = "accel-sim")]
#[command(version = "0.1.0")]
#[command(about = "Roofline latency/energy estimates for conv and GEMM layers", long_about = None)]
struct Args {
  /// Accelerator config (YAML or TOML)
  #[arg(long, value_name = "FILE")]
  config: PathBuf,

  /// JSON model description
  #[arg(long, value_name = "FILE")]
  model: PathBuf,

  /// Optional CSV output path
  #[arg(long, alias = "csv_out", value_name = "FILE")]
  csv_out: Option<PathBuf>,

  /// Optional JSON output path
  #[arg(long, alias = "json_out", value_name = "FILE")]
  json_out: Option<PathBuf>,

  /// Estimate layers on all cores
  #[arg(long)]
  parallel: bool,

  /// Quiet mode (warnings and errors only)
  #[arg(short, long)]
  quiet: bool,

  /// Print the resolved accelerator config as TOML
  #[arg(long)]
  print_config: bool,

  /// Override the accelerator name
  #[arg(long, value_name = "NAME")]
  name: Option<String>,

  /// Override the clock frequency
  #[arg(long, value_name = "GHZ")]
  frequency_ghz: Option<f64>,

  /// Override DRAM bandwidth, bytes per second
  #[arg(long, value_name = "BYTES_PER_SEC")]
  dram_bw: Option<f64>,
}

fn sim_config(args: &Args) -> SimConfig {
  SimConfig {
    run_mode: if args.parallel {
      RunMode::Parallel
    } else {
      RunMode::Serial
    },
    quiet: args.quiet,
    csv_out: args.csv_out.clone(),
    json_out: args.json_out.clone(),
  }
}

fn run(args: Args, config: SimConfig) -> accel_sim::Result<()> {
  let overrides = AcceleratorOverrides {
    name: args.name,
    frequency_ghz: args.frequency_ghz,
    dram_bw_bps: args.dram_bw,
  };

  let simulator = Simulator::from_paths(config, &args.config, &args.model, &overrides)?;

  if args.print_config {
    println!("{}", to_toml(simulator.accelerator())?);
  }

  let estimate = simulator.run_and_export()?;
  print_report(&estimate, simulator.accelerator());
  Ok(())
}

fn main() -> ExitCode {
  let args = Args::parse();
  let config = sim_config(&args);
  init_log(config.quiet);

  match run(args, config) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      log::error!("{}", e);
      ExitCode::FAILURE
    },
  }
}
