use std::error::Error;

use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record};
use mlfq_model::{MlfqSim, SimConfig};

/// Two-level feedback queue scheduler simulation.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of synthetic processes
    #[arg(long, default_value_t = SimConfig::default().process_count)]
    processes: usize,

    /// RNG seed; drawn from system entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Chance per running tick that the process requests I/O
    #[arg(long, default_value_t = SimConfig::default().io_probability)]
    io_probability: f64,

    /// Stop after this many ticks even if processes remain
    #[arg(long, default_value_t = SimConfig::default().time_ceiling)]
    time_ceiling: u64,

    /// Print the final report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Suppress the per-tick event log
    #[arg(short, long)]
    quiet: bool,

    /// Increase diagnostic verbosity on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

// `SetLoggerError` only implements `Error` with log's `std` feature
fn init_logging(verbose: u8) -> Result<(), Box<dyn Error>> {
    log::set_logger(&LOGGER).map_err(|err| err.to_string())?;
    log::set_max_level(match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = SimConfig {
        process_count: args.processes,
        io_probability: args.io_probability,
        time_ceiling: args.time_ceiling,
        ..SimConfig::default()
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("seed {seed}; replay with --seed {seed}");

    let mut sim = MlfqSim::new(config, seed)?;

    if !args.quiet && !args.json {
        let config = sim.config();
        println!("======== SIMULATION START ========");
        println!("- processes: {}", config.process_count);
        println!("- seed: {seed}");
        println!("- high queue quantum: {}", config.quantum_high);
        println!("- low queue quantum: {}", config.quantum_low);
        println!("- I/O probability: {:.0}%", config.io_probability * 100.0);
        println!("==================================");
    }

    let quiet = args.quiet || args.json;
    let report = sim.run_with(|now, event| {
        if !quiet {
            println!("t={now:>4} {event}");
        }
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("{report}");
    }

    Ok(())
}
