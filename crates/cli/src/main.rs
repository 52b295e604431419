//! RV32 cycle-level simulator CLI.
//!
//! Loads a flat binary or ELF into the machine, runs until the core halts
//! (trap with `mtvec` unset) or a tick limit expires, streaming UART output
//! to stdout, and prints statistics at the end.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::{fs, io};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rv32sim_core::config::Config;
use rv32sim_core::sim::{RunExit, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "rv32sim",
    author,
    version,
    about = "Cycle-level RV32 microcontroller simulator",
    long_about = "Run a bare-metal flat binary or ELF image on the simulated core.\n\n\
        Flat binaries load at the flash base; ELF images load by segment address\n\
        and start at their entry point. The run ends when the core halts or the\n\
        tick limit expires.\n\n\
        Set RUST_LOG=rv32sim_core=trace for per-tick pipeline and router traces."
)]
struct Cli {
    /// Program image (flat binary or ELF).
    image: PathBuf,

    /// JSON configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many ticks.
    #[arg(short = 'n', long, default_value_t = 100_000_000)]
    ticks: u64,

    /// Print statistics when the run ends.
    #[arg(long)]
    stats: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::from_json(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    let image = fs::read(&cli.image)?;
    let mut sim = Simulator::new(&config);
    sim.load(&config, &image)?;

    let mut stdout = io::stdout();
    let mut exit = RunExit::TickLimit;
    let mut remaining = cli.ticks;
    // Run in bursts so UART output streams while the simulation is live.
    const BURST: u64 = 10_000;
    while remaining > 0 {
        let step = remaining.min(BURST);
        let r = sim.run(step);
        let tx = sim.take_uart_tx();
        if !tx.is_empty() {
            stdout.write_all(&tx)?;
            stdout.flush()?;
        }
        remaining -= step;
        if r == RunExit::Halted {
            exit = RunExit::Halted;
            break;
        }
    }

    match exit {
        RunExit::Halted => eprintln!("\n[*] core halted after {} ticks", sim.stats().cycles),
        RunExit::TickLimit => eprintln!("\n[!] tick limit reached ({})", cli.ticks),
    }
    if cli.stats {
        sim.stats().print();
    }
    Ok(match exit {
        RunExit::Halted => ExitCode::SUCCESS,
        RunExit::TickLimit => ExitCode::from(2),
    })
}
