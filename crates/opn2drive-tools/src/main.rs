use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;

mod cui;
mod script;
mod vgm;

/// opn2drive command line tools
#[derive(Parser)]
#[command(
    name = "opn2drive",
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None
)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv register trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a note script through the driver and write a VGM file
    Render {
        /// Note script to read (use '-' for stdin)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Output file (.vgm, or .vgz for gzip; use '-' for stdout)
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        /// Gzip the output regardless of extension
        #[arg(long)]
        gzip: bool,
        /// YM2612 master clock in Hz written to the header
        #[arg(long, default_value_t = vgm::DEFAULT_CLOCK)]
        clock: u32,
    },
    /// Print the register writes each script event produces
    Trace {
        /// Note script to read (use '-' for stdin)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Also list the writes of the init sequence
        #[arg(long)]
        init: bool,
    },
    /// Print the note to F-number/block table
    Fnum {
        /// Master clock in Hz used for the produced frequency column
        #[arg(long, default_value_t = vgm::DEFAULT_CLOCK)]
        clock: u32,
        /// First note
        #[arg(long, default_value_t = 0)]
        from: u8,
        /// Last note
        #[arg(long, default_value_t = 127)]
        to: u8,
    },
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .compact()
        .finish()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            script,
            output,
            gzip,
            clock,
        } => {
            cui::render::render(&script, &output, gzip, clock)?;
        }
        Commands::Trace { script, init } => {
            cui::trace::trace(&script, init)?;
        }
        Commands::Fnum { clock, from, to } => {
            cui::fnum::fnum_table(clock, from, to)?;
        }
    }

    Ok(())
}
