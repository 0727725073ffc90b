//! Run laa for a single barcode and print its records as JSON lines.

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use itertools::Itertools;
use laa_phaser::{LaaConfig, LaaPhaser};
use log::LevelFilter;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(about = "Phase amplicons of one barcode with laa and print the records as JSON lines")]
struct Args {
    /// Barcode to restrict laa to.
    barcode: String,

    /// Subread dataset to analyse.
    dataset: PathBuf,

    /// Additional options passed through to laa.
    #[clap(long, default_value = "", allow_hyphen_values = true)]
    laa_options: String,

    /// TOML file configuring the laa executable and its search path.
    #[clap(long)]
    config: Option<PathBuf>,
}

fn setup_logging() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = LaaConfig::load(args.config.as_deref())?;
    let dataset = args
        .dataset
        .canonicalize()
        .with_context(|| args.dataset.display().to_string())?;

    let mut phaser = LaaPhaser::with_config(&args.barcode, dataset, &args.laa_options, config)?;
    let scope = phaser
        .acquire()
        .with_context(|| format!("Running laa for barcode {}", args.barcode))?;

    let mut out = BufWriter::new(std::io::stdout().lock());
    for record in &scope {
        serde_json::to_writer(&mut out, record)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    setup_logging();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {}", err.chain().join("\n\tCaused by: "));
            ExitCode::FAILURE
        }
    }
}
