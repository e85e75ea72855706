// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use clap::Parser;

mod config;
mod export;
mod sweep;

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Leg joint angle lookup table generator", long_about = None)]
struct Args {
    /// Configuration file.
    #[arg(short = 'c', long = "config", alias = "conf", value_name = "FILE")]
    config: Option<std::path::PathBuf>,
    /// Output directory.
    #[arg(short, long, value_name = "DIR")]
    output: Option<std::path::PathBuf>,
    /// Required distance between effector and target.
    #[arg(long)]
    tolerance: Option<f32>,
    /// Number of rows solved in parallel.
    #[arg(long, default_value_t = 4)]
    workers: usize,
    /// Quiet output (no logging).
    #[arg(long)]
    quiet: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use log::LevelFilter;

    let args = Args::parse();

    let mut config: config::DumpConfig = match &args.config {
        Some(path) => legik_core::from_file(path)?,
        None => config::DumpConfig::default(),
    };

    if let Some(output) = args.output {
        config.output.directory = output;
    }
    if let Some(tolerance) = args.tolerance {
        config.solver.tolerance = tolerance;
    }

    let mut log_config = simplelog::ConfigBuilder::new();
    log_config.set_target_level(LevelFilter::Off);
    log_config.set_location_level(LevelFilter::Off);
    log_config.set_thread_level(LevelFilter::Off);

    let log_level = if args.quiet {
        LevelFilter::Off
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    log::trace!("{:#?}", config);

    config.validate()?;

    let (upper, lower) = config.leg.kinematics().lengths();

    log::info!("Leg: {}", config.leg.chain());
    log::info!("Links: {:.2} / {:.2}", upper, lower);
    log::info!("Grid: {}", config.grid);

    let table = sweep::sweep(&config, args.workers.max(1)).await?;

    log::info!(
        "Solved {} of {} cells",
        table.solved_count(),
        config.grid.len()
    );

    export::write_all(&table, &config.output)?;

    Ok(())
}
