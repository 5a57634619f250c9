use clap::Parser;
use tnep_cli::{Cli, Commands, PlannerConfig};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::reliability::SweepOverrides;

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = PlannerConfig::resolve(cli)?;

    match &cli.command {
        Commands::Solve {
            input,
            max_distance,
            out,
            dot,
            strict,
            format,
        } => commands::solve::handle(
            &config,
            input,
            *max_distance,
            out.as_deref(),
            dot.as_deref(),
            *strict,
            *format,
        ),
        Commands::Reliability {
            input,
            initial_distance,
            distance_step,
            max_attempts,
            out,
            format,
        } => commands::reliability::handle(
            &config,
            input,
            SweepOverrides {
                initial_distance: *initial_distance,
                distance_step: *distance_step,
                max_attempts: *max_attempts,
            },
            out.as_deref(),
            *format,
        ),
        Commands::Inspect {
            input,
            max_distance,
            dot,
        } => commands::inspect::handle(&config, input, *max_distance, dot.as_deref()),
        Commands::Sample { out } => commands::sample::handle(out),
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }

    if let Err(err) = run(&cli) {
        error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
