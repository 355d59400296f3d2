//! placesync CLI entry point.

use clap::Parser;
use placesync::cli::commands;
use placesync::cli::commands::import::ImportOptions;
use placesync::cli::{Cli, Commands};
use placesync::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let places = cli.places_path.as_ref();
    match &cli.command {
        Commands::Dump { output, overwrite } => {
            commands::dump::execute(output.as_ref(), *overwrite, places, cli.json)
        }
        Commands::Diff { a, b } => commands::diff::execute(a, b, cli.json),
        Commands::Import {
            path,
            no_backup,
            no_confirm,
            silent,
        } => {
            let options = ImportOptions {
                no_backup: *no_backup,
                no_confirm: *no_confirm,
                silent: *silent || cli.quiet,
            };
            commands::import::execute(path, options, places, cli.json)
        }
        Commands::Completions { shell } => commands::completions::execute(shell),
        Commands::Version => commands::version::execute(cli.json),
    }
}
