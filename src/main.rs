use clap::Parser;
use fbackup::commands::{self, Cli, Commands, Outcome};
use fbackup::sysexits;
use std::process;

/// Entry point for the fbk CLI application.
/// Parses command-line arguments and dispatches to the appropriate command handler.
fn main() {
    let commands = match Cli::parse().commands {
        Some(commands) => commands,
        None => {
            eprintln!("fbk requires at least one command to execute. See 'fbk --help' for usage.");
            process::exit(sysexits::EX_KEYWORD);
        }
    };

    let result = match commands {
        Commands::Run { options, dry_run } => commands::run(&options, dry_run).map(report),
        Commands::Discover { options } => commands::run(&options, true).map(report),
        Commands::Config => commands::config(),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {e}");
        process::exit(e.exit_code());
    }
}

fn report(outcome: Outcome) {
    match outcome {
        Outcome::Backup(summary) => println!(
            "Backed up {} source(s), {} size warning(s)",
            summary.archives.len(),
            summary.warnings()
        ),
        Outcome::Discovery(reports) => {
            println!("Discovered {} source(s), no archives written", reports.len())
        }
    }
}
