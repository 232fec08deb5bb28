//! Promptmix CLI - Voice-over-Music Prompt Mixer
//!
//! Command-line interface for the Promptmix prompt mixer.

use clap::Parser;
use env_logger::Env;
use log::debug;

use promptmix::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("Promptmix v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Mix(args) => commands::mix(&cli.profiles, &args),
        Commands::Estimate { duration, profile } => {
            commands::estimate(&cli.profiles, duration, profile.as_deref())
        }
        Commands::Info { path } => commands::info(&path),
        Commands::Profiles(cmd) => commands::profiles(&cli.profiles, cmd),
    }
}
