//! CLI Module
//!
//! Command-line interface for the Promptmix prompt mixer.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Promptmix - mix voice prompts over background music for IVR systems
#[derive(Parser, Debug)]
#[command(name = "promptmix")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Profile store file
    #[arg(
        long,
        global = true,
        env = "PROMPTMIX_PROFILES",
        default_value = "promptmix-profiles.json"
    )]
    pub profiles: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mix a voice recording over background music
    #[command(name = "mix")]
    Mix(MixArgs),

    /// Estimate the output size of a prompt
    #[command(name = "estimate")]
    Estimate {
        /// Prompt duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Profile name (defaults to the built-in default profile)
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Show the native format and duration of an audio file
    #[command(name = "info")]
    Info {
        /// Audio file to inspect
        path: PathBuf,
    },

    /// Manage output profiles
    #[command(name = "profiles", subcommand)]
    Profiles(ProfileCommands),
}

#[derive(clap::Args, Debug)]
pub struct MixArgs {
    /// Voice recording
    pub voice: PathBuf,

    /// Background music
    pub music: PathBuf,

    /// Output WAV file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Voice gain (0.0-1.0)
    #[arg(long, default_value_t = crate::pipeline::DEFAULT_VOICE_VOLUME)]
    pub voice_volume: f32,

    /// Music gain (0.0-1.0)
    #[arg(long, default_value_t = crate::pipeline::DEFAULT_MUSIC_VOLUME)]
    pub music_volume: f32,

    /// Seconds to skip at the start of the music
    #[arg(long, default_value_t = 0.0)]
    pub offset: f64,

    /// Seconds of faded music after the voice ends
    #[arg(long, default_value_t = 0.0)]
    pub buffer: f64,

    /// Profile name (defaults to the built-in default profile)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all profiles
    #[command(name = "list")]
    List,

    /// Show one profile
    #[command(name = "show")]
    Show {
        /// Profile name
        name: String,
    },

    /// Add or replace a profile
    #[command(name = "add")]
    Add {
        /// Profile name
        name: String,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 8000)]
        sample_rate: u32,

        /// Bits per sample
        #[arg(long, default_value_t = 16)]
        bit_depth: u16,

        /// Channel count (1 or 2)
        #[arg(long, default_value_t = 1)]
        channels: u16,

        /// Size limit in megabytes
        #[arg(long, default_value_t = 10)]
        max_size_mb: u32,

        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Remove a profile
    #[command(name = "remove")]
    Remove {
        /// Profile name
        name: String,
    },

    /// Merge profiles from another file
    #[command(name = "import")]
    Import {
        /// Profile file to import
        path: PathBuf,
    },

    /// Write all profiles to a file
    #[command(name = "export")]
    Export {
        /// Destination file
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mix() {
        let cli = Cli::parse_from([
            "promptmix",
            "mix",
            "voice.wav",
            "music.mp3",
            "-o",
            "out.wav",
            "--buffer",
            "3",
            "--profile",
            "Wideband",
        ]);
        match cli.command {
            Commands::Mix(args) => {
                assert_eq!(args.buffer, 3.0);
                assert_eq!(args.offset, 0.0);
                assert_eq!(args.profile.as_deref(), Some("Wideband"));
            }
            other => panic!("Expected mix, got: {:?}", other),
        }
    }
}
