//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::info;

use crate::cli::{MixArgs, ProfileCommands};
use crate::engine::probe;
use crate::estimate::{bytes_to_mb, estimate_bytes, fits_profile};
use crate::pipeline::{mix_audio_files, MixingRequest};
use crate::profile::{Profile, ProfileStore};

/// Resolve an optional profile name against the store
fn resolve_profile(store: &ProfileStore, name: Option<&str>) -> Result<Profile> {
    match name {
        Some(name) => Ok(store.require(name)?.clone()),
        None => Ok(Profile::default_profile()),
    }
}

/// Mix voice over music and report the outcome.
pub fn mix(store_path: &Path, args: &MixArgs) -> Result<()> {
    let store = ProfileStore::load(store_path)
        .with_context(|| format!("loading profiles from {}", store_path.display()))?;
    let profile = resolve_profile(&store, args.profile.as_deref())?;

    let request = MixingRequest::new(&args.voice, &args.music, &args.output)
        .with_volumes(args.voice_volume, args.music_volume)
        .with_music_offset(args.offset)
        .with_buffer(args.buffer)
        .with_profile(profile);

    info!("Mixing with profile '{}'", request.resolved_profile().name);
    let outcome = mix_audio_files(&request);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.message);
    }

    if !outcome.success {
        bail!(outcome.error.unwrap_or_else(|| "mixing failed".to_string()));
    }
    Ok(())
}

/// Print the estimated size of a prompt.
pub fn estimate(store_path: &Path, duration_secs: f64, profile: Option<&str>) -> Result<()> {
    let duration = match Duration::try_from_secs_f64(duration_secs) {
        Ok(duration) => duration,
        Err(_) => bail!("duration must be a non-negative, representable number of seconds"),
    };

    let store = ProfileStore::load(store_path)?;
    let profile = resolve_profile(&store, profile)?;
    let bytes = estimate_bytes(duration, &profile);

    println!("Profile:   {}", profile.name);
    println!("Duration:  {:.2}s", duration_secs);
    println!("Estimate:  {} bytes ({} MB)", bytes, bytes_to_mb(bytes));
    println!("Limit:     {} MB", profile.max_file_size_mb);
    println!(
        "Fits:      {}",
        if fits_profile(duration, &profile) { "yes" } else { "no" }
    );
    Ok(())
}

/// Print the native format and duration of an audio file.
pub fn info(path: &Path) -> Result<()> {
    let source = probe(path)?;
    println!("File:      {}", path.display());
    println!("Format:    {}", source.format);
    println!("Duration:  {:.3}s", source.duration.as_secs_f64());
    Ok(())
}

/// Dispatch a profile management command.
pub fn profiles(store_path: &Path, cmd: ProfileCommands) -> Result<()> {
    let mut store = ProfileStore::load(store_path)?;

    match cmd {
        ProfileCommands::List => {
            println!(
                "{:<24} {:>7} {:>5} {:>4} {:>8}",
                "NAME", "RATE", "BITS", "CH", "MAX MB"
            );
            println!("{:-<52}", "");
            for p in store.list() {
                println!(
                    "{:<24} {:>7} {:>5} {:>4} {:>8}",
                    p.name, p.sample_rate, p.bit_depth, p.channels, p.max_file_size_mb
                );
            }
        }
        ProfileCommands::Show { name } => {
            let profile = store.require(&name)?;
            println!("{}", serde_json::to_string_pretty(profile)?);
        }
        ProfileCommands::Add {
            name,
            sample_rate,
            bit_depth,
            channels,
            max_size_mb,
            description,
        } => {
            let profile = Profile::new(name, sample_rate, bit_depth, channels, max_size_mb)
                .with_description(description);
            let name = profile.name.clone();
            store.upsert(profile)?;
            store.save()?;
            println!("Saved profile: {}", name);
        }
        ProfileCommands::Remove { name } => {
            let removed = store.remove(&name)?;
            store.save()?;
            println!("Removed profile: {}", removed.name);
        }
        ProfileCommands::Import { path } => {
            let count = store
                .import_file(&path)
                .with_context(|| format!("importing {}", path.display()))?;
            store.save()?;
            println!("Imported {} profiles from {}", count, path.display());
        }
        ProfileCommands::Export { path } => {
            store.export_file(&path)?;
            println!("Exported {} profiles to {}", store.list().len(), path.display());
        }
    }

    Ok(())
}
