//! Profile Persistence
//!
//! JSON file holding the user's named profiles. A missing file loads as the
//! built-in templates.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MixError, Result};
use crate::profile::{validate_profile, Profile};

/// On-disk layout of the profile file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfileFile {
    profiles: Vec<Profile>,
}

/// Named profiles backed by a JSON file
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: Vec<Profile>,
}

impl ProfileStore {
    /// Load the store at `path`, seeding templates if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(
                "No profile file at {}, using built-in templates",
                path.display()
            );
            return Ok(Self {
                path: path.to_path_buf(),
                profiles: Profile::templates(),
            });
        }

        let profiles = read_profiles(path)?;
        debug!("Loaded {} profiles from {}", profiles.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            profiles,
        })
    }

    /// Write the store back to its file
    pub fn save(&self) -> Result<()> {
        write_profiles(&self.path, &self.profiles)?;
        info!(
            "Saved {} profiles to {}",
            self.profiles.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All profiles in insertion order
    pub fn list(&self) -> &[Profile] {
        &self.profiles
    }

    /// Look up a profile by id
    pub fn get(&self, id: Uuid) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Look up a profile by name, ignoring case
    pub fn get_by_name(&self, name: &str) -> Option<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Look up by name, failing with `ProfileNotFound`
    pub fn require(&self, name: &str) -> Result<&Profile> {
        self.get_by_name(name).ok_or_else(|| MixError::ProfileNotFound {
            name: name.to_string(),
        })
    }

    /// Insert or replace a profile
    ///
    /// Profiles are matched by id first, then by name. The profile must
    /// pass validation.
    pub fn upsert(&mut self, mut profile: Profile) -> Result<()> {
        validate_profile(&profile)?;
        profile.modified_at = Utc::now();

        let existing = self
            .profiles
            .iter()
            .position(|p| p.id == profile.id)
            .or_else(|| {
                self.profiles
                    .iter()
                    .position(|p| p.name.eq_ignore_ascii_case(&profile.name))
            });

        match existing {
            Some(index) => {
                profile.id = self.profiles[index].id;
                profile.created_at = self.profiles[index].created_at;
                self.profiles[index] = profile;
            }
            None => self.profiles.push(profile),
        }
        Ok(())
    }

    /// Remove a profile by name, returning it
    pub fn remove(&mut self, name: &str) -> Result<Profile> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| MixError::ProfileNotFound {
                name: name.to_string(),
            })?;
        Ok(self.profiles.remove(index))
    }

    /// Merge every valid profile from another profile file
    ///
    /// Returns how many profiles were imported. Invalid entries abort the
    /// import before anything is merged.
    pub fn import_file(&mut self, path: &Path) -> Result<usize> {
        let incoming = read_profiles(path)?;
        for profile in &incoming {
            validate_profile(profile)?;
        }
        let count = incoming.len();
        for profile in incoming {
            self.upsert(profile)?;
        }
        info!("Imported {} profiles from {}", count, path.display());
        Ok(count)
    }

    /// Write all profiles to another file
    pub fn export_file(&self, path: &Path) -> Result<()> {
        write_profiles(path, &self.profiles)
    }
}

fn read_profiles(path: &Path) -> Result<Vec<Profile>> {
    let content = fs::read_to_string(path)?;
    let file: ProfileFile = serde_json::from_str(&content)?;
    Ok(file.profiles)
}

fn write_profiles(path: &Path, profiles: &[Profile]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = ProfileFile {
        profiles: profiles.to_vec(),
    };
    fs::write(path, serde_json::to_string_pretty(&file)?)?;
    Ok(())
}
