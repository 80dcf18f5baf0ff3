// SPDX-License-Identifier: AGPL-3.0-only

//! Cleanup of calculation outputs and downloaded trajectories.
//!
//! Runs once per session, after every artifact has been read. Only the
//! system directory itself is scanned; subdirectories are never touched.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::DatabankError;
use crate::registry::{FileKind, SystemRecord};

/// Set this to keep computed JSON and trajectories for inspection.
pub const NOWIPE_ENV: &str = "NMLDB_TEST_NOWIPE";

/// Scratch files left by the analysis scripts.
pub const CALCULATION_PATTERNS: &[&str] = &[
    "*.dat",
    "conf.gro",
    "frame0.gro",
    "*.buildH",
    ".*",
    "#*",
    "*.def",
    "whole.xtc",
    "centered.xtc",
];

/// Computed artifacts, removed unless JSON is kept.
pub const JSON_PATTERN: &str = "*.json";

/// What teardown leaves behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WipePolicy {
    pub keep_json: bool,
    pub keep_trajectories: bool,
}

impl WipePolicy {
    /// Keep everything teardown would normally remove except scratch files.
    #[must_use]
    pub const fn keep_all() -> Self {
        Self {
            keep_json: true,
            keep_trajectories: true,
        }
    }

    /// `keep_all` when `NMLDB_TEST_NOWIPE` is set, full wipe otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        if std::env::var_os(NOWIPE_ENV).is_some() {
            Self::keep_all()
        } else {
            Self::default()
        }
    }
}

fn calculation_globs(policy: WipePolicy) -> Result<GlobSet, DatabankError> {
    let mut builder = GlobSetBuilder::new();
    if !policy.keep_json {
        builder.add(Glob::new(JSON_PATTERN)?);
    }
    for pattern in CALCULATION_PATTERNS {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Remove calculation outputs from one system directory.
///
/// A missing directory is not an error. Returns the removed paths, sorted.
///
/// # Errors
///
/// `Io` if the directory cannot be listed or a file cannot be removed.
pub fn wipe_calculation_outputs(
    simulation_root: &Path,
    system: &SystemRecord,
    policy: WipePolicy,
) -> Result<Vec<PathBuf>, DatabankError> {
    let globs = calculation_globs(policy)?;
    let dir = system.directory(simulation_root);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut removed = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if globs.is_match(Path::new(&entry.file_name())) {
            let path = entry.path();
            tracing::debug!(file = %path.display(), "removing");
            std::fs::remove_file(&path)?;
            removed.push(path);
        }
    }
    removed.sort();
    Ok(removed)
}

/// Remove the first `GRO`, `TPR` and `TRJ` file of a system.
///
/// Systems whose `DOI` is `localhost` keep their trajectories: they are not
/// downloaded copies.
///
/// # Errors
///
/// `Io` if a listed file exists but cannot be removed.
pub fn wipe_trajectories(
    simulation_root: &Path,
    system: &SystemRecord,
    policy: WipePolicy,
) -> Result<Vec<PathBuf>, DatabankError> {
    if policy.keep_trajectories {
        return Ok(Vec::new());
    }
    if system.is_local() {
        tracing::debug!(system = system.id, "local trajectories, not wiping");
        return Ok(Vec::new());
    }

    let dir = system.directory(simulation_root);
    let mut removed = Vec::new();
    for kind in FileKind::ALL {
        let Some(name) = system.primary_file(kind) else {
            tracing::warn!(system = system.id, kind = kind.key(), "no file listed");
            continue;
        };
        let path = dir.join(name);
        if path.is_file() {
            tracing::debug!(file = %path.display(), "removing");
            std::fs::remove_file(&path)?;
            removed.push(path);
        }
    }
    Ok(removed)
}
