// SPDX-License-Identifier: AGPL-3.0-only

//! Data-root discovery for the databank fixtures.
//!
//! # Discovery order
//!
//! 0. Injected override (tests, `--data-root`)
//! 1. Environment variable (`NMLDB_DATA_PATH`)
//! 2. `CARGO_MANIFEST_DIR` parent (development layout)
//! 3. Current working directory
//!
//! A valid root is a directory with a `Simulations/` subdirectory.

use std::path::{Path, PathBuf};

use crate::error::DatabankError;

/// Environment variable naming the data root.
pub const DATA_ROOT_ENV: &str = "NMLDB_DATA_PATH";

/// Well-known entries within a data root.
pub mod paths {
    /// Simulation tree the analysis scripts write into
    pub const SIMULATIONS: &str = "Simulations";
    /// Sentinel marking the fixture tree as corrupted by an earlier run
    pub const NOTEST_SENTINEL: &str = ".notest";
    /// Registry index (JSON array of system records)
    pub const REGISTRY: &str = "systems.json";
}

/// Discover the data root, checking `override_root` before anything else.
///
/// # Errors
///
/// Returns `DataLoad` if no valid root is found.
pub fn try_discover_with_override(override_root: Option<&Path>) -> Result<PathBuf, DatabankError> {
    if let Some(root) = override_root {
        if is_valid_root(root) {
            return Ok(root.to_path_buf());
        }
        tracing::warn!(root = %root.display(), "override is not a data root, continuing discovery");
    }

    if let Ok(root) = std::env::var(DATA_ROOT_ENV) {
        let p = PathBuf::from(root);
        if is_valid_root(&p) {
            return Ok(p);
        }
    }

    let manifest_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if let Some(parent) = manifest_root.parent() {
        if is_valid_root(parent) {
            return Ok(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if is_valid_root(&cwd) {
            return Ok(cwd);
        }
    }

    Err(DatabankError::DataLoad(format!(
        "no valid databank data root found (need a directory with {}/; set {DATA_ROOT_ENV})",
        paths::SIMULATIONS
    )))
}

/// Whether `path` looks like a data root.
#[must_use]
pub fn is_valid_root(path: &Path) -> bool {
    path.join(paths::SIMULATIONS).is_dir()
}

/// `<root>/.notest`
#[must_use]
pub fn sentinel_path(root: &Path) -> PathBuf {
    root.join(paths::NOTEST_SENTINEL)
}
