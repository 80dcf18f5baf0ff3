// SPDX-License-Identifier: AGPL-3.0-only

//! Session configuration.
//!
//! Every field has a default, so a config file only names what it changes:
//!
//! ```json
//! {"data_root": "/srv/nmrlipids/Data", "tolerance": 0.02, "collect_all": true}
//! ```
//!
//! Unset roots are derived from `data_root`: simulations in `Simulations/`,
//! references in `Simulations.2/`, registry in `systems.json`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compare::{Comparator, CompareMode};
use crate::discovery::{self, paths};
use crate::error::DatabankError;
use crate::store::ResultStore;
use crate::tolerances;
use crate::workflow;

/// Reference tree name under the data root.
pub const REFERENCE_DIR: &str = "Simulations.2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub data_root: PathBuf,
    pub simulation_root: Option<PathBuf>,
    pub reference_root: Option<PathBuf>,
    pub registry: Option<PathBuf>,
    pub tolerance: f64,
    pub near_zero_floor: f64,
    pub collect_all: bool,
    /// Interpreter for analysis scripts; `NMLDB_PYTHON` or `python3` if unset.
    pub python: Option<String>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            simulation_root: None,
            reference_root: None,
            registry: None,
            tolerance: tolerances::MAX_REL_ERR,
            near_zero_floor: tolerances::NEAR_ZERO_FLOOR,
            collect_all: false,
            python: None,
        }
    }
}

impl VerifyConfig {
    #[must_use]
    pub fn for_data_root(root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: root.into(),
            ..Self::default()
        }
    }

    /// Read a JSON config file.
    ///
    /// # Errors
    ///
    /// `DataLoad` if the file cannot be opened or parsed.
    pub fn from_file(path: &Path) -> Result<Self, DatabankError> {
        let file = File::open(path).map_err(|e| {
            DatabankError::DataLoad(format!("cannot open config {}: {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            DatabankError::DataLoad(format!("cannot parse config {}: {e}", path.display()))
        })
    }

    /// Defaults rooted at the discovered data root.
    ///
    /// # Errors
    ///
    /// `DataLoad` if discovery finds no data root.
    pub fn discover(override_root: Option<&Path>) -> Result<Self, DatabankError> {
        discovery::try_discover_with_override(override_root).map(Self::for_data_root)
    }

    #[must_use]
    pub fn simulation_root(&self) -> PathBuf {
        self.simulation_root
            .clone()
            .unwrap_or_else(|| self.data_root.join(paths::SIMULATIONS))
    }

    #[must_use]
    pub fn reference_root(&self) -> PathBuf {
        self.reference_root
            .clone()
            .unwrap_or_else(|| self.data_root.join(REFERENCE_DIR))
    }

    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.registry
            .clone()
            .unwrap_or_else(|| self.data_root.join(paths::REGISTRY))
    }

    #[must_use]
    pub fn sentinel_path(&self) -> PathBuf {
        discovery::sentinel_path(&self.data_root)
    }

    #[must_use]
    pub fn python(&self) -> String {
        self.python.clone().unwrap_or_else(workflow::python_interpreter)
    }

    #[must_use]
    pub fn comparator(&self) -> Comparator {
        let mode = if self.collect_all {
            CompareMode::CollectAll
        } else {
            CompareMode::FirstDivergence
        };
        Comparator::new(self.tolerance)
            .with_floor(self.near_zero_floor)
            .with_mode(mode)
    }

    #[must_use]
    pub fn store(&self) -> ResultStore {
        ResultStore::new(self.simulation_root(), self.reference_root())
    }
}
