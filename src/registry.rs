// SPDX-License-Identifier: AGPL-3.0-only

//! Registered simulation systems.
//!
//! The registry is a JSON array of system records, one per simulation, with
//! the databank's upper-case metadata keys:
//!
//! ```json
//! [{"ID": 281, "path": "3c1/b4e/.../", "DOI": "10.5281/zenodo.1234",
//!   "COMPOSITION": {"POPC": {"NAME": "POPC", "COUNT": [64, 64]}},
//!   "TRJ": [["run.xtc", "sha1"]], "TPR": [["run.tpr", "sha1"]]}]
//! ```
//!
//! Loaded once per session and read-only afterwards.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DatabankError;
use crate::molecules;

/// Databank system identifier.
pub type SystemId = u64;

/// `DOI` value of systems whose trajectories live on this machine.
pub const LOCALHOST_DOI: &str = "localhost";

/// Trajectory-side files listed in a record, each as `[[name, hash], ...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Gro,
    Tpr,
    Trj,
}

impl FileKind {
    pub const ALL: [Self; 3] = [Self::Gro, Self::Tpr, Self::Trj];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Gro => "GRO",
            Self::Tpr => "TPR",
            Self::Trj => "TRJ",
        }
    }
}

/// One registered simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRecord {
    #[serde(rename = "ID")]
    pub id: SystemId,
    /// Directory relative to the simulation root.
    pub path: PathBuf,
    /// Molecule name → composition data (counts, mapping file, ...).
    #[serde(rename = "COMPOSITION", default)]
    pub composition: BTreeMap<String, Value>,
    #[serde(rename = "DOI", default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(rename = "GRO", default, skip_serializing_if = "Option::is_none")]
    pub gro: Option<Vec<Vec<String>>>,
    #[serde(rename = "TPR", default, skip_serializing_if = "Option::is_none")]
    pub tpr: Option<Vec<Vec<String>>>,
    #[serde(rename = "TRJ", default, skip_serializing_if = "Option::is_none")]
    pub trj: Option<Vec<Vec<String>>>,
}

impl SystemRecord {
    /// Minimal record (tests and ad-hoc runs).
    #[must_use]
    pub fn new(id: SystemId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
            composition: BTreeMap::new(),
            doi: None,
            gro: None,
            tpr: None,
            trj: None,
        }
    }

    /// Add a molecule to the composition.
    #[must_use]
    pub fn with_molecule(mut self, name: &str, data: Value) -> Self {
        self.composition.insert(name.to_string(), data);
        self
    }

    /// Trajectories are local and must never be wiped.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.doi.as_deref() == Some(LOCALHOST_DOI)
    }

    /// Name of the first file of the given kind, if the record lists one.
    #[must_use]
    pub fn primary_file(&self, kind: FileKind) -> Option<&str> {
        let files = match kind {
            FileKind::Gro => self.gro.as_ref(),
            FileKind::Tpr => self.tpr.as_ref(),
            FileKind::Trj => self.trj.as_ref(),
        }?;
        files.first()?.first().map(String::as_str)
    }

    /// Lipids in the composition, sorted.
    #[must_use]
    pub fn lipids(&self) -> Vec<&str> {
        self.composition
            .keys()
            .map(String::as_str)
            .filter(|name| molecules::is_lipid(name))
            .collect()
    }

    /// System directory under a simulation root.
    #[must_use]
    pub fn directory(&self, simulation_root: &Path) -> PathBuf {
        simulation_root.join(&self.path)
    }
}

/// All registered systems, addressable by id.
#[derive(Debug, Clone, Default)]
pub struct SystemRegistry {
    systems: Vec<SystemRecord>,
}

impl SystemRegistry {
    #[must_use]
    pub fn from_records(systems: Vec<SystemRecord>) -> Self {
        Self { systems }
    }

    /// Load a registry index (JSON array of records).
    ///
    /// # Errors
    ///
    /// Returns `DataLoad` if the file cannot be opened or parsed, or if two
    /// records share an id.
    pub fn load(path: &Path) -> Result<Self, DatabankError> {
        let file = File::open(path).map_err(|e| {
            DatabankError::DataLoad(format!("cannot open registry {}: {e}", path.display()))
        })?;
        let systems: Vec<SystemRecord> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                DatabankError::DataLoad(format!("cannot parse registry {}: {e}", path.display()))
            })?;
        let mut ids: Vec<SystemId> = systems.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        if let Some(w) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(DatabankError::DataLoad(format!(
                "registry {} lists system {} twice",
                path.display(),
                w[0]
            )));
        }
        tracing::info!(count = systems.len(), registry = %path.display(), "loaded systems");
        Ok(Self { systems })
    }

    /// Look up a system by id.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSystem` if no record has this id.
    pub fn loc(&self, id: SystemId) -> Result<&SystemRecord, DatabankError> {
        self.systems
            .iter()
            .find(|s| s.id == id)
            .ok_or(DatabankError::UnknownSystem(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemRecord> {
        self.systems.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl<'a> IntoIterator for &'a SystemRegistry {
    type Item = &'a SystemRecord;
    type IntoIter = std::slice::Iter<'a, SystemRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.systems.iter()
    }
}
