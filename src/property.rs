// SPDX-License-Identifier: AGPL-3.0-only

//! The databank's property computations and the artifacts each one promises.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::registry::SystemRecord;
use crate::tolerances::{MIN_ARTIFACT_BYTES, MIN_SCALAR_ARTIFACT_BYTES};

/// MAICoS profile artifacts, in the order they are checked.
pub const MAICOS_ARTIFACTS: &[&str] = &[
    "WaterDensity.json",
    "LipidDensity.json",
    "TotalDensity.json",
    "FormFactor.json",
];

/// A physical property recomputed per system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Area per lipid time series.
    Apl,
    /// C–H bond order parameters, one file per lipid.
    OrderParameters,
    /// MAICoS density profiles and form factor.
    Maicos,
    /// Equilibration times from NMR-PCA.
    NmrPca,
}

impl Property {
    pub const ALL: [Self; 4] = [Self::Apl, Self::OrderParameters, Self::Maicos, Self::NmrPca];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Apl => "apl",
            Self::OrderParameters => "order-parameters",
            Self::Maicos => "maicos",
            Self::NmrPca => "nmr-pca",
        }
    }

    /// Analysis script under `Scripts/AnalyzeDatabank`.
    #[must_use]
    pub const fn script(self) -> &'static str {
        match self {
            Self::Apl => "calcAPL.py",
            Self::OrderParameters => "calcOrderParameters.py",
            Self::Maicos => "calc_MAICoS.py",
            Self::NmrPca => "calcNMRPCA.py",
        }
    }

    /// Artifacts a computed outcome must leave in the system directory.
    #[must_use]
    pub fn artifacts(self, system: &SystemRecord) -> Vec<ArtifactSpec> {
        match self {
            Self::Apl => vec![ArtifactSpec::new("apl.json", MIN_ARTIFACT_BYTES)],
            Self::OrderParameters => system
                .lipids()
                .into_iter()
                .map(|lipid| {
                    ArtifactSpec::new(format!("{lipid}OrderParameters.json"), MIN_ARTIFACT_BYTES)
                })
                .collect(),
            Self::Maicos => MAICOS_ARTIFACTS
                .iter()
                .map(|name| ArtifactSpec::new(*name, MIN_ARTIFACT_BYTES))
                .collect(),
            Self::NmrPca => vec![ArtifactSpec::new(
                "eq_times.json",
                MIN_SCALAR_ARTIFACT_BYTES,
            )],
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "apl" => Ok(Self::Apl),
            "op" | "order-parameters" | "orderparameters" => Ok(Self::OrderParameters),
            "maicos" => Ok(Self::Maicos),
            "nmrpca" | "nmr-pca" | "eq-times" => Ok(Self::NmrPca),
            other => Err(format!(
                "unknown property '{other}' (expected apl, order-parameters, maicos, nmr-pca)"
            )),
        }
    }
}

/// One promised artifact: file name in the system directory and the size it
/// must exceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: String,
    pub min_bytes: u64,
}

impl ArtifactSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, min_bytes: u64) -> Self {
        Self {
            name: name.into(),
            min_bytes,
        }
    }

    /// Path relative to the simulation root.
    #[must_use]
    pub fn relative_path(&self, system: &SystemRecord) -> PathBuf {
        system.path.join(&self.name)
    }
}
