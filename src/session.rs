// SPDX-License-Identifier: AGPL-3.0-only

//! One verification session: setup, runs, teardown.
//!
//! `teardown` consumes the session, so nothing can be wiped while a run is
//! still reading artifacts.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::computation::Computation;
use crate::config::VerifyConfig;
use crate::error::DatabankError;
use crate::harness::VerificationHarness;
use crate::outcome::Outcome;
use crate::registry::{SystemId, SystemRegistry};
use crate::teardown::{self, WipePolicy};
use crate::validation::Collector;

/// What one [`Session::run`] found.
#[derive(Debug)]
pub struct RunReport {
    /// Artifact checks of every system that returned its expected outcome
    pub checks: Collector,
    /// Systems that were aborted (unexpected outcome, unknown id), in input order
    pub errors: Vec<DatabankError>,
}

impl RunReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors.is_empty() && self.checks.all_passed()
    }

    /// Check summary followed by one line per aborted system.
    #[must_use]
    pub fn format_summary(&self) -> String {
        let mut s = self.checks.format_summary();
        for e in &self.errors {
            let _ = writeln!(s, "  ✗ {e}");
        }
        s
    }
}

#[derive(Debug)]
pub struct Session {
    config: VerifyConfig,
    registry: SystemRegistry,
    harness: VerificationHarness,
}

impl Session {
    /// Check the environment and load the registry.
    ///
    /// # Errors
    ///
    /// `CorruptedEnvironment` if the `.notest` sentinel is present, checked
    /// before anything else is read; `DataLoad` if the registry is unusable.
    pub fn open(config: VerifyConfig) -> Result<Self, DatabankError> {
        check_sentinel(&config)?;
        let registry = SystemRegistry::load(&config.registry_path())?;
        Ok(Self::assemble(config, registry))
    }

    /// Open with an already-built registry.
    ///
    /// # Errors
    ///
    /// `CorruptedEnvironment` if the `.notest` sentinel is present.
    pub fn with_registry(
        config: VerifyConfig,
        registry: SystemRegistry,
    ) -> Result<Self, DatabankError> {
        check_sentinel(&config)?;
        Ok(Self::assemble(config, registry))
    }

    fn assemble(config: VerifyConfig, registry: SystemRegistry) -> Self {
        let harness = VerificationHarness::from_config(&config);
        tracing::info!(
            systems = registry.len(),
            simulations = %config.simulation_root().display(),
            references = %config.reference_root().display(),
            "session open"
        );
        Self {
            config,
            registry,
            harness,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &VerifyConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &SystemRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn harness(&self) -> &VerificationHarness {
        &self.harness
    }

    /// Verify every `(system, expected outcome)` pair.
    ///
    /// An unexpected outcome is fatal for its own system only: every other
    /// system's artifact checks and outcome errors still land in the report.
    #[must_use]
    pub fn run(
        &self,
        computation: &dyn Computation,
        expectations: &[(SystemId, Outcome)],
    ) -> RunReport {
        let mut report = RunReport {
            checks: Collector::new(computation.property().to_string()),
            errors: Vec::new(),
        };
        for result in self
            .harness
            .verify_many(&self.registry, computation, expectations)
        {
            match result {
                Ok(system) => report.checks.absorb(system.collector),
                Err(e) => {
                    tracing::error!(error = %e, "system aborted");
                    report.errors.push(e);
                }
            }
        }
        report
    }

    /// Wipe calculation outputs and downloaded trajectories of every system.
    ///
    /// # Errors
    ///
    /// The first filesystem error; files removed before it stay removed.
    pub fn teardown(self, policy: WipePolicy) -> Result<Vec<PathBuf>, DatabankError> {
        let root = self.config.simulation_root();
        tracing::info!(keep_json = policy.keep_json, "wiping temporary calculation data");
        let mut removed = Vec::new();
        for system in &self.registry {
            removed.extend(teardown::wipe_calculation_outputs(&root, system, policy)?);
        }
        if policy.keep_trajectories {
            tracing::info!("keeping trajectory data");
        } else {
            for system in &self.registry {
                removed.extend(teardown::wipe_trajectories(&root, system, policy)?);
            }
        }
        Ok(removed)
    }
}

fn check_sentinel(config: &VerifyConfig) -> Result<(), DatabankError> {
    let sentinel = config.sentinel_path();
    if sentinel.exists() {
        tracing::error!(sentinel = %sentinel.display(), "test data is corrupted");
        return Err(DatabankError::CorruptedEnvironment { sentinel });
    }
    Ok(())
}
