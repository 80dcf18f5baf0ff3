// SPDX-License-Identifier: AGPL-3.0-only

//! Verification harness: one property computation against one system.
//!
//! For a system and an expected outcome:
//!   1. run the computation once
//!   2. outcome differs from the expectation → fail fast
//!   3. outcome is not `Computed` → done, no file is touched
//!   4. for every promised artifact, soft-check existence, size, and
//!      content against the reference store
//!
//! Step 4 never stops early: a report lists every failing artifact.

use std::io::ErrorKind;
use std::path::Path;

use rayon::prelude::*;

use crate::compare::Comparator;
use crate::computation::Computation;
use crate::config::VerifyConfig;
use crate::error::DatabankError;
use crate::outcome::Outcome;
use crate::property::{ArtifactSpec, Property};
use crate::registry::{SystemId, SystemRecord, SystemRegistry};
use crate::store::ResultStore;
use crate::validation::{Collector, Failure};

/// Checks performed for one system × property.
#[derive(Debug, Clone)]
pub struct SystemReport {
    pub system: SystemId,
    pub property: Property,
    pub outcome: Outcome,
    pub collector: Collector,
}

impl SystemReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.collector.all_passed()
    }

    /// Assert the collector is empty.
    ///
    /// # Errors
    ///
    /// `ChecksFailed` listing every failed check.
    pub fn into_result(self) -> Result<(), DatabankError> {
        self.collector.finish()
    }
}

/// Runs computations and checks their artifacts against the reference store.
#[derive(Debug, Clone)]
pub struct VerificationHarness {
    store: ResultStore,
    comparator: Comparator,
}

impl VerificationHarness {
    #[must_use]
    pub const fn new(store: ResultStore, comparator: Comparator) -> Self {
        Self { store, comparator }
    }

    #[must_use]
    pub fn from_config(config: &VerifyConfig) -> Self {
        Self::new(config.store(), config.comparator())
    }

    #[must_use]
    pub const fn store(&self) -> &ResultStore {
        &self.store
    }

    #[must_use]
    pub const fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    /// Run `computation` for `system` and check everything it promised.
    ///
    /// # Errors
    ///
    /// `UnexpectedOutcome` when the reported outcome differs from `expected`.
    /// Artifact problems are *not* errors here; they are in the report.
    pub fn verify(
        &self,
        system: &SystemRecord,
        computation: &dyn Computation,
        expected: Outcome,
    ) -> Result<SystemReport, DatabankError> {
        let property = computation.property();
        let span = tracing::info_span!("verify", system = system.id, property = %property);
        let _guard = span.enter();

        let outcome = computation.compute(system, &system.directory(self.store.computed_root()));
        if outcome != expected {
            return Err(DatabankError::UnexpectedOutcome {
                system: system.id,
                property: property.to_string(),
                expected,
                actual: outcome,
            });
        }

        let mut collector = Collector::new(format!("{}/{property}", system.id));
        if outcome.produces_artifacts() {
            for spec in property.artifacts(system) {
                self.check_artifact(system, &spec, &mut collector);
            }
        } else {
            tracing::info!(%outcome, "no artifacts expected");
        }

        Ok(SystemReport {
            system: system.id,
            property,
            outcome,
            collector,
        })
    }

    /// Soft-check one artifact: exists, exceeds its size threshold, matches
    /// the reference.
    pub fn check_artifact(
        &self,
        system: &SystemRecord,
        spec: &ArtifactSpec,
        collector: &mut Collector,
    ) {
        let relative = spec.relative_path(system);
        let path = self.store.computed_path(&relative);

        let bytes = match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                collector.pass(format!("{}: exists", spec.name));
                meta.len()
            }
            Ok(_) => {
                collector.record(
                    format!("{}: exists", spec.name),
                    Err(Failure::MissingArtifact { path }),
                );
                return;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                collector.record(
                    format!("{}: exists", spec.name),
                    Err(Failure::MissingArtifact { path }),
                );
                return;
            }
            Err(e) => {
                collector.record(
                    format!("{}: exists", spec.name),
                    Err(Failure::UnreadableArtifact {
                        path,
                        reason: e.to_string(),
                    }),
                );
                return;
            }
        };

        let size = if bytes > spec.min_bytes {
            Ok(())
        } else {
            Err(Failure::ArtifactTooSmall {
                path,
                bytes,
                min_bytes: spec.min_bytes,
            })
        };
        collector.record(format!("{}: size", spec.name), size);

        let content = self.compare_artifact(&relative);
        collector.record(format!("{}: matches reference", spec.name), content);
    }

    /// Compare the computed artifact at `relative` with its reference.
    ///
    /// # Errors
    ///
    /// `Divergent` with the divergences found (one in first-divergence
    /// mode), or the load failure of either file.
    pub fn compare_artifact(&self, relative: &Path) -> Result<(), Failure> {
        tracing::info!(artifact = %relative.display(), "comparing against reference");
        let pair = self.store.load_pair(relative)?;
        let divergences = self.comparator.divergences(&pair.reference, &pair.computed);
        if divergences.is_empty() {
            tracing::info!(artifact = %relative.display(), "matches reference");
            Ok(())
        } else {
            Err(Failure::Divergent {
                artifact: relative.to_path_buf(),
                divergences,
            })
        }
    }

    /// Verify many systems in parallel; results keep the input order.
    ///
    /// Systems live in disjoint directories, so checks never share files.
    #[must_use]
    pub fn verify_many(
        &self,
        registry: &SystemRegistry,
        computation: &dyn Computation,
        expectations: &[(SystemId, Outcome)],
    ) -> Vec<Result<SystemReport, DatabankError>> {
        expectations
            .par_iter()
            .map(|&(id, expected)| {
                let system = registry.loc(id)?;
                self.verify(system, computation, expected)
            })
            .collect()
    }
}
