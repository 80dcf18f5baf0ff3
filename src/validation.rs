// SPDX-License-Identifier: AGPL-3.0-only

//! Soft-check collector for verification runs.
//!
//! Every artifact check follows the same pattern:
//!   - record the check, never raise
//!   - keep going so one run reports *all* failing artifacts
//!   - assert the collector is empty at the very end
//!
//! Fail-fast conditions (unexpected outcome code, corrupted environment) do
//! not go through the collector; they are returned as errors immediately.

use std::fmt::{self, Write as _};
use std::path::PathBuf;

use crate::compare::Divergence;
use crate::error::DatabankError;

/// Why a single check failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// The computation promised an artifact it did not write.
    MissingArtifact { path: PathBuf },
    /// The artifact is no larger than its plausibility threshold.
    ArtifactTooSmall {
        path: PathBuf,
        bytes: u64,
        min_bytes: u64,
    },
    /// The artifact (or its reference) could not be read or parsed.
    UnreadableArtifact { path: PathBuf, reason: String },
    /// The artifact differs from the reference.
    Divergent {
        artifact: PathBuf,
        divergences: Vec<Divergence>,
    },
}

impl Failure {
    /// Short tag for summaries.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingArtifact { .. } => "missing-artifact",
            Self::ArtifactTooSmall { .. } => "artifact-too-small",
            Self::UnreadableArtifact { .. } => "unreadable-artifact",
            Self::Divergent { .. } => "divergent",
        }
    }

    #[must_use]
    pub const fn is_divergence(&self) -> bool {
        matches!(self, Self::Divergent { .. })
    }
}

impl From<DatabankError> for Failure {
    fn from(err: DatabankError) -> Self {
        match err {
            DatabankError::MissingArtifact { path } => Self::MissingArtifact { path },
            DatabankError::UnreadableArtifact { path, reason } => {
                Self::UnreadableArtifact { path, reason }
            }
            other => Self::UnreadableArtifact {
                path: PathBuf::new(),
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArtifact { path } => {
                write!(f, "file {} was not created", path.display())
            }
            Self::ArtifactTooSmall {
                path,
                bytes,
                min_bytes,
            } => write!(
                f,
                "file {} is {bytes} bytes, must exceed {min_bytes}",
                path.display()
            ),
            Self::UnreadableArtifact { path, reason } => {
                write!(f, "cannot load {}: {reason}", path.display())
            }
            Self::Divergent {
                artifact,
                divergences,
            } => {
                write!(
                    f,
                    "{} differs from reference ({} divergence{})",
                    artifact.display(),
                    divergences.len(),
                    if divergences.len() == 1 { "" } else { "s" }
                )?;
                for d in divergences {
                    write!(f, "\n  {d}")?;
                }
                Ok(())
            }
        }
    }
}

/// A single named check.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    /// Human-readable label (`281/apl.json: exists`)
    pub label: String,
    /// `None` when the check passed
    pub failure: Option<Failure>,
}

impl Check {
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Accumulates checks for one verification unit and asserts at the end.
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct Collector {
    /// Name of the verification unit
    pub name: String,
    /// All checks performed
    pub checks: Vec<Check>,
}

impl Collector {
    #[must_use = "collector must be finished to assert its checks"]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
        }
    }

    pub fn pass(&mut self, label: impl Into<String>) {
        self.checks.push(Check {
            label: label.into(),
            failure: None,
        });
    }

    pub fn fail(&mut self, label: impl Into<String>, failure: Failure) {
        self.checks.push(Check {
            label: label.into(),
            failure: Some(failure),
        });
    }

    /// Record a check from a `Result`; returns whether it passed.
    pub fn record(&mut self, label: impl Into<String>, result: Result<(), Failure>) -> bool {
        let label = label.into();
        match result {
            Ok(()) => {
                self.pass(label);
                true
            }
            Err(failure) => {
                tracing::warn!(check = %label, kind = failure.kind(), "check failed");
                self.fail(label, failure);
                false
            }
        }
    }

    /// Fold another collector's checks into this one, prefixing labels.
    pub fn absorb(&mut self, other: Self) {
        for check in other.checks {
            self.checks.push(Check {
                label: format!("{}: {}", other.name, check.label),
                failure: check.failure,
            });
        }
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed()).count()
    }

    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.checks.len()
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    /// Failed checks, in recording order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Failure)> {
        self.checks
            .iter()
            .filter_map(|c| c.failure.as_ref().map(|f| (c.label.as_str(), f)))
    }

    /// Summary block: header line, then one line per check.
    #[must_use]
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(
            s,
            "═══ {} validation: {}/{} checks passed ═══",
            self.name,
            self.passed_count(),
            self.total_count()
        );
        for check in &self.checks {
            match &check.failure {
                None => {
                    let _ = writeln!(s, "  ✓ {}", check.label);
                }
                Some(failure) => {
                    let _ = writeln!(s, "  ✗ {}: {failure}", check.label);
                }
            }
        }
        s
    }

    /// Assert that no check failed.
    ///
    /// # Errors
    ///
    /// Returns `ChecksFailed` carrying the full summary if any check failed.
    pub fn finish(self) -> Result<(), DatabankError> {
        if self.all_passed() {
            return Ok(());
        }
        let failed = self.total_count() - self.passed_count();
        Err(DatabankError::ChecksFailed {
            summary: self.format_summary(),
            name: self.name,
            failed,
            total: self.checks.len(),
        })
    }
}
