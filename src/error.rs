// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for databank verification.
//!
//! Comparator divergences are *not* errors: they are values collected by the
//! harness. This enum covers the I/O layer (missing or unparsable artifacts),
//! the fail-fast conditions (unexpected outcome code, corrupted environment)
//! and the final "collector not empty" assertion.

use std::path::PathBuf;

use crate::outcome::Outcome;
use crate::registry::SystemId;

/// Errors arising from artifact loading, computation orchestration, or
/// session setup.
#[derive(Debug, thiserror::Error)]
pub enum DatabankError {
    /// Artifact file does not exist.
    #[error("missing artifact: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// Artifact exists but could not be read or parsed as JSON.
    #[error("unreadable artifact {}: {reason}", path.display())]
    UnreadableArtifact { path: PathBuf, reason: String },

    /// The computation reported an outcome the caller did not expect.
    #[error("system {system}: {property} returned {actual}, expected {expected}")]
    UnexpectedOutcome {
        system: SystemId,
        property: String,
        expected: Outcome,
        actual: Outcome,
    },

    /// The `.notest` sentinel marks the fixture data as known-bad.
    #[error(
        "test environment is corrupted: found sentinel {}",
        sentinel.display()
    )]
    CorruptedEnvironment { sentinel: PathBuf },

    /// No system with this id in the registry.
    #[error("system {0} is not registered")]
    UnknownSystem(SystemId),

    /// Registry or configuration loading failed.
    #[error("data loading failed: {0}")]
    DataLoad(String),

    /// An external command or script exited unsuccessfully.
    #[error("{message} (command: {command})")]
    CommandFailed { command: String, message: String },

    /// Soft checks were collected and at least one failed.
    #[error("{name}: {failed} of {total} checks failed\n{summary}")]
    ChecksFailed {
        name: String,
        failed: usize,
        total: usize,
        summary: String,
    },

    /// A cleanup glob pattern failed to compile.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),

    /// Filesystem error outside artifact loading (teardown, registry).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_artifact() {
        let err = DatabankError::MissingArtifact {
            path: PathBuf::from("sims/281/apl.json"),
        };
        assert_eq!(err.to_string(), "missing artifact: sims/281/apl.json");
    }

    #[test]
    fn display_unexpected_outcome_names_everything() {
        let err = DatabankError::UnexpectedOutcome {
            system: 787,
            property: "order-parameters".into(),
            expected: Outcome::Computed,
            actual: Outcome::Error,
        };
        let msg = err.to_string();
        assert!(msg.contains("787"));
        assert!(msg.contains("order-parameters"));
        assert!(msg.contains("COMPUTED"));
        assert!(msg.contains("ERROR"));
    }

    #[test]
    fn display_corrupted_environment() {
        let err = DatabankError::CorruptedEnvironment {
            sentinel: PathBuf::from("Data/.notest"),
        };
        assert!(err.to_string().contains(".notest"));
    }

    #[test]
    fn io_errors_convert() {
        fn fails() -> Result<(), DatabankError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(DatabankError::Io(_))));
    }

    #[test]
    fn error_trait_works() {
        let err = DatabankError::UnknownSystem(42);
        let dyn_err: &dyn std::error::Error = &err;
        assert_eq!(dyn_err.to_string(), "system 42 is not registered");
    }
}
