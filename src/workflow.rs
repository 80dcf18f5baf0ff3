// SPDX-License-Identifier: AGPL-3.0-only

//! Databank script locations and subprocess helpers for automated workflows.
//!
//! Failures are returned as `CommandFailed` so the caller decides whether to
//! exit; nothing here terminates the process.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::DatabankError;

/// Environment variable overriding the Python interpreter.
pub const PYTHON_ENV: &str = "NMLDB_PYTHON";

/// Interpreter used when `NMLDB_PYTHON` is unset.
pub const DEFAULT_PYTHON: &str = "python3";

/// Well-known script locations inside a databank checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabankPaths {
    pub build_databank: PathBuf,
    pub add_data: PathBuf,
    pub analyze_databank: PathBuf,
    pub calc_properties: PathBuf,
    pub search_databank: PathBuf,
    pub quality_evaluation: PathBuf,
    pub make_ranking: PathBuf,
}

impl DatabankPaths {
    #[must_use]
    pub fn new(root: &Path) -> Self {
        let build_databank = root.join("Scripts").join("BuildDatabank");
        let analyze_databank = root.join("Scripts").join("AnalyzeDatabank");
        Self {
            add_data: build_databank.join("AddData.py"),
            search_databank: build_databank.join("searchDATABANK.py"),
            quality_evaluation: build_databank.join("QualityEvaluation.py"),
            make_ranking: build_databank.join("makeRanking.py"),
            calc_properties: analyze_databank.join("calcProperties.sh"),
            build_databank,
            analyze_databank,
        }
    }

    /// Path of an analysis script by file name.
    #[must_use]
    pub fn analysis_script(&self, script: &str) -> PathBuf {
        self.analyze_databank.join(script)
    }
}

/// Interpreter from `NMLDB_PYTHON`, falling back to `python3`.
#[must_use]
pub fn python_interpreter() -> String {
    std::env::var(PYTHON_ENV).unwrap_or_else(|_| DEFAULT_PYTHON.to_string())
}

/// Run a shell command; non-zero exit is an error.
///
/// # Errors
///
/// `CommandFailed` if the shell cannot be spawned or the command fails.
pub fn run_command(
    command: &str,
    error_message: &str,
    working_dir: Option<&Path>,
) -> Result<(), DatabankError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }
    run_checked(cmd, command, error_message)
}

/// Run a Python script with the configured interpreter.
///
/// # Errors
///
/// `CommandFailed` if the interpreter cannot be spawned or the script fails.
pub fn run_python_script(
    interpreter: &str,
    script: &Path,
    args: &[String],
    error_message: &str,
    working_dir: Option<&Path>,
) -> Result<(), DatabankError> {
    let mut cmd = Command::new(interpreter);
    cmd.arg(script).args(args);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }
    let shown = format!("{interpreter} {} {}", script.display(), args.join(" "));
    run_checked(cmd, shown.trim_end(), error_message)
}

fn run_checked(mut cmd: Command, shown: &str, error_message: &str) -> Result<(), DatabankError> {
    tracing::debug!(command = shown, "running");
    let status = cmd.status().map_err(|e| DatabankError::CommandFailed {
        command: shown.to_string(),
        message: format!("{error_message}: {e}"),
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(DatabankError::CommandFailed {
            command: shown.to_string(),
            message: format!("{error_message}: {status}"),
        })
    }
}

/// Delete an info file, warning on failure. Returns whether it was deleted.
pub fn delete_info_file(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(file = %path.display(), "deleted info file");
            true
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "could not delete info file");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn databank_paths_layout() {
        let p = DatabankPaths::new(Path::new("/db"));
        assert_eq!(p.build_databank, PathBuf::from("/db/Scripts/BuildDatabank"));
        assert_eq!(p.add_data, PathBuf::from("/db/Scripts/BuildDatabank/AddData.py"));
        assert_eq!(
            p.calc_properties,
            PathBuf::from("/db/Scripts/AnalyzeDatabank/calcProperties.sh")
        );
        assert_eq!(
            p.make_ranking,
            PathBuf::from("/db/Scripts/BuildDatabank/makeRanking.py")
        );
        assert_eq!(
            p.analysis_script("calcAPL.py"),
            PathBuf::from("/db/Scripts/AnalyzeDatabank/calcAPL.py")
        );
    }

    #[test]
    fn run_command_success_and_failure() {
        assert!(run_command("true", "should not fail", None).is_ok());
        let err = run_command("exit 3", "step failed", None).unwrap_err();
        match err {
            DatabankError::CommandFailed { command, message } => {
                assert_eq!(command, "exit 3");
                assert!(message.starts_with("step failed"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn run_command_honours_working_dir() {
        let dir = TempDir::new().unwrap();
        run_command("touch marker", "touch failed", Some(dir.path())).unwrap();
        assert!(dir.path().join("marker").is_file());
    }

    #[test]
    fn run_python_script_reports_spawn_failure() {
        let err = run_python_script(
            "/nonexistent/interpreter",
            Path::new("x.py"),
            &[],
            "script failed",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DatabankError::CommandFailed { .. }));
    }

    #[test]
    fn delete_info_file_reports_outcome() {
        let dir = TempDir::new().unwrap();
        let info = dir.path().join("info.yml");
        std::fs::write(&info, "x").unwrap();
        assert!(delete_info_file(&info));
        assert!(!info.exists());
        assert!(!delete_info_file(&info));
    }
}
