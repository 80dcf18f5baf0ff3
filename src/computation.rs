// SPDX-License-Identifier: AGPL-3.0-only

//! Property computations as seen by the harness.
//!
//! The harness only needs a black box: given a system, write artifacts into
//! the system directory and report an [`Outcome`]. [`ScriptComputation`]
//! drives the databank's Python analysis scripts; tests plug in closures.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::outcome::Outcome;
use crate::property::Property;
use crate::registry::SystemRecord;
use crate::workflow::{self, DatabankPaths};

/// Environment variable carrying the system id into analysis scripts.
pub const SYSTEM_ID_ENV: &str = "NMLDB_SYSTEM_ID";

/// One property computation.
pub trait Computation: Sync {
    fn property(&self) -> Property;

    /// Run for one system, writing artifacts under `system_dir`.
    fn compute(&self, system: &SystemRecord, system_dir: &Path) -> Outcome;
}

/// Adapter turning a closure into a [`Computation`].
pub struct FnComputation<F> {
    property: Property,
    run: F,
}

impl<F> FnComputation<F>
where
    F: Fn(&SystemRecord, &Path) -> Outcome + Sync,
{
    pub const fn new(property: Property, run: F) -> Self {
        Self { property, run }
    }
}

impl<F> Computation for FnComputation<F>
where
    F: Fn(&SystemRecord, &Path) -> Outcome + Sync,
{
    fn property(&self) -> Property {
        self.property
    }

    fn compute(&self, system: &SystemRecord, system_dir: &Path) -> Outcome {
        (self.run)(system, system_dir)
    }
}

/// Runs a databank analysis script as a subprocess.
///
/// Invocation: `<interpreter> <script> <system_dir>` with `NMLDB_SYSTEM_ID`
/// set. The last non-empty line of stdout is the outcome code. A process
/// that cannot be spawned, exits unsuccessfully, or prints no valid code is
/// an [`Outcome::Error`].
#[derive(Debug, Clone)]
pub struct ScriptComputation {
    property: Property,
    interpreter: String,
    script: PathBuf,
}

impl ScriptComputation {
    #[must_use]
    pub fn new(property: Property, interpreter: impl Into<String>, script: PathBuf) -> Self {
        Self {
            property,
            interpreter: interpreter.into(),
            script,
        }
    }

    /// The property's standard script inside a databank checkout.
    #[must_use]
    pub fn for_databank(property: Property, interpreter: &str, paths: &DatabankPaths) -> Self {
        Self::new(property, interpreter, paths.analysis_script(property.script()))
    }

    /// Interpreter from the environment, script from the checkout.
    #[must_use]
    pub fn from_env(property: Property, databank_root: &Path) -> Self {
        Self::for_databank(
            property,
            &workflow::python_interpreter(),
            &DatabankPaths::new(databank_root),
        )
    }

    #[must_use]
    pub fn script(&self) -> &Path {
        &self.script
    }
}

impl Computation for ScriptComputation {
    fn property(&self) -> Property {
        self.property
    }

    fn compute(&self, system: &SystemRecord, system_dir: &Path) -> Outcome {
        let output = Command::new(&self.interpreter)
            .arg(&self.script)
            .arg(system_dir)
            .env(SYSTEM_ID_ENV, system.id.to_string())
            .output();
        let output = match output {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(
                    script = %self.script.display(),
                    error = %e,
                    "cannot spawn analysis script"
                );
                return Outcome::Error;
            }
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(
                script = %self.script.display(),
                status = %output.status,
                stderr = %stderr.trim(),
                "analysis script failed"
            );
            return Outcome::Error;
        }
        parse_outcome(&String::from_utf8_lossy(&output.stdout)).unwrap_or_else(|| {
            tracing::error!(
                script = %self.script.display(),
                "analysis script printed no outcome code"
            );
            Outcome::Error
        })
    }
}

/// Outcome code from the last non-empty line of script output.
#[must_use]
pub fn parse_outcome(stdout: &str) -> Option<Outcome> {
    let last = stdout.lines().rev().find(|l| !l.trim().is_empty())?;
    last.trim().parse::<i32>().ok().and_then(Outcome::from_code)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_outcome_reads_last_line() {
        assert_eq!(parse_outcome("progress...\n1\n"), Some(Outcome::Computed));
        assert_eq!(parse_outcome("2\n\n  \n"), Some(Outcome::Error));
        assert_eq!(parse_outcome(" 0 "), Some(Outcome::Skipped));
        assert_eq!(parse_outcome("done"), None);
        assert_eq!(parse_outcome("5"), None);
        assert_eq!(parse_outcome(""), None);
    }

    #[test]
    fn closure_computation_passes_through() {
        let c = FnComputation::new(Property::Apl, |s: &SystemRecord, _: &Path| {
            if s.id == 787 {
                Outcome::Skipped
            } else {
                Outcome::Computed
            }
        });
        assert_eq!(c.property(), Property::Apl);
        let dir = Path::new("/tmp");
        assert_eq!(c.compute(&SystemRecord::new(787, "x"), dir), Outcome::Skipped);
        assert_eq!(c.compute(&SystemRecord::new(1, "x"), dir), Outcome::Computed);
    }

    #[test]
    fn script_computation_uses_stdout_code() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("calcAPL.sh");
        std::fs::write(
            &script,
            concat!(
                "echo \"system $NMLDB_SYSTEM_ID in $1\"\n",
                "if [ \"$NMLDB_SYSTEM_ID\" = 787 ]; then echo 2; else echo 1; fi\n",
            ),
        )
        .unwrap();
        let c = ScriptComputation::new(Property::Apl, "sh", script);
        assert_eq!(c.compute(&SystemRecord::new(281, "x"), dir.path()), Outcome::Computed);
        assert_eq!(c.compute(&SystemRecord::new(787, "x"), dir.path()), Outcome::Error);
    }

    #[test]
    fn failing_script_is_error() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("boom.sh");
        std::fs::write(&script, "echo 1\nexit 4\n").unwrap();
        let c = ScriptComputation::new(Property::Maicos, "sh", script);
        assert_eq!(c.compute(&SystemRecord::new(1, "x"), dir.path()), Outcome::Error);
    }

    #[test]
    fn missing_interpreter_is_error() {
        let c = ScriptComputation::new(
            Property::NmrPca,
            "/nonexistent/python",
            PathBuf::from("calcNMRPCA.py"),
        );
        assert_eq!(
            c.compute(&SystemRecord::new(1, "x"), Path::new(".")),
            Outcome::Error
        );
    }

    #[test]
    fn databank_script_location() {
        let paths = DatabankPaths::new(Path::new("/db"));
        let c = ScriptComputation::for_databank(Property::Maicos, "python3", &paths);
        assert_eq!(
            c.script(),
            Path::new("/db/Scripts/AnalyzeDatabank/calc_MAICoS.py")
        );
    }
}
