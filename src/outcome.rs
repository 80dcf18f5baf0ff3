// SPDX-License-Identifier: AGPL-3.0-only

//! Outcome codes reported by databank property computations.

use std::fmt;

/// What a property computation did for one system.
///
/// Codes match the databank analysis scripts: the script prints the code as
/// the last line of its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Not applicable to this system (or already present); no artifact.
    Skipped,
    /// Success; the promised artifacts were written.
    Computed,
    /// Failure; artifacts are absent or unreliable.
    Error,
}

impl Outcome {
    /// Integer code used by the analysis scripts.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Skipped => 0,
            Self::Computed => 1,
            Self::Error => 2,
        }
    }

    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Skipped),
            1 => Some(Self::Computed),
            2 => Some(Self::Error),
            _ => None,
        }
    }

    /// Only a computed outcome promises artifacts.
    #[must_use]
    pub const fn produces_artifacts(self) -> bool {
        matches!(self, Self::Computed)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Skipped => "SKIPPED",
            Self::Computed => "COMPUTED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.label(), self.code())
    }
}
