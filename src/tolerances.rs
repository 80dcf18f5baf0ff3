// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized verification thresholds with rationale.
//!
//! Every tolerance and size threshold used by the comparator and the harness
//! is defined here. No ad-hoc magic numbers elsewhere.
//!
//! | Threshold | Basis | Value |
//! |-----------|-------|-------|
//! | Relative tolerance | Trajectory re-analysis noise | 1e-2 |
//! | Near-zero floor | f64 round-off on O(1) observables | 1e-12 |
//! | Artifact size | Smallest complete profile/OP file | 1000 bytes |
//! | Scalar artifact size | Smallest complete `eq_times.json` | 10 bytes |

// ═══════════════════════════════════════════════════════════════════
// Comparator tolerances
// ═══════════════════════════════════════════════════════════════════

/// Default relative tolerance for recomputed vs reference artifacts.
///
/// Recomputation reads the same trajectory but may run on a different
/// MDAnalysis/MAICoS version and with a different frame-chunking, so
/// order parameters and density bins drift at the 1e-3 level. 1% leaves
/// headroom while still catching a wrong atom selection or unit error.
pub const MAX_REL_ERR: f64 = 1e-2;

/// Magnitude floor in the relative-tolerance denominator.
///
/// `|a - b| <= tol * max(|a|, |b|, floor)`. Without a floor two values that
/// are both round-off zeros of opposite sign (±1e-17) would be "100% apart".
/// The floor turns the rule into an absolute `tol * floor` bound below it.
pub const NEAR_ZERO_FLOOR: f64 = 1e-12;

// ═══════════════════════════════════════════════════════════════════
// Artifact plausibility
// ═══════════════════════════════════════════════════════════════════

/// Minimum byte size for profile-style artifacts (APL time series, order
/// parameters, density profiles, form factors).
///
/// The smallest complete file observed in the test bank is several kB. An
/// artifact at or below 1000 bytes is a truncated or empty write.
pub const MIN_ARTIFACT_BYTES: u64 = 1000;

/// Minimum byte size for scalar-only artifacts (`eq_times.json`).
///
/// One lipid with one relaxation time already needs more than 10 bytes.
pub const MIN_SCALAR_ARTIFACT_BYTES: u64 = 10;
