// SPDX-License-Identifier: AGPL-3.0-only

#![deny(clippy::expect_used, clippy::unwrap_used)]

//! NMRlipids databank recompute-and-compare verification.
//!
//! Re-runs the databank analysis battery (area per lipid, order parameters,
//! MAICoS density profiles, NMR-PCA equilibration times) for registered
//! simulation systems and checks every JSON artifact against a reference
//! store within a relative tolerance.
//!
//! ## Core
//!   - `compare`: structural approximate equality over JSON documents
//!   - `locator`: breadcrumb paths into a JSON document
//!   - `store`: computed/reference artifact loading
//!
//! ## Harness
//!   - `harness`: run a computation, check its outcome and artifacts
//!   - `validation`: soft-check collector, asserted empty at the end
//!   - `session`: registry + harness + teardown for one test session
//!   - `teardown`: wiping calculation outputs and trajectories
//!
//! ## Databank plumbing
//!   - `registry`, `molecules`, `property`, `outcome`, `computation`
//!   - `config`, `discovery`, `tolerances`, `workflow`, `logging`
//!
//! ## Binary
//!   - `verify_databank`: `compare` two files or `run` a property battery

pub mod compare;
pub mod computation;
pub mod config;
pub mod discovery;
pub mod error;
pub mod harness;
pub mod locator;
pub mod logging;
pub mod molecules;
pub mod outcome;
pub mod property;
pub mod registry;
pub mod session;
pub mod store;
pub mod teardown;
pub mod tolerances;
pub mod validation;
pub mod workflow;

pub use compare::{compare, Comparator, CompareMode, Comparison, Divergence, Reason};
pub use error::DatabankError;
pub use harness::{SystemReport, VerificationHarness};
pub use locator::{Locator, Segment};
pub use outcome::Outcome;
pub use property::{ArtifactSpec, Property};
pub use registry::{SystemId, SystemRecord, SystemRegistry};
pub use store::ResultStore;
pub use validation::Collector;
