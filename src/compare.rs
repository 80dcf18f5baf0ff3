// SPDX-License-Identifier: AGPL-3.0-only

//! Structural approximate equality over JSON documents.
//!
//! Two parsed artifacts are equal when they have the same shape at every
//! depth and every numeric leaf agrees within a relative tolerance:
//!
//! ```text
//! |a - b| <= tol * max(|a|, |b|, floor)
//! ```
//!
//! Shape rules, checked before any descent:
//!   - sequences compare positionally; unequal lengths are a
//!     `length-mismatch` at the sequence itself
//!   - mappings need identical key sets; asymmetric keys are a
//!     `key-set-mismatch` at the mapping itself
//!   - a sequence never equals a mapping, whatever their cardinality
//!
//! After the length check a sequence is traversed as an index-keyed view,
//! through the same child walk as a mapping. Mapping keys are visited in
//! sorted order so diagnostics are reproducible.
//!
//! The default mode stops at the first divergence. [`CompareMode::CollectAll`]
//! keeps going and reports every divergence in one pass.

use std::fmt;
use std::ops::ControlFlow;

use serde_json::{Map, Number, Value};

use crate::locator::{Locator, Segment};
use crate::tolerances;

/// Type class of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl Shape {
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Sequence,
            Value::Object(_) => Self::Mapping,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }
}

/// Why two documents diverge at a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    /// Different type classes (including sequence vs mapping).
    TypeMismatch,
    /// Sequences of different length.
    LengthMismatch,
    /// Mappings with different key sets.
    KeySetMismatch,
    /// Numbers further apart than the relative tolerance.
    ValueOutOfTolerance,
    /// Unequal strings or booleans.
    ValueMismatch,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TypeMismatch => "type-mismatch",
            Self::LengthMismatch => "length-mismatch",
            Self::KeySetMismatch => "key-set-mismatch",
            Self::ValueOutOfTolerance => "value-out-of-tolerance",
            Self::ValueMismatch => "value-mismatch",
        })
    }
}

/// A single point where `actual` departs from `expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    /// Path from the document root to the divergent sub-values.
    pub locator: Locator,
    /// Sub-value of the expected (reference) document.
    pub expected: Value,
    /// Sub-value of the actual (computed) document.
    pub actual: Value,
    pub reason: Reason,
    /// Lengths, differing keys, or relative difference vs tolerance.
    pub detail: String,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} at {}: {}", self.reason, self.locator, self.detail)?;
        writeln!(f, "    expected: {}", self.expected)?;
        write!(f, "    actual:   {}", self.actual)
    }
}

/// Result of a first-divergence comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Equal,
    Divergent(Divergence),
}

impl Comparison {
    #[must_use]
    pub const fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }

    #[must_use]
    pub const fn divergence(&self) -> Option<&Divergence> {
        match self {
            Self::Equal => None,
            Self::Divergent(d) => Some(d),
        }
    }

    /// `Ok(())` when equal, the divergence otherwise.
    ///
    /// # Errors
    ///
    /// Returns the divergence when the documents differ.
    pub fn into_result(self) -> Result<(), Divergence> {
        match self {
            Self::Equal => Ok(()),
            Self::Divergent(d) => Err(d),
        }
    }
}

/// Whether a comparison stops at the first divergence or collects them all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareMode {
    #[default]
    FirstDivergence,
    CollectAll,
}

/// Configured structural comparator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct Comparator {
    tolerance: f64,
    floor: f64,
    mode: CompareMode,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(tolerances::MAX_REL_ERR)
    }
}

impl Comparator {
    /// Comparator with the given relative tolerance (negative or NaN is
    /// treated as 0, i.e. exact equality).
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
            floor: tolerances::NEAR_ZERO_FLOOR,
            mode: CompareMode::FirstDivergence,
        }
    }

    /// Override the near-zero magnitude floor.
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor.max(0.0);
        self
    }

    pub const fn with_mode(mut self, mode: CompareMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub const fn floor(&self) -> f64 {
        self.floor
    }

    #[must_use]
    pub const fn mode(&self) -> CompareMode {
        self.mode
    }

    /// Compare and stop at the first divergence (left-to-right indices,
    /// sorted keys).
    #[must_use]
    pub fn compare(&self, expected: &Value, actual: &Value) -> Comparison {
        let mut walk = Walk::new(self, CompareMode::FirstDivergence);
        let _ = walk.visit(&Locator::root(), expected, actual);
        walk.found
            .into_iter()
            .next()
            .map_or(Comparison::Equal, Comparison::Divergent)
    }

    /// Compare and collect every divergence.
    ///
    /// A length mismatch still stops descent into that sequence. A key-set
    /// mismatch is reported and the shared keys are compared as well.
    #[must_use]
    pub fn compare_all(&self, expected: &Value, actual: &Value) -> Vec<Divergence> {
        let mut walk = Walk::new(self, CompareMode::CollectAll);
        let _ = walk.visit(&Locator::root(), expected, actual);
        walk.found
    }

    /// Divergences according to the configured mode (at most one in
    /// first-divergence mode).
    #[must_use]
    pub fn divergences(&self, expected: &Value, actual: &Value) -> Vec<Divergence> {
        match self.mode {
            CompareMode::FirstDivergence => match self.compare(expected, actual) {
                Comparison::Equal => Vec::new(),
                Comparison::Divergent(d) => vec![d],
            },
            CompareMode::CollectAll => self.compare_all(expected, actual),
        }
    }

    /// The relative-tolerance rule for one pair of numbers.
    #[must_use]
    pub fn numbers_close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.tolerance * self.scale(a, b)
    }

    /// `|a - b| / max(|a|, |b|, floor)`.
    #[must_use]
    pub fn relative_difference(&self, a: f64, b: f64) -> f64 {
        (a - b).abs() / self.scale(a, b)
    }

    fn scale(&self, a: f64, b: f64) -> f64 {
        a.abs().max(b.abs()).max(self.floor)
    }
}

/// Compare two documents with the given relative tolerance, first
/// divergence only.
#[must_use]
pub fn compare(expected: &Value, actual: &Value, tolerance: f64) -> Comparison {
    Comparator::new(tolerance).compare(expected, actual)
}

struct Walk<'c> {
    comparator: &'c Comparator,
    mode: CompareMode,
    found: Vec<Divergence>,
}

impl<'c> Walk<'c> {
    const fn new(comparator: &'c Comparator, mode: CompareMode) -> Self {
        Self {
            comparator,
            mode,
            found: Vec::new(),
        }
    }

    fn visit(&mut self, loc: &Locator, expected: &Value, actual: &Value) -> ControlFlow<()> {
        match (expected, actual) {
            (Value::Array(e), Value::Array(a)) => {
                if e.len() != a.len() {
                    return self.diverge(
                        loc,
                        expected,
                        actual,
                        Reason::LengthMismatch,
                        format!("expected {} elements, found {}", e.len(), a.len()),
                    );
                }
                let children = e
                    .iter()
                    .zip(a)
                    .enumerate()
                    .map(|(i, (x, y))| (Segment::Index(i), x, y));
                self.visit_children(loc, children)
            }
            (Value::Object(e), Value::Object(a)) => {
                let missing = keys_only_in(e, a);
                let unexpected = keys_only_in(a, e);
                if !missing.is_empty() || !unexpected.is_empty() {
                    self.diverge(
                        loc,
                        expected,
                        actual,
                        Reason::KeySetMismatch,
                        key_set_detail(&missing, &unexpected),
                    )?;
                }
                let mut shared: Vec<(&String, &Value, &Value)> = e
                    .iter()
                    .filter_map(|(k, x)| a.get(k).map(|y| (k, x, y)))
                    .collect();
                shared.sort_unstable_by(|l, r| l.0.cmp(r.0));
                let children = shared
                    .into_iter()
                    .map(|(k, x, y)| (Segment::Key(k.clone()), x, y));
                self.visit_children(loc, children)
            }
            (Value::Number(e), Value::Number(a)) => self.visit_numbers(loc, expected, actual, e, a),
            (Value::String(e), Value::String(a)) if e == a => ControlFlow::Continue(()),
            (Value::Bool(e), Value::Bool(a)) if e == a => ControlFlow::Continue(()),
            (Value::Null, Value::Null) => ControlFlow::Continue(()),
            _ if Shape::of(expected) == Shape::of(actual) => self.diverge(
                loc,
                expected,
                actual,
                Reason::ValueMismatch,
                format!("{} values differ", Shape::of(expected).name()),
            ),
            _ => self.diverge(
                loc,
                expected,
                actual,
                Reason::TypeMismatch,
                format!(
                    "expected {}, found {}",
                    Shape::of(expected).name(),
                    Shape::of(actual).name()
                ),
            ),
        }
    }

    fn visit_children<'v>(
        &mut self,
        loc: &Locator,
        children: impl Iterator<Item = (Segment, &'v Value, &'v Value)>,
    ) -> ControlFlow<()> {
        for (segment, expected, actual) in children {
            self.visit(&loc.child(segment), expected, actual)?;
        }
        ControlFlow::Continue(())
    }

    fn visit_numbers(
        &mut self,
        loc: &Locator,
        expected: &Value,
        actual: &Value,
        e: &Number,
        a: &Number,
    ) -> ControlFlow<()> {
        if e == a {
            return ControlFlow::Continue(());
        }
        let (x, y) = (as_float(e), as_float(a));
        if self.comparator.numbers_close(x, y) {
            return ControlFlow::Continue(());
        }
        let detail = format!(
            "relative difference {:.3e} exceeds tolerance {:.3e}",
            self.comparator.relative_difference(x, y),
            self.comparator.tolerance()
        );
        self.diverge(loc, expected, actual, Reason::ValueOutOfTolerance, detail)
    }

    fn diverge(
        &mut self,
        loc: &Locator,
        expected: &Value,
        actual: &Value,
        reason: Reason,
        detail: String,
    ) -> ControlFlow<()> {
        self.found.push(Divergence {
            locator: loc.clone(),
            expected: expected.clone(),
            actual: actual.clone(),
            reason,
            detail,
        });
        match self.mode {
            CompareMode::FirstDivergence => ControlFlow::Break(()),
            CompareMode::CollectAll => ControlFlow::Continue(()),
        }
    }
}

fn as_float(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

/// Keys of `left` absent from `right`, sorted.
fn keys_only_in<'m>(left: &'m Map<String, Value>, right: &Map<String, Value>) -> Vec<&'m str> {
    let mut keys: Vec<&str> = left
        .keys()
        .filter(|k| !right.contains_key(k.as_str()))
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    keys
}

fn key_set_detail(missing: &[&str], unexpected: &[&str]) -> String {
    match (missing.is_empty(), unexpected.is_empty()) {
        (false, false) => format!("missing keys {missing:?}, unexpected keys {unexpected:?}"),
        (false, true) => format!("missing keys {missing:?}"),
        _ => format!("unexpected keys {unexpected:?}"),
    }
}
