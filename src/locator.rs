// SPDX-License-Identifier: AGPL-3.0-only

//! Breadcrumb paths into a JSON document.
//!
//! A [`Locator`] is the sequence of mapping keys and sequence indices from the
//! document root to a sub-value. It renders as `y.z` or `x.1`; the root
//! renders as `<root>`.

use std::fmt;

use serde_json::Value;

/// One step of a locator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) if k.is_empty() || k.contains(['.', '"']) => write!(f, "{k:?}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

/// Path from the document root to a sub-value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Locator(Vec<Segment>);

impl Locator {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// A new locator one level deeper.
    #[must_use]
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        Self(segments)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Follow the locator through `document`.
    ///
    /// Returns `None` when a step does not exist or addresses the wrong kind
    /// of container (a key into a sequence, an index into a mapping).
    #[must_use]
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.0
            .iter()
            .try_fold(document, |node, segment| match (segment, node) {
                (Segment::Key(k), Value::Object(map)) => map.get(k),
                (Segment::Index(i), Value::Array(items)) => items.get(*i),
                _ => None,
            })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<Segment> for Locator {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(k: &str) -> Segment {
        Segment::Key(k.to_string())
    }

    #[test]
    fn root_renders_marker() {
        assert_eq!(Locator::root().to_string(), "<root>");
        assert!(Locator::root().is_root());
    }

    #[test]
    fn breadcrumb_joins_keys_and_indices() {
        let loc = Locator::root().child(key("y")).child(key("z"));
        assert_eq!(loc.to_string(), "y.z");
        let loc = Locator::root().child(key("x")).child(Segment::Index(1));
        assert_eq!(loc.to_string(), "x.1");
        assert_eq!(loc.depth(), 2);
    }

    #[test]
    fn awkward_keys_are_quoted() {
        let loc = Locator::root().child(key("M_G1_M")).child(key("a.b"));
        assert_eq!(loc.to_string(), "M_G1_M.\"a.b\"");
        assert_eq!(Locator::root().child(key("")).to_string(), "\"\"");
    }

    #[test]
    fn child_does_not_mutate_parent() {
        let parent = Locator::root().child(key("a"));
        let _ = parent.child(Segment::Index(3));
        assert_eq!(parent.depth(), 1);
    }

    #[test]
    fn resolve_walks_nested_document() {
        let doc = json!({"x": [1.0, 2.0], "y": {"z": 100.0}});
        let loc: Locator = [key("y"), key("z")].into_iter().collect();
        assert_eq!(loc.resolve(&doc), Some(&json!(100.0)));
        let loc: Locator = [key("x"), Segment::Index(1)].into_iter().collect();
        assert_eq!(loc.resolve(&doc), Some(&json!(2.0)));
        assert_eq!(Locator::root().resolve(&doc), Some(&doc));
    }

    #[test]
    fn resolve_rejects_wrong_container_kind() {
        let doc = json!({"x": [1.0, 2.0]});
        let loc: Locator = [key("x"), key("0")].into_iter().collect();
        assert_eq!(loc.resolve(&doc), None);
        let loc: Locator = [Segment::Index(0)].into_iter().collect();
        assert_eq!(loc.resolve(&doc), None);
        let loc: Locator = [key("x"), Segment::Index(7)].into_iter().collect();
        assert_eq!(loc.resolve(&doc), None);
    }
}
