// SPDX-License-Identifier: AGPL-3.0-only

//! Computed and reference artifact stores.
//!
//! Both stores share the databank layout `<root>/<system.path>/<artifact>`.
//! The computed root is where the analysis scripts write; the reference root
//! holds trusted artifacts from an earlier run.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::DatabankError;

/// Both parsed versions of one artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPair {
    pub relative: PathBuf,
    pub computed: Value,
    pub reference: Value,
}

/// Resolves and loads artifacts from the computed and reference roots.
#[derive(Debug, Clone)]
pub struct ResultStore {
    computed_root: PathBuf,
    reference_root: PathBuf,
}

impl ResultStore {
    #[must_use]
    pub fn new(computed_root: impl Into<PathBuf>, reference_root: impl Into<PathBuf>) -> Self {
        Self {
            computed_root: computed_root.into(),
            reference_root: reference_root.into(),
        }
    }

    #[must_use]
    pub fn computed_root(&self) -> &Path {
        &self.computed_root
    }

    #[must_use]
    pub fn reference_root(&self) -> &Path {
        &self.reference_root
    }

    #[must_use]
    pub fn computed_path(&self, relative: &Path) -> PathBuf {
        self.computed_root.join(relative)
    }

    #[must_use]
    pub fn reference_path(&self, relative: &Path) -> PathBuf {
        self.reference_root.join(relative)
    }

    /// Load both versions of an artifact.
    ///
    /// # Errors
    ///
    /// `MissingArtifact` if either file is absent, `UnreadableArtifact` if
    /// either cannot be read or is not valid JSON. The computed file is
    /// loaded first.
    pub fn load_pair(&self, relative: &Path) -> Result<ArtifactPair, DatabankError> {
        let computed = load_json(&self.computed_path(relative))?;
        let reference = load_json(&self.reference_path(relative))?;
        Ok(ArtifactPair {
            relative: relative.to_path_buf(),
            computed,
            reference,
        })
    }
}

/// Parse one JSON file through a buffered reader.
///
/// The file handle is dropped before returning, on success and on parse
/// failure alike.
///
/// # Errors
///
/// `MissingArtifact` when the file does not exist, `UnreadableArtifact` for
/// any other I/O or parse failure.
pub fn load_json(path: &Path) -> Result<Value, DatabankError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DatabankError::MissingArtifact {
            path: path.to_path_buf(),
        },
        _ => DatabankError::UnreadableArtifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| DatabankError::UnreadableArtifact {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn stores() -> (TempDir, ResultStore) {
        let dir = TempDir::new().unwrap();
        let computed = dir.path().join("Simulations.1");
        let reference = dir.path().join("Simulations.2");
        std::fs::create_dir_all(computed.join("sys")).unwrap();
        std::fs::create_dir_all(reference.join("sys")).unwrap();
        (dir, ResultStore::new(computed, reference))
    }

    #[test]
    fn loads_both_documents() {
        let (_dir, store) = stores();
        let rel = Path::new("sys/apl.json");
        std::fs::write(store.computed_path(rel), r#"{"0.0": 0.64}"#).unwrap();
        std::fs::write(store.reference_path(rel), r#"{"0.0": 0.645}"#).unwrap();
        let pair = store.load_pair(rel).unwrap();
        assert_eq!(pair.computed, json!({"0.0": 0.64}));
        assert_eq!(pair.reference, json!({"0.0": 0.645}));
        assert_eq!(pair.relative, PathBuf::from("sys/apl.json"));
    }

    #[test]
    fn top_level_array_is_accepted() {
        let (_dir, store) = stores();
        let rel = Path::new("sys/FormFactor.json");
        std::fs::write(store.computed_path(rel), "[[0.0, 1.0], [0.1, 0.9]]").unwrap();
        assert_eq!(
            load_json(&store.computed_path(rel)).unwrap(),
            json!([[0.0, 1.0], [0.1, 0.9]])
        );
    }

    #[test]
    fn missing_computed_file() {
        let (_dir, store) = stores();
        let err = store.load_pair(Path::new("sys/apl.json")).unwrap_err();
        assert!(matches!(
            err,
            DatabankError::MissingArtifact { ref path }
                if path.ends_with("Simulations.1/sys/apl.json")
        ));
    }

    #[test]
    fn missing_reference_file() {
        let (_dir, store) = stores();
        let rel = Path::new("sys/apl.json");
        std::fs::write(store.computed_path(rel), "{}").unwrap();
        let err = store.load_pair(rel).unwrap_err();
        assert!(matches!(
            err,
            DatabankError::MissingArtifact { ref path }
                if path.ends_with("Simulations.2/sys/apl.json")
        ));
    }

    #[test]
    fn truncated_json_is_unreadable_not_missing() {
        let (_dir, store) = stores();
        let rel = Path::new("sys/apl.json");
        std::fs::write(store.computed_path(rel), r#"{"0.0": [0.64, "#).unwrap();
        std::fs::write(store.reference_path(rel), "{}").unwrap();
        let err = store.load_pair(rel).unwrap_err();
        assert!(matches!(err, DatabankError::UnreadableArtifact { .. }));
    }

    #[test]
    fn directory_in_place_of_file_is_unreadable() {
        let (_dir, store) = stores();
        let rel = Path::new("sys/apl.json");
        std::fs::create_dir_all(store.computed_path(rel)).unwrap();
        let err = load_json(&store.computed_path(rel)).unwrap_err();
        assert!(matches!(err, DatabankError::UnreadableArtifact { .. }));
    }
}
