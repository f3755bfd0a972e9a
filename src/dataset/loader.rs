//! Single-attempt JSON loading with fallback substitution

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::HarmonyError;

/// Where a dataset came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DataStatus {
    /// Read from the requested file
    Loaded,
    /// The file could not be used; a fallback was substituted
    Fallback { reason: String },
}

impl DataStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, DataStatus::Fallback { .. })
    }
}

/// A dataset together with its load status
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub data: T,
    pub status: DataStatus,
}

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, HarmonyError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Read a JSON file once, substituting `fallback()` on any failure.
///
/// `what` names the dataset in log output.
pub fn load_or_fallback<T, F>(path: &Path, what: &str, fallback: F) -> Loaded<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match read_json(path) {
        Ok(data) => {
            debug!(dataset = what, path = %path.display(), "dataset loaded");
            Loaded {
                data,
                status: DataStatus::Loaded,
            }
        }
        Err(e) => {
            warn!(
                dataset = what,
                path = %path.display(),
                error = %e,
                "dataset unavailable, using fallback"
            );
            Loaded {
                data: fallback(),
                status: DataStatus::Fallback {
                    reason: e.to_string(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_loads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": 1, "b": 2}}"#).unwrap();

        let loaded: Loaded<HashMap<String, u32>> =
            load_or_fallback(file.path(), "test", HashMap::new);
        assert_eq!(loaded.status, DataStatus::Loaded);
        assert_eq!(loaded.data.get("b"), Some(&2));
    }

    #[test]
    fn test_missing_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Loaded<Vec<u32>> =
            load_or_fallback(&dir.path().join("absent.json"), "test", || vec![7]);
        assert!(loaded.status.is_degraded());
        assert_eq!(loaded.data, vec![7]);
    }

    #[test]
    fn test_malformed_file_uses_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let loaded: Loaded<Vec<u32>> = load_or_fallback(file.path(), "test", Vec::new);
        match loaded.status {
            DataStatus::Fallback { reason } => assert!(reason.contains("JSON")),
            DataStatus::Loaded => panic!("malformed file must not load"),
        }
    }

    #[test]
    fn test_read_json_propagates_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Vec<u32>, _> = read_json(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(HarmonyError::Io(_))));
    }
}
