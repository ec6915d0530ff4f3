//! Medication knowledge base.
//!
//! Medications are read once from `medications.json` and looked up by name, ignoring case.
//! Two file layouts are accepted: an array of records, or an object keyed by medication name
//! (where a record may omit its own `name`).

use crate::{CoreError, CoreResult};
use api_shared::Medication;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum MedicationFile {
    List(Vec<Medication>),
    Keyed(serde_json::Map<String, serde_json::Value>),
}

#[derive(Deserialize)]
struct KeyedRecord {
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    alternate_names: Vec<String>,
    #[serde(default)]
    mechanism_of_action: String,
}

/// In-memory medication store keyed by lowercased name.
#[derive(Clone, Debug, Default)]
pub struct MedicationStore {
    records: Vec<Medication>,
    by_name: HashMap<String, usize>,
}

impl MedicationStore {
    /// Build a store from records. A later record replaces an earlier one with the same
    /// name (ignoring case).
    pub fn from_records(records: impl IntoIterator<Item = Medication>) -> Self {
        let mut store = Self::default();
        for record in records {
            let key = record.name.to_lowercase();
            match store.by_name.get(&key) {
                Some(&idx) => store.records[idx] = record,
                None => {
                    store.by_name.insert(key, store.records.len());
                    store.records.push(record);
                }
            }
        }
        store
    }

    /// Load the store from a JSON file.
    ///
    /// A missing file is not an error: a warning is logged and the store is empty.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::FileRead` if the file exists but cannot be read, and
    /// `CoreError::Deserialization` if it is not a valid medication document.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            tracing::warn!("medication file not found: {}", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: MedicationFile =
            serde_json::from_str(&contents).map_err(|source| CoreError::Deserialization {
                path: path.to_path_buf(),
                source,
            })?;

        let records = match parsed {
            MedicationFile::List(records) => records,
            MedicationFile::Keyed(map) => {
                let mut records = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let record: KeyedRecord = serde_json::from_value(value).map_err(|source| {
                        CoreError::Deserialization {
                            path: path.to_path_buf(),
                            source,
                        }
                    })?;
                    records.push(Medication {
                        name: record.name.unwrap_or(key),
                        description: record.description,
                        alternate_names: record.alternate_names,
                        mechanism_of_action: record.mechanism_of_action,
                    });
                }
                records
            }
        };

        let store = Self::from_records(records);
        tracing::info!("loaded {} medications from {}", store.len(), path.display());
        Ok(store)
    }

    /// Look up a medication by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Medication> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&idx| &self.records[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Medication> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn med(name: &str, alternates: &[&str]) -> Medication {
        Medication {
            name: name.into(),
            description: format!("{name} description"),
            alternate_names: alternates.iter().map(|s| s.to_string()).collect(),
            mechanism_of_action: format!("{name} mechanism"),
        }
    }

    #[test]
    fn lookup_ignores_case_and_returns_stored_spelling() {
        let store = MedicationStore::from_records([med("Amiodarone", &["Pacerone"])]);
        let found = store.get("AMIODARONE").expect("should find by any case");
        assert_eq!(found.name, "Amiodarone");
        assert!(store.get("Pacerone").is_none());
    }

    #[test]
    fn later_duplicate_replaces_earlier() {
        let mut second = med("aspirin", &[]);
        second.description = "second".into();
        let store = MedicationStore::from_records([med("Aspirin", &[]), second]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("Aspirin").unwrap().description, "second");
    }

    #[test]
    fn missing_file_yields_empty_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = MedicationStore::load(&temp_dir.path().join("medications.json"))
            .expect("missing file is tolerated");
        assert!(store.is_empty());
    }

    #[test]
    fn loads_array_layout() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("medications.json");
        fs::write(
            &path,
            r#"[{"name":"Metoprolol","description":"beta blocker","alternate_names":["Lopressor"],"mechanism_of_action":"beta-1 antagonist"}]"#,
        )
        .unwrap();

        let store = MedicationStore::load(&path).expect("should load");
        let metoprolol = store.get("metoprolol").unwrap();
        assert_eq!(metoprolol.alternate_names, vec!["Lopressor".to_string()]);
        assert_eq!(metoprolol.mechanism_of_action, "beta-1 antagonist");
    }

    #[test]
    fn loads_keyed_layout_using_key_as_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("medications.json");
        fs::write(
            &path,
            r#"{"Lisinopril":{"description":"ACE inhibitor","mechanism_of_action":"blocks ACE"}}"#,
        )
        .unwrap();

        let store = MedicationStore::load(&path).expect("should load");
        let found = store.get("lisinopril").unwrap();
        assert_eq!(found.name, "Lisinopril");
        assert!(found.alternate_names.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("medications.json");
        fs::write(&path, "not json").unwrap();

        let err = MedicationStore::load(&path).expect_err("should fail");
        assert!(matches!(err, CoreError::Deserialization { .. }));
    }
}
