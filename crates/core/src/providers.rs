//! Provider preference store.
//!
//! `providers.json` is an array of `{ id, name, preferences }`. Ids may be written as strings
//! or numbers; they are normalised to strings since they arrive as URL path segments.

use crate::{CoreError, CoreResult};
use api_shared::{PreferenceSet, ProviderSummary};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// One provider as stored on disk.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StoredProvider {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub preferences: PreferenceSet,
}

#[derive(Clone, Debug, Default)]
pub struct ProviderStore {
    providers: Vec<StoredProvider>,
    by_id: HashMap<String, usize>,
}

impl ProviderStore {
    pub fn from_providers(providers: Vec<StoredProvider>) -> Self {
        let by_id = providers
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id.clone(), idx))
            .collect();
        Self { providers, by_id }
    }

    /// Load the store from a JSON file. A missing file logs a warning and yields an empty store.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            tracing::warn!("provider file not found: {}", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let providers: Vec<StoredProvider> =
            serde_json::from_str(&contents).map_err(|source| CoreError::Deserialization {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!("loaded {} providers from {}", providers.len(), path.display());
        Ok(Self::from_providers(providers))
    }

    /// All providers in list form, in file order.
    pub fn list(&self) -> Vec<ProviderSummary> {
        self.providers
            .iter()
            .map(|p| ProviderSummary {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect()
    }

    pub fn preferences(&self, id: &str) -> Option<&PreferenceSet> {
        self.by_id
            .get(id)
            .map(|&idx| &self.providers[idx].preferences)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"[
        {"id": "dr-lee", "name": "Anna Lee", "preferences": {"note_pref": "Brief", "mdm": ["Document reassessment"]}},
        {"id": 7, "name": "Bo Chen", "preferences": {}}
    ]"#;

    #[test]
    fn loads_and_normalises_numeric_ids() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("providers.json");
        fs::write(&path, SAMPLE).unwrap();

        let store = ProviderStore::load(&path).expect("should load");
        let ids: Vec<String> = store.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["dr-lee".to_string(), "7".to_string()]);
        assert!(store.preferences("7").unwrap().is_empty());
    }

    #[test]
    fn preferences_keep_their_values() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("providers.json");
        fs::write(&path, SAMPLE).unwrap();

        let store = ProviderStore::load(&path).unwrap();
        let prefs = store.preferences("dr-lee").unwrap();
        assert_eq!(prefs.get("note_pref"), Some(&serde_json::json!("Brief")));
        assert_eq!(
            prefs.get("mdm"),
            Some(&serde_json::json!(["Document reassessment"]))
        );
    }

    #[test]
    fn unknown_provider_has_no_preferences() {
        let store = ProviderStore::default();
        assert!(store.preferences("missing").is_none());
    }

    #[test]
    fn missing_file_yields_empty_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = ProviderStore::load(&temp_dir.path().join("providers.json")).unwrap();
        assert!(store.is_empty());
    }
}
