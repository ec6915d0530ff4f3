//! Reference data service.
//!
//! Bundles the medication store, its suggestion index and the provider store behind one
//! cheaply cloneable handle, loaded once from the configured data directory.

use crate::config::CoreConfig;
use crate::medications::MedicationStore;
use crate::providers::ProviderStore;
use crate::suggestions::SuggestionIndex;
use crate::CoreResult;
use api_shared::{Medication, PreferenceSet, ProviderSummary, SuggestionPair};
use std::sync::Arc;

/// Read-only lookups over medications and provider preferences - no API concerns.
#[derive(Clone, Debug)]
pub struct ReferenceService {
    medications: Arc<MedicationStore>,
    suggestions: Arc<SuggestionIndex>,
    providers: Arc<ProviderStore>,
}

impl ReferenceService {
    /// Creates a service from already-built stores.
    pub fn new(medications: MedicationStore, providers: ProviderStore, fuzzy_limit: usize) -> Self {
        let suggestions = SuggestionIndex::build(&medications, fuzzy_limit);
        Self {
            medications: Arc::new(medications),
            suggestions: Arc::new(suggestions),
            providers: Arc::new(providers),
        }
    }

    /// Loads both data files from the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` if a data file exists but cannot be read or parsed. Missing files
    /// produce empty stores.
    pub fn load(cfg: &CoreConfig) -> CoreResult<Self> {
        let medications = MedicationStore::load(&cfg.medications_path())?;
        let providers = ProviderStore::load(&cfg.providers_path())?;
        Ok(Self::new(medications, providers, cfg.fuzzy_limit()))
    }

    pub fn medication(&self, name: &str) -> Option<&Medication> {
        self.medications.get(name)
    }

    pub fn suggestions(&self, query: &str) -> Vec<SuggestionPair> {
        self.suggestions.suggest(query)
    }

    pub fn providers(&self) -> Vec<ProviderSummary> {
        self.providers.list()
    }

    pub fn provider_preferences(&self, id: &str) -> Option<&PreferenceSet> {
        self.providers.preferences(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HpiEngineConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_reads_both_files_from_data_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(
            temp_dir.path().join("medications.json"),
            r#"[{"name":"Ondansetron","alternate_names":["Zofran"],"mechanism_of_action":"5-HT3 antagonist"}]"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("providers.json"),
            r#"[{"id":"a1","name":"Ada Park","preferences":{"speed":"fast"}}]"#,
        )
        .unwrap();

        let cfg = CoreConfig::new(
            temp_dir.path().to_path_buf(),
            5,
            HpiEngineConfig::Template,
            false,
        )
        .unwrap();
        let service = ReferenceService::load(&cfg).expect("should load");

        assert_eq!(service.medication("ondansetron").unwrap().name, "Ondansetron");
        assert_eq!(
            service.suggestions("zof"),
            vec![SuggestionPair("Ondansetron".into(), "Zofran".into())]
        );
        assert_eq!(service.providers().len(), 1);
        assert!(service.provider_preferences("a1").unwrap().contains("speed"));
    }

    #[test]
    fn empty_data_dir_gives_empty_service() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::new(
            temp_dir.path().to_path_buf(),
            5,
            HpiEngineConfig::Template,
            false,
        )
        .unwrap();
        let service = ReferenceService::load(&cfg).unwrap();
        assert!(service.providers().is_empty());
        assert!(service.medication("anything").is_none());
    }
}
