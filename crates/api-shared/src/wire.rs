//! JSON wire types for the MedRef HTTP endpoints.
//!
//! Field names follow the JSON the page scripts already speak: snake_case for medication and
//! preference records, camelCase for the HPI request form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Response body of `GET /health`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error body returned by every failing endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Provider in list form, as returned by `GET /providers`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProviderSummary {
    pub id: String,
    pub name: String,
}

impl ProviderSummary {
    /// First whitespace-separated word of the name, lowercased. Used for list ordering.
    pub fn first_name_key(&self) -> String {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// A provider's documentation preferences.
///
/// Maps a category key (`note_pref`, `hpi_elements`, ...) to either a string or a list of
/// strings. Key order is the order of the source document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PreferenceSet(#[schema(value_type = Object)] pub Map<String, Value>);

impl PreferenceSet {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, category: &str) -> Option<&Value> {
        self.0.get(category)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.contains_key(category)
    }

    /// Categories in document order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, category: impl Into<String>, value: Value) {
        self.0.insert(category.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Medication record, as returned by `GET /medication/{name}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Medication {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub alternate_names: Vec<String>,
    #[serde(default)]
    pub mechanism_of_action: String,
}

/// One autocomplete entry: `[canonical_name, matched_name]`.
///
/// `matched_name` is the medication name itself or the alternate name that matched the query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionPair(pub String, pub String);

impl SuggestionPair {
    pub fn canonical(&self) -> &str {
        &self.0
    }

    pub fn matched(&self) -> &str {
        &self.1
    }
}

/// Request body of `POST /generate-hpi`.
///
/// Every field is optional on the wire; presence rules are enforced by the form before
/// submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct HpiReq {
    pub gender: String,
    pub past_medical_history: String,
    pub chief_complaint: String,
    pub onset_timing: String,
    pub accompanied_by: String,
    pub additional_symptoms: String,
    /// Free-text narrative context.
    pub other_notes: String,
    pub pertinent_negatives: String,
    pub current_medications: String,
}

/// Response body of `POST /generate-hpi`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HpiRes {
    pub generated_hpi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_prompt: Option<String>,
}
