//! # MedRef Core
//!
//! Core data operations for the MedRef clinical reference service:
//! - Medication knowledge base and autocomplete suggestions
//! - Provider preference lookup
//! - HPI prompt construction and draft generation
//! - Startup configuration
//!
//! **No API concerns**: HTTP servers, routing and response shaping belong in `api-rest`;
//! wire types shared with clients live in `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod hpi;
pub mod medications;
pub mod providers;
pub mod reference;
pub mod suggestions;

pub use config::{CoreConfig, HpiEngineConfig};
pub use constants::*;
pub use error::{CoreError, CoreResult};
pub use hpi::{HpiEngine, HpiPrompt, HpiService};
pub use medications::MedicationStore;
pub use providers::{ProviderStore, StoredProvider};
pub use reference::ReferenceService;
pub use suggestions::SuggestionIndex;

pub use medref_types::{NonEmptyText, TextError};
