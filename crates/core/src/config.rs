//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables. The `*_from_env_value`
//! helpers take the raw `Option<String>` so they can be tested without touching the
//! environment.

use crate::constants::{
    DEFAULT_FUZZY_LIMIT, DEFAULT_HPI_MODEL, DEFAULT_HPI_TIMEOUT_SECS, MEDICATIONS_FILENAME,
    PROVIDERS_FILENAME,
};
use crate::{CoreError, CoreResult};
use medref_types::NonEmptyText;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How `/generate-hpi` produces its text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HpiEngineConfig {
    /// Deterministic draft assembled from the form fields.
    Template,
    /// Pass-through to an OpenAI-compatible chat-completion endpoint.
    Remote {
        endpoint: String,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
    },
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    fuzzy_limit: usize,
    hpi_engine: HpiEngineConfig,
    hpi_debug_prompt: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if `data_dir` is not an existing directory.
    pub fn new(
        data_dir: PathBuf,
        fuzzy_limit: usize,
        hpi_engine: HpiEngineConfig,
        hpi_debug_prompt: bool,
    ) -> CoreResult<Self> {
        if !data_dir.is_dir() {
            return Err(CoreError::InvalidInput(format!(
                "data directory does not exist: {}",
                data_dir.display()
            )));
        }

        Ok(Self {
            data_dir,
            fuzzy_limit,
            hpi_engine,
            hpi_debug_prompt,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn medications_path(&self) -> PathBuf {
        self.data_dir.join(MEDICATIONS_FILENAME)
    }

    pub fn providers_path(&self) -> PathBuf {
        self.data_dir.join(PROVIDERS_FILENAME)
    }

    pub fn fuzzy_limit(&self) -> usize {
        self.fuzzy_limit
    }

    pub fn hpi_engine(&self) -> &HpiEngineConfig {
        &self.hpi_engine
    }

    pub fn hpi_debug_prompt(&self) -> bool {
        self.hpi_debug_prompt
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .and_then(NonEmptyText::optional)
        .map(NonEmptyText::into_inner)
}

/// Parse the fuzzy suggestion limit. Missing or blank means the default.
pub fn fuzzy_limit_from_env_value(value: Option<String>) -> CoreResult<usize> {
    match non_blank(value) {
        None => Ok(DEFAULT_FUZZY_LIMIT),
        Some(v) => v
            .parse::<usize>()
            .map_err(|_| CoreError::InvalidInput(format!("invalid fuzzy limit: {v}"))),
    }
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`/`yes`/`no`). Missing means `false`.
pub fn flag_from_env_value(value: Option<String>) -> CoreResult<bool> {
    match non_blank(value).map(|v| v.to_ascii_lowercase()).as_deref() {
        None => Ok(false),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(CoreError::InvalidInput(format!("invalid flag: {other}"))),
    }
}

/// Resolve the HPI engine from its environment values.
///
/// `engine` selects `template` (default) or `remote`. The remote engine requires an endpoint;
/// model and timeout fall back to defaults.
pub fn hpi_engine_from_env_values(
    engine: Option<String>,
    endpoint: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<String>,
) -> CoreResult<HpiEngineConfig> {
    let engine = non_blank(engine).map(|e| e.to_ascii_lowercase());
    match engine.as_deref() {
        None | Some("template") => Ok(HpiEngineConfig::Template),
        Some("remote") => {
            let endpoint = non_blank(endpoint).ok_or_else(|| {
                CoreError::InvalidInput("remote HPI engine requires an endpoint".into())
            })?;
            let timeout_secs = match non_blank(timeout_secs) {
                None => DEFAULT_HPI_TIMEOUT_SECS,
                Some(v) => v
                    .parse::<u64>()
                    .map_err(|_| CoreError::InvalidInput(format!("invalid HPI timeout: {v}")))?,
            };
            Ok(HpiEngineConfig::Remote {
                endpoint,
                model: non_blank(model).unwrap_or_else(|| DEFAULT_HPI_MODEL.into()),
                api_key: non_blank(api_key),
                timeout: Duration::from_secs(timeout_secs),
            })
        }
        Some(other) => Err(CoreError::InvalidInput(format!(
            "unknown HPI engine: {other} (expected template or remote)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rejects_missing_data_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("nope");
        let err = CoreConfig::new(missing, 5, HpiEngineConfig::Template, false)
            .expect_err("missing directory should be rejected");
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn data_file_paths_live_in_data_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::new(
            temp_dir.path().to_path_buf(),
            5,
            HpiEngineConfig::Template,
            false,
        )
        .unwrap();
        assert_eq!(
            cfg.medications_path(),
            temp_dir.path().join("medications.json")
        );
        assert_eq!(cfg.providers_path(), temp_dir.path().join("providers.json"));
    }

    #[test]
    fn fuzzy_limit_defaults_and_parses() {
        assert_eq!(fuzzy_limit_from_env_value(None).unwrap(), 5);
        assert_eq!(fuzzy_limit_from_env_value(Some(" ".into())).unwrap(), 5);
        assert_eq!(fuzzy_limit_from_env_value(Some("8".into())).unwrap(), 8);
        assert!(fuzzy_limit_from_env_value(Some("many".into())).is_err());
    }

    #[test]
    fn flags_parse_common_spellings() {
        assert!(!flag_from_env_value(None).unwrap());
        assert!(flag_from_env_value(Some("TRUE".into())).unwrap());
        assert!(!flag_from_env_value(Some("0".into())).unwrap());
        assert!(flag_from_env_value(Some("maybe".into())).is_err());
    }

    #[test]
    fn template_engine_is_default() {
        let engine = hpi_engine_from_env_values(None, None, None, None, None).unwrap();
        assert_eq!(engine, HpiEngineConfig::Template);
    }

    #[test]
    fn remote_engine_requires_endpoint() {
        let err = hpi_engine_from_env_values(Some("remote".into()), None, None, None, None)
            .expect_err("endpoint is required");
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn remote_engine_fills_defaults() {
        let engine = hpi_engine_from_env_values(
            Some("Remote".into()),
            Some("http://localhost:9000/v1/chat/completions".into()),
            None,
            Some("".into()),
            None,
        )
        .unwrap();
        assert_eq!(
            engine,
            HpiEngineConfig::Remote {
                endpoint: "http://localhost:9000/v1/chat/completions".into(),
                model: "gpt-3.5-turbo".into(),
                api_key: None,
                timeout: Duration::from_secs(30),
            }
        );
    }

    #[test]
    fn unknown_engine_is_rejected() {
        assert!(hpi_engine_from_env_values(Some("magic".into()), None, None, None, None).is_err());
    }
}
