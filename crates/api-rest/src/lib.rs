//! # API REST
//!
//! REST API implementation for MedRef.
//!
//! Handles:
//! - JSON endpoints with axum (`/providers`, `/provider/:id`, `/medication/:name`,
//!   `/suggestions`, `/generate-hpi`, `/health`)
//! - OpenAPI/Swagger documentation
//! - Static page assets, falling through to `index.html` for any unmatched route
//!
//! Uses `medref-core` for data and `api-shared` for wire types.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use medref_core::config::{
    flag_from_env_value, fuzzy_limit_from_env_value, hpi_engine_from_env_values,
};
use medref_core::{CoreConfig, HpiService, ReferenceService, DEFAULT_DATA_DIR};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;
pub use routes::ApiDoc;

/// Default listen address for the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default directory holding `index.html` and the page assets.
pub const DEFAULT_WEB_ROOT: &str = "web";

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub reference: ReferenceService,
    pub hpi: HpiService,
}

impl AppState {
    /// Load reference data and build the HPI engine from configuration.
    pub fn from_config(cfg: &CoreConfig) -> anyhow::Result<Self> {
        Ok(Self {
            reference: ReferenceService::load(cfg)?,
            hpi: HpiService::from_config(cfg)?,
        })
    }
}

/// Server settings resolved once at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
    pub web_root: PathBuf,
    pub core: Arc<CoreConfig>,
}

impl ServerConfig {
    /// Resolve settings from the process environment.
    ///
    /// # Environment Variables
    /// - `MEDREF_REST_ADDR`: listen address (default: "0.0.0.0:3000")
    /// - `MEDREF_WEB_ROOT`: static asset directory (default: "web")
    /// - `MEDREF_DATA_DIR`: directory with `medications.json` / `providers.json` (default: ".")
    /// - `MEDREF_FUZZY_LIMIT`: maximum fuzzy-only suggestions (default: 5)
    /// - `MEDREF_HPI_ENGINE`: `template` or `remote` (default: "template")
    /// - `MEDREF_HPI_ENDPOINT`, `MEDREF_HPI_MODEL`, `MEDREF_HPI_API_KEY`,
    ///   `MEDREF_HPI_TIMEOUT_SECS`: remote engine settings
    /// - `MEDREF_HPI_DEBUG_PROMPT`: include the prompt in `/generate-hpi` responses
    ///
    /// # Errors
    /// Returns an error if any value fails to parse or the data directory does not exist.
    pub fn from_env() -> anyhow::Result<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let addr = env("MEDREF_REST_ADDR").unwrap_or_else(|| DEFAULT_REST_ADDR.into());
        let web_root = PathBuf::from(env("MEDREF_WEB_ROOT").unwrap_or_else(|| DEFAULT_WEB_ROOT.into()));
        let data_dir = PathBuf::from(env("MEDREF_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.into()));

        let hpi_engine = hpi_engine_from_env_values(
            env("MEDREF_HPI_ENGINE"),
            env("MEDREF_HPI_ENDPOINT"),
            env("MEDREF_HPI_MODEL"),
            env("MEDREF_HPI_API_KEY"),
            env("MEDREF_HPI_TIMEOUT_SECS"),
        )?;

        let core = CoreConfig::new(
            data_dir,
            fuzzy_limit_from_env_value(env("MEDREF_FUZZY_LIMIT"))?,
            hpi_engine,
            flag_from_env_value(env("MEDREF_HPI_DEBUG_PROMPT"))?,
        )?;

        Ok(Self {
            addr,
            web_root,
            core: Arc::new(core),
        })
    }
}

/// Build the full application router.
///
/// API routes take precedence; everything else is served from `web_root`, with `index.html`
/// answering any path that does not name an existing file.
pub fn router(state: AppState, web_root: impl Into<PathBuf>) -> Router {
    let web_root = web_root.into();
    let index = ServeFile::new(web_root.join("index.html"));
    let assets = ServeDir::new(&web_root).fallback(index);

    Router::new()
        .route("/health", get(routes::health))
        .route("/providers", get(routes::list_providers))
        .route("/provider/:id", get(routes::provider_preferences))
        .route("/medication/:name", get(routes::medication_details))
        .route("/suggestions", get(routes::suggestions))
        .route("/generate-hpi", post(routes::generate_hpi))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(assets)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Load data, bind and serve until the listener fails.
///
/// # Errors
/// Returns an error if reference data cannot be loaded, the address cannot be bound, or the
/// HTTP server fails while running.
pub async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
    serve_with_shutdown(cfg, std::future::pending()).await
}

/// Like [`serve`], stopping gracefully once `shutdown` resolves.
pub async fn serve_with_shutdown(
    cfg: ServerConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = AppState::from_config(&cfg.core)?;
    if !cfg.web_root.join("index.html").is_file() {
        tracing::warn!("no index.html under {}", cfg.web_root.display());
    }

    let app = router(state, cfg.web_root);
    let listener = tokio::net::TcpListener::bind(&cfg.addr).await?;
    tracing::info!("-- MedRef REST listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::{Medication, ProviderSummary, SuggestionPair};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use medref_core::{
        HpiEngine, MedicationStore, ProviderStore, StoredProvider,
    };
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn medications() -> Vec<Medication> {
        vec![
            Medication {
                name: "Amiodarone".into(),
                description: "Class III antiarrhythmic".into(),
                alternate_names: vec!["Pacerone".into(), "Cordarone".into()],
                mechanism_of_action: "Blocks potassium channels".into(),
            },
            Medication {
                name: "Ketamine".into(),
                description: "Dissociative anesthetic".into(),
                alternate_names: vec!["Ketalar".into()],
                mechanism_of_action: "NMDA antagonist".into(),
            },
            Medication {
                name: "Famotidine".into(),
                description: "H2 blocker".into(),
                alternate_names: vec!["Pepcid".into()],
                mechanism_of_action: "H2 receptor antagonist".into(),
            },
        ]
    }

    fn test_state() -> AppState {
        let providers: Vec<StoredProvider> = serde_json::from_str(
            r#"[{"id":"p1","name":"Maria Lopez","preferences":{"note_pref":"Concise","mdm":["Reassess pain"]}}]"#,
        )
        .unwrap();
        AppState {
            reference: ReferenceService::new(
                MedicationStore::from_records(medications()),
                ProviderStore::from_providers(providers),
                5,
            ),
            hpi: HpiService::new(HpiEngine::Template, false),
        }
    }

    fn web_root() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("index.html"), "<html>medref</html>").unwrap();
        fs::write(dir.path().join("style.css"), "body{}").unwrap();
        dir
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        (status, body_bytes(response).await)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        (status, body_bytes(response).await)
    }

    #[tokio::test]
    async fn every_stored_medication_is_returned_exactly() {
        let root = web_root();
        for med in medications() {
            let app = router(test_state(), root.path());
            let (status, body) = get(app, &format!("/medication/{}", med.name)).await;
            assert_eq!(status, StatusCode::OK);
            let returned: Medication = serde_json::from_slice(&body).unwrap();
            assert_eq!(returned, med);
        }
    }

    #[tokio::test]
    async fn medication_lookup_decodes_path_and_ignores_case() {
        let root = web_root();
        let app = router(test_state(), root.path());
        let (status, body) = get(app, "/medication/FAMOTIDINE").await;
        assert_eq!(status, StatusCode::OK);
        let returned: Medication = serde_json::from_slice(&body).unwrap();
        assert_eq!(returned.name, "Famotidine");
    }

    #[tokio::test]
    async fn absent_medication_is_404_with_error_field() {
        let root = web_root();
        let app = router(test_state(), root.path());
        let (status, body) = get(app, "/medication/Unobtainium").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err["error"], "Medication not found");
    }

    #[tokio::test]
    async fn suggestions_return_pairs_containing_query() {
        let root = web_root();
        let app = router(test_state(), root.path());
        let (status, body) = get(app, "/suggestions?q=ami").await;
        assert_eq!(status, StatusCode::OK);
        let pairs: Vec<SuggestionPair> = serde_json::from_slice(&body).unwrap();

        let containing: Vec<&SuggestionPair> = pairs
            .iter()
            .filter(|p| p.matched().to_lowercase().contains("ami"))
            .collect();
        let names: Vec<&str> = containing.iter().map(|p| p.canonical()).collect();
        assert_eq!(names, vec!["Amiodarone", "Ketamine"]);
    }

    #[tokio::test]
    async fn suggestions_without_query_are_empty() {
        let root = web_root();
        let app = router(test_state(), root.path());
        let (status, body) = get(app, "/suggestions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn providers_list_and_preferences() {
        let root = web_root();
        let (status, body) = get(router(test_state(), root.path()), "/providers").await;
        assert_eq!(status, StatusCode::OK);
        let providers: Vec<ProviderSummary> = serde_json::from_slice(&body).unwrap();
        assert_eq!(providers[0].name, "Maria Lopez");

        let (status, body) = get(router(test_state(), root.path()), "/provider/p1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"note_pref":"Concise","mdm":["Reassess pain"]}"#
        );

        let (status, body) = get(router(test_state(), root.path()), "/provider/zz").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err["error"], "Provider not found");
    }

    #[tokio::test]
    async fn generate_hpi_returns_draft() {
        let root = web_root();
        let app = router(test_state(), root.path());
        let (status, body) = post_json(
            app,
            "/generate-hpi",
            r#"{"gender":"male","chiefComplaint":"chest pain","otherNotes":"started at rest"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let text = res["generated_hpi"].as_str().unwrap();
        assert!(text.contains("complaining of chest pain"));
        assert!(res.get("debug_prompt").is_none());
    }

    #[tokio::test]
    async fn generate_hpi_rejects_empty_input() {
        let root = web_root();
        for body in ["{}", "", "null", "not json"] {
            let app = router(test_state(), root.path());
            let (status, bytes) = post_json(app, "/generate-hpi", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
            let err: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(err["error"], "No input data provided");
        }
    }

    #[tokio::test]
    async fn unknown_routes_fall_back_to_index() {
        let root = web_root();
        let (status, body) = get(router(test_state(), root.path()), "/some/client/route").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<html>medref</html>");

        let (status, body) = get(router(test_state(), root.path()), "/style.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"body{}");

        let (status, body) = get(router(test_state(), root.path()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<html>medref</html>");
    }

    #[tokio::test]
    async fn openapi_document_lists_endpoints() {
        let root = web_root();
        let (status, body) = get(router(test_state(), root.path()), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"].get("/suggestions").is_some());
        assert!(doc["paths"].get("/provider/{id}").is_some());
    }
}
