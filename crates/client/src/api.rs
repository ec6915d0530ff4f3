//! Fetch layer over the MedRef REST endpoints.
//!
//! Every call decodes the JSON body on success. A non-success status becomes
//! [`FetchError::Status`] carrying the server's `error` message when the body has one.

use crate::error::{FetchError, FetchResult};
use api_shared::{
    ErrorRes, HealthRes, HpiReq, HpiRes, Medication, PreferenceSet, ProviderSummary,
    SuggestionPair,
};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

/// Async client for one MedRef server.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base: Url,
    http: Client,
}

impl ApiClient {
    /// Creates a client for the server at `base_url`, e.g. `http://127.0.0.1:3000`.
    ///
    /// # Errors
    /// Returns [`FetchError::Network`] if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> FetchResult<Self> {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, http: Client) -> FetchResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| FetchError::Network(format!("invalid server url {base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::Network(format!(
                "invalid server url {base_url}: not a base url"
            )));
        }
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn health(&self) -> FetchResult<HealthRes> {
        self.get_json(&["health"], None).await
    }

    /// `GET /providers`, in server order.
    pub async fn providers(&self) -> FetchResult<Vec<ProviderSummary>> {
        self.get_json(&["providers"], None).await
    }

    /// `GET /provider/:id`
    pub async fn provider_preferences(&self, id: &str) -> FetchResult<PreferenceSet> {
        self.get_json(&["provider", id], None).await
    }

    /// `GET /medication/:name`, with the name percent-encoded as one path segment.
    pub async fn medication(&self, name: &str) -> FetchResult<Medication> {
        self.get_json(&["medication", name], None).await
    }

    /// `GET /suggestions?q=`
    pub async fn suggestions(&self, query: &str) -> FetchResult<Vec<SuggestionPair>> {
        self.get_json(&["suggestions"], Some(query)).await
    }

    /// `POST /generate-hpi`
    pub async fn generate_hpi(&self, req: &HpiReq) -> FetchResult<HpiRes> {
        let url = self.url(&["generate-hpi"])?;
        tracing::debug!("POST {}", url);
        let response = self.http.post(url).json(req).send().await?;
        decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: Option<&str>,
    ) -> FetchResult<T> {
        let url = self.url(segments)?;
        tracing::debug!("GET {}", url);
        let mut request = self.http.get(url);
        if let Some(q) = query {
            request = request.query(&[("q", q)]);
        }
        let response = request.send().await?;
        decode(response).await
    }

    fn url(&self, segments: &[&str]) -> FetchResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Network(format!("invalid server url {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> FetchResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.bytes().await.unwrap_or_default();
    let error = serde_json::from_slice::<ErrorRes>(&body)
        .ok()
        .map(|e| e.error);
    Err(FetchError::Status {
        status: status.as_u16(),
        error,
    })
}
