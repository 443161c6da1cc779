//! Reference location client trait and HTTP implementation.

use std::future::Future;
use std::time::Duration;

use super::error::ReferenceDataError;
use super::model::ReferenceCollection;

/// Default reference endpoint.
pub const DEFAULT_REFERENCE_URL: &str = "http://localhost:4567/locations";

/// Default HTTP timeout for the reference request.
pub const DEFAULT_REFERENCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of reference locations.
pub trait ReferenceClient: Send + Sync {
    /// Fetch the full location collection.
    fn fetch_locations(
        &self,
    ) -> impl Future<Output = Result<ReferenceCollection, ReferenceDataError>> + Send;
}

/// Reference client using a plain HTTP GET.
pub struct HttpReferenceClient {
    http: reqwest::Client,
    url: String,
}

impl HttpReferenceClient {
    /// Create a client for `url` with a request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ReferenceDataError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReferenceDataError::HttpError(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Endpoint this client fetches from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReferenceClient for HttpReferenceClient {
    async fn fetch_locations(&self) -> Result<ReferenceCollection, ReferenceDataError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ReferenceDataError::HttpError(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ReferenceDataError::HttpError(e.to_string()))?;

        if !status.is_success() {
            return Err(ReferenceDataError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let raw: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| ReferenceDataError::JsonError(e.to_string()))?;
        let collection = ReferenceCollection::from_geojson(&raw)?;

        tracing::debug!(
            url = %self.url,
            locations = collection.len(),
            "Reference locations fetched"
        );

        Ok(collection)
    }
}
