//! DaData suggestions API binding.
//!
//! Both operations POST JSON to the suggestions API and read back a
//! `{"suggestions": [...]}` document. Each suggestion is normalised into an
//! [`Address`]: the city falls back to the settlement name when DaData has no
//! city for the location, and any missing field becomes the empty string.

use crate::GeoProvider;
use async_trait::async_trait;
use locus_core::{env_parse, env_var, Address, ProviderError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "dadata";
const DEFAULT_BASE_URL: &str = "https://suggestions.dadata.ru";
const SUGGEST_PATH: &str = "/suggestions/api/4_1/rs/suggest/address";
const GEOLOCATE_PATH: &str = "/suggestions/api/4_1/rs/geolocate/address";
/// Upper bound on how much of an error body ends up in an error message.
const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Credentials and endpoint for the DaData API.
#[derive(Clone)]
pub struct DadataConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub secret_key: SecretString,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for DadataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DadataConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl DadataConfig {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: SecretString::new(Into::<String>::into(api_key).into_boxed_str()),
            secret_key: SecretString::new(Into::<String>::into(secret_key).into_boxed_str()),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DADATA_API_KEY`: API token
    /// - `DADATA_SECRET_KEY`: secret key
    /// - `DADATA_BASE_URL`: API root (default: `https://suggestions.dadata.ru`)
    /// - `DADATA_TIMEOUT_SECS`: per-request timeout (default: 10)
    pub fn from_env() -> Self {
        let config = Self::new(
            env_var("DADATA_API_KEY").unwrap_or_default(),
            env_var("DADATA_SECRET_KEY").unwrap_or_default(),
        )
        .with_base_url(env_var("DADATA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
        .with_timeout(Duration::from_secs(
            env_parse("DADATA_TIMEOUT_SECS").unwrap_or(10),
        ));

        if !config.has_credentials() {
            tracing::warn!("DADATA_API_KEY or DADATA_SECRET_KEY is not set; provider calls will be rejected");
        }
        config
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.secret_key.expose_secret().is_empty()
    }
}

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct SuggestRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Serialize)]
struct GeolocateRequest {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct SuggestionsResponse {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    #[serde(default)]
    data: SuggestionData,
}

#[derive(Debug, Default, Deserialize)]
struct SuggestionData {
    city: Option<String>,
    settlement: Option<String>,
    street: Option<String>,
    house: Option<String>,
    geo_lat: Option<String>,
    geo_lon: Option<String>,
}

impl From<SuggestionData> for Address {
    fn from(data: SuggestionData) -> Self {
        let city = data
            .city
            .filter(|city| !city.is_empty())
            .or(data.settlement)
            .unwrap_or_default();

        Address {
            city,
            street: data.street.unwrap_or_default(),
            house: data.house.unwrap_or_default(),
            lat: data.geo_lat.unwrap_or_default(),
            lon: data.geo_lon.unwrap_or_default(),
        }
    }
}

// ============================================================================
// PROVIDER
// ============================================================================

/// DaData-backed [`GeoProvider`].
#[derive(Debug, Clone)]
pub struct DadataProvider {
    http_client: reqwest::Client,
    config: DadataConfig,
}

impl DadataProvider {
    pub fn new(config: DadataConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Transport {
                provider: PROVIDER.to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            http_client,
            config,
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<Address>, ProviderError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);

        let response = self
            .http_client
            .post(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", self.config.api_key.expose_secret()),
            )
            .header("X-Secret", self.config.secret_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // Keep the request URL out of logs and messages.
                let e = e.without_url();
                tracing::warn!(path, error = %e, "DaData request failed");
                ProviderError::Transport {
                    provider: PROVIDER.to_string(),
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(ProviderError::Status {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SuggestionsResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    reason: e.without_url().to_string(),
                })?;

        Ok(parsed
            .suggestions
            .into_iter()
            .map(|s| Address::from(s.data))
            .collect())
    }
}

fn parse_coordinate(name: &str, value: &str) -> Result<f64, ProviderError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProviderError::InvalidRequest {
            reason: format!("{} is not a decimal number: {:?}", name, value),
        })
}

#[async_trait]
impl GeoProvider for DadataProvider {
    async fn address_search(&self, query: &str) -> Result<Vec<Address>, ProviderError> {
        let addresses = self.post(SUGGEST_PATH, &SuggestRequest { query }).await?;
        tracing::debug!(count = addresses.len(), "DaData address search completed");
        Ok(addresses)
    }

    async fn geocode(&self, lat: &str, lon: &str) -> Result<Vec<Address>, ProviderError> {
        let request = GeolocateRequest {
            lat: parse_coordinate("lat", lat)?,
            lon: parse_coordinate("lon", lon)?,
        };
        let addresses = self.post(GEOLOCATE_PATH, &request).await?;
        tracing::debug!(count = addresses.len(), "DaData geolocate completed");
        Ok(addresses)
    }
}
