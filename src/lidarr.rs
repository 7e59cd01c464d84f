use color_eyre::Result;
use color_eyre::eyre::Context;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::ports::ArtistLibrary;

/// How much of an error response body to include when reporting a failed
/// roster fetch.
const BODY_REPORT_LIMIT: usize = 200;

/// Lidarr rejected the request outright, e.g. a bad API key or a proxy
/// error page. Carries the status and a truncated body for reporting.
#[derive(Debug, Error)]
#[error("Lidarr returned {status}: {body}")]
pub struct LidarrStatusError {
    status: StatusCode,
    body: String,
}

/// Outcome of one add attempt, decoupled from the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Lidarr created the artist (status 201).
    Added,
    /// Lidarr refused with a structured error message, most commonly
    /// "has already been added".
    Rejected(String),
    /// Lidarr refused without a usable error message; the raw body is
    /// kept for reporting.
    Failed(String),
}

pub struct LidarrClient {
    client: Client,
    host: String,
    api_key: String,
    root_folder_path: String,
}

#[derive(Debug, Deserialize)]
struct ArtistRecord {
    #[serde(rename = "artistName")]
    artist_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddArtistRequest<'a> {
    artist_name: &'a str,
    foreign_artist_id: String,
    quality_profile_id: u32,
    metadata_profile_id: u32,
    add_options: AddOptions,
    root_folder_path: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddOptions {
    monitor: &'static str,
    search_for_missing_albums: bool,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

impl LidarrClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            host: config.lidarr_host.clone(),
            api_key: config.lidarr_api_key.clone(),
            root_folder_path: config.root_folder_path.clone(),
        }
    }

    /// Headers the Lidarr web UI sends; some reverse-proxy setups reject
    /// requests without them.
    fn with_browser_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Accept", "*/*")
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Referer", format!("https://{}/", self.host))
            .header("Sec-Fetch-Dest", "empty")
            .header("Sec-Fetch-Mode", "cors")
            .header("Sec-Fetch-Site", "same-origin")
            .header("TE", "trailers")
    }
}

#[async_trait::async_trait]
impl ArtistLibrary for LidarrClient {
    async fn list_artists(&self) -> Result<Vec<String>> {
        let url = format!("https://{}/api/v1/artist", self.host);
        log::debug!("Fetching artist list from {}", url);

        let response = self
            .with_browser_headers(self.client.get(&url))
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to send artist list request to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LidarrStatusError {
                status,
                body: truncate(&body, BODY_REPORT_LIMIT),
            }
            .into());
        }

        let records: Vec<ArtistRecord> = response
            .json()
            .await
            .wrap_err("Failed to parse Lidarr artist list response")?;

        // Records without a name are skipped; the list is deliberately not
        // deduplicated.
        let names = records
            .into_iter()
            .filter_map(|record| record.artist_name)
            .filter(|name| !name.is_empty())
            .collect();

        Ok(names)
    }

    async fn add_artist(&self, guid: &str, name: &str) -> Result<AddOutcome> {
        let url = format!("https://{}/api/v1/artist?apikey={}", self.host, self.api_key);
        let payload = AddArtistRequest {
            artist_name: name,
            foreign_artist_id: format!("lidarr:{}", guid),
            quality_profile_id: 1,
            metadata_profile_id: 1,
            add_options: AddOptions {
                monitor: "all",
                search_for_missing_albums: true,
            },
            root_folder_path: &self.root_folder_path,
        };

        log::debug!("Adding artist {} ({}) via {}", name, guid, url);

        let response = self
            .with_browser_headers(self.client.post(&url))
            .json(&payload)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to send add request for {}", name))?;

        if response.status() == StatusCode::CREATED {
            return Ok(AddOutcome::Added);
        }

        let body = response
            .text()
            .await
            .wrap_err_with(|| format!("Failed to read add response body for {}", name))?;

        Ok(classify_add_failure(&body))
    }
}

/// Classify a non-201 add response body. Lidarr validation errors arrive
/// as a JSON array of objects carrying `errorMessage`; anything else is
/// reported raw.
fn classify_add_failure(body: &str) -> AddOutcome {
    if let Ok(errors) = serde_json::from_str::<Vec<ApiError>>(body) {
        if let Some(message) = errors.into_iter().next().and_then(|e| e.error_message) {
            return AddOutcome::Rejected(message);
        }
    }
    AddOutcome::Failed(body.to_string())
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
