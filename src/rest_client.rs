use std::time::Instant;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::log;

use crate::config_handler::{Config, Credentials};
use crate::errors::ApiError;
use crate::models_external::player::{EventSummary, PlayerRsp};
use crate::models_external::snapshot::{MatchSnapshot, MatchUpdate};

/// Typed client over the remote store's HTTP contract. Reads are
/// anonymous; the partial-update POST carries HTTP Basic credentials.
pub struct RestClient {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl RestClient {
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> RestClient {
        RestClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn from_config(config: &Config) -> RestClient {
        RestClient::new(&config.base_url, config.credentials())
    }

    pub async fn get_snapshot(&self, match_id: &str) -> Result<MatchSnapshot, ApiError> {
        self.get_call(&format!("{}/events/{match_id}", self.base_url)).await
    }

    pub async fn get_player(&self, player_id: u32) -> Result<PlayerRsp, ApiError> {
        self.get_call(&format!("{}/players/{player_id}", self.base_url)).await
    }

    pub async fn get_players(&self) -> Result<Vec<PlayerRsp>, ApiError> {
        self.get_call(&format!("{}/players", self.base_url)).await
    }

    pub async fn get_event_list(&self) -> Result<Vec<EventSummary>, ApiError> {
        self.get_call(&format!("{}/events", self.base_url)).await
    }

    /// Submit a partial update. The response body is discarded beyond
    /// the status code.
    pub async fn post_update(&self, match_id: &str, update: &MatchUpdate) -> Result<(), ApiError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            ApiError::Validation("write credentials are not configured".to_string())
        })?;

        let before = Instant::now();
        let url = format!("{}/events/{match_id}", self.base_url);
        let rsp = self
            .client
            .post(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .json(update)
            .send()
            .await?;

        if !rsp.status().is_success() {
            return Err(ApiError::RemoteUpdate(rsp.status()));
        }
        log::info!("[REST] Post {url} {:.2?}", before.elapsed());
        Ok(())
    }

    async fn get_call<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let before = Instant::now();
        let rsp = self.client.get(url).send().await?;
        if !rsp.status().is_success() {
            return Err(ApiError::RemoteStatus(rsp.status()));
        }
        let res = rsp.json().await?;
        log::info!("[REST] Call {url} {:.2?}", before.elapsed());
        Ok(res)
    }
}
