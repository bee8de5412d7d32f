//! JSON-over-HTTP implementation of the remote feed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::account::Account;
use crate::credentials::AuthToken;
use crate::error::{SyncError, SyncResult};
use crate::event::RemoteEvent;
use crate::remote::RemoteSource;

/// Body of the events endpoint: `{"data": [{"id", "start", "end", "title"}, ..]}`
#[derive(Debug, Deserialize)]
struct EventsResponse {
    data: Vec<RemoteEvent>,
}

#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    events_url: Url,
}

impl HttpRemote {
    pub fn new(server_url: &str, events_path: &str, timeout: Duration) -> SyncResult<Self> {
        let events_url = events_url(server_url, events_path)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("calsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(HttpRemote { client, events_url })
    }
}

fn events_url(server_url: &str, events_path: &str) -> SyncResult<Url> {
    // Url::join replaces the last segment unless the base ends in a slash
    let base = if server_url.ends_with('/') {
        server_url.to_string()
    } else {
        format!("{server_url}/")
    };

    Url::parse(&base)
        .and_then(|base| base.join(events_path.trim_start_matches('/')))
        .map_err(|e| SyncError::Config(format!("Invalid server URL '{server_url}': {e}")))
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch_events(
        &self,
        account: &Account,
        token: &AuthToken,
    ) -> SyncResult<Vec<RemoteEvent>> {
        debug!(url = %self.events_url, account = %account, "fetching remote events");

        let response = self
            .client
            .get(self.events_url.clone())
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SyncError::Auth(format!("Server rejected credentials ({status})")));
        }
        if !status.is_success() {
            return Err(SyncError::Transport(format!("Server responded with {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let payload: EventsResponse = serde_json::from_slice(&body)
            .map_err(|e| SyncError::MalformedPayload(e.to_string()))?;

        debug!(count = payload.data.len(), "fetched remote events");
        Ok(payload.data)
    }
}
