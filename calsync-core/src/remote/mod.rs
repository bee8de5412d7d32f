//! The remote event feed.

mod http;

pub use http::HttpRemote;

use async_trait::async_trait;

use crate::account::Account;
use crate::credentials::AuthToken;
use crate::error::SyncResult;
use crate::event::RemoteEvent;

#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// The complete current list of the account's remote events.
    ///
    /// Fails with `Transport` when the feed cannot be reached, `Auth` when it
    /// rejects the token and `MalformedPayload` when the response cannot be
    /// decoded. Timeouts and retries are the implementation's business.
    async fn fetch_events(
        &self,
        account: &Account,
        token: &AuthToken,
    ) -> SyncResult<Vec<RemoteEvent>>;
}
