//! Credentials for the remote feed.
//!
//! Token retrieval is a plain synchronous call from the runner's point of
//! view. Any failure to produce a usable token is a [`SyncError::Auth`].

use std::fmt;

use crate::account::Account;
use crate::error::{SyncError, SyncResult};

/// Bearer token presented to the remote feed.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: &str) -> Self {
        AuthToken(token.to_string())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

pub trait CredentialSource: Send + Sync {
    fn auth_token(&self, account: &Account) -> SyncResult<AuthToken>;
}

/// Serves the token configured for the account.
#[derive(Clone, Default)]
pub struct ConfigCredentials {
    token: Option<String>,
}

impl ConfigCredentials {
    pub fn new(token: Option<String>) -> Self {
        ConfigCredentials { token }
    }
}

impl CredentialSource for ConfigCredentials {
    fn auth_token(&self, account: &Account) -> SyncResult<AuthToken> {
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(AuthToken::new(token)),
            _ => Err(SyncError::Auth(format!(
                "No token configured for account '{}'",
                account.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_token_is_served() {
        let credentials = ConfigCredentials::new(Some(" s3cret ".to_string()));
        let token = credentials
            .auth_token(&Account::new("jan", "nl.vgst"))
            .unwrap();
        assert_eq!(token.secret(), "s3cret");
    }

    #[test]
    fn missing_or_blank_token_is_auth_failure() {
        let account = Account::new("jan", "nl.vgst");
        for token in [None, Some(String::new()), Some("  ".to_string())] {
            let result = ConfigCredentials::new(token).auth_token(&account);
            assert!(matches!(result, Err(SyncError::Auth(_))));
        }
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        assert_eq!(format!("{:?}", AuthToken::new("s3cret")), "AuthToken(***)");
    }
}
