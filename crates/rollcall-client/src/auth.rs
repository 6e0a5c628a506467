// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token sources for API requests.

use async_trait::async_trait;
use rollcall_core::RollcallError;

/// Supplies the bearer token attached to each request.
///
/// Asked once per request so implementations can refresh expiring tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns the current token, or `None` to send the request unauthenticated.
    async fn bearer_token(&self) -> Result<Option<String>, RollcallError>;
}

/// A token fixed at startup, usually from `api.token` / `ROLLCALL_API_TOKEN`.
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// A source that never authenticates.
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn from_config(token: Option<&str>) -> Self {
        Self(
            token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        )
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = if self.0.is_some() { "<redacted>" } else { "<none>" };
        f.debug_tuple("StaticToken").field(&shown).finish()
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> Result<Option<String>, RollcallError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_config_token_is_anonymous() {
        let source = StaticToken::from_config(Some("   "));
        assert_eq!(source.bearer_token().await.unwrap(), None);
    }

    #[test]
    fn debug_output_redacts_token() {
        let rendered = format!("{:?}", StaticToken::new("s3cret"));
        assert!(!rendered.contains("s3cret"));
    }
}
