//! CSRF tokens for form posts made with a bearer identity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

/// How long an issued token is accepted.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug)]
struct IssuedToken {
    value: String,
    issued_at: Instant,
}

impl IssuedToken {
    fn is_live(&self, ttl: Duration) -> bool {
        self.issued_at.elapsed() < ttl
    }
}

/// Per-user CSRF tokens, issued with the subscription page and checked
/// on the toggle form.
///
/// Expired tokens are rejected, and dropped whenever a new token is issued.
#[derive(Clone, Debug)]
pub struct CsrfStore {
    tokens: Arc<RwLock<HashMap<Uuid, IssuedToken>>>,
    ttl: Duration,
}

impl Default for CsrfStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TOKEN_TTL)
    }
}

impl CsrfStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            tokens: Arc::default(),
            ttl,
        }
    }

    /// The user's live token, issuing a fresh one when none is held.
    pub async fn token_for(&self, user_id: Uuid) -> String {
        if let Some(existing) = self.tokens.read().await.get(&user_id)
            && existing.is_live(self.ttl)
        {
            return existing.value.clone();
        }

        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| token.is_live(self.ttl));
        if tokens.len() < before {
            tracing::debug!(pruned = before - tokens.len(), "Dropped expired CSRF tokens");
        }

        tokens
            .entry(user_id)
            .or_insert_with(|| {
                tracing::debug!(%user_id, "Issuing CSRF token");
                IssuedToken {
                    value: Uuid::new_v4().simple().to_string(),
                    issued_at: Instant::now(),
                }
            })
            .value
            .clone()
    }

    pub async fn validate(&self, user_id: Uuid, token: &str) -> bool {
        self.tokens
            .read()
            .await
            .get(&user_id)
            .filter(|stored| stored.is_live(self.ttl))
            .is_some_and(|stored| {
                !token.is_empty() && bool::from(stored.value.as_bytes().ct_eq(token.as_bytes()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_is_stable_per_user() {
        let store = CsrfStore::new();
        let user = Uuid::new_v4();

        let first = store.token_for(user).await;
        assert_eq!(store.token_for(user).await, first);
        assert_ne!(store.token_for(Uuid::new_v4()).await, first);
    }

    #[tokio::test]
    async fn test_validate() {
        let store = CsrfStore::new();
        let user = Uuid::new_v4();
        let token = store.token_for(user).await;

        assert!(store.validate(user, &token).await);
        assert!(!store.validate(user, "forged").await);
        assert!(!store.validate(user, &token[..8]).await);
        assert!(!store.validate(user, "").await);
        assert!(!store.validate(Uuid::new_v4(), &token).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_token_is_rejected_and_replaced() {
        let store = CsrfStore::with_ttl(Duration::from_secs(60));
        let user = Uuid::new_v4();
        let token = store.token_for(user).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!store.validate(user, &token).await);

        let renewed = store.token_for(user).await;
        assert_ne!(renewed, token);
        assert!(store.validate(user, &renewed).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_issuing_prunes_expired_tokens() {
        let store = CsrfStore::with_ttl(Duration::from_secs(60));
        for _ in 0..3 {
            store.token_for(Uuid::new_v4()).await;
        }
        assert_eq!(store.tokens.read().await.len(), 3);

        tokio::time::advance(Duration::from_secs(61)).await;
        store.token_for(Uuid::new_v4()).await;

        assert_eq!(store.tokens.read().await.len(), 1);
    }
}
