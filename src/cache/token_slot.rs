use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::token::{Token, TokenState};

#[derive(Debug, Default)]
struct SlotEntry {
    token: Option<Arc<Token>>,
    state: TokenState,
}

/// Single-slot holder of the current access token.
///
/// The token is swapped as one `Arc<Token>`; readers get either the previous
/// or the new token. The lock is only held for the swap itself, never across
/// a network call.
#[derive(Debug, Clone, Default)]
pub struct TokenSlot {
    inner: Arc<RwLock<SlotEntry>>,
}

impl TokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whatever is stored right now, possibly expired after failed refreshes.
    pub async fn current(&self) -> Option<Arc<Token>> {
        self.inner.read().await.token.clone()
    }

    pub async fn state(&self) -> TokenState {
        self.inner.read().await.state
    }

    /// Marks a fetch in flight and returns the new state.
    pub async fn begin_fetch(&self) -> TokenState {
        let mut entry = self.inner.write().await;
        entry.state = if entry.token.is_some() {
            TokenState::Refreshing
        } else {
            TokenState::Fetching
        };
        entry.state
    }

    /// Replaces the current token wholesale.
    pub async fn store(&self, token: Token) -> Arc<Token> {
        let token = Arc::new(token);
        let mut entry = self.inner.write().await;
        entry.token = Some(token.clone());
        entry.state = TokenState::Valid;
        debug!("token swapped, expires at {}", token.expires_at_unix_ts());
        token
    }

    /// Keeps the previous token and returns the resulting state.
    pub async fn mark_failed(&self) -> TokenState {
        let mut entry = self.inner.write().await;
        entry.state = if entry.token.is_some() {
            TokenState::Stale
        } else {
            TokenState::Uninitialized
        };
        entry.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn follows_state_machine() {
        let slot = TokenSlot::new();
        assert_eq!(slot.state().await, TokenState::Uninitialized);
        assert!(slot.current().await.is_none());

        assert_eq!(slot.begin_fetch().await, TokenState::Fetching);
        assert_eq!(slot.mark_failed().await, TokenState::Uninitialized);

        slot.begin_fetch().await;
        slot.store(Token::new("first".into(), 60)).await;
        assert_eq!(slot.state().await, TokenState::Valid);

        assert_eq!(slot.begin_fetch().await, TokenState::Refreshing);
        assert_eq!(slot.mark_failed().await, TokenState::Stale);
        assert_eq!(slot.current().await.unwrap().value, "first");

        assert_eq!(slot.begin_fetch().await, TokenState::Refreshing);
        slot.store(Token::new("second".into(), 60)).await;
        assert_eq!(slot.state().await, TokenState::Valid);
        assert_eq!(slot.current().await.unwrap().value, "second");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_never_see_mixed_tokens() {
        let slot = TokenSlot::new();
        slot.store(Token::new("tok-0".into(), 0)).await;

        let writer = {
            let slot = slot.clone();
            tokio::spawn(async move {
                for n in 1..=500i64 {
                    slot.store(Token::new(format!("tok-{}", n), n)).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let slot = slot.clone();
                tokio::spawn(async move {
                    for _ in 0..500 {
                        let token = slot.current().await.expect("token present");
                        assert_eq!(token.value, format!("tok-{}", token.expires_in));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(slot.current().await.unwrap().value, "tok-500");
    }
}
