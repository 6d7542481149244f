use crate::helpers::time::now_i64;

/// Access token as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    /// provider-declared lifetime, may be zero or negative on malformed responses
    pub expires_in: i64,
    pub fetched_at_unix_ts: i64,
}

impl Token {
    pub fn new(value: String, expires_in: i64) -> Self {
        Self::fetched_at(value, expires_in, now_i64())
    }

    pub fn fetched_at(value: String, expires_in: i64, fetched_at_unix_ts: i64) -> Self {
        Self { value, expires_in, fetched_at_unix_ts }
    }

    pub fn expires_at_unix_ts(&self) -> i64 {
        self.fetched_at_unix_ts.saturating_add(self.expires_in)
    }

    pub fn is_expired(&self) -> bool {
        now_i64() >= self.expires_at_unix_ts()
    }
}

/// Lifecycle of the current token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenState {
    #[default]
    Uninitialized,
    Fetching,
    Valid,
    Refreshing,
    /// last refresh failed, the previous token is still served
    Stale,
}

impl TokenState {
    pub fn as_gauge(&self) -> i64 {
        match self {
            TokenState::Uninitialized => 0,
            TokenState::Fetching => 1,
            TokenState::Valid => 2,
            TokenState::Refreshing => 3,
            TokenState::Stale => 4,
        }
    }
}
