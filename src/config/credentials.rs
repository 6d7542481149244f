use std::fmt;

use thiserror::Error;

use crate::config::provider::ProviderType;
use crate::utils::constants::{ENV_GOOGLE_API_KEY, ENV_TDX_CLIENT_ID, ENV_TDX_CLIENT_SECRET};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {0} is empty")]
    Empty(&'static str),
}

/// Client-credentials pair for the transit token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(pub String);

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Secrets needed by the configured provider, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSecrets {
    Transit(Credential),
    Places(ApiKey),
}

impl ProviderSecrets {
    pub fn from_env(provider: ProviderType) -> Result<Self, CredentialError> {
        Self::from_lookup(provider, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(provider: ProviderType, lookup: F) -> Result<Self, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match provider {
            ProviderType::Transit => Ok(ProviderSecrets::Transit(Credential {
                client_id: required(&lookup, ENV_TDX_CLIENT_ID)?,
                client_secret: required(&lookup, ENV_TDX_CLIENT_SECRET)?,
            })),
            ProviderType::Places => Ok(ProviderSecrets::Places(ApiKey(required(
                &lookup,
                ENV_GOOGLE_API_KEY,
            )?))),
        }
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, CredentialError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).ok_or(CredentialError::Missing(key))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(CredentialError::Empty(key));
    }
    Ok(value.to_owned())
}
