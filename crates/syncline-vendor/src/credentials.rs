//! Credential storage behind a capability interface
//!
//! Plugins persist bearer tokens in whatever the runtime offers (browser
//! local storage, a keychain, a JSON file). The sync core only sees this
//! trait, so any backend can stand in, including the in-memory store
//! used by tests.

use dashmap::DashMap;

/// Plugin-data key under which the bearer token is stored
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Get/set/clear of opaque token strings
pub trait CredentialStore: Send + Sync {
    /// Read a stored credential
    fn get(&self, key: &str) -> Option<String>;

    /// Store a credential, replacing any previous value
    fn set(&self, key: &str, value: &str);

    /// Delete a credential
    fn clear(&self, key: &str);
}

/// In-memory credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tokens: DashMap<String, String>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one access token
    #[must_use]
    pub fn with_access_token(token: &str) -> Self {
        let store = Self::new();
        store.set(ACCESS_TOKEN_KEY, token);
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.tokens.get(key).map(|entry| entry.clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.tokens.insert(key.to_string(), value.to_string());
    }

    fn clear(&self, key: &str) {
        self.tokens.remove(key);
    }
}
