//! Session credential storage.
//!
//! The signed token issued at login is persisted in the OS credential store
//! (Windows Credential Manager, macOS Keychain, Linux keyutils via the
//! `keyring` crate) under one fixed key. It survives restarts on the same
//! machine profile and is never shared across machines.
//!
//! The raw token string is the canonical stored form. Older builds wrote the
//! token JSON-stringified (`"eyJ..."`); such values are unwrapped on read.

use keyring::Entry;
use std::sync::Mutex;
use tracing::{info, warn};
use zeroize::Zeroize;

use crate::error::{ConsoleError, Result};

const SERVICE_NAME: &str = "orderit-console";

/// Storage key holding the session credential.
pub const CREDENTIAL_KEY: &str = "LoggedOrderItAppUser";

/// Persisted access to the single session credential.
pub trait CredentialStore: Send + Sync {
    fn save(&self, credential: &str) -> Result<()>;

    /// Returns `None` when nothing is stored. Never fails.
    fn load(&self) -> Option<String>;

    /// Removes the credential. Succeeds when nothing is stored.
    fn clear(&self) -> Result<()>;
}

/// Undo the legacy JSON-string encoding, if present.
pub(crate) fn canonical_credential(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let unwrapped = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string())
    } else {
        trimmed.to_string()
    };
    let unwrapped = unwrapped.trim().to_string();
    if unwrapped.is_empty() || unwrapped == "null" {
        None
    } else {
        Some(unwrapped)
    }
}

// ---------------------------------------------------------------------------
// OS keyring
// ---------------------------------------------------------------------------

/// Credential store backed by the OS keyring.
pub struct KeyringStore {
    service: String,
    key: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_names(SERVICE_NAME, CREDENTIAL_KEY)
    }

    pub fn with_names(service: &str, key: &str) -> Self {
        Self {
            service: service.to_string(),
            key: key.to_string(),
        }
    }

    fn entry(&self) -> std::result::Result<Entry, keyring::Error> {
        Entry::new(&self.service, &self.key)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn save(&self, credential: &str) -> Result<()> {
        let entry = self
            .entry()
            .map_err(|e| ConsoleError::Storage(e.to_string()))?;
        entry
            .set_password(credential.trim())
            .map_err(|e| ConsoleError::Storage(e.to_string()))?;
        info!(key = %self.key, "session credential stored");
        Ok(())
    }

    fn load(&self) -> Option<String> {
        let entry = match self.entry() {
            Ok(e) => e,
            Err(e) => {
                warn!(key = %self.key, error = %e, "keyring: failed to create entry");
                return None;
            }
        };
        match entry.get_password() {
            Ok(mut raw) => {
                let credential = canonical_credential(&raw);
                raw.zeroize();
                credential
            }
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "keyring: failed to read credential");
                None
            }
        }
    }

    fn clear(&self) -> Result<()> {
        let entry = self
            .entry()
            .map_err(|e| ConsoleError::Storage(e.to_string()))?;
        match entry.delete_credential() {
            Ok(()) => {
                info!(key = %self.key, "session credential cleared");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ConsoleError::Storage(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local store used by tests and headless tooling.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: &str) -> Self {
        Self {
            slot: Mutex::new(Some(credential.to_string())),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn save(&self, credential: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| ConsoleError::Storage(e.to_string()))?;
        if let Some(old) = slot.as_mut() {
            old.zeroize();
        }
        *slot = Some(credential.trim().to_string());
        Ok(())
    }

    fn load(&self) -> Option<String> {
        let slot = self.slot.lock().ok()?;
        slot.as_deref().and_then(canonical_credential)
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| ConsoleError::Storage(e.to_string()))?;
        if let Some(mut old) = slot.take() {
            old.zeroize();
        }
        Ok(())
    }
}
