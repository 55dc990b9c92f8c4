//! API credentials in configured order, with a cursor that wraps around.
//!
//! The pool is built once at startup and shared by reference. It never grows or
//! shrinks; the cursor moves only through [`KeyPool::rotate`].

use std::sync::atomic::{AtomicUsize, Ordering};

use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, warn};

/// Value shipped in `.env.example` files. Never a usable credential.
const PLACEHOLDER_KEY: &str = "your_groq_key_here";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyPoolError {
    #[error("No API keys configured")]
    NoKeysConfigured,
}

#[derive(Debug)]
pub struct KeyPool {
    keys: Vec<SecretString>,
    cursor: AtomicUsize,
}

impl KeyPool {
    pub fn new(keys: Vec<SecretString>) -> Self {
        info!("Loaded {} API key(s) for rotation", keys.len());
        Self {
            keys,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Returns the credential under the cursor.
    pub fn current_key(&self) -> Result<&SecretString, KeyPoolError> {
        let index = self.cursor.load(Ordering::SeqCst);
        self.keys.get(index).ok_or(KeyPoolError::NoKeysConfigured)
    }

    /// Advances the cursor to the next credential, wrapping at the end.
    ///
    /// With a single key this is a no-op that still hands the key back.
    pub fn rotate(&self) -> Result<&SecretString, KeyPoolError> {
        let total = self.keys.len();
        if total == 0 {
            return Err(KeyPoolError::NoKeysConfigured);
        }
        if total == 1 {
            warn!("Only 1 API key available, cannot rotate");
            return self.current_key();
        }

        // CAS keeps two concurrent rotations from skipping a key.
        let previous = self
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |index| {
                Some((index + 1) % total)
            })
            .unwrap_or_else(|index| index);
        let next = (previous + 1) % total;
        info!("Rotating API key: Key #{} -> Key #{}", previous + 1, next + 1);

        Ok(&self.keys[next])
    }

    /// 1-based position of the cursor. Diagnostics only.
    pub fn current_key_number(&self) -> usize {
        self.cursor.load(Ordering::SeqCst) + 1
    }

    pub fn total_keys(&self) -> usize {
        self.keys.len()
    }
}

/// True for values that look configured but are not real credentials.
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || key == PLACEHOLDER_KEY
}
