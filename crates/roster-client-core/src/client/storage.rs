//! The persistence surface for the one piece of durable client state: the
//! bearer token. Everything else the client believes is recomputed per page.

use std::fmt::Debug;
use std::sync::Mutex;

use roster_shared::token::AuthToken;

#[cfg(target_arch = "wasm32")]
use roster_shared::{const_config::client::TOKEN_STORAGE_KEY, log_err_as_warn};

/// Key-value wrapper around persistent storage holding exactly one key.
///
/// No network calls, no interpretation of the value. `clear` when no token is
/// stored is a no-op, not an error, so logout stays idempotent.
pub trait TokenStore: Debug + Send + Sync {
    fn set(&self, token: &AuthToken);
    fn get(&self) -> Option<AuthToken>;
    fn clear(&self);
}

/// Process-local store; the native default and the double used in tests
#[derive(Debug, Default)]
pub struct MemoryTokenStore(Mutex<Option<AuthToken>>);

impl TokenStore for MemoryTokenStore {
    fn set(&self, token: &AuthToken) {
        *self.0.lock().expect("mutex poisoned") = Some(token.clone());
    }

    fn get(&self) -> Option<AuthToken> {
        self.0.lock().expect("mutex poisoned").clone()
    }

    fn clear(&self) {
        *self.0.lock().expect("mutex poisoned") = None;
    }
}

/// Browser localStorage store. The storage handle is re-acquired per call
/// because `web_sys` handles cannot be held across threads of control.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct WebStorageTokenStore;

#[cfg(target_arch = "wasm32")]
impl TokenStore for WebStorageTokenStore {
    fn set(&self, token: &AuthToken) {
        if let Some(storage) = local_storage() {
            log_err_as_warn!(storage.set_item(TOKEN_STORAGE_KEY, token.as_header_value()));
        }
    }

    fn get(&self) -> Option<AuthToken> {
        local_storage()?
            .get_item(TOKEN_STORAGE_KEY)
            .ok()
            .flatten()
            .map(AuthToken::from)
    }

    fn clear(&self) {
        if let Some(storage) = local_storage() {
            log_err_as_warn!(storage.remove_item(TOKEN_STORAGE_KEY));
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear_round_trip() {
        // Arrange
        let store = MemoryTokenStore::default();
        let token = AuthToken::from_raw("abc");

        // Act / Assert
        assert!(store.get().is_none(), "fresh store should be empty");
        store.set(&token);
        assert_eq!(store.get(), Some(token));
        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn clear_on_empty_store_is_a_no_op() {
        // Arrange
        let store = MemoryTokenStore::default();

        // Act - twice on purpose, logout can run with no token present
        store.clear();
        store.clear();

        // Assert
        assert!(store.get().is_none());
    }

    #[test]
    fn set_overwrites_the_single_key() {
        // Arrange
        let store = MemoryTokenStore::default();
        store.set(&AuthToken::from_raw("old"));

        // Act
        store.set(&AuthToken::from_raw("new"));

        // Assert
        assert_eq!(store.get(), Some(AuthToken::from_raw("new")));
    }
}
