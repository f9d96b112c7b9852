use crate::i18n::provider::LocaleStore;

/// `localStorage`-backed store. Silently does nothing when storage is
/// unavailable (private browsing, disabled cookies).
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserLocaleStore;

impl BrowserLocaleStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl LocaleStore for BrowserLocaleStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, value).is_err() {
                tracing::warn!(key, "Failed to persist preference");
            }
        }
    }
}
