use std::collections::HashMap;
use std::sync::RwLock;

use crate::i18n::{Dictionary, Locale, LOCALE_STORAGE_KEY};

/// Durable key-value storage for user preferences.
///
/// The browser implementation writes to `localStorage`; servers and tests
/// use [`MemoryLocaleStore`].
pub trait LocaleStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

#[derive(Debug, Default)]
pub struct MemoryLocaleStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryLocaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocaleStore for MemoryLocaleStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

/// Active locale plus its persistence, created once at the application root.
///
/// Starts on the default locale so server and first client render agree;
/// [`LocaleProvider::rehydrate`] then applies the persisted choice.
pub struct LocaleProvider<S: LocaleStore> {
    store: S,
    dictionary: &'static Dictionary,
    locale: Locale,
}

impl<S: LocaleStore> LocaleProvider<S> {
    pub fn new(store: S) -> Self {
        Self::with_dictionary(store, Dictionary::builtin())
    }

    pub fn with_dictionary(store: S, dictionary: &'static Dictionary) -> Self {
        Self {
            store,
            dictionary,
            locale: Locale::default(),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Apply the persisted locale, if any. Unknown stored values are ignored.
    pub fn rehydrate(&mut self) -> Locale {
        if let Some(stored) = self.store.get(LOCALE_STORAGE_KEY) {
            match Locale::from_code(&stored) {
                Some(locale) => self.locale = locale,
                None => tracing::warn!(stored, "Ignoring unknown persisted locale"),
            }
        }
        self.locale
    }

    /// Switch locale and persist the choice.
    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        self.store.set(LOCALE_STORAGE_KEY, locale.code());
    }

    /// Translate `category.key` in the active locale.
    pub fn t(&self, category: &str, key: &str) -> String {
        self.dictionary.lookup(category, key, self.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_default_locale() {
        let store = MemoryLocaleStore::new();
        store.set(LOCALE_STORAGE_KEY, "en");
        let provider = LocaleProvider::new(store);
        assert_eq!(provider.locale(), Locale::Fr);
        assert_eq!(provider.t("nav", "home"), "Accueil");
    }

    #[test]
    fn test_rehydrate_applies_persisted_locale() {
        let store = MemoryLocaleStore::new();
        store.set(LOCALE_STORAGE_KEY, "en");
        let mut provider = LocaleProvider::new(store);
        assert_eq!(provider.rehydrate(), Locale::En);
        assert_eq!(provider.t("nav", "home"), "Home");
    }

    #[test]
    fn test_rehydrate_ignores_garbage() {
        let store = MemoryLocaleStore::new();
        store.set(LOCALE_STORAGE_KEY, "klingon");
        let mut provider = LocaleProvider::new(store);
        assert_eq!(provider.rehydrate(), Locale::Fr);
    }

    #[test]
    fn test_set_locale_persists() {
        let mut provider = LocaleProvider::new(MemoryLocaleStore::new());
        provider.set_locale(Locale::Sw);
        assert_eq!(provider.t("nav", "news"), "Habari");
        assert_eq!(provider.store.get(LOCALE_STORAGE_KEY).as_deref(), Some("sw"));

        let mut reopened = LocaleProvider::new(MemoryLocaleStore::new());
        reopened.store.set(LOCALE_STORAGE_KEY, "sw");
        assert_eq!(reopened.rehydrate(), Locale::Sw);
    }

    #[test]
    fn test_fallbacks_through_provider() {
        let mut provider = LocaleProvider::new(MemoryLocaleStore::new());
        provider.set_locale(Locale::Ln);
        assert_eq!(provider.t("nav", "simulator"), "Simulateur");
        assert_eq!(provider.t("nav", "unknown"), "unknown");
    }
}
