//! Locale dictionary and lookup.
//!
//! Translations live in `locales/translations.json`, embedded at build time,
//! shaped as `{ category: { key: { locale: text } } }`.

pub mod provider;

#[cfg(feature = "hydrate")]
pub mod browser;

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Key under which the chosen locale is persisted.
pub const LOCALE_STORAGE_KEY: &str = "drnoflu-locale";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
    Ln,
    Sw,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::Fr, Locale::En, Locale::Ln, Locale::Sw];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
            Locale::Ln => "ln",
            Locale::Sw => "sw",
        }
    }

    /// Parse a locale code (case-insensitive, region suffix ignored: `en-GB` → `en`).
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        match primary.to_lowercase().as_str() {
            "fr" => Some(Locale::Fr),
            "en" => Some(Locale::En),
            "ln" => Some(Locale::Ln),
            "sw" => Some(Locale::Sw),
            _ => None,
        }
    }

    /// Name of the language in that language.
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::Fr => "Français",
            Locale::En => "English",
            Locale::Ln => "Lingála",
            Locale::Sw => "Kiswahili",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

type Entries = HashMap<String, HashMap<String, HashMap<String, String>>>;

/// A `{ category: { key: { locale: text } } }` translation table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: Entries,
}

static BUILTIN: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::from_json(include_str!("../../locales/translations.json")).unwrap_or_else(|e| {
        tracing::error!("Embedded translations are invalid: {e}");
        Dictionary::default()
    })
});

impl Dictionary {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The dictionary shipped with the portal.
    pub fn builtin() -> &'static Dictionary {
        &BUILTIN
    }

    /// Resolve `category.key` for `locale`.
    ///
    /// Falls back to the default locale's text when `locale` has none, and
    /// to `key` itself when the category or key is unknown.
    pub fn lookup(&self, category: &str, key: &str, locale: Locale) -> String {
        let Some(texts) = self.entries.get(category).and_then(|keys| keys.get(key)) else {
            return key.to_string();
        };

        texts
            .get(locale.code())
            .or_else(|| texts.get(Locale::default().code()))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Look up `category.key` in the built-in dictionary for a locale code.
///
/// Unknown locale codes resolve to the default locale (French).
///
/// ```
/// use drnoflu::i18n::translate;
///
/// assert_eq!(translate("nav", "home", "en"), "Home");
/// assert_eq!(translate("nav", "home", "zz"), "Accueil");
/// assert_eq!(translate("nav", "missing_key", "en"), "missing_key");
/// ```
pub fn translate(category: &str, key: &str, locale: &str) -> String {
    let locale = Locale::from_code(locale).unwrap_or_default();
    Dictionary::builtin().lookup(category, key, locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dictionary_parses() {
        let parsed = Dictionary::from_json(include_str!("../../locales/translations.json"));
        assert!(parsed.is_ok());
        assert!(Dictionary::builtin().categories().any(|c| c == "nav"));
    }

    #[test]
    fn test_translate_known_locale() {
        assert_eq!(translate("nav", "home", "en"), "Home");
        assert_eq!(translate("nav", "home", "fr"), "Accueil");
        assert_eq!(translate("nav", "home", "sw"), "Mwanzo");
    }

    #[test]
    fn test_unsupported_locale_falls_back_to_french() {
        assert_eq!(translate("nav", "home", "zz"), "Accueil");
        assert_eq!(translate("nav", "home", ""), "Accueil");
    }

    #[test]
    fn test_missing_locale_text_falls_back_to_french() {
        assert_eq!(translate("nav", "simulator", "ln"), "Simulateur");
    }

    #[test]
    fn test_missing_key_returns_key() {
        assert_eq!(translate("nav", "inexistant", "en"), "inexistant");
        assert_eq!(translate("inconnue", "home", "en"), "home");
    }

    #[test]
    fn test_every_entry_has_default_locale() {
        let dictionary = Dictionary::builtin();
        for (category, keys) in &dictionary.entries {
            for (key, texts) in keys {
                assert!(
                    texts.contains_key(Locale::default().code()),
                    "{category}.{key} has no French text"
                );
            }
        }
    }

    #[test]
    fn test_locale_from_code() {
        assert_eq!(Locale::from_code("EN"), Some(Locale::En));
        assert_eq!(Locale::from_code("fr-CD"), Some(Locale::Fr));
        assert_eq!(Locale::from_code("sw_KE"), Some(Locale::Sw));
        assert_eq!(Locale::from_code("de"), None);
        assert_eq!(Locale::default(), Locale::Fr);
    }

    #[test]
    fn test_custom_dictionary_without_default_text() {
        let dictionary =
            Dictionary::from_json(r#"{"nav": {"home": {"en": "Home"}}}"#).unwrap();
        assert_eq!(dictionary.lookup("nav", "home", Locale::Sw), "home");
        assert_eq!(dictionary.lookup("nav", "home", Locale::En), "Home");
    }
}
