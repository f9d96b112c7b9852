use leptos::prelude::*;

use crate::i18n::provider::LocaleProvider;
use crate::i18n::Locale;

#[cfg(feature = "hydrate")]
type ActiveStore = crate::i18n::browser::BrowserLocaleStore;
#[cfg(not(feature = "hydrate"))]
type ActiveStore = crate::i18n::provider::MemoryLocaleStore;

/// Reactive handle on the active locale, provided at the application root.
///
/// Wraps the single [`LocaleProvider`] of the app; the signal mirrors its
/// locale so views re-render on a switch.
#[derive(Clone, Copy)]
pub struct LocaleContext {
    pub locale: RwSignal<Locale>,
    provider: StoredValue<LocaleProvider<ActiveStore>>,
}

impl LocaleContext {
    /// Translate `category.key`, tracking the locale signal.
    pub fn t(&self, category: &str, key: &str) -> String {
        self.locale.track();
        self.provider.with_value(|provider| provider.t(category, key))
    }

    /// Switch locale and persist the choice.
    pub fn set(&self, locale: Locale) {
        self.provider.update_value(|provider| provider.set_locale(locale));
        self.locale.set(locale);
    }

    #[cfg(any(feature = "hydrate", test))]
    fn rehydrate(&self) {
        let mut restored = Locale::default();
        self.provider.update_value(|provider| restored = provider.rehydrate());
        self.locale.set(restored);
    }
}

/// Provide the locale context. Server and first client render both use the
/// default locale; the persisted choice is applied once hydrated.
pub fn provide_locale() -> LocaleContext {
    let context = LocaleContext {
        locale: RwSignal::new(Locale::default()),
        provider: StoredValue::new(LocaleProvider::new(ActiveStore::default())),
    };
    provide_context(context);

    #[cfg(feature = "hydrate")]
    Effect::new(move |_| context.rehydrate());

    context
}

pub fn use_locale() -> LocaleContext {
    use_context::<LocaleContext>().unwrap_or_else(provide_locale)
}

#[component]
pub fn LocaleSwitcher() -> impl IntoView {
    let i18n = use_locale();

    view! {
        <label class="locale-switcher">
            <span class="sr-only">{move || i18n.t("common", "language")}</span>
            <select
                on:change=move |ev| {
                    if let Some(locale) = Locale::from_code(&event_target_value(&ev)) {
                        i18n.set(locale);
                    }
                }
                prop:value=move || i18n.locale.get().code()
            >
                {Locale::ALL
                    .into_iter()
                    .map(|locale| view! {
                        <option value=locale.code()>{locale.native_name()}</option>
                    })
                    .collect_view()}
            </select>
        </label>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_persists_through_root_provider() {
        let owner = Owner::new();
        owner.set();

        let context = provide_locale();
        assert_eq!(context.t("nav", "home"), "Accueil");

        context.set(Locale::En);
        assert_eq!(context.locale.get_untracked(), Locale::En);
        assert_eq!(context.t("nav", "home"), "Home");

        // A later rehydrate reads back what the same provider stored
        context.locale.set(Locale::Fr);
        context.rehydrate();
        assert_eq!(context.locale.get_untracked(), Locale::En);
        assert_eq!(
            context.provider.with_value(|provider| provider.locale()),
            Locale::En
        );
    }
}
