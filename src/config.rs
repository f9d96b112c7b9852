use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;
use crate::i18n::Locale;
use crate::search::matcher::{AggregationPolicy, DEFAULT_RESULT_CAP};

/// Search behavior knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    pub result_cap: usize,
    pub policy: AggregationPolicy,
}

/// Server settings.
///
/// Layered as: built-in defaults, then an optional `drnoflu.toml` in the
/// working directory, then `DRNOFLU__*` environment variables
/// (`DRNOFLU__SUPABASE_URL`, `DRNOFLU__SEARCH__RESULT_CAP`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Supabase project URL. Without it the server runs on seeded demo data.
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    /// Bearer token required by the admin API.
    pub service_token: String,
    pub search: SearchSettings,
    pub default_locale: String,
    pub http_timeout_secs: u64,
    pub log_filter: String,
}

impl Settings {
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(Some("drnoflu"))
    }

    /// Load settings, reading `file` (without extension) when given.
    pub fn load_from(file: Option<&str>) -> Result<Self, AppError> {
        let mut builder = Config::builder()
            .set_default("service_token", "dev-token")
            .and_then(|b| b.set_default("search.result_cap", DEFAULT_RESULT_CAP as i64))
            .and_then(|b| b.set_default("search.policy", "source_order"))
            .and_then(|b| b.set_default("default_locale", Locale::default().code()))
            .and_then(|b| b.set_default("http_timeout_secs", 10))
            .and_then(|b| b.set_default("log_filter", "drnoflu=info,tower_http=info"))
            .map_err(|e| AppError::Config(e.to_string()))?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("DRNOFLU")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Default locale, falling back to French for unknown codes.
    pub fn locale(&self) -> Locale {
        Locale::from_code(&self.default_locale).unwrap_or_default()
    }

    pub fn is_demo(&self) -> bool {
        self.supabase_url.as_deref().map_or(true, str::is_empty)
    }
}
