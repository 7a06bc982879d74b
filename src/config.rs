use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "HOPE";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Upper bound for the routing suggestion call. A slow model must not hold
/// the caller; on expiry the router scores deterministically.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 5;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "hope_lib=info,hope=info,tower_http=warn"
}

/// Get the application data directory (~/Hope/)
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("Hope")
}

/// Default SQLite database location.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("hope.db")
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub db_path: PathBuf,
    pub listen_addr: String,
    /// `None` disables the AI suggestion step entirely.
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub ai_timeout: Duration,
    /// Optional JSON file overriding the built-in routing lexicon.
    pub lexicon_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            ai_timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            lexicon_path: None,
        }
    }
}

impl ServiceConfig {
    /// Build the config from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (testable without
    /// touching the process environment).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let ai_timeout = match non_empty("HOPE_AI_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %raw, "Ignoring invalid HOPE_AI_TIMEOUT_SECS");
                    defaults.ai_timeout
                }
            },
            None => defaults.ai_timeout,
        };

        Self {
            db_path: non_empty("HOPE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            listen_addr: non_empty("HOPE_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_base_url: non_empty("HOPE_GEMINI_BASE_URL")
                .unwrap_or(defaults.gemini_base_url),
            gemini_model: non_empty("HOPE_GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            ai_timeout,
            lexicon_path: non_empty("HOPE_ROUTING_LEXICON").map(PathBuf::from),
        }
    }
}
