//! Runtime configuration
//!
//! Values come from command-line flags with environment fallbacks; `.env`
//! files are loaded first so they can supply those environment values.

use crate::catalog::context::DEFAULT_ROW_LIMIT;
use crate::persona::{DEFAULT_PERSONA, load_persona};
use crate::providers::DEFAULT_BASE_URL;
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Load environment variables from ./.env, then ~/.env.
/// dotenv never overrides a variable that is already set, so the process
/// environment wins over the project file, which wins over the home file.
/// Call this before parsing CLI args so env fallbacks see the values.
pub fn load_env_file() {
    dotenv::dotenv().ok();

    if let Some(home) = dirs::home_dir() {
        dotenv::from_path(home.join(".env")).ok();
    }
}

/// The model API key. Lives only in memory for the session.
///
/// The key is never exported to the process environment; it is handed to
/// the provider explicitly when the model is created.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for a blank key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() { None } else { Some(ApiKey(key)) }
    }

    /// Read the key from [`API_KEY_ENV`], if set and non-blank.
    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV).ok().and_then(Self::new)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Resolved settings for one chat session.
#[derive(Clone, Debug)]
pub struct Settings {
    pub model: String,
    pub base_url: String,
    pub row_limit: usize,
    pub persona: String,
    pub catalog_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            row_limit: DEFAULT_ROW_LIMIT,
            persona: DEFAULT_PERSONA.to_string(),
            catalog_path: None,
        }
    }
}

impl Settings {
    /// Replace the built-in persona with the contents of a file.
    pub fn with_persona_file(mut self, path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            self.persona = load_persona(path)?;
        }
        Ok(self)
    }
}
