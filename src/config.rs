//! Loading application configuration from TOML plus environment overrides.
//!
//! Schema (every key optional):
//!
//! ```toml
//! challenge_length = 10
//! score_webhook_url = "https://script.google.com/macros/s/.../exec"
//! rng_seed = 42            # reproducible problem sequences
//! static_dir = "./static"
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::session::DEFAULT_CHALLENGE_LENGTH;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Questions per challenge run.
  pub challenge_length: u32,
  /// Spreadsheet webhook for finished challenges; unset disables submission.
  pub score_webhook_url: Option<String>,
  /// Fixed seed for the shared generator; unset seeds from entropy.
  pub rng_seed: Option<u64>,
  pub static_dir: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      challenge_length: DEFAULT_CHALLENGE_LENGTH,
      score_webhook_url: None,
      rng_seed: None,
      static_dir: "./static".into(),
    }
  }
}

pub fn parse_app_config(text: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(text)
}

/// Read a TOML file. On any IO/parsing error, logs and returns None.
pub fn load_app_config(path: &str) -> Option<AppConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match parse_app_config(&s) {
      Ok(cfg) => {
        info!(target: "polygon_practice", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "polygon_practice", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "polygon_practice", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Config from APP_CONFIG_PATH (defaults when absent or broken), then
/// SCORE_WEBHOOK_URL on top.
pub fn load_app_config_from_env() -> AppConfig {
  let mut cfg = std::env::var("APP_CONFIG_PATH")
    .ok()
    .and_then(|path| load_app_config(&path))
    .unwrap_or_default();
  if let Ok(url) = std::env::var("SCORE_WEBHOOK_URL") {
    if !url.trim().is_empty() {
      cfg.score_webhook_url = Some(url);
    }
  }
  if cfg.challenge_length == 0 {
    error!(target: "polygon_practice", "challenge_length must be positive; using the default");
    cfg.challenge_length = DEFAULT_CHALLENGE_LENGTH;
  }
  cfg
}
