//! Loading service configuration (authoring/summary knobs + optional lab bank) from TOML.
//!
//! See `LabsConfig` for the expected schema:
//!
//! ```toml
//! [authoring]
//! history_limit = 50
//!
//! [summary]
//! max_chars = 160
//!
//! [[labs]]
//! slug = "rust-30"
//! title = "Rust en 30 días"
//!
//! [[labs.days]]
//! day_number = 1
//! title = "Instalación"
//! video_url = "https://youtu.be/dQw4w9WgXcQ"
//! content = "Instala rustup y cargo."
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::blocks::history::DEFAULT_HISTORY_LIMIT;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct LabsConfig {
  #[serde(default)]
  pub authoring: AuthoringCfg,
  #[serde(default)]
  pub summary: SummaryCfg,
  #[serde(default)]
  pub labs: Vec<LabCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthoringCfg {
  /// Undo steps kept per authoring session.
  #[serde(default = "default_history_limit")]
  pub history_limit: usize,
}

impl Default for AuthoringCfg {
  fn default() -> Self {
    Self { history_limit: default_history_limit() }
  }
}

fn default_history_limit() -> usize {
  DEFAULT_HISTORY_LIMIT
}

#[derive(Clone, Debug, Deserialize)]
pub struct SummaryCfg {
  #[serde(default = "default_summary_chars")]
  pub max_chars: usize,
}

impl Default for SummaryCfg {
  fn default() -> Self {
    Self { max_chars: default_summary_chars() }
  }
}

fn default_summary_chars() -> usize {
  160
}

/// Lab entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct LabCfg {
  pub slug: String,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub days: Vec<DayCfg>,
}

/// Day entry; `content` may be a stored JSON payload or legacy plain text.
#[derive(Clone, Debug, Deserialize)]
pub struct DayCfg {
  pub day_number: u32,
  pub title: String,
  #[serde(default)] pub video_url: Option<String>,
  #[serde(default)] pub content: Option<String>,
}

pub fn parse_labs_config(raw: &str) -> Result<LabsConfig, toml::de::Error> {
  toml::from_str::<LabsConfig>(raw)
}

/// Attempt to load `LabsConfig` from LABS_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_labs_config_from_env() -> Option<LabsConfig> {
  let path = std::env::var("LABS_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_labs_config(&s) {
      Ok(cfg) => {
        info!(target: "labs_backend", %path, labs = cfg.labs.len(), "Loaded labs config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "labs_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "labs_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
