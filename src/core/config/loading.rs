//! Configuration discovery: file lookup plus environment overrides.

use std::env;
use std::path::{Path, PathBuf};

use crate::core::config::{Config, ConfigBuilder, ConfigFile};
use crate::core::error::{AppError, Result};

const FILE_NAME: &str = "dash-pilot.toml";

fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(FILE_NAME)];
    if let Ok(home) = env::var("HOME") {
        candidates.push(PathBuf::from(home).join(".dash-pilot").join("config.toml"));
    }
    candidates
}

fn read_file(path: &Path) -> Result<ConfigFile> {
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("Failed to parse {}: {e}", path.display())))
}

fn apply_env_overrides(mut builder: ConfigBuilder) -> ConfigBuilder {
    if let Ok(value) = env::var("INFINITYFREE_COOKIES") {
        builder = builder.cookie_string(value);
    }
    if let Ok(value) = env::var("INFINITYFREE_EMAIL") {
        builder = builder.email(value);
    }
    if let Ok(value) = env::var("INFINITYFREE_PASSWORD") {
        builder = builder.password(value);
    }
    if let Ok(value) = env::var("WEBDRIVER_URL") {
        builder = builder.webdriver_url(value);
    }
    if let Ok(value) = env::var("CHROMIUM_PATH") {
        builder = builder.browser_path(value);
    }
    if let Ok(value) = env::var("CHROMEDRIVER_PATH") {
        builder = builder.chromedriver_path(value);
    }
    if let Ok(value) = env::var("CAPTCHA_SOLVER_URL") {
        builder = builder.captcha_solver_url(value);
    }
    if let Ok(value) = env::var("CAPTCHA_API_KEY") {
        builder = builder.captcha_api_key(value);
    }
    if let Ok(value) = env::var("CAPTCHA_REMOTE_BROWSER") {
        builder = builder.captcha_remote_browser(value == "1" || value.eq_ignore_ascii_case("true"));
    }
    builder
}

/// Loads the runtime configuration.
///
/// An explicitly passed path must exist; otherwise the default candidates
/// (`./dash-pilot.toml`, `~/.dash-pilot/config.toml`) are tried in order and
/// silently skipped when absent. Environment variables override file values.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut builder = ConfigBuilder::new();

    if let Some(path) = explicit_path {
        if !path.is_file() {
            return Err(AppError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        tracing::info!("Loading configuration from {}", path.display());
        builder = builder.with_file(read_file(path)?, Some(path.display().to_string()));
    } else if let Some(path) = candidate_paths().into_iter().find(|p| p.is_file()) {
        tracing::debug!("Loading configuration from {}", path.display());
        builder = builder.with_file(read_file(&path)?, Some(path.display().to_string()));
    }

    apply_env_overrides(builder).build()
}
