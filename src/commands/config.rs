use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::types::SavedConfig;

// Configuration management

pub const APP_IDENTIFIER: &str = "com.instalock.app";

/// Per-user data directory: `%APPDATA%/com.instalock.app`, or the working directory.
pub fn app_data_dir() -> PathBuf {
  std::env::var("APPDATA")
    .map(|ap| PathBuf::from(ap).join(APP_IDENTIFIER))
    .unwrap_or_else(|_| PathBuf::from("."))
}

pub fn config_file(app_dir: &Path) -> PathBuf {
  app_dir.join("config").join("config.json")
}

pub fn logs_dir(app_dir: &Path) -> PathBuf {
  app_dir.join("logs")
}

/// Loads `config.json`. A missing file is the default configuration.
pub fn load_config(app_dir: &Path) -> Result<SavedConfig, String> {
  let file = config_file(app_dir);
  if !file.exists() {
    return Ok(SavedConfig::default());
  }
  let content = fs::read_to_string(&file).map_err(|e| format!("Failed to read config.json: {}", e))?;
  serde_json::from_str(&content).map_err(|e| format!("Failed to parse config.json: {}", e))
}

/// Writes `config.json`, keeping keys this version does not know about.
pub fn save_config(app_dir: &Path, config: &SavedConfig) -> Result<(), String> {
  let file = config_file(app_dir);
  if let Some(config_dir) = file.parent() {
    fs::create_dir_all(config_dir).map_err(|e| format!("Failed to create config dir: {}", e))?;
  }

  // Read existing config if it exists
  let mut merged: serde_json::Value = match fs::read_to_string(&file) {
    Ok(content) => serde_json::from_str(&content).unwrap_or_else(|_| serde_json::json!({})),
    Err(_) => serde_json::json!({}),
  };
  if !merged.is_object() {
    merged = serde_json::json!({});
  }

  let update = serde_json::to_value(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
  if let (Some(target), serde_json::Value::Object(fields)) = (merged.as_object_mut(), update) {
    for (key, value) in fields {
      target.insert(key, value);
    }
  }

  let data = serde_json::to_string_pretty(&merged)
    .map_err(|e| format!("Failed to serialize config: {}", e))?;
  fs::write(&file, data).map_err(|e| format!("Failed to write config.json: {}", e))
}
