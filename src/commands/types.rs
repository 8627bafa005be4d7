use serde::{Deserialize, Serialize};

use super::lcu_watcher::{AutomationConfig, PollSettings};

// Data structures persisted between runs

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedConfig {
  #[serde(default)]
  pub league_path: Option<String>,
  #[serde(default)]
  pub automation: AutomationConfig,
  #[serde(default)]
  pub poll: PollSettings,
}
