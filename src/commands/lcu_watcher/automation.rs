// Automation settings shared between the front end and the monitor thread

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use super::types::{AutomationConfig, ChampionTarget};
use crate::commands::champion_data::{ChampionDirectory, DEFAULT_SUGGESTION_LIMIT};

/// Inputs that switch an automation off instead of naming a champion.
fn is_disable_input(name: &str) -> bool {
  name == "99" || name.eq_ignore_ascii_case("disable")
}

/// Owns the [`AutomationConfig`] behind a mutex.
///
/// Writers are the front end's setters and toggles; the monitor reads a
/// snapshot once per tick, so a change becomes visible within one poll
/// interval.
pub struct Automation {
  directory: Arc<ChampionDirectory>,
  config: Mutex<AutomationConfig>,
}

impl Automation {
  pub fn new(directory: Arc<ChampionDirectory>) -> Self {
    Self::with_config(directory, AutomationConfig::default())
  }

  pub fn with_config(directory: Arc<ChampionDirectory>, config: AutomationConfig) -> Self {
    Self {
      directory,
      config: Mutex::new(config),
    }
  }

  pub fn directory(&self) -> &Arc<ChampionDirectory> {
    &self.directory
  }

  fn config(&self) -> MutexGuard<'_, AutomationConfig> {
    self.config.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn snapshot(&self) -> AutomationConfig {
    self.config().clone()
  }

  /// Sets the instalock champion. Accepts a champion name, "random", or "99"/"disable".
  ///
  /// Returns false and leaves the configuration untouched when the name
  /// does not resolve.
  pub fn set_instalock_target(&self, name: &str) -> bool {
    let name = name.trim();
    if is_disable_input(name) {
      let mut config = self.config();
      config.instalock_enabled = false;
      config.instalock_champion = ChampionTarget::Disabled;
      info!("Instalock disabled");
      return true;
    }

    if name.eq_ignore_ascii_case("random") {
      if !self.directory.ensure_loaded() {
        warn!("Champion list not loaded yet. Make sure League Client is running!");
        return false;
      }
      let mut config = self.config();
      config.instalock_champion = ChampionTarget::Random;
      config.instalock_enabled = true;
      info!("Instalock set to a random champion");
      return true;
    }

    let Some(champion) = self.resolve_target(name) else {
      return false;
    };
    let mut config = self.config();
    config.instalock_champion = ChampionTarget::Named(champion.clone());
    config.instalock_enabled = true;
    info!(champion = %champion, "Instalock champion set");
    true
  }

  /// Sets the auto-ban champion. Accepts a champion name or "99"/"disable".
  pub fn set_auto_ban_target(&self, name: &str) -> bool {
    let name = name.trim();
    if is_disable_input(name) {
      let mut config = self.config();
      config.auto_ban_enabled = false;
      config.auto_ban_champion = ChampionTarget::Disabled;
      info!("Auto ban disabled");
      return true;
    }

    let Some(champion) = self.resolve_target(name) else {
      return false;
    };
    let mut config = self.config();
    config.auto_ban_champion = ChampionTarget::Named(champion.clone());
    config.auto_ban_enabled = true;
    info!(champion = %champion, "Auto ban champion set");
    true
  }

  // Logs suggestions on a miss so the caller only has to report the failure.
  fn resolve_target(&self, name: &str) -> Option<String> {
    if let Some(champion) = self.directory.canonical_name(name) {
      return Some(champion);
    }
    let suggestions = self.directory.suggest(name, DEFAULT_SUGGESTION_LIMIT);
    if !suggestions.is_empty() {
      info!("Did you mean: {}?", suggestions.join(", "));
    }
    if self.directory.is_empty() {
      warn!("Champion list not loaded. Make sure League Client is running!");
    } else {
      info!(total = self.directory.len(), name, "Unknown champion");
    }
    None
  }

  /// Suggestions for a name the setters rejected.
  pub fn suggestions_for(&self, name: &str) -> Vec<String> {
    self.directory.suggest(name, DEFAULT_SUGGESTION_LIMIT)
  }

  pub fn toggle_instalock(&self) -> bool {
    let mut config = self.config();
    config.instalock_enabled = !config.instalock_enabled;
    info!(enabled = config.instalock_enabled, "Instalock toggled");
    config.instalock_enabled
  }

  pub fn toggle_auto_ban(&self) -> bool {
    let mut config = self.config();
    config.auto_ban_enabled = !config.auto_ban_enabled;
    info!(enabled = config.auto_ban_enabled, "Auto ban toggled");
    config.auto_ban_enabled
  }

  pub fn toggle_auto_accept(&self) -> bool {
    let mut config = self.config();
    config.auto_accept_enabled = !config.auto_accept_enabled;
    info!(enabled = config.auto_accept_enabled, "Auto accept toggled");
    config.auto_accept_enabled
  }
}
