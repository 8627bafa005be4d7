// Types and constants for the champ select monitor

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Stored target value meaning "automation has no champion".
pub const DISABLED_TARGET: &str = "None";
/// Stored target value meaning "any loaded champion".
pub const RANDOM_TARGET: &str = "Random";

/// Champion an automation submits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChampionTarget {
  #[default]
  Disabled,
  Random,
  /// Lowercase directory key.
  Named(String),
}

impl From<String> for ChampionTarget {
  fn from(value: String) -> Self {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(DISABLED_TARGET) {
      Self::Disabled
    } else if trimmed.eq_ignore_ascii_case(RANDOM_TARGET) {
      Self::Random
    } else {
      Self::Named(trimmed.to_lowercase())
    }
  }
}

impl From<ChampionTarget> for String {
  fn from(value: ChampionTarget) -> Self {
    value.to_string()
  }
}

impl fmt::Display for ChampionTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Disabled => f.write_str(DISABLED_TARGET),
      Self::Random => f.write_str(RANDOM_TARGET),
      Self::Named(name) => f.write_str(name),
    }
  }
}

/// Automation settings read by the monitor on every tick.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
  pub instalock_enabled: bool,
  pub instalock_champion: ChampionTarget,
  pub auto_ban_enabled: bool,
  pub auto_ban_champion: ChampionTarget,
  pub auto_accept_enabled: bool,
}

/// Sleep intervals between monitor ticks, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
  pub active_ms: u64,
  pub idle_ms: u64,
  pub seat_wait_ms: u64,
}

impl Default for PollSettings {
  fn default() -> Self {
    Self {
      active_ms: 200,
      idle_ms: 500,
      seat_wait_ms: 300,
    }
  }
}

impl PollSettings {
  pub fn delay_for(&self, outcome: TickOutcome) -> Duration {
    let ms = match outcome {
      TickOutcome::Idle | TickOutcome::Error => self.idle_ms,
      TickOutcome::AwaitingSeat => self.seat_wait_ms,
      TickOutcome::Scanned => self.active_ms,
    };
    Duration::from_millis(ms)
  }
}

/// What one poll of the champ select session observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
  /// Not in champ select, or the client answered with its error sentinel.
  Idle,
  /// In champ select but the local seat is not known yet.
  AwaitingSeat,
  /// Actions were scanned (and possibly dispatched).
  Scanned,
  /// The poll failed; handled like `Idle` without forgetting the last action.
  Error,
}
