// Champion directory: resolves typed champion names to the ids the client expects

use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::{debug, info, warn};

use super::lcu_communication::{LcuApi, ALL_GRID_CHAMPIONS, OWNED_CHAMPIONS};

/// Numeric form of "no champion matched".
pub const UNKNOWN_CHAMPION_ID: i64 = -1;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct RosterEntry {
  #[serde(default)]
  id: Option<i64>,
  #[serde(default)]
  name: Option<String>,
}

// Names in roster order; lookups by key go through `by_name`.
#[derive(Debug, Default)]
struct ChampionIndex {
  entries: Vec<(String, i64)>,
  by_name: HashMap<String, usize>,
}

impl ChampionIndex {
  fn from_roster(roster: Vec<RosterEntry>) -> Self {
    let mut index = Self::default();
    for entry in roster {
      let (Some(id), Some(name)) = (entry.id, entry.name) else {
        continue;
      };
      let key = normalize(&name);
      if id <= 0 || key.is_empty() || index.by_name.contains_key(&key) {
        continue;
      }
      index.by_name.insert(key.clone(), index.entries.len());
      index.entries.push((key, id));
    }
    index
  }

  fn len(&self) -> usize {
    self.entries.len()
  }

  fn lookup(&self, key: &str) -> Option<(String, i64)> {
    if let Some(&pos) = self.by_name.get(key) {
      return Some(self.entries[pos].clone());
    }
    // First hit in roster order wins; short queries are ambiguous.
    self
      .entries
      .iter()
      .find(|(name, _)| name.contains(key) || key.contains(name.as_str()))
      .cloned()
  }
}

fn normalize(name: &str) -> String {
  name.trim().to_lowercase()
}

/// Capitalizes the first letter of every alphabetic run ("kai'sa" -> "Kai'Sa").
pub fn title_case(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  let mut prev_alpha = false;
  for c in name.chars() {
    if c.is_alphabetic() {
      if prev_alpha {
        out.extend(c.to_lowercase());
      } else {
        out.extend(c.to_uppercase());
      }
      prev_alpha = true;
    } else {
      out.push(c);
      prev_alpha = false;
    }
  }
  out
}

/// Process-wide name to id map, built from the client's roster.
///
/// One instance is shared by the front end and the champ select monitor.
/// The map is replaced wholesale on refresh; refreshes are serialized so
/// concurrent lookups against an empty directory fetch the roster once.
pub struct ChampionDirectory {
  api: Arc<dyn LcuApi>,
  index: RwLock<ChampionIndex>,
  refresh_lock: Mutex<()>,
  // Set after the first failed load is logged; cleared by a successful one.
  failure_reported: AtomicBool,
}

impl ChampionDirectory {
  pub fn new(api: Arc<dyn LcuApi>) -> Self {
    Self {
      api,
      index: RwLock::new(ChampionIndex::default()),
      refresh_lock: Mutex::new(()),
      failure_reported: AtomicBool::new(false),
    }
  }

  fn refresh_guard(&self) -> MutexGuard<'_, ()> {
    self.refresh_lock.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn read_index<R>(&self, f: impl FnOnce(&ChampionIndex) -> R) -> R {
    let index = self.index.read().unwrap_or_else(|e| e.into_inner());
    f(&index)
  }

  /// Reloads the roster. Returns whether at least one champion was loaded.
  pub fn refresh(&self) -> bool {
    let _guard = self.refresh_guard();
    self.refresh_locked()
  }

  fn refresh_locked(&self) -> bool {
    let Some(index) = self.fetch_roster() else {
      if self.failure_reported.swap(true, Ordering::Relaxed) {
        debug!("Champion list still unavailable");
      } else {
        warn!("Failed to load champion list. Make sure League Client is running!");
      }
      return false;
    };
    let count = index.len();
    *self.index.write().unwrap_or_else(|e| e.into_inner()) = index;
    self.failure_reported.store(false, Ordering::Relaxed);
    info!(count, "Champion list loaded");
    true
  }

  fn fetch_roster(&self) -> Option<ChampionIndex> {
    for path in [ALL_GRID_CHAMPIONS, OWNED_CHAMPIONS] {
      let response = match self.api.get(path) {
        Ok(response) => response,
        Err(e) => {
          debug!(path, error = %e, kind = e.kind(), "Champion roster request failed");
          return None;
        }
      };
      if response.status != 200 {
        debug!(path, status = response.status, "Champion roster endpoint unavailable");
        continue;
      }
      match response.json::<Vec<RosterEntry>>() {
        Ok(roster) => {
          let index = ChampionIndex::from_roster(roster);
          if !index.entries.is_empty() {
            return Some(index);
          }
          debug!(path, "Champion roster was empty");
        }
        Err(e) => debug!(path, error = %e, "Failed to parse champion roster"),
      }
    }
    None
  }

  /// Loads the roster if nothing is loaded yet. Returns whether the directory is usable.
  pub fn ensure_loaded(&self) -> bool {
    if !self.is_empty() {
      return true;
    }
    let _guard = self.refresh_guard();
    // Another caller may have loaded it while we waited.
    if !self.is_empty() {
      return true;
    }
    self.refresh_locked()
  }

  pub fn len(&self) -> usize {
    self.read_index(|index| index.len())
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn ids(&self) -> Vec<i64> {
    self.read_index(|index| index.entries.iter().map(|(_, id)| *id).collect())
  }

  /// Directory key and id for a typed name: exact match first, then substring in either direction.
  pub fn lookup(&self, name: &str) -> Option<(String, i64)> {
    let key = normalize(name);
    if key.is_empty() {
      return None;
    }
    self.ensure_loaded();
    self.read_index(|index| index.lookup(&key))
  }

  pub fn resolve(&self, name: &str) -> Option<i64> {
    self.lookup(name).map(|(_, id)| id)
  }

  /// `resolve` with the not-found case mapped to [`UNKNOWN_CHAMPION_ID`].
  pub fn resolve_id(&self, name: &str) -> i64 {
    self.resolve(name).unwrap_or(UNKNOWN_CHAMPION_ID)
  }

  pub fn canonical_name(&self, name: &str) -> Option<String> {
    self.lookup(name).map(|(key, _)| key)
  }

  /// Up to `limit` title-cased names containing `partial`.
  pub fn suggest(&self, partial: &str, limit: usize) -> Vec<String> {
    let partial = normalize(partial);
    self.read_index(|index| {
      index
        .entries
        .iter()
        .filter(|(name, _)| name.contains(&partial))
        .take(limit)
        .map(|(name, _)| title_case(name))
        .collect()
    })
  }

  /// Uniformly random id among loaded champions.
  pub fn random_id(&self) -> Option<i64> {
    if !self.ensure_loaded() {
      return None;
    }
    self.read_index(|index| {
      index
        .entries
        .choose(&mut rand::thread_rng())
        .map(|(_, id)| *id)
    })
  }
}
