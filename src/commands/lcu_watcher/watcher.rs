// Champ select monitor: polls the session and completes the local player's pick/ban

use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::automation::Automation;
use super::session::{ActionRecord, ChampSelectSession, RPC_ERROR_SENTINEL};
use super::types::{AutomationConfig, ChampionTarget, PollSettings, TickOutcome};
use crate::commands::champion_data::ChampionDirectory;
use crate::commands::lcu_communication::{
  champ_select_action_path, LcuApi, LcuError, CHAMP_SELECT_SESSION, READY_CHECK,
  READY_CHECK_ACCEPT,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ReadyCheck {
  state: String,
  player_response: String,
}

/// State and collaborators of one poll loop.
struct MonitorCore {
  api: Arc<dyn LcuApi>,
  automation: Arc<Automation>,
  poll: PollSettings,
  last_handled_action_id: Mutex<Option<i64>>,
}

impl MonitorCore {
  fn directory(&self) -> &ChampionDirectory {
    self.automation.directory()
  }

  fn last_handled(&self) -> MutexGuard<'_, Option<i64>> {
    self
      .last_handled_action_id
      .lock()
      .unwrap_or_else(|e| e.into_inner())
  }

  fn tick(&self) -> TickOutcome {
    let config = self.automation.snapshot();

    if config.auto_accept_enabled {
      if let Err(e) = self.accept_ready_check() {
        debug!(error = %e, kind = e.kind(), "Ready check poll failed");
      }
    }

    if config.instalock_enabled || config.auto_ban_enabled {
      self.directory().ensure_loaded();
    }

    match self.scan_session(&config) {
      Ok(outcome) => outcome,
      Err(e) => {
        match e {
          LcuError::Transport(_) | LcuError::Lockfile(_) => {
            debug!(error = %e, kind = e.kind(), "Champ select poll failed")
          }
          _ => warn!(error = %e, kind = e.kind(), "Champ select poll failed"),
        }
        TickOutcome::Error
      }
    }
  }

  fn scan_session(&self, config: &AutomationConfig) -> Result<TickOutcome, LcuError> {
    let response = self.api.get(CHAMP_SELECT_SESSION)?;
    if response.status != 200 || response.text.contains(RPC_ERROR_SENTINEL) {
      *self.last_handled() = None;
      return Ok(TickOutcome::Idle);
    }

    let session: ChampSelectSession = response.json()?;
    let Some(cell_id) = session.local_player_cell_id else {
      return Ok(TickOutcome::AwaitingSeat);
    };

    let last_handled = *self.last_handled();
    for action in session.pending_actions_for(cell_id, last_handled) {
      let Some(champion_id) = self.champion_for(action, config) else {
        continue;
      };
      self.submit(action, champion_id);
    }
    Ok(TickOutcome::Scanned)
  }

  /// Champion to submit for `action`, if an enabled automation covers it.
  fn champion_for(&self, action: &ActionRecord, config: &AutomationConfig) -> Option<i64> {
    // The tick already tried to load the roster; an empty one means nothing can resolve.
    if !action.is_in_progress || self.directory().is_empty() {
      return None;
    }
    let (target, random_allowed) = if action.is_pick() && config.instalock_enabled {
      (&config.instalock_champion, true)
    } else if action.is_ban() && config.auto_ban_enabled {
      (&config.auto_ban_champion, false)
    } else {
      return None;
    };

    match target {
      ChampionTarget::Disabled => None,
      ChampionTarget::Random if random_allowed => self.directory().random_id(),
      ChampionTarget::Random => {
        debug!(action_id = ?action.id, "Random is not a ban target, skipping");
        None
      }
      ChampionTarget::Named(name) => self.directory().resolve(name),
    }
  }

  // A rejected or failed patch leaves the action pending, so the next tick retries it.
  fn submit(&self, action: &ActionRecord, champion_id: i64) {
    let Some(action_id) = action.id else {
      return;
    };
    let body = json!({ "completed": true, "championId": champion_id });
    match self.api.patch(&champ_select_action_path(action_id), &body) {
      Ok(response) if response.is_success_status() => {
        *self.last_handled() = Some(action_id);
        info!(
          action_id,
          champion_id,
          action = %action.action_type,
          "Completed champ select action"
        );
      }
      Ok(response) => {
        debug!(action_id, status = response.status, "Action patch rejected");
      }
      Err(e) => {
        debug!(action_id, error = %e, kind = e.kind(), "Action patch failed");
      }
    }
  }

  fn accept_ready_check(&self) -> Result<(), LcuError> {
    let response = self.api.get(READY_CHECK)?;
    if response.status != 200 {
      return Ok(());
    }
    let ready_check: ReadyCheck = response.json()?;
    if ready_check.state != "InProgress" || ready_check.player_response != "None" {
      return Ok(());
    }
    let response = self.api.post(READY_CHECK_ACCEPT, None)?;
    if !response.is_success_status() {
      return Err(LcuError::Status(response.status));
    }
    info!("Match accepted");
    Ok(())
  }

  fn run(&self, token: CancellationToken) {
    info!("Champ select monitor started");
    while !token.is_cancelled() {
      let outcome = self.tick();
      thread::sleep(self.poll.delay_for(outcome));
    }
    info!("Champ select monitor stopped");
  }
}

/// Background worker that automates the local player's champ select actions.
///
/// At most one worker thread runs per monitor. `stop` is cooperative: the
/// loop notices the cancellation at the top of its next iteration.
pub struct ChampSelectMonitor {
  core: Arc<MonitorCore>,
  worker: Mutex<Option<(JoinHandle<()>, CancellationToken)>>,
}

impl ChampSelectMonitor {
  pub fn new(api: Arc<dyn LcuApi>, automation: Arc<Automation>, poll: PollSettings) -> Self {
    Self {
      core: Arc::new(MonitorCore {
        api,
        automation,
        poll,
        last_handled_action_id: Mutex::new(None),
      }),
      worker: Mutex::new(None),
    }
  }

  fn worker(&self) -> MutexGuard<'_, Option<(JoinHandle<()>, CancellationToken)>> {
    self.worker.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn automation(&self) -> &Arc<Automation> {
    &self.core.automation
  }

  /// Id of the last action this monitor completed in the current session.
  pub fn last_handled_action_id(&self) -> Option<i64> {
    *self.core.last_handled()
  }

  /// One poll iteration. The worker calls this in a loop.
  pub fn tick(&self) -> TickOutcome {
    self.core.tick()
  }

  /// Starts the worker unless one is already alive. Returns whether a new worker was spawned.
  ///
  /// A worker that was stopped but is still inside its last tick is joined first.
  pub fn start(&self) -> bool {
    let mut worker = self.worker();
    if let Some((handle, token)) = worker.as_ref() {
      if !handle.is_finished() && !token.is_cancelled() {
        return false;
      }
    }
    // A stopped worker may still be finishing its last tick; let it exit before replacing it.
    if let Some((handle, _)) = worker.take() {
      if handle.join().is_err() {
        warn!("Champ select monitor thread panicked");
      }
    }
    let token = CancellationToken::new();
    let core = Arc::clone(&self.core);
    let worker_token = token.clone();
    let handle = thread::Builder::new()
      .name("champ-select-monitor".into())
      .spawn(move || core.run(worker_token));
    match handle {
      Ok(handle) => {
        *worker = Some((handle, token));
        true
      }
      Err(e) => {
        warn!(error = %e, "Failed to spawn champ select monitor");
        false
      }
    }
  }

  pub fn is_running(&self) -> bool {
    self
      .worker()
      .as_ref()
      .map(|(handle, token)| !handle.is_finished() && !token.is_cancelled())
      .unwrap_or(false)
  }

  /// Requests the worker to exit at its next iteration boundary.
  pub fn stop(&self) {
    if let Some((_, token)) = self.worker().as_ref() {
      token.cancel();
    }
  }

  /// Stops the worker and waits for its thread to exit.
  pub fn stop_and_join(&self) {
    let worker = self.worker().take();
    if let Some((handle, token)) = worker {
      token.cancel();
      if handle.join().is_err() {
        warn!("Champ select monitor thread panicked");
      }
    }
  }
}

impl Drop for ChampSelectMonitor {
  fn drop(&mut self) {
    self.stop();
  }
}
