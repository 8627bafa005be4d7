// Champ select automation: shared settings, session parsing and the monitor worker

mod automation;
mod logging;
mod session;
mod types;
mod watcher;

#[cfg(test)]
mod tests;

pub use automation::Automation;
pub use logging::{buffered_logs, export_logs, init_logging, LIVE_LOG_NAME};
pub use session::{ActionGroup, ActionRecord, ChampSelectSession, TeamMember, RPC_ERROR_SENTINEL};
pub use types::{
  AutomationConfig, ChampionTarget, PollSettings, TickOutcome, DISABLED_TARGET, RANDOM_TARGET,
};
pub use watcher::ChampSelectMonitor;
