// Commands module - Re-exports the automation core and the one-shot actions
pub mod champion_data;
pub mod config;
pub mod lcu_communication;
pub mod lcu_watcher;
pub mod league_detection;
pub mod lobby_actions;
pub mod types;

// Re-export the public surface used by the binary
pub use champion_data::*;
pub use config::*;
pub use lcu_communication::{LcuApi, LcuClient, LcuError, LcuSession};
pub use lcu_watcher::*;
pub use league_detection::*;
pub use lobby_actions::*;
pub use types::*;
