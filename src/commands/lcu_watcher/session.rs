// Champ select session snapshot as returned by the client

use serde::Deserialize;

pub const PICK: &str = "pick";
pub const BAN: &str = "ban";

/// Body marker the client uses for internal failures on an otherwise normal response.
pub const RPC_ERROR_SENTINEL: &str = "RPC_ERROR";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChampSelectSession {
  pub local_player_cell_id: Option<i64>,
  pub actions: Vec<ActionGroup>,
  pub my_team: Vec<TeamMember>,
}

/// One pick/ban round. Anything that is not a list of actions is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ActionGroup {
  Actions(Vec<ActionRecord>),
  Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionRecord {
  pub id: Option<i64>,
  pub actor_cell_id: Option<i64>,
  #[serde(rename = "type")]
  pub action_type: String,
  pub is_in_progress: bool,
  pub completed: bool,
  pub champion_id: Option<i64>,
}

impl ActionGroup {
  pub fn actions(&self) -> &[ActionRecord] {
    match self {
      Self::Actions(actions) => actions,
      Self::Other(_) => &[],
    }
  }
}

impl ActionRecord {
  pub fn is_pick(&self) -> bool {
    self.action_type == PICK
  }

  pub fn is_ban(&self) -> bool {
    self.action_type == BAN
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMember {
  pub cell_id: Option<i64>,
  pub champion_id: Option<i64>,
  pub summoner_id: serde_json::Value,
  pub name_visibility_type: Option<String>,
}

impl TeamMember {
  pub fn is_name_hidden(&self) -> bool {
    self.name_visibility_type.as_deref() == Some("HIDDEN")
  }

  /// Summoner id as a path segment; bots and empty seats report 0.
  pub fn summoner_id(&self) -> Option<String> {
    let id = match &self.summoner_id {
      serde_json::Value::Number(n) => n.to_string(),
      serde_json::Value::String(s) => s.clone(),
      _ => return None,
    };
    if id.is_empty() || id == "0" {
      None
    } else {
      Some(id)
    }
  }
}

impl ChampSelectSession {
  pub fn all_actions(&self) -> impl Iterator<Item = &ActionRecord> {
    self.actions.iter().flat_map(ActionGroup::actions)
  }

  /// Actions owned by `cell_id` that are still open and not the one we last handled.
  pub fn pending_actions_for(
    &self,
    cell_id: i64,
    last_handled: Option<i64>,
  ) -> impl Iterator<Item = &ActionRecord> {
    self.all_actions().filter(move |action| {
      action.actor_cell_id == Some(cell_id)
        && !action.completed
        && action.id.is_some()
        && action.id != last_handled
    })
  }
}
