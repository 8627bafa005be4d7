// One-shot lobby actions: dodging the ready check and revealing lobby names

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::lcu_communication::{
  summoner_path, LcuApi, LcuError, CHAMP_SELECT_SESSION, CHAT_PARTICIPANTS, READY_CHECK_DECLINE,
  REGION_LOCALE,
};
use super::lcu_watcher::{ChampSelectSession, RPC_ERROR_SENTINEL};

// Characters that would break a porofessor path segment or name list.
const NAME_SEGMENT: &AsciiSet = &CONTROLS
  .add(b' ')
  .add(b'#')
  .add(b'%')
  .add(b'/')
  .add(b'?')
  .add(b',');

const POROFESSOR_PREGAME: &str = "https://porofessor.gg/pregame";

/// Declines the current ready check.
pub fn dodge(api: &dyn LcuApi) -> Result<(), LcuError> {
  let response = api.post(READY_CHECK_DECLINE, None)?;
  if response.is_success_status() {
    info!("Dodge executed");
    Ok(())
  } else {
    warn!(status = response.status, body = %response.text, "Dodge failed");
    Err(LcuError::Status(response.status))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealReport {
  pub region: String,
  /// `gameName#tagLine` for every teammate found.
  pub players: Vec<String>,
  /// Names came from chat participants because the lobby hides them.
  pub hidden_lobby: bool,
  pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Summoner {
  game_name: String,
  tag_line: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatParticipants {
  participants: Vec<ChatParticipant>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatParticipant {
  cid: String,
  game_name: String,
  game_tag: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RegionLocale {
  web_region: String,
}

pub fn porofessor_url(region: &str, players: &[String]) -> String {
  let names: Vec<String> = players
    .iter()
    .map(|name| utf8_percent_encode(name, NAME_SEGMENT).to_string())
    .collect();
  format!(
    "{}/{}/{}/soloqueue/season",
    POROFESSOR_PREGAME,
    region,
    names.join(",")
  )
}

/// Collects the lobby's Riot ids and builds a porofessor pregame link.
///
/// Lobbies that hide names (ranked) are read from the Riot Client's chat
/// participants instead, which needs `riot_api`.
pub fn reveal(api: &dyn LcuApi, riot_api: Option<&dyn LcuApi>) -> Result<RevealReport, LcuError> {
  let response = api.get(CHAMP_SELECT_SESSION)?;
  if response.status != 200 || response.text.contains(RPC_ERROR_SENTINEL) {
    return Err(LcuError::NotInChampSelect);
  }
  let session: ChampSelectSession = response.json()?;

  let hidden_lobby = session.my_team.iter().any(|member| member.is_name_hidden());
  let players = if hidden_lobby {
    let riot_api = riot_api.ok_or_else(|| {
      LcuError::Unavailable("lobby names are hidden and the Riot Client is not reachable".into())
    })?;
    chat_participant_names(riot_api)?
  } else {
    teammate_names(api, &session)
  };

  let region = match api.get(REGION_LOCALE) {
    Ok(response) if response.status == 200 => response.json::<RegionLocale>()?.web_region,
    Ok(response) => {
      debug!(status = response.status, "Region lookup failed");
      String::new()
    }
    Err(e) => return Err(e),
  };

  if region.is_empty() || players.is_empty() {
    return Err(LcuError::Unavailable(
      "Failed to get region or summoner names".into(),
    ));
  }

  let url = porofessor_url(&region, &players);
  info!(region = %region, players = players.len(), hidden_lobby, "Lobby revealed");
  Ok(RevealReport {
    region,
    players,
    hidden_lobby,
    url,
  })
}

fn teammate_names(api: &dyn LcuApi, session: &ChampSelectSession) -> Vec<String> {
  let mut names = Vec::new();
  for summoner_id in session.my_team.iter().filter_map(|m| m.summoner_id()) {
    match api.get(&summoner_path(&summoner_id)) {
      Ok(response) if response.status == 200 => match response.json::<Summoner>() {
        Ok(summoner) if !summoner.game_name.is_empty() => {
          names.push(format!("{}#{}", summoner.game_name, summoner.tag_line));
        }
        Ok(_) => debug!(summoner_id = %summoner_id, "Summoner has no Riot id"),
        Err(e) => debug!(summoner_id = %summoner_id, error = %e, "Bad summoner payload"),
      },
      Ok(response) => debug!(summoner_id = %summoner_id, status = response.status, "Summoner lookup failed"),
      Err(e) => debug!(summoner_id = %summoner_id, error = %e, "Summoner lookup failed"),
    }
  }
  names
}

fn chat_participant_names(riot_api: &dyn LcuApi) -> Result<Vec<String>, LcuError> {
  let response = riot_api.get(CHAT_PARTICIPANTS)?;
  if response.status != 200 {
    return Err(LcuError::Status(response.status));
  }
  let chat: ChatParticipants = response.json()?;
  Ok(
    chat
      .participants
      .into_iter()
      .filter(|p| p.cid.contains("champ-select") && !p.game_name.is_empty())
      .map(|p| format!("{}#{}", p.game_name, p.game_tag))
      .collect(),
  )
}
