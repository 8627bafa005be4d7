// LCU connection details and the request capability shared by the
// champion directory, the champ select monitor and the one-shot lobby actions

use base64::{engine::general_purpose, Engine};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

pub const CHAMP_SELECT_SESSION: &str = "/lol-champ-select/v1/session";
pub const ALL_GRID_CHAMPIONS: &str = "/lol-champ-select/v1/all-grid-champions";
pub const OWNED_CHAMPIONS: &str = "/lol-champions/v1/inventories/local-player/champions";
pub const READY_CHECK: &str = "/lol-matchmaking/v1/ready-check";
pub const READY_CHECK_ACCEPT: &str = "/lol-matchmaking/v1/ready-check/accept";
pub const READY_CHECK_DECLINE: &str = "/lol-matchmaking/v1/ready-check/decline";
pub const REGION_LOCALE: &str = "/riotclient/region-locale";
pub const CHAT_PARTICIPANTS: &str = "/chat/v5/participants";

/// Lockfile names written by the client, in the order they are tried.
pub const LOCKFILE_NAMES: [&str; 3] = [
  "lockfile",
  "LeagueClientUx.lockfile",
  "LeagueClient.lockfile",
];

pub fn champ_select_action_path(action_id: i64) -> String {
  format!("{}/actions/{}", CHAMP_SELECT_SESSION, action_id)
}

pub fn summoner_path(summoner_id: &str) -> String {
  format!("/lol-summoner/v1/summoners/{}", summoner_id)
}

#[derive(Debug)]
pub enum LcuError {
  Transport(String),
  Status(u16),
  Decode(String),
  Lockfile(String),
  NotInChampSelect,
  Unavailable(String),
}

impl LcuError {
  /// Short classification used as a structured log field.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Transport(_) => "transport",
      Self::Status(_) => "status",
      Self::Decode(_) => "decode",
      Self::Lockfile(_) => "lockfile",
      Self::NotInChampSelect => "not_in_champ_select",
      Self::Unavailable(_) => "unavailable",
    }
  }
}

impl fmt::Display for LcuError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Transport(msg) => write!(f, "Transport error: {}", msg),
      Self::Status(code) => write!(f, "Unexpected status code: {}", code),
      Self::Decode(msg) => write!(f, "Malformed response: {}", msg),
      Self::Lockfile(msg) => write!(f, "Lockfile error: {}", msg),
      Self::NotInChampSelect => write!(f, "Not in champion select"),
      Self::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
    }
  }
}

impl std::error::Error for LcuError {}

impl From<reqwest::Error> for LcuError {
  fn from(err: reqwest::Error) -> Self {
    Self::Transport(err.to_string())
  }
}

impl From<serde_json::Error> for LcuError {
  fn from(err: serde_json::Error) -> Self {
    Self::Decode(err.to_string())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
  Get,
  Post,
  Patch,
}

impl HttpMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Get => "GET",
      Self::Post => "POST",
      Self::Patch => "PATCH",
    }
  }
}

#[derive(Debug, Clone)]
pub struct LcuResponse {
  pub status: u16,
  pub text: String,
}

impl LcuResponse {
  /// 200 and 204 are the only statuses the client uses for accepted writes.
  pub fn is_success_status(&self) -> bool {
    matches!(self.status, 200 | 204)
  }

  pub fn json<T: DeserializeOwned>(&self) -> Result<T, LcuError> {
    Ok(serde_json::from_str(&self.text)?)
  }
}

/// Request-issuing capability against a local client API.
pub trait LcuApi: Send + Sync {
  fn request(
    &self,
    method: HttpMethod,
    path: &str,
    body: Option<&serde_json::Value>,
  ) -> Result<LcuResponse, LcuError>;

  fn get(&self, path: &str) -> Result<LcuResponse, LcuError> {
    self.request(HttpMethod::Get, path, None)
  }

  fn post(&self, path: &str, body: Option<&serde_json::Value>) -> Result<LcuResponse, LcuError> {
    self.request(HttpMethod::Post, path, body)
  }

  fn patch(&self, path: &str, body: &serde_json::Value) -> Result<LcuResponse, LcuError> {
    self.request(HttpMethod::Patch, path, Some(body))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcuConnection {
  pub port: String,
  pub token: String,
}

impl LcuConnection {
  pub fn base_url(&self) -> String {
    format!("https://127.0.0.1:{}", self.port)
  }

  pub fn auth_header(&self) -> String {
    let auth = general_purpose::STANDARD.encode(format!("riot:{}", self.token));
    format!("Basic {}", auth)
  }
}

// Lockfile format: name:pid:port:token:protocol
pub fn parse_lockfile(contents: &str) -> Option<LcuConnection> {
  let parts: Vec<&str> = contents.trim().split(':').collect();
  if parts.len() < 5 || parts[2].is_empty() || parts[3].is_empty() {
    return None;
  }
  if parts[2].parse::<u16>().is_err() {
    return None;
  }
  Some(LcuConnection {
    port: parts[2].to_string(),
    token: parts[3].to_string(),
  })
}

pub fn read_lockfile(dir: &Path) -> Result<LcuConnection, LcuError> {
  for name in LOCKFILE_NAMES {
    let path = dir.join(name);
    if let Ok(content) = std::fs::read_to_string(&path) {
      if let Some(connection) = parse_lockfile(&content) {
        debug!(path = %path.display(), port = %connection.port, "Found lockfile");
        return Ok(connection);
      }
    }
  }
  Err(LcuError::Lockfile(format!(
    "No valid lockfile found in {}. Is League running?",
    dir.display()
  )))
}

/// Directory holding the Riot Client lockfile, used for chat participants.
pub fn riot_client_config_dir() -> Option<PathBuf> {
  std::env::var("LOCALAPPDATA").ok().map(|local| {
    PathBuf::from(local)
      .join("Riot Games")
      .join("Riot Client")
      .join("Config")
  })
}

fn build_http_client() -> Result<reqwest::blocking::Client, LcuError> {
  reqwest::blocking::Client::builder()
    .danger_accept_invalid_certs(true)
    .timeout(Duration::from_secs(5))
    .connect_timeout(Duration::from_secs(2))
    .build()
    .map_err(|e| LcuError::Transport(format!("Failed to create HTTP client: {}", e)))
}

fn send_request(
  http: &reqwest::blocking::Client,
  connection: &LcuConnection,
  method: HttpMethod,
  path: &str,
  body: Option<&serde_json::Value>,
) -> Result<LcuResponse, LcuError> {
  let url = format!("{}{}", connection.base_url(), path);
  let mut request = match method {
    HttpMethod::Get => http.get(&url),
    HttpMethod::Post => http.post(&url),
    HttpMethod::Patch => http.patch(&url),
  };
  request = request
    .header("Authorization", connection.auth_header())
    .header("Accept", "application/json");
  if let Some(body) = body {
    request = request.json(body);
  }

  let response = request.send()?;
  let status = response.status().as_u16();
  let text = response.text()?;
  Ok(LcuResponse { status, text })
}

/// Client bound to one set of lockfile credentials.
pub struct LcuClient {
  connection: LcuConnection,
  http: reqwest::blocking::Client,
}

impl LcuClient {
  pub fn new(connection: LcuConnection) -> Result<Self, LcuError> {
    Ok(Self {
      connection,
      http: build_http_client()?,
    })
  }

  pub fn from_league_dir(dir: &Path) -> Result<Self, LcuError> {
    Self::new(read_lockfile(dir)?)
  }

  pub fn connection(&self) -> &LcuConnection {
    &self.connection
  }
}

impl LcuApi for LcuClient {
  fn request(
    &self,
    method: HttpMethod,
    path: &str,
    body: Option<&serde_json::Value>,
  ) -> Result<LcuResponse, LcuError> {
    send_request(&self.http, &self.connection, method, path, body)
  }
}

/// Client that re-reads the lockfile whenever it has no usable credentials.
///
/// The client writes a fresh port and token on every launch, so a long
/// running monitor cannot hold on to the credentials it started with. A
/// transport failure drops the cached connection and the next request
/// rediscovers it.
pub struct LcuSession {
  league_dir: PathBuf,
  http: reqwest::blocking::Client,
  connection: Mutex<Option<LcuConnection>>,
}

impl LcuSession {
  pub fn new(league_dir: impl Into<PathBuf>) -> Result<Self, LcuError> {
    Ok(Self {
      league_dir: league_dir.into(),
      http: build_http_client()?,
      connection: Mutex::new(None),
    })
  }

  pub fn league_dir(&self) -> &Path {
    &self.league_dir
  }

  fn current_connection(&self) -> Result<LcuConnection, LcuError> {
    let mut cached = self.connection.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(connection) = cached.as_ref() {
      return Ok(connection.clone());
    }
    let connection = read_lockfile(&self.league_dir)?;
    info!(port = %connection.port, "Connected to League client");
    *cached = Some(connection.clone());
    Ok(connection)
  }

  fn forget_connection(&self) {
    let mut cached = self.connection.lock().unwrap_or_else(|e| e.into_inner());
    if cached.take().is_some() {
      info!("Lost League client connection, will re-read lockfile");
    }
  }
}

impl LcuApi for LcuSession {
  fn request(
    &self,
    method: HttpMethod,
    path: &str,
    body: Option<&serde_json::Value>,
  ) -> Result<LcuResponse, LcuError> {
    let connection = self.current_connection()?;
    let result = send_request(&self.http, &connection, method, path, body);
    if let Err(LcuError::Transport(_)) = &result {
      self.forget_connection();
    }
    result
  }
}
