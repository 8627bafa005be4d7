#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;

// League of Legends directory detection

// Common League of Legends installation paths on Windows
const COMMON_PATHS: [&str; 3] = [
  r"C:\Riot Games\League of Legends",
  r"C:\Program Files\Riot Games\League of Legends",
  r"C:\Program Files (x86)\Riot Games\League of Legends",
];

/// True when `path` holds the client executable, the game executable, or a lockfile.
pub fn is_league_dir(path: &Path) -> bool {
  path.join("LeagueClient.exe").exists()
    || path.join("Game").join("League of Legends.exe").exists()
    || crate::commands::lcu_communication::LOCKFILE_NAMES
      .iter()
      .any(|name| path.join(name).exists())
}

pub fn auto_detect_league() -> Result<String, String> {
  for path in COMMON_PATHS.iter() {
    let client_path = Path::new(path).join("LeagueClient.exe");
    if client_path.exists() {
      return Ok(path.to_string());
    }
  }

  // Try to find through registry as fallback
  let mut command = Command::new("powershell");
  #[cfg(target_os = "windows")]
  command.creation_flags(0x08000000); // CREATE_NO_WINDOW flag

  command.args([
    "-NoProfile",
    "-Command",
    r#"Get-ItemProperty -Path 'HKLM:\SOFTWARE\WOW6432Node\Riot Games, Inc\League of Legends' -Name 'Location' -ErrorAction SilentlyContinue | Select-Object -ExpandProperty Location"#,
  ]);

  if let Ok(output) = command.output() {
    if output.status.success() {
      if let Ok(path) = String::from_utf8(output.stdout) {
        let path = path.trim();
        if !path.is_empty() {
          let path = Path::new(path);
          if path.join("LeagueClient.exe").exists() {
            return Ok(path.to_string_lossy().to_string());
          }
        }
      }
    }
  }

  Err("League of Legends installation not found".to_string())
}

/// Picks the League directory: explicit argument, then saved config, then auto-detection.
pub fn resolve_league_dir(explicit: Option<&str>, saved: Option<&str>) -> Result<PathBuf, String> {
  if let Some(path) = explicit {
    let path = PathBuf::from(path);
    if !path.is_dir() {
      return Err(format!("{} is not a directory", path.display()));
    }
    return Ok(path);
  }
  if let Some(path) = saved.map(PathBuf::from) {
    if is_league_dir(&path) {
      return Ok(path);
    }
  }
  auto_detect_league().map(PathBuf::from)
}
