// Headless front end for the champ select automation

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use instalock_lib::commands::lcu_communication::riot_client_config_dir;
use instalock_lib::commands::{
  app_data_dir, dodge, export_logs, init_logging, load_config, logs_dir, resolve_league_dir,
  reveal, save_config, Automation, ChampSelectMonitor, ChampionDirectory, LcuApi, LcuClient,
  LcuSession, SavedConfig, DEFAULT_SUGGESTION_LIMIT,
};
use tracing::{error, info, warn};

const USAGE: &str = "usage: instalock [--league-dir DIR] <command>

commands:
  run [--instalock NAME] [--ban NAME] [--accept]
                     watch champ select until Enter is pressed
  resolve NAME       print the champion id for NAME
  suggest PARTIAL    list champions whose name contains PARTIAL
  dodge              decline the current ready check
  reveal             print a porofessor link for the lobby
  logs               export the collected logs";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
  Run {
    instalock: Option<String>,
    ban: Option<String>,
    accept: bool,
  },
  Resolve(String),
  Suggest(String),
  Dodge,
  Reveal,
  Logs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
  league_dir: Option<String>,
  command: Command,
}

fn flag_value(flag: &str, args: &mut impl Iterator<Item = String>) -> Result<String, String> {
  args
    .next()
    .filter(|value| !value.starts_with("--"))
    .ok_or_else(|| format!("{} needs a value", flag))
}

// Champion names may contain spaces ("Miss Fortune"), so the rest of the line is one argument.
fn rest_as_name(command: &str, args: impl Iterator<Item = String>) -> Result<String, String> {
  let name = args.collect::<Vec<_>>().join(" ");
  if name.trim().is_empty() {
    return Err(format!("{} needs a champion name", command));
  }
  Ok(name)
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
  let mut args = args.into_iter();
  let mut league_dir = None;

  let command = loop {
    match args.next().as_deref() {
      Some("--league-dir") => league_dir = Some(flag_value("--league-dir", &mut args)?),
      Some(command) => break command.to_string(),
      None => return Err("missing command".to_string()),
    }
  };

  let command = match command.as_str() {
    "run" => {
      let mut instalock = None;
      let mut ban = None;
      let mut accept = false;
      while let Some(flag) = args.next() {
        match flag.as_str() {
          "--instalock" => instalock = Some(flag_value("--instalock", &mut args)?),
          "--ban" => ban = Some(flag_value("--ban", &mut args)?),
          "--accept" => accept = true,
          other => return Err(format!("unknown option for run: {}", other)),
        }
      }
      Command::Run {
        instalock,
        ban,
        accept,
      }
    }
    "resolve" => Command::Resolve(rest_as_name("resolve", args)?),
    "suggest" => Command::Suggest(rest_as_name("suggest", args)?),
    "dodge" => Command::Dodge,
    "reveal" => Command::Reveal,
    "logs" => Command::Logs,
    other => return Err(format!("unknown command: {}", other)),
  };

  Ok(CliArgs {
    league_dir,
    command,
  })
}

fn open_session(league_dir: &Path) -> Result<Arc<dyn LcuApi>, String> {
  let session =
    LcuSession::new(league_dir).map_err(|e| format!("Failed to create LCU session: {}", e))?;
  Ok(Arc::new(session))
}

fn print_suggestions(directory: &ChampionDirectory, name: &str) {
  let suggestions = directory.suggest(name, DEFAULT_SUGGESTION_LIMIT);
  if !suggestions.is_empty() {
    println!("Did you mean: {}?", suggestions.join(", "));
  }
}

fn run_monitor(
  app_dir: &Path,
  mut saved: SavedConfig,
  league_dir: PathBuf,
  instalock: Option<String>,
  ban: Option<String>,
  accept: bool,
) -> Result<(), String> {
  let api = open_session(&league_dir)?;
  let directory = Arc::new(ChampionDirectory::new(Arc::clone(&api)));
  let automation = Arc::new(Automation::with_config(
    Arc::clone(&directory),
    saved.automation.clone(),
  ));

  if let Some(name) = instalock {
    if !automation.set_instalock_target(&name) {
      println!("Could not set instalock champion '{}'", name);
      print_suggestions(&directory, &name);
    }
  }
  if let Some(name) = ban {
    if !automation.set_auto_ban_target(&name) {
      println!("Could not set auto ban champion '{}'", name);
      print_suggestions(&directory, &name);
    }
  }
  if accept && !automation.snapshot().auto_accept_enabled {
    automation.toggle_auto_accept();
  }

  let settings = automation.snapshot();
  info!(
    instalock = settings.instalock_enabled,
    instalock_champion = %settings.instalock_champion,
    auto_ban = settings.auto_ban_enabled,
    auto_ban_champion = %settings.auto_ban_champion,
    auto_accept = settings.auto_accept_enabled,
    league_dir = %league_dir.display(),
    "Starting champ select monitor"
  );

  let monitor = ChampSelectMonitor::new(api, Arc::clone(&automation), saved.poll);
  monitor.start();
  println!("Watching champ select. Press Enter to stop.");

  let mut line = String::new();
  let waited = io::stdin().read_line(&mut line);
  monitor.stop_and_join();
  if let Err(e) = waited {
    warn!(error = %e, "Failed to read stdin, stopping");
  }

  saved.automation = automation.snapshot();
  saved.league_path = Some(league_dir.to_string_lossy().to_string());
  save_config(app_dir, &saved)
}

fn run_cli(cli: CliArgs) -> Result<(), String> {
  let app_dir = app_data_dir();
  let saved = load_config(&app_dir).unwrap_or_else(|e| {
    error!(error = %e, "Using default settings");
    SavedConfig::default()
  });
  let league_dir =
    || resolve_league_dir(cli.league_dir.as_deref(), saved.league_path.as_deref());

  match cli.command {
    Command::Run {
      instalock,
      ban,
      accept,
    } => {
      let league_dir = league_dir()?;
      run_monitor(&app_dir, saved, league_dir, instalock, ban, accept)
    }
    Command::Resolve(name) => {
      let directory = ChampionDirectory::new(open_session(&league_dir()?)?);
      match directory.lookup(&name) {
        Some((champion, id)) => {
          println!("{} -> {}", champion, id);
          Ok(())
        }
        None => {
          print_suggestions(&directory, &name);
          Err(format!("No champion matches '{}'", name))
        }
      }
    }
    Command::Suggest(partial) => {
      let directory = ChampionDirectory::new(open_session(&league_dir()?)?);
      if !directory.ensure_loaded() {
        return Err("Champion list not loaded. Make sure League Client is running!".to_string());
      }
      for name in directory.suggest(&partial, DEFAULT_SUGGESTION_LIMIT) {
        println!("{}", name);
      }
      Ok(())
    }
    Command::Dodge => {
      let api = LcuClient::from_league_dir(&league_dir()?).map_err(|e| e.to_string())?;
      dodge(&api).map_err(|e| format!("Failed to dodge: {}", e))?;
      println!("Dodged");
      Ok(())
    }
    Command::Reveal => {
      let api = LcuClient::from_league_dir(&league_dir()?).map_err(|e| e.to_string())?;
      let riot_api = riot_client_config_dir().and_then(|dir| match LcuClient::from_league_dir(&dir) {
        Ok(client) => Some(client),
        Err(e) => {
          warn!(error = %e, "Riot Client not reachable, hidden lobbies cannot be revealed");
          None
        }
      });
      let report = reveal(&api, riot_api.as_ref().map(|client| client as &dyn LcuApi))
        .map_err(|e| format!("Failed to reveal lobby: {}", e))?;
      for player in &report.players {
        println!("{}", player);
      }
      println!("{}", report.url);
      Ok(())
    }
    Command::Logs => {
      let path = export_logs(&logs_dir(&app_dir))?;
      println!("Logs exported to {}", path.display());
      Ok(())
    }
  }
}

fn main() {
  let cli = match parse_args(std::env::args().skip(1)) {
    Ok(cli) => cli,
    Err(e) => {
      eprintln!("{}\n\n{}", e, USAGE);
      std::process::exit(2);
    }
  };

  let app_dir = app_data_dir();
  if let Err(e) = init_logging(Some(&logs_dir(&app_dir))) {
    eprintln!("{}", e);
  }

  if let Err(e) = run_cli(cli) {
    error!("{}", e);
    std::process::exit(1);
  }
}
