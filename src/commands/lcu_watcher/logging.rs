// Logging setup: stdout, a bounded in-memory buffer and an on-disk live log

use chrono::Utc;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const MAX_BUFFERED_LINES: usize = 2000;
pub const LIVE_LOG_NAME: &str = "instalock-live.log";

// Global in-memory log buffer
pub static LOG_BUFFER: Lazy<Mutex<VecDeque<String>>> = Lazy::new(|| Mutex::new(VecDeque::new()));

fn push_buffered(line: &str) {
  let mut buf = LOG_BUFFER.lock().unwrap_or_else(|e| e.into_inner());
  buf.push_back(line.to_string());
  while buf.len() > MAX_BUFFERED_LINES {
    buf.pop_front();
  }
}

pub fn buffered_logs() -> Vec<String> {
  let buf = LOG_BUFFER.lock().unwrap_or_else(|e| e.into_inner());
  buf.iter().cloned().collect()
}

/// Writer handed to the fmt layer; tees every event into the buffer and the live log.
#[derive(Clone, Default)]
pub struct BufferWriter {
  live_log: Option<Arc<Mutex<File>>>,
}

impl BufferWriter {
  pub fn new(live_log: Option<File>) -> Self {
    Self {
      live_log: live_log.map(|f| Arc::new(Mutex::new(f))),
    }
  }
}

impl Write for BufferWriter {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let text = String::from_utf8_lossy(buf);
    for line in text.lines().filter(|l| !l.is_empty()) {
      push_buffered(line);
    }
    if let Some(file) = &self.live_log {
      let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
      // Non-fatal: the buffer still has the line
      let _ = file.write_all(buf);
    }
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    if let Some(file) = &self.live_log {
      let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
      let _ = file.flush();
    }
    Ok(())
  }
}

impl<'a> MakeWriter<'a> for BufferWriter {
  type Writer = BufferWriter;

  fn make_writer(&'a self) -> Self::Writer {
    self.clone()
  }
}

fn open_live_log(logs_dir: &Path) -> Option<File> {
  if let Err(e) = std::fs::create_dir_all(logs_dir) {
    eprintln!("[Logging] Failed to ensure logs dir exists: {}", e);
    return None;
  }
  File::options()
    .create(true)
    .append(true)
    .open(logs_dir.join(LIVE_LOG_NAME))
    .map_err(|e| eprintln!("[Logging] Failed to open live log: {}", e))
    .ok()
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(logs_dir: Option<&Path>) -> Result<(), String> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let buffer = BufferWriter::new(logs_dir.and_then(open_live_log));

  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_target(false))
    .with(
      tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(buffer),
    )
    .try_init()
    .map_err(|e| format!("Failed to initialize logging: {}", e))
}

/// Writes the live log (or the in-memory buffer) to a timestamped file in `logs_dir`.
pub fn export_logs(logs_dir: &Path) -> Result<PathBuf, String> {
  std::fs::create_dir_all(logs_dir).map_err(|e| format!("Failed to create log dir: {}", e))?;

  let live_log = logs_dir.join(LIVE_LOG_NAME);
  let full_contents = match std::fs::read_to_string(&live_log) {
    Ok(s) if !s.is_empty() => s,
    _ => {
      let buf = buffered_logs();
      if buf.is_empty() {
        return Err("No logs available".to_string());
      }
      buf.join("\n")
    }
  };

  let filename = format!("instalock-logs-{}.txt", Utc::now().format("%Y%m%d-%H%M%S"));
  let out_path = logs_dir.join(filename);
  let mut file = File::create(&out_path).map_err(|e| format!("Failed to create file: {}", e))?;
  write!(file, "{}", full_contents).map_err(|e| format!("Failed to write logs: {}", e))?;

  Ok(out_path)
}
