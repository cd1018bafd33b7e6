use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;
use colored::*;
use dotenv::dotenv;
use highlight::config::Settings;
use highlight::document::{check_complexity, estimate_solve_time, Document, DEMO_LIMITS};
use highlight::render::{AnsiRenderer, StaticText};
use highlight::session::Storage;
use highlight::storage::FileStorage;
use highlight::{ChangeType, HighlightError, Profile, SessionManager};
use log::{debug, LevelFilter};
use serde_json::Value;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "vrp-highlight", about = "Highlights the changes between two routing documents")]
struct Cli {
  /// Document before the edit
  #[structopt(parse(from_os_str))]
  before: PathBuf,

  /// Document after the edit
  #[structopt(parse(from_os_str))]
  after: PathBuf,

  /// Text to highlight; defaults to the after document pretty-printed
  #[structopt(long, parse(from_os_str))]
  text: Option<PathBuf>,

  /// Show every change instead of collapsing siblings
  #[structopt(long)]
  no_group: bool,

  #[structopt(long)]
  theme: Option<String>,

  /// Only highlight these change types
  #[structopt(long = "type", possible_values = &["added", "modified", "removed"])]
  types: Vec<ChangeType>,

  /// Settings file; defaults to ~/.config/vrp-highlight/config.ini
  #[structopt(long, parse(from_os_str))]
  config: Option<PathBuf>,

  /// Persist session metadata under ~/.config/vrp-highlight/sessions
  #[structopt(long)]
  persist: bool,

  #[structopt(short, long)]
  verbose: bool
}

fn read_document(path: &Path) -> Result<Value, HighlightError> {
  let raw = std::fs::read_to_string(path).map_err(|e| HighlightError::document(path, e))?;
  serde_json::from_str(&raw).map_err(|e| HighlightError::document(path, e))
}

fn main() -> Result<()> {
  dotenv().ok();
  let cli = Cli::from_args();

  if cli.verbose {
    env_logger::builder()
      .filter_level(LevelFilter::Debug)
      .format_target(false)
      .format_timestamp(None)
      .init();
    debug!("Verbose logging enabled");
  } else {
    env_logger::init();
  }

  let _profile = Profile::new("vrp-highlight");
  let config_file = match cli.config.clone() {
    Some(path) => Some(path),
    None => Settings::config_file().ok()
  };
  let mut settings = Settings::load(config_file.as_deref())?;
  if cli.no_group {
    settings.smart_grouping = false;
  }
  if let Some(theme) = &cli.theme {
    settings.theme = theme.clone();
  }
  settings.enable_persistence = settings.enable_persistence && cli.persist;

  let before = read_document(&cli.before)?;
  let after = read_document(&cli.after)?;
  let text = match &cli.text {
    Some(path) => std::fs::read_to_string(path).map_err(|e| HighlightError::document(path, e))?,
    None => serde_json::to_string_pretty(&after)?
  };

  let report = check_complexity(&Document::new(&after), &DEMO_LIMITS);
  for warning in report.errors.iter().chain(report.warnings.iter()) {
    println!("{} {}", "warning:".yellow().bold(), warning);
  }
  debug!("Estimated solve time: {:.1}s", estimate_solve_time(&Document::new(&after)));

  let storage: Option<Box<dyn Storage>> = if settings.enable_persistence {
    Some(Box::new(FileStorage::default_location()?))
  } else {
    None
  };

  let source = Rc::new(StaticText::new(text.clone()));
  let renderer = Rc::new(RefCell::new(AnsiRenderer::following(&source)));
  let mut manager = SessionManager::new(source, Box::new(renderer.clone()), storage, settings);

  let description = format!("{} -> {}", cli.before.display(), cli.after.display());
  manager.create_session(&before, &after, Some(&description));
  if !cli.types.is_empty() {
    manager.filter_highlights_by_type(&cli.types);
  }

  if let Some(stats) = manager.get_session_stats() {
    println!(
      "{} changes: {} added, {} modified, {} removed",
      stats.total.to_string().bold(),
      stats.added.to_string().green(),
      stats.modified.to_string().yellow(),
      stats.removed.to_string().red()
    );
  }

  let renderer = renderer.borrow();
  for entry in renderer.legend() {
    println!("{entry}");
  }
  println!();
  print!("{}", renderer.render(&text));

  Ok(())
}
