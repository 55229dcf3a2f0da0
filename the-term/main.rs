//! Terminal client for the directory: an incremental search box over the
//! organization catalog.

mod ctx;
mod input;
mod login;
mod render;
mod router;
mod terminal;

use std::{
  path::PathBuf,
  sync::Arc,
  time::Duration,
};

use clap::{
  ArgAction,
  Parser,
};
use crossterm::event::{
  self,
  Event,
};
use eyre::{
  Context,
  Result,
};
use the_directory_client::{
  HttpSearchBackend,
  StaticCatalog,
};
use the_directory_loader::config::{
  BackendKind,
  Config,
  load_config,
};
use the_directory_search::SearchBackend;

use crate::ctx::Ctx;

const TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(name = "the-directory", version)]
#[command(about = "Incremental search over the organization directory")]
struct Cli {
  /// Use FILE instead of the default config.toml
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Write logs to FILE
  #[arg(long, value_name = "FILE")]
  log: Option<PathBuf>,

  /// Increase log verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, action = ArgAction::Count)]
  verbose: u8,

  /// Query the lookup service at URL
  #[arg(long, value_name = "URL", conflicts_with = "catalog")]
  endpoint: Option<String>,

  /// Search a local JSON catalog instead of a lookup service
  #[arg(long, value_name = "FILE")]
  catalog: Option<PathBuf>,

  /// Print resolved paths and settings, then exit
  #[arg(long)]
  health: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  the_directory_loader::initialize_config_file(cli.config.clone());
  the_directory_loader::initialize_log_file(cli.log.clone());

  let config = load_config(None)?;
  setup_logging(cli.verbose, &config)?;

  if cli.health {
    print_health(&cli, &config);
    return Ok(());
  }

  let runtime = tokio::runtime::Builder::new_multi_thread()
    .worker_threads(2)
    .thread_name("the-directory")
    .enable_all()
    .build()
    .context("failed to start the async runtime")?;
  let _guard = runtime.enter();

  let backend = build_backend(&cli, &config)?;
  let mut ctx = Ctx::new(backend, &config);
  let mut terminal = terminal::Terminal::new()?;

  terminal.enter_raw_mode()?;
  let result = run(&mut ctx, &mut terminal);
  terminal.leave_raw_mode()?;

  // Cancel outstanding work while the runtime is still alive.
  drop(ctx);
  result
}

fn run(ctx: &mut Ctx, terminal: &mut terminal::Terminal) -> Result<()> {
  render::render(ctx, terminal)?;

  loop {
    if ctx.should_quit {
      break;
    }

    if event::poll(TICK)? {
      match event::read()? {
        Event::Key(key) => input::handle_key(ctx, key),
        Event::Mouse(mouse) => input::handle_mouse(ctx, mouse),
        Event::Resize(..) => ctx.needs_render = true,
        _ => {},
      }
    }

    ctx.tick();

    if ctx.needs_render {
      render::render(ctx, terminal)?;
      ctx.needs_render = false;
    }
  }

  Ok(())
}

/// `--endpoint` / `--catalog` win over the configured backend.
fn build_backend(cli: &Cli, config: &Config) -> Result<Arc<dyn SearchBackend>> {
  let backend = &config.backend;
  let catalog = cli.catalog.clone().or_else(|| {
    (cli.endpoint.is_none() && backend.kind == BackendKind::Catalog)
      .then(|| backend.catalog.clone())
      .flatten()
  });

  if let Some(path) = catalog {
    let path = the_directory_loader::expand_tilde(&path);
    let catalog = StaticCatalog::load(&path)
      .with_context(|| format!("failed to load catalog {}", path.display()))?
      .with_latency(backend.latency());
    log::info!("searching catalog {} ({} entries)", path.display(), catalog.len());
    return Ok(Arc::new(catalog));
  }

  if cli.endpoint.is_none() && backend.kind == BackendKind::Catalog {
    eyre::bail!("backend.kind is \"catalog\" but no backend.catalog path is configured");
  }

  let url = cli.endpoint.as_deref().unwrap_or(&backend.url);
  let http = HttpSearchBackend::new(url, backend.timeout())
    .with_context(|| format!("invalid search endpoint {url}"))?;
  log::info!("searching {}", http.endpoint());
  Ok(Arc::new(http))
}

fn setup_logging(verbosity: u8, config: &Config) -> Result<()> {
  let level = match verbosity {
    0 => config.log.level_filter().unwrap_or(log::LevelFilter::Warn),
    1 => log::LevelFilter::Info,
    2 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  };

  // The terminal owns stdout, so everything goes to the log file.
  let log_file = the_directory_loader::log_file();
  fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} {} [{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.target(),
        record.level(),
        message
      ))
    })
    .level(level)
    .chain(
      fern::log_file(&log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?,
    )
    .apply()
    .context("failed to install logger")?;

  Ok(())
}

fn print_health(cli: &Cli, config: &Config) {
  println!("Config file: {}", the_directory_loader::config_file().display());
  println!("Log file: {}", the_directory_loader::log_file().display());
  println!("Cache dir: {}", the_directory_loader::cache_dir().display());
  println!();
  println!(
    "Search: debounce {}ms, at least {} chars, up to {} results",
    config.search.debounce_ms, config.search.min_query_chars, config.search.max_results
  );
  match (&cli.catalog, &cli.endpoint) {
    (Some(path), _) => println!("Backend: catalog {}", path.display()),
    (None, Some(url)) => println!("Backend: http {url}"),
    (None, None) => {
      match config.backend.kind {
        BackendKind::Http => {
          println!(
            "Backend: http {} (timeout {}s)",
            config.backend.url, config.backend.timeout_secs
          )
        },
        BackendKind::Catalog => {
          match &config.backend.catalog {
            Some(path) => println!("Backend: catalog {}", path.display()),
            None => println!("Backend: catalog (no path configured)"),
          }
        },
      }
    },
  }
}
