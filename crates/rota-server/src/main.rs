//! rota-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite faculty directory, and serves the JSON API over HTTP.
//!
//! # Checking the department table
//!
//! To see how a department name resolves under the configured alias table:
//!
//! ```
//! cargo run -p rota-server -- --normalize "eletronic enigneering"
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use rota_core::{department::DepartmentResolver, registry::SlotRegistry};
use rota_server::{environment, load_config};
use rota_store_sqlite::SqliteDirectory;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Rota course coordinator registry")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the canonical form of a department name and exit.
  #[arg(long, value_name = "DEPARTMENT")]
  normalize: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = load_config(&cli.config, environment())
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let resolver = DepartmentResolver::new(server_cfg.departments.clone());

  // Helper mode: resolve a department name and exit.
  if let Some(raw) = cli.normalize {
    println!("{}", resolver.normalize(&raw));
    return Ok(());
  }

  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteDirectory::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let registry = Arc::new(SlotRegistry::new(
    Arc::new(store),
    Arc::new(resolver),
    server_cfg.registry.clone(),
  ));

  let app = rota_server::app(registry);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
