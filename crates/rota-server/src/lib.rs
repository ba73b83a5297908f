//! Server assembly for Rota: configuration types and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use rota_core::{
  department::DepartmentConfig, directory::FacultyDirectory,
  registry::{RegistryConfig, SlotRegistry},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROTA_`-prefixed environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:        String,
  #[serde(default = "default_port")]
  pub port:        u16,
  #[serde(default = "default_store_path")]
  pub store_path:  PathBuf,
  #[serde(default)]
  pub registry:    RegistryConfig,
  /// Department alias table and typo families.
  #[serde(default)]
  pub departments: DepartmentConfig,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("rota.sqlite3") }

/// `ROTA_`-prefixed variables, with `__` between nested keys:
/// `ROTA_PORT`, `ROTA_REGISTRY__MAX_ATTEMPTS`.
pub fn environment() -> config::Environment {
  config::Environment::with_prefix("ROTA")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

/// Layer `env` over the optional TOML file at `path`.
pub fn load_config(
  path: &Path,
  env: config::Environment,
) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(env)
    .build()?
    .try_deserialize()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn app<D>(registry: Arc<SlotRegistry<D>>) -> Router
where
  D: FacultyDirectory + 'static,
{
  rota_api::api_router(registry).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{body::Body, http::{Request, StatusCode}};
  use rota_core::department::DepartmentResolver;
  use rota_store_sqlite::SqliteDirectory;
  use tower::ServiceExt as _;

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.registry.max_attempts, 3);
    assert!(!cfg.departments.aliases.is_empty());
  }

  #[test]
  fn department_table_is_loaded_from_config() {
    let cfg = parse(
      r#"
      port = 9000

      [registry]
      max_attempts = 5

      [departments]
      families = [["physic", "phyisc"]]

      [departments.aliases]
      phy = "Physics"
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.registry.max_attempts, 5);

    let resolver = DepartmentResolver::new(cfg.departments);
    assert_eq!(resolver.normalize("PHY"), "Physics");
    assert!(resolver.loosely_equal("Phyisc Lab", "physics"));
  }

  #[test]
  fn environment_overrides_file() {
    let env = environment().source(Some(
      [
        ("ROTA_PORT", "9000"),
        ("ROTA_REGISTRY__MAX_ATTEMPTS", "5"),
        ("OTHER_PORT", "1"),
      ]
      .into_iter()
      .map(|(k, v)| (k.to_owned(), v.to_owned()))
      .collect(),
    ));

    let cfg = load_config(Path::new("missing-config.toml"), env).unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.registry.max_attempts, 5);
    assert_eq!(cfg.registry.lock_timeout_ms, 5_000);
    assert_eq!(cfg.host, "127.0.0.1");
  }

  #[tokio::test]
  async fn app_serves_api_routes() {
    let store = SqliteDirectory::open_in_memory().await.unwrap();
    let registry = Arc::new(SlotRegistry::new(
      Arc::new(store),
      Arc::new(DepartmentResolver::default()),
      RegistryConfig::default(),
    ));

    let resp = app(registry)
      .oneshot(
        Request::builder()
          .uri("/cc-assignments")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
