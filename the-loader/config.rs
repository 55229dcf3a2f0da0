use std::{
  path::{
    Path,
    PathBuf,
  },
  str::from_utf8,
  time::Duration,
};

use eyre::{
  Context,
  Result,
};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  #[serde(default)]
  pub search:  SearchConfig,
  #[serde(default)]
  pub backend: BackendConfig,
  #[serde(default)]
  pub log:     LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SearchConfig {
  pub debounce_ms:     u64,
  pub min_query_chars: usize,
  pub max_results:     usize,
}

impl SearchConfig {
  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      debounce_ms:     300,
      min_query_chars: 3,
      max_results:     50,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
  #[default]
  Http,
  Catalog,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct BackendConfig {
  pub kind:         BackendKind,
  pub url:          String,
  pub timeout_secs: u64,
  pub catalog:      Option<PathBuf>,
  pub latency_ms:   u64,
}

impl BackendConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn latency(&self) -> Duration {
    Duration::from_millis(self.latency_ms)
  }
}

impl Default for BackendConfig {
  fn default() -> Self {
    Self {
      kind:         BackendKind::Http,
      url:          "http://localhost:8080/api/search".to_string(),
      timeout_secs: 10,
      catalog:      None,
      latency_ms:   0,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LogConfig {
  pub level: Option<String>,
}

impl LogConfig {
  /// The configured level, if it names a valid `log` level.
  pub fn level_filter(&self) -> Option<log::LevelFilter> {
    let level = self.level.as_deref()?;
    match level.parse() {
      Ok(filter) => Some(filter),
      Err(_) => {
        log::warn!("ignoring unknown log level {level:?}");
        None
      },
    }
  }
}

/// Default built-in config.toml.
pub fn default_config() -> Result<toml::Value> {
  let default_config = include_bytes!("config.toml");
  let config_str =
    from_utf8(default_config).context("built-in config.toml contains invalid UTF-8")?;
  toml::from_str(config_str).context("failed to parse built-in config.toml")
}

/// Built-in defaults merged with the file at `path` (the user config file if
/// `None`). A missing file is not an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
  let path = path.map_or_else(crate::config_file, Path::to_path_buf);
  let default = default_config()?;

  let merged = match std::fs::read_to_string(&path) {
    Ok(text) => {
      let user: toml::Value =
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
      crate::merge_toml_values(default, user, 3)
    },
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
      log::debug!("no config at {}, using defaults", path.display());
      default
    },
    Err(err) => {
      return Err(err).with_context(|| format!("failed to read {}", path.display()));
    },
  };

  merged
    .try_into()
    .with_context(|| format!("invalid configuration in {}", path.display()))
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn builtin_defaults_match_struct_defaults() {
    let config: Config = default_config().unwrap().try_into().unwrap();
    assert_eq!(config.search, SearchConfig::default());
    assert_eq!(config.backend, BackendConfig::default());
    assert_eq!(config.log.level_filter(), None);
  }

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(Some(dir.path().join("absent.toml").as_path())).unwrap();
    assert_eq!(config.search.debounce(), Duration::from_millis(300));
  }

  #[test]
  fn user_values_override_defaults() {
    let file = write_config(
      r#"
        [search]
        debounce-ms = 120

        [backend]
        kind = "catalog"
        catalog = "/srv/catalog.json"
        latency-ms = 80

        [log]
        level = "debug"
        "#,
    );
    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.search.debounce_ms, 120);
    assert_eq!(config.search.min_query_chars, 3);
    assert_eq!(config.backend.kind, BackendKind::Catalog);
    assert_eq!(
      config.backend.catalog.as_deref(),
      Some(Path::new("/srv/catalog.json"))
    );
    assert_eq!(config.backend.latency(), Duration::from_millis(80));
    assert_eq!(config.backend.timeout(), Duration::from_secs(10));
    assert_eq!(config.log.level_filter(), Some(log::LevelFilter::Debug));
  }

  #[test]
  fn unknown_keys_are_rejected() {
    let file = write_config("[search]\ndebounce = 10\n");
    assert!(load_config(Some(file.path())).is_err());
  }

  #[test]
  fn invalid_toml_is_reported() {
    let file = write_config("[search\n");
    let err = load_config(Some(file.path())).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse"));
  }
}
