pub mod config;

use std::{
  path::{
    Path,
    PathBuf,
  },
  sync::OnceLock,
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};

const APP_DIR: &str = "the-directory";

static CONFIG_FILE: OnceLock<PathBuf> = OnceLock::new();

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

pub fn initialize_config_file(specified_file: Option<PathBuf>) {
  let config_file = specified_file.unwrap_or_else(default_config_file);
  ensure_parent_dir(&config_file);
  CONFIG_FILE.set(config_file).ok();
}

pub fn initialize_log_file(specified_file: Option<PathBuf>) {
  let log_file = specified_file.unwrap_or_else(default_log_file);
  ensure_parent_dir(&log_file);
  LOG_FILE.set(log_file).ok();
}

/// `$THE_DIRECTORY_CONFIG_DIR`, or the platform config dir.
pub fn config_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("THE_DIRECTORY_CONFIG_DIR") {
    return expand_tilde(Path::new(&dir));
  }
  match choose_base_strategy() {
    Ok(strategy) => strategy.config_dir().join(APP_DIR),
    Err(err) => {
      log::warn!("no platform config directory ({err}), using ./.{APP_DIR}");
      PathBuf::from(format!(".{APP_DIR}"))
    },
  }
}

/// `$THE_DIRECTORY_CACHE_DIR`, or the platform cache dir.
pub fn cache_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("THE_DIRECTORY_CACHE_DIR") {
    return expand_tilde(Path::new(&dir));
  }
  match choose_base_strategy() {
    Ok(strategy) => strategy.cache_dir().join(APP_DIR),
    Err(err) => {
      log::warn!("no platform cache directory ({err}), using ./.{APP_DIR}");
      PathBuf::from(format!(".{APP_DIR}"))
    },
  }
}

pub fn config_file() -> PathBuf {
  CONFIG_FILE
    .get_or_init(|| {
      let path = default_config_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn log_file() -> PathBuf {
  LOG_FILE
    .get_or_init(|| {
      let path = default_log_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn default_log_file() -> PathBuf {
  cache_dir().join("the-directory.log")
}

fn default_config_file() -> PathBuf {
  config_dir().join("config.toml")
}

fn ensure_parent_dir(path: &Path) {
  if let Some(parent) = path.parent()
    && !parent.exists()
  {
    std::fs::create_dir_all(parent).ok();
  }
}

/// Expand a leading `~` component to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let mut components = path.components();
  if let Some(std::path::Component::Normal(first)) = components.next()
    && first == "~"
    && let Some(home) = etcetera::home_dir().ok()
  {
    return home.join(components.as_path());
  }
  path.to_path_buf()
}

/// Merge two TOML documents, merging values from `right` onto `left`
///
/// `merge_depth` sets the nesting depth up to which values are merged instead
/// of overridden.
///
/// When a table exists in both `left` and `right`, the merged table consists of
/// all keys in `left`'s table unioned with all keys in `right` with the values
/// of `right` being merged recursively onto values of `left`.
///
/// Arrays of tables are merged element-wise when elements share a `name` key,
/// any other array in `right` replaces the one in `left`.
pub fn merge_toml_values(left: toml::Value, right: toml::Value, merge_depth: usize) -> toml::Value {
  use toml::Value;

  fn get_name(v: &Value) -> Option<&str> {
    v.get("name").and_then(Value::as_str)
  }

  match (left, right) {
    (Value::Array(mut left_items), Value::Array(right_items)) => {
      if merge_depth > 0 {
        left_items.reserve(right_items.len());
        for rvalue in right_items {
          let lvalue = get_name(&rvalue)
            .and_then(|rname| left_items.iter().position(|v| get_name(v) == Some(rname)))
            .map(|lpos| left_items.remove(lpos));
          let mvalue = match lvalue {
            Some(lvalue) => merge_toml_values(lvalue, rvalue, merge_depth - 1),
            None => rvalue,
          };
          left_items.push(mvalue);
        }
        Value::Array(left_items)
      } else {
        Value::Array(right_items)
      }
    },
    (Value::Table(mut left_map), Value::Table(right_map)) => {
      if merge_depth > 0 {
        for (rname, rvalue) in right_map {
          match left_map.remove(&rname) {
            Some(lvalue) => {
              let merged_value = merge_toml_values(lvalue, rvalue, merge_depth - 1);
              left_map.insert(rname, merged_value);
            },
            None => {
              left_map.insert(rname, rvalue);
            },
          }
        }
        Value::Table(left_map)
      } else {
        Value::Table(right_map)
      }
    },
    // Catch everything else we didn't handle, and use the right value
    (_, value) => value,
  }
}


#[cfg(test)]
mod path_tests {
  use std::path::Path;

  use super::expand_tilde;

  #[test]
  fn only_leading_tilde_expands() {
    assert_eq!(expand_tilde(Path::new("/srv/catalog.json")), Path::new("/srv/catalog.json"));
    assert_eq!(expand_tilde(Path::new("data/~/x")), Path::new("data/~/x"));
    if let Ok(home) = etcetera::home_dir() {
      assert_eq!(expand_tilde(Path::new("~/catalog.json")), home.join("catalog.json"));
    }
  }
}
