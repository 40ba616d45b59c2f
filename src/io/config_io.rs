use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory: explicit override, then `$TALLY_DIR`,
/// then `$XDG_DATA_HOME/tally`, then `~/.local/share/tally`.
pub fn resolve_data_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_path("TALLY_DIR") {
        return dir;
    }
    let data_home = env_path("XDG_DATA_HOME").unwrap_or_else(|| home_dir().join(".local/share"));
    data_home.join("tally")
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn home_dir() -> PathBuf {
    env_path("HOME").unwrap_or_else(|| PathBuf::from("/"))
}

/// Read `config.toml` from the data directory. A missing file means
/// defaults; an unreadable or invalid one is an error.
pub fn read_config(data_dir: &Path) -> Result<Config, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(ConfigError::ReadError { path, source: e }),
    };
    toml::from_str(&text).map_err(|e| ConfigError::ParseError { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::FilterMode;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config.storage.slot, "todos");
        assert!(config.confirm.deletes);
    }

    #[test]
    fn reads_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"[storage]
slot = "work"

[display]
default_filter = "completed"
show_created = true
"#,
        )
        .unwrap();

        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config.storage.slot, "work");
        assert_eq!(config.display.default_filter, FilterMode::Completed);
        assert!(config.display.show_created);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[storage\nslot = ").unwrap();
        let err = read_config(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn override_wins() {
        let dir = resolve_data_dir(Some(Path::new("/tmp/elsewhere")));
        assert_eq!(dir, PathBuf::from("/tmp/elsewhere"));
    }
}
