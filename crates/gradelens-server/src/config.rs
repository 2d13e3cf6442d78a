//! Server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level gradelens configuration (`gradelens.toml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradelensConfig {
    /// Grades CSV the dataset is loaded from.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Reload the dataset this often. Unset means reload only on request.
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("grades.csv")
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for GradelensConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            refresh_interval_secs: None,
        }
    }
}

impl GradelensConfig {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }

    /// Starter config written by `gradelens init`.
    pub fn sample_toml() -> &'static str {
        r#"# gradelens configuration

# Grades CSV: header Q1..Q10,Total with an optional student_id column.
data_path = "grades.csv"

host = "0.0.0.0"
port = 8080

# Browser origins allowed to query the API.
allowed_origins = ["http://localhost:3000"]

# Reload the CSV periodically (seconds). Omit to reload only via POST /api/reload.
# refresh_interval_secs = 300
"#
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + end]).unwrap_or_default();
        result.replace_range(start..start + end + 1, &value);
    }
    result
}

fn resolve_config_vars(config: &mut GradelensConfig) {
    if let Some(path) = config.data_path.to_str() {
        config.data_path = PathBuf::from(resolve_env_vars(path));
    }
    config.host = resolve_env_vars(&config.host);
    for origin in &mut config.allowed_origins {
        *origin = resolve_env_vars(origin);
    }
}

/// Apply `GRADELENS_DATA` and `GRADELENS_PORT` overrides.
fn apply_overrides(
    config: &mut GradelensConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(data) = lookup("GRADELENS_DATA") {
        config.data_path = PathBuf::from(data);
    }
    if let Some(port) = lookup("GRADELENS_PORT") {
        config.port = port
            .trim()
            .parse()
            .with_context(|| format!("GRADELENS_PORT is not a valid port: {port}"))?;
    }
    Ok(())
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gradelens.toml` in the current directory
/// 2. `~/.config/gradelens/config.toml`
///
/// Environment variable overrides: `GRADELENS_DATA`, `GRADELENS_PORT`.
pub fn load_config() -> Result<GradelensConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GradelensConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("gradelens.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GradelensConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradelensConfig::default(),
    };

    resolve_config_vars(&mut config);
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;

    match &config_path {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::debug!("no config file found, using defaults"),
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradelens"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_GRADELENS_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_GRADELENS_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_GRADELENS_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_close_${brace"), "no_close_${brace");
        std::env::remove_var("_GRADELENS_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = GradelensConfig::default();
        assert_eq!(config.data_path, PathBuf::from("grades.csv"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn parse_partial_config() {
        let config: GradelensConfig = toml::from_str(
            r#"
data_path = "/srv/grades.csv"
port = 9000
refresh_interval_secs = 60
"#,
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/srv/grades.csv"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn sample_config_parses_to_defaults() {
        let config: GradelensConfig = toml::from_str(GradelensConfig::sample_toml()).unwrap();
        assert_eq!(config, GradelensConfig::default());
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = GradelensConfig::default();
        apply_overrides(&mut config, |key| match key {
            "GRADELENS_DATA" => Some("/tmp/other.csv".into()),
            "GRADELENS_PORT" => Some("9191".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/tmp/other.csv"));
        assert_eq!(config.port, 9191);
    }

    #[test]
    fn bad_port_override_is_an_error() {
        let mut config = GradelensConfig::default();
        let err = apply_overrides(&mut config, |key| {
            (key == "GRADELENS_PORT").then(|| "eighty".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("GRADELENS_PORT"));
    }

    #[test]
    fn explicit_missing_path_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/gradelens.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradelens.toml");
        std::fs::write(&path, "host = \"127.0.0.1\"\nallowed_origins = []\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.allowed_origins.is_empty());
    }
}
