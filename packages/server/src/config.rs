//! Server configuration.
//!
//! Defaults are overridden by an optional TOML file named by
//! `CRIME_DEMO_CONFIG`, which is in turn overridden by individual
//! environment variables (`BIND_ADDR`, `PORT`, `FIR_DATA_PATH`,
//! `CRIME_CSV_PATH`, `JWT_SECRET`). The result is built once at startup and
//! shared read-only with every request.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crime_demo_dataset_models::AreaLookup;
use serde::Deserialize;

/// Environment variable naming the optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "CRIME_DEMO_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`AppConfig`].
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A demo login account.
#[derive(Clone, Deserialize)]
pub struct UserRecord {
    pub password: String,
    pub role: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Settings for the token-issuing login step.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for HS256 tokens.
    pub jwt_secret: String,
    /// Lifetime of an issued token.
    pub token_ttl_minutes: i64,
    /// Username to account.
    pub users: BTreeMap<String, UserRecord>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let user = |password: &str, role: &str| UserRecord {
            password: password.to_owned(),
            role: role.to_owned(),
        };
        Self {
            jwt_secret: "super-secret-demo-key".to_owned(),
            token_ttl_minutes: 60,
            users: BTreeMap::from([
                ("admin".to_owned(), user("password123", "admin")),
                ("officer".to_owned(), user("beatpass", "viewer")),
            ]),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("users", &self.users)
            .finish()
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    /// File behind the chain-snatching view.
    pub fir_data_path: PathBuf,
    /// File behind the breakdown reports. Falls back to `fir_data_path`.
    pub crime_csv_path: Option<PathBuf>,
    /// Served at `/static` when the directory exists.
    pub static_dir: PathBuf,
    /// Served at `/templates` when the directory exists.
    pub templates_dir: PathBuf,
    pub auth: AuthConfig,
    /// Map marker position per area name.
    pub area_coordinates: AreaLookup,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_owned(),
            port: 8000,
            fir_data_path: PathBuf::from("data/fir_data.csv"),
            crime_csv_path: None,
            static_dir: PathBuf::from("static"),
            templates_dir: PathBuf::from("templates"),
            auth: AuthConfig::default(),
            area_coordinates: AreaLookup::default(),
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `CRIME_DEMO_CONFIG` names a file that
    /// cannot be read or parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads a TOML config file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses TOML config text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed input.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// An unparseable `PORT` is ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(e) => log::warn!("Ignoring PORT={port:?}: {e}"),
            }
        }
        if let Some(path) = lookup("FIR_DATA_PATH") {
            self.fir_data_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CRIME_CSV_PATH") {
            self.crime_csv_path = Some(PathBuf::from(path));
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
    }

    /// File read by the breakdown reports.
    #[must_use]
    pub fn crime_csv_path(&self) -> &Path {
        self.crime_csv_path
            .as_deref()
            .unwrap_or(self.fir_data_path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use crime_demo_dataset_models::Coordinates;

    use super::*;

    #[test]
    fn defaults_match_the_demo_setup() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.auth.token_ttl_minutes, 60);
        assert_eq!(config.auth.users.len(), 2);
        assert_eq!(config.area_coordinates.len(), 4);
        assert_eq!(config.crime_csv_path(), Path::new("data/fir_data.csv"));
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = AppConfig::from_toml_str(
            r#"
            port = 9000
            crime_csv_path = "data/crimes.csv"

            [auth]
            token_ttl_minutes = 5

            [auth.users.analyst]
            password = "pw"
            role = "viewer"

            [area_coordinates]
            Harbor = { lat = 1.0, lng = 2.0 }
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.crime_csv_path(), Path::new("data/crimes.csv"));
        assert_eq!(config.auth.token_ttl_minutes, 5);
        assert_eq!(config.auth.jwt_secret, "super-secret-demo-key");
        assert!(config.auth.users.contains_key("analyst"));
        assert_eq!(
            config.area_coordinates.resolve("Harbor"),
            Coordinates::new(1.0, 2.0)
        );
        assert_eq!(
            config.area_coordinates.resolve("Downtown"),
            Coordinates::new(0.0, 0.0)
        );
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("port = \"eighty\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn env_overrides_apply_and_bad_port_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(|key| match key {
            "PORT" => Some("not-a-port".to_owned()),
            "JWT_SECRET" => Some("s3cret".to_owned()),
            "FIR_DATA_PATH" => Some("/srv/fir.csv".to_owned()),
            _ => None,
        });
        assert_eq!(config.port, 8000);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.crime_csv_path(), Path::new("/srv/fir.csv"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let rendered = format!("{:?}", AppConfig::default());
        assert!(!rendered.contains("super-secret-demo-key"));
        assert!(!rendered.contains("password123"));
    }
}
