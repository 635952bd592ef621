// Runtime configuration
//
// Environment and backend credentials are read at startup, from env vars
// (optionally via .env files) or from a JSON file, then validated. Empty or
// malformed credentials stop the program instead of being carried around.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::ConfigError;

pub const ENV_VAR: &str = "SAVINGS_ENV";
pub const BACKEND_URL_VAR: &str = "SAVINGS_BACKEND_URL";
pub const BACKEND_KEY_VAR: &str = "SAVINGS_BACKEND_KEY";
pub const DB_PATH_VAR: &str = "SAVINGS_DB_PATH";
pub const PROFILE_VAR: &str = "SAVINGS_PROFILE_ID";
pub const CONFIG_FILE_VAR: &str = "SAVINGS_CONFIG";

pub const DEFAULT_DB_PATH: &str = "savings.db";
pub const DEFAULT_PROFILE_ID: &str = "local";

// ============================================================================
// ENVIRONMENT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// .env file loaded for this environment before reading variables
    pub fn env_file(&self) -> &'static str {
        match self {
            Environment::Development => ".env.development",
            Environment::Production => ".env.production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "prod" | "production" => Ok(Environment::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

fn resolve_environment() -> Result<Environment, ConfigError> {
    if let Ok(value) = env::var(ENV_VAR) {
        return value.parse();
    }

    // Peek at .env without exporting it; the env-specific file must load first
    let from_dotenv = match dotenv::dotenv_iter() {
        Ok(entries) => environment_from_entries(entries)?,
        Err(_) => None,
    };
    Ok(from_dotenv.unwrap_or(Environment::Development))
}

/// SAVINGS_ENV among parsed dotenv entries, if present
fn environment_from_entries<I>(entries: I) -> Result<Option<Environment>, ConfigError>
where
    I: IntoIterator<Item = dotenv::Result<(String, String)>>,
{
    for entry in entries {
        let (key, value) = entry.map_err(|e| ConfigError::Parse(e.to_string()))?;
        if key == ENV_VAR {
            return value.parse().map(Some);
        }
    }
    Ok(None)
}

// ============================================================================
// BACKEND + APP CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
}

impl BackendConfig {
    pub fn validate(&self, environment: Environment) -> Result<(), ConfigError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Empty { name: BACKEND_URL_VAR });
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Empty { name: BACKEND_KEY_VAR });
        }

        let rest = if let Some(rest) = url.strip_prefix("https://") {
            rest
        } else if let Some(rest) = url.strip_prefix("http://") {
            if environment == Environment::Production {
                return Err(ConfigError::InsecureUrl(url.to_string()));
            }
            rest
        } else {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        };

        if rest.trim_end_matches('/').is_empty() || rest.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Profile that locally recorded savings belong to
    #[serde(default = "default_profile_id")]
    pub profile_id: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

fn default_profile_id() -> String {
    DEFAULT_PROFILE_ID.to_string()
}

impl AppConfig {
    /// Load from process environment. SAVINGS_ENV (process env first, then the
    /// plain .env) picks the .env.{environment} file, defaulting to development;
    /// the plain .env then fills any remaining gaps. Set variables always win.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = resolve_environment()?;

        match dotenv::from_filename(environment.env_file()) {
            Ok(path) => info!("Loaded {}", path.display()),
            Err(e) => debug!("{} not loaded: {}", environment.env_file(), e),
        }
        dotenv::dotenv().ok();

        Self::from_lookup(environment, |key| env::var(key).ok())
    }

    /// Build from any key lookup (process env, test maps, ...)
    pub fn from_lookup<F>(environment: Environment, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(BACKEND_URL_VAR).ok_or(ConfigError::Missing(BACKEND_URL_VAR))?;
        let api_key = lookup(BACKEND_KEY_VAR).ok_or(ConfigError::Missing(BACKEND_KEY_VAR))?;
        let database_path = lookup(DB_PATH_VAR)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let profile_id = lookup(PROFILE_VAR)
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(default_profile_id);

        let config = AppConfig {
            environment,
            backend: BackendConfig { url, api_key },
            database_path,
            profile_id,
        };
        config.validate()?;
        Ok(config)
    }

    /// SAVINGS_CONFIG points at a JSON file when set, otherwise environment variables
    pub fn load() -> Result<Self, ConfigError> {
        match env::var(CONFIG_FILE_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim())),
            _ => Self::from_env(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate(self.environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(
            "staging".parse::<Environment>(),
            Err(ConfigError::UnknownEnvironment("staging".to_string()))
        );
    }

    #[test]
    fn test_from_lookup_valid() {
        let config = AppConfig::from_lookup(
            Environment::Production,
            lookup(&[
                (BACKEND_URL_VAR, "https://abc.example.co"),
                (BACKEND_KEY_VAR, "anon-key"),
            ]),
        )
        .unwrap();

        assert_eq!(config.backend.url, "https://abc.example.co");
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.profile_id, DEFAULT_PROFILE_ID);
    }

    #[test]
    fn test_missing_and_empty_values_fail_fast() {
        let err = AppConfig::from_lookup(Environment::Development, lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(BACKEND_URL_VAR));

        let err = AppConfig::from_lookup(
            Environment::Development,
            lookup(&[(BACKEND_URL_VAR, ""), (BACKEND_KEY_VAR, "k")]),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::Empty { name: BACKEND_URL_VAR });

        let err = AppConfig::from_lookup(
            Environment::Development,
            lookup(&[(BACKEND_URL_VAR, "http://localhost:54321"), (BACKEND_KEY_VAR, "  ")]),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::Empty { name: BACKEND_KEY_VAR });
    }

    #[test]
    fn test_url_rules() {
        let backend = |url: &str| BackendConfig {
            url: url.to_string(),
            api_key: "k".to_string(),
        };

        assert!(backend("http://localhost:54321").validate(Environment::Development).is_ok());
        assert_eq!(
            backend("http://localhost:54321").validate(Environment::Production),
            Err(ConfigError::InsecureUrl("http://localhost:54321".to_string()))
        );
        assert!(matches!(
            backend("ftp://example.com").validate(Environment::Development),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            backend("https://").validate(Environment::Development),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let config = AppConfig::from_json(
            r#"{
                "environment": "development",
                "backend": { "url": "http://127.0.0.1:54321", "api_key": "dev-key" },
                "database_path": "/tmp/dev.db"
            }"#,
        )
        .unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.database_path, PathBuf::from("/tmp/dev.db"));
        assert_eq!(config.profile_id, DEFAULT_PROFILE_ID);

        let err = AppConfig::from_json(r#"{ "environment": "production" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("savings-{}-{}", uuid::Uuid::new_v4(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_environment_read_from_dotenv_entries() {
        let path = temp_file(".env", "# local\nSAVINGS_BACKEND_KEY=k\nSAVINGS_ENV=production\n");
        let found = environment_from_entries(dotenv::from_path_iter(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(found, Some(Environment::Production));

        let path = temp_file(".env", "SAVINGS_BACKEND_KEY=k\n");
        let found = environment_from_entries(dotenv::from_path_iter(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(found, None);

        let path = temp_file(".env", "SAVINGS_ENV=staging\n");
        let err = environment_from_entries(dotenv::from_path_iter(&path).unwrap()).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err, ConfigError::UnknownEnvironment("staging".to_string()));
    }

    #[test]
    fn test_from_file() {
        let path = temp_file(
            "config.json",
            r#"{
                "environment": "production",
                "backend": { "url": "https://abc.example.co", "api_key": "anon" },
                "profile_id": "p-9"
            }"#,
        );
        let config = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.backend.api_key, "anon");
        assert_eq!(config.profile_id, "p-9");
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_PATH));

        let missing = env::temp_dir().join(format!("savings-{}-absent.json", uuid::Uuid::new_v4()));
        assert!(matches!(AppConfig::from_file(&missing), Err(ConfigError::Io(_))));
    }
}
