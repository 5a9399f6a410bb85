//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env(String),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env(e) => write!(f, "Environment error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GateConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => GateConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay secrets and the environment name from variables.
///
/// `lookup` abstracts `std::env::var` so tests do not touch process state.
pub fn apply_env_overrides<F>(config: &mut GateConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(env) = get("PORTFOLIO_ENV") {
        config.environment = env.parse().map_err(ConfigError::Env)?;
    }
    if let Some(v) = get("ADMIN_PASSWORD") {
        config.admin.password = Some(v);
    }
    if let Some(v) = get("ADMIN_PASSWORD_HASH") {
        config.admin.password_sha256 = Some(v);
    }
    if let Some(v) = get("ADMIN_PASSWORD_SCRYPT") {
        config.admin.password_scrypt = Some(v);
    }
    if let Some(v) = get("PASSWORD_SALT") {
        config.admin.password_salt = Some(v);
    }
    if let Some(v) = get("JWT_SECRET") {
        config.admin.jwt_secret = Some(v);
    }
    if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
        config.alerts.telegram_bot_token = Some(v);
    }
    if let Some(v) = get("TELEGRAM_CHAT_ID") {
        config.alerts.telegram_chat_id = Some(v);
    }
    if let Some(v) = get("UPSTREAM_URL") {
        config.upstream.url = Some(v);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Environment;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [login]
            max_attempts = 3
            "#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.login.max_attempts, 3);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listener = 5").unwrap();
        assert!(matches!(load_config(Some(file.path())), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PORTFOLIO_ENV", "production"),
            ("JWT_SECRET", "from-env"),
            ("ADMIN_PASSWORD", ""),
            ("ADMIN_PASSWORD_SCRYPT", "abcd"),
            ("PASSWORD_SALT", "salt"),
        ]);
        let mut config = GateConfig::default();
        apply_env_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.admin.jwt_secret.as_deref(), Some("from-env"));
        assert!(config.admin.password.is_none());
        assert_eq!(config.admin.password_scrypt.as_deref(), Some("abcd"));
        assert_eq!(config.admin.password_salt.as_deref(), Some("salt"));
    }

    #[test]
    fn test_bad_env_name() {
        let mut config = GateConfig::default();
        let result = apply_env_overrides(&mut config, |k| {
            (k == "PORTFOLIO_ENV").then(|| "qa".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }
}
