use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "reviewdeck.toml",
    "config/reviewdeck.toml",
    "crates/config/reviewdeck.toml",
    "../reviewdeck.toml",
    "../config/reviewdeck.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub api: ApiConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://reviewdeck.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Signing material and lifetimes for confirmation codes and access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    #[serde(default = "AuthConfig::default_confirmation_ttl")]
    pub confirmation_ttl_seconds: u64,
    #[serde(default = "AuthConfig::default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: "insecure-dev-secret".to_string(),
            confirmation_ttl_seconds: Self::default_confirmation_ttl(),
            token_ttl_seconds: Self::default_token_ttl(),
        }
    }
}

impl AuthConfig {
    // Three days.
    fn default_confirmation_ttl() -> u64 {
        259_200
    }

    // Access tokens are long-lived; authorization re-reads the user row anyway.
    fn default_token_ttl() -> u64 {
        2_592_000
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub sender: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: "noreply@reviewdeck.local".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_page_size")]
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            page_size: Self::default_page_size(),
        }
    }
}

impl ApiConfig {
    fn default_page_size() -> u32 {
        10
    }
}

/// Field-length ceilings shared by validation and the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub username_max_length: usize,
    pub email_max_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            username_max_length: 150,
            email_max_length: 254,
        }
    }
}

/// Load the application configuration by combining defaults, an optional
/// TOML file, and `REVIEWDECK`-prefixed environment overrides.
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap()
        .set_default("auth.secret", defaults.auth.secret.clone())
        .unwrap()
        .set_default(
            "auth.confirmation_ttl_seconds",
            i64::try_from(defaults.auth.confirmation_ttl_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default(
            "auth.token_ttl_seconds",
            i64::try_from(defaults.auth.token_ttl_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default("mail.sender", defaults.mail.sender.clone())
        .unwrap()
        .set_default("api.page_size", i64::from(defaults.api.page_size))
        .unwrap()
        .set_default(
            "limits.username_max_length",
            defaults.limits.username_max_length as i64,
        )
        .unwrap()
        .set_default(
            "limits.email_max_length",
            defaults.limits.email_max_length as i64,
        )
        .unwrap();

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("REVIEWDECK_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via REVIEWDECK_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(config::Environment::with_prefix("REVIEWDECK").separator("__"));

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn defaults_load_without_file() {
        std::env::remove_var("REVIEWDECK_CONFIG");

        let config = load().expect("defaults should load");
        assert_eq!(config.http.port, 8000);
        assert_eq!(config.limits.username_max_length, 150);
        assert_eq!(config.limits.email_max_length, 254);
        assert_eq!(config.api.page_size, 10);
    }

    #[test]
    #[serial]
    fn config_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reviewdeck.toml");
        std::fs::File::create(&path)
            .and_then(|mut file| {
                writeln!(
                    file,
                    "[http]\naddress = \"0.0.0.0\"\nport = 9001\n\n[auth]\nsecret = \"test-secret\"\nconfirmation_ttl_seconds = 600\n"
                )
            })
            .unwrap();

        std::env::set_var("REVIEWDECK_CONFIG", &path);
        let config = load().expect("file config should load");
        std::env::remove_var("REVIEWDECK_CONFIG");

        assert_eq!(config.http.port, 9001);
        assert_eq!(config.auth.secret, "test-secret");
        assert_eq!(config.auth.confirmation_ttl_seconds, 600);
        // Sections absent from the file keep their defaults.
        assert_eq!(config.mail.sender, "noreply@reviewdeck.local");
    }
}
