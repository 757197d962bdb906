use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "cadence.toml",
    "config/cadence.toml",
    "crates/config/cadence.toml",
    "../cadence.toml",
    "../config/cadence.toml",
    "../crates/config/cadence.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub messaging: MessagingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            messaging: MessagingConfig::default(),
        }
    }
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
            port: 8070,
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
            url: "sqlite://cadence.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Settings for the signed-token handshake on both the REST and socket
/// boundaries.
///
/// ```
/// use cadence_config::AuthConfig;
///
/// let auth = AuthConfig::default();
/// assert_eq!(auth.handshake_timeout_seconds, 20);
/// assert_eq!(auth.token_ttl_seconds, 86_400);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "AuthConfig::default_token_ttl")]
    pub token_ttl_seconds: u64,
    /// How long an unauthenticated socket may sit in the handshake before it
    /// is closed.
    #[serde(default = "AuthConfig::default_handshake_timeout")]
    pub handshake_timeout_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Self::default_jwt_secret(),
            token_ttl_seconds: Self::default_token_ttl(),
            handshake_timeout_seconds: Self::default_handshake_timeout(),
        }
    }
}

impl AuthConfig {
    fn default_jwt_secret() -> String {
        "insecure-dev-secret".to_string()
    }

    const fn default_token_ttl() -> u64 {
        86_400
    }

    const fn default_handshake_timeout() -> u64 {
        20
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Capacity of each connection's outbound event queue. A full queue drops
    /// events instead of stalling the sender.
    #[serde(default = "MessagingConfig::default_outbound_queue_depth")]
    pub outbound_queue_depth: usize,
    #[serde(default = "MessagingConfig::default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "MessagingConfig::default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            outbound_queue_depth: Self::default_outbound_queue_depth(),
            default_page_size: Self::default_page_size(),
            max_page_size: Self::default_max_page_size(),
        }
    }
}

impl MessagingConfig {
    const fn default_outbound_queue_depth() -> usize {
        64
    }

    const fn default_page_size() -> u32 {
        50
    }

    const fn default_max_page_size() -> u32 {
        100
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use cadence_config::load;
///
/// std::env::remove_var("CADENCE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let token_ttl = defaults.auth.token_ttl_seconds;
    let token_ttl_i64 = if token_ttl > i64::MAX as u64 {
        i64::MAX
    } else {
        token_ttl as i64
    };

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
        .set_default("auth.jwt_secret", defaults.auth.jwt_secret.clone())
        .unwrap()
        .set_default("auth.token_ttl_seconds", token_ttl_i64)
        .unwrap()
        .set_default(
            "auth.handshake_timeout_seconds",
            i64::try_from(defaults.auth.handshake_timeout_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default(
            "messaging.outbound_queue_depth",
            i64::try_from(defaults.messaging.outbound_queue_depth).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default(
            "messaging.default_page_size",
            i64::from(defaults.messaging.default_page_size),
        )
        .unwrap()
        .set_default(
            "messaging.max_page_size",
            i64::from(defaults.messaging.max_page_size),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("CADENCE").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("CADENCE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via CADENCE_CONFIG");
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

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
