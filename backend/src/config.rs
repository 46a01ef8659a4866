use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub language: LanguageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Languages the application resolves to, in header matching priority
    pub allowed: Vec<String>,
    /// Fallback when neither the cookie nor the header gives a language
    pub default: String,
    pub cookie: CookieConfig,
}

/// Language cookie parameters, fixed once the resolver is built
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CookieConfig {
    pub name: String,
    /// Cookie max-age in seconds (default: 365 days)
    #[serde(rename = "timeout", deserialize_with = "deserialize_duration_secs")]
    pub timeout_secs: u64,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from the given path, or from config.toml when none is given
    /// 2. Override with environment variables (prefixed with APP_)
    /// 3. Validate the final configuration
    pub fn load(path: Option<&str>) -> Result<Self, anyhow::Error> {
        // 1. Load from config file
        let mut config = match path.map(str::to_string).or_else(Self::find_config_file) {
            Some(config_path) => Self::from_toml(&config_path)?,
            None => {
                tracing::warn!("Configuration file not found, using defaults");
                Config::default()
            },
        };

        // 2. Override with environment variables
        config.apply_env_overrides();

        // 3. Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 8080)
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,language_cookie=debug")
    /// - APP_LANGUAGE_ALLOWED: Comma separated allowed languages (e.g., "en,fr")
    /// - APP_LANGUAGE_DEFAULT: Default language
    /// - APP_LANGUAGE_COOKIE_NAME: Cookie name (default: lang)
    /// - APP_LANGUAGE_COOKIE_TIMEOUT: Cookie max-age (accepts "3600", "12h", "365d")
    /// - APP_LANGUAGE_COOKIE_DOMAIN: Cookie domain
    /// - APP_LANGUAGE_COOKIE_SECURE: Secure flag (true/false)
    /// - APP_LANGUAGE_COOKIE_HTTPONLY: HttpOnly flag (true/false)
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Ok(port) = std::env::var("APP_SERVER_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
            tracing::info!("Override server.port from env: {}", self.server.port);
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(allowed) = std::env::var("APP_LANGUAGE_ALLOWED") {
            self.language.allowed = parse_language_list(&allowed);
            tracing::info!("Override language.allowed from env: {:?}", self.language.allowed);
        }

        if let Ok(default) = std::env::var("APP_LANGUAGE_DEFAULT") {
            self.language.default = default.trim().to_string();
            tracing::info!("Override language.default from env: {}", self.language.default);
        }

        if let Ok(name) = std::env::var("APP_LANGUAGE_COOKIE_NAME") {
            self.language.cookie.name = name;
            tracing::info!("Override language.cookie.name from env: {}", self.language.cookie.name);
        }

        if let Ok(timeout) = std::env::var("APP_LANGUAGE_COOKIE_TIMEOUT") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.language.cookie.timeout_secs = val;
                    tracing::info!(
                        "Override language.cookie.timeout from env: {}s",
                        self.language.cookie.timeout_secs
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_LANGUAGE_COOKIE_TIMEOUT '{}': {} (keep {}s)",
                    timeout,
                    e,
                    self.language.cookie.timeout_secs
                ),
            }
        }

        if let Ok(domain) = std::env::var("APP_LANGUAGE_COOKIE_DOMAIN") {
            self.language.cookie.domain = Some(domain).filter(|d| !d.is_empty());
            tracing::info!(
                "Override language.cookie.domain from env: {:?}",
                self.language.cookie.domain
            );
        }

        if let Ok(secure) = std::env::var("APP_LANGUAGE_COOKIE_SECURE")
            && let Ok(val) = secure.parse()
        {
            self.language.cookie.secure = val;
            tracing::info!(
                "Override language.cookie.secure from env: {}",
                self.language.cookie.secure
            );
        }

        if let Ok(http_only) = std::env::var("APP_LANGUAGE_COOKIE_HTTPONLY")
            && let Ok(val) = http_only.parse()
        {
            self.language.cookie.http_only = val;
            tracing::info!(
                "Override language.cookie.http_only from env: {}",
                self.language.cookie.http_only
            );
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        // Validate server port
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        self.language.cookie.validate()?;

        // The resolver does not enforce these, only warn
        if self.language.allowed.is_empty() {
            tracing::warn!("language.allowed is empty, only cookies and the default will resolve");
        } else if !self.language.allowed.contains(&self.language.default) {
            tracing::warn!(
                "language.default '{}' is not one of the allowed languages {:?}",
                self.language.default,
                self.language.allowed
            );
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl CookieConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.name.is_empty() {
            anyhow::bail!("language.cookie.name cannot be empty");
        }
        if self.name.chars().any(|c| c == ';' || c == '=' || c == ',' || c.is_whitespace()) {
            anyhow::bail!("language.cookie.name '{}' is not a valid cookie name", self.name);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("language.cookie.timeout must be > 0");
        }
        if self.timeout_secs > i64::MAX as u64 {
            anyhow::bail!("language.cookie.timeout is too large");
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,language_cookie=debug".to_string(),
            file: Some("logs/language-cookie.log".to_string()),
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            allowed: vec!["en".to_string()],
            default: "en".to_string(),
            cookie: CookieConfig::default(),
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "lang".to_string(),
            timeout_secs: 365 * 24 * 60 * 60,
            domain: None,
            secure: false,
            http_only: false,
        }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_language_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    let secs = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(n),
        "m" | "min" | "mins" | "minute" | "minutes" => n.checked_mul(60),
        "h" | "hr" | "hour" | "hours" => n.checked_mul(60 * 60),
        "d" | "day" | "days" => n.checked_mul(60 * 60 * 24),
        "w" | "week" | "weeks" => n.checked_mul(60 * 60 * 24 * 7),
        _ => return Err(format!("unsupported unit: {}", unit)),
    };
    secs.ok_or_else(|| "duration overflow".to_string())
}

// Custom serde deserializer to support numeric or human-friendly string values
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '12h', '365d'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
        fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(&v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}
