use crate::error::{config_error, env_error, CalResult};
use crate::utils::time::{parse_weekday, CalendarZone};
use chrono::Weekday;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Default address of the mock API
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";

/// Default port the mock API listens on
pub const DEFAULT_PORT: u16 = 3001;

/// Signing secret used when `JWT_SECRET` is not set
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-here";

/// Optional overrides file, merged over the environment
pub const CONFIG_FILE: &str = "config/kalenteri.toml";

/// Configuration shared by the client and the mock server
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST API
    pub api_base_url: Url,
    /// Directory holding the persisted session
    pub session_dir: PathBuf,
    /// Zone instants are rendered in
    pub timezone: CalendarZone,
    /// First day of the week in grids
    pub week_start: Weekday,
    /// Address the mock server binds to
    pub host: String,
    /// Port the mock server listens on
    pub port: u16,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Token lifetime in minutes
    pub token_expiration_minutes: i64,
    /// Whether the mock server starts with the demo user and events
    pub seed_data: bool,
}

/// Keys accepted in the overrides file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    session_dir: Option<PathBuf>,
    timezone: Option<String>,
    week_start: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    jwt_secret: Option<String>,
    token_expiration_minutes: Option<i64>,
    seed_data: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default API URL is valid"),
            session_dir: default_session_dir(),
            timezone: CalendarZone::Local,
            week_start: Weekday::Sun,
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_expiration_minutes: 60,
            seed_data: true,
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> CalResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Config::default();

        if let Ok(url) = env::var("API_BASE_URL") {
            config.api_base_url = Url::parse(&url).map_err(|_| env_error("API_BASE_URL"))?;
        }
        if let Ok(dir) = env::var("SESSION_DIR") {
            config.session_dir = PathBuf::from(dir);
        }
        if let Ok(tz) = env::var("TIMEZONE") {
            config.timezone = CalendarZone::parse(&tz).ok_or_else(|| env_error("TIMEZONE"))?;
        }
        if let Ok(day) = env::var("WEEK_START") {
            config.week_start = parse_weekday(&day).ok_or_else(|| env_error("WEEK_START"))?;
        }
        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            config.port = port.parse::<u16>().map_err(|_| env_error("PORT"))?;
        }
        if let Ok(secret) = env::var("JWT_SECRET") {
            config.jwt_secret = secret;
        }
        if let Ok(minutes) = env::var("TOKEN_EXPIRATION_MINUTES") {
            config.token_expiration_minutes = minutes
                .parse::<i64>()
                .map_err(|_| env_error("TOKEN_EXPIRATION_MINUTES"))?;
        }
        if let Ok(seed) = env::var("SEED_DATA") {
            config.seed_data = seed.parse::<bool>().map_err(|_| env_error("SEED_DATA"))?;
        }

        // Merge overrides from file if it exists
        if let Ok(content) = fs::read_to_string(CONFIG_FILE) {
            config.merge_toml(&content)?;
        }

        Ok(config)
    }

    /// Apply overrides from TOML text
    pub fn merge_toml(&mut self, content: &str) -> CalResult<()> {
        let file: FileConfig = toml::from_str(content)?;

        if let Some(url) = file.api_base_url {
            self.api_base_url = Url::parse(&url)?;
        }
        if let Some(dir) = file.session_dir {
            self.session_dir = dir;
        }
        if let Some(tz) = file.timezone {
            self.timezone = CalendarZone::parse(&tz)
                .ok_or_else(|| config_error(&format!("Unknown timezone: {}", tz)))?;
        }
        if let Some(day) = file.week_start {
            self.week_start = parse_weekday(&day)
                .ok_or_else(|| config_error(&format!("Unknown weekday: {}", day)))?;
        }
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(secret) = file.jwt_secret {
            self.jwt_secret = secret;
        }
        if let Some(minutes) = file.token_expiration_minutes {
            self.token_expiration_minutes = minutes;
        }
        if let Some(seed) = file.seed_data {
            self.seed_data = seed;
        }

        Ok(())
    }

    /// Address the mock server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_session_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kalenteri")
}
