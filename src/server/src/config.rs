use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CACHE_DIRECTORY: &str = "cache";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_JOB_TTL: Duration = Duration::from_secs(60 * 60);

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub cache_directory: PathBuf,
    pub log_level: String,
    pub port: u16,
    /// Terminal simulation jobs older than this are reaped.
    pub job_ttl: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = ServerConfig::default();

        if let Ok(dir) = env::var("CACHE_DIRECTORY") {
            config.cache_directory = PathBuf::from(dir);
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(port) = env::var("PORT").ok().and_then(|port| port.parse().ok()) {
            config.port = port;
        }

        config
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            cache_directory: PathBuf::from(DEFAULT_CACHE_DIRECTORY),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            port: DEFAULT_PORT,
            job_ttl: DEFAULT_JOB_TTL,
        }
    }
}
