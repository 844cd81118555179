//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_BROKER_BUFFER, DEFAULT_COMPILE_SCRIPT, DEFAULT_DATABASE_MAX_CONNECTIONS,
    DEFAULT_JUDGE_MAX_CONCURRENCY, DEFAULT_MEMORY_EXIT_CODE, DEFAULT_MESSAGE_LIMIT,
    DEFAULT_RUN_SCRIPT, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_TIMEOUT_EXIT_CODE,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub judge: JudgeConfig,
    pub standings: StandingsConfig,
    pub broker: BrokerConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT verification configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

/// Sandbox protocol and judging task configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Program invoked as `<compile_script> <source-file> <language>`
    pub compile_script: PathBuf,
    /// Program invoked as `<run_script> <artifact> <input-file> <language>`
    pub run_script: PathBuf,
    /// Where temporary source and input files are written
    pub work_dir: PathBuf,
    pub timeout_exit_code: i32,
    pub memory_exit_code: i32,
    /// Truncation limit for process diagnostics
    pub message_limit: usize,
    /// 0 = unbounded
    pub max_concurrency: usize,
}

/// Which submissions count toward standings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// Only submissions in `[start, start + duration]`
    Contest,
    /// Every submission for the contest's problems
    Open,
}

/// Who gets a row in the standings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantScope {
    /// Every known user
    All,
    /// Users registered for the contest
    Contest,
}

/// Standings computation configuration
#[derive(Debug, Clone)]
pub struct StandingsConfig {
    pub window: WindowMode,
    pub participants: ParticipantScope,
    /// Keep counting attempts on a problem after it was solved
    pub count_attempts_after_solve: bool,
}

/// Notification broker configuration
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Signals buffered per subscriber before new ones are dropped
    pub buffer: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            judge: JudgeConfig::from_env()?,
            standings: StandingsConfig::from_env()?,
            broker: BrokerConfig::from_env()?,
        })
    }
}

/// Read `key` and parse it, falling back to `default` when unset
fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format: parse_var("LOG_FORMAT", LogFormat::Pretty)?,
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
        })
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_SECRET".to_string()))?,
        })
    }
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            compile_script: PathBuf::from(
                env::var("COMPILE_SCRIPT").unwrap_or_else(|_| DEFAULT_COMPILE_SCRIPT.to_string()),
            ),
            run_script: PathBuf::from(
                env::var("RUN_SCRIPT").unwrap_or_else(|_| DEFAULT_RUN_SCRIPT.to_string()),
            ),
            work_dir: env::var("JUDGE_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            timeout_exit_code: parse_var("TIMEOUT_EXIT_CODE", DEFAULT_TIMEOUT_EXIT_CODE)?,
            memory_exit_code: parse_var("MEMORY_EXIT_CODE", DEFAULT_MEMORY_EXIT_CODE)?,
            message_limit: parse_var("JUDGE_MESSAGE_LIMIT", DEFAULT_MESSAGE_LIMIT)?,
            max_concurrency: parse_var("JUDGE_MAX_CONCURRENCY", DEFAULT_JUDGE_MAX_CONCURRENCY)?,
        })
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            compile_script: PathBuf::from(DEFAULT_COMPILE_SCRIPT),
            run_script: PathBuf::from(DEFAULT_RUN_SCRIPT),
            work_dir: env::temp_dir(),
            timeout_exit_code: DEFAULT_TIMEOUT_EXIT_CODE,
            memory_exit_code: DEFAULT_MEMORY_EXIT_CODE,
            message_limit: DEFAULT_MESSAGE_LIMIT,
            max_concurrency: DEFAULT_JUDGE_MAX_CONCURRENCY,
        }
    }
}

impl StandingsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            window: parse_var("STANDINGS_WINDOW", WindowMode::Contest)?,
            participants: parse_var("STANDINGS_PARTICIPANTS", ParticipantScope::All)?,
            count_attempts_after_solve: parse_var("STANDINGS_COUNT_AFTER_SOLVE", false)?,
        })
    }
}

impl Default for StandingsConfig {
    fn default() -> Self {
        Self {
            window: WindowMode::Contest,
            participants: ParticipantScope::All,
            count_attempts_after_solve: false,
        }
    }
}

impl BrokerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let buffer = parse_var("BROKER_BUFFER", DEFAULT_BROKER_BUFFER)?;
        if buffer == 0 {
            return Err(ConfigError::InvalidValue("BROKER_BUFFER".to_string()));
        }
        Ok(Self { buffer })
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            buffer: DEFAULT_BROKER_BUFFER,
        }
    }
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

impl FromStr for WindowMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contest" => Ok(Self::Contest),
            "open" => Ok(Self::Open),
            _ => Err(()),
        }
    }
}

impl FromStr for ParticipantScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "contest" => Ok(Self::Contest),
            _ => Err(()),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
