//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::{
    config::Config,
    db::Store,
    judge::{Judge, Sandbox},
    realtime::Broker,
    services::{ContestService, StandingsService, SubmissionService},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    store: Arc<dyn Store>,
    broker: Broker,
    submissions: SubmissionService,
    standings: StandingsService,
    contests: ContestService,
    config: Config,
}

impl AppState {
    /// Wire the services around a store and a sandbox
    pub fn new(store: Arc<dyn Store>, sandbox: Arc<dyn Sandbox>, config: Config) -> Self {
        let broker = Broker::from_config(&config.broker);
        let judge = Judge::new(sandbox, &config.judge);

        let submissions = SubmissionService::new(
            store.clone(),
            judge,
            broker.clone(),
            config.judge.max_concurrency,
        );
        let standings = StandingsService::new(store.clone(), config.standings.clone());
        let contests = ContestService::new(store.clone());

        Self {
            inner: Arc::new(AppStateInner {
                store,
                broker,
                submissions,
                standings,
                contests,
                config,
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.inner.store
    }

    pub fn broker(&self) -> &Broker {
        &self.inner.broker
    }

    pub fn submissions(&self) -> &SubmissionService {
        &self.inner.submissions
    }

    pub fn standings(&self) -> &StandingsService {
        &self.inner.standings
    }

    pub fn contests(&self) -> &ContestService {
        &self.inner.contests
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::{
        BrokerConfig, DatabaseConfig, JudgeConfig, JwtConfig, LogFormat, ServerConfig,
        StandingsConfig,
    };

    pub const JWT_SECRET: &str = "router-test-secret";

    pub fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                rust_log: "info".to_string(),
                log_format: LogFormat::Pretty,
            },
            database: DatabaseConfig {
                url: "postgres://unused".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: JWT_SECRET.to_string(),
            },
            judge: JudgeConfig::default(),
            standings: StandingsConfig::default(),
            broker: BrokerConfig::default(),
        }
    }
}
