use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub layout: LayoutConfig,
    pub business_rules: BusinessRules,
}

/// Where the venue-metadata collaborator's layout export lives: a JSON
/// array of section specs, read once at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,

    /// Pool sizing for the booking ledger. Commits are short transactions,
    /// so a small pool goes a long way.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// How long a hold protects its seats before the reaper (or lazy
    /// expiry) gives them back.
    #[serde(default = "default_hold_ttl")]
    pub hold_ttl_seconds: u64,

    /// No-show policy: booked seats reopen once fewer than this many
    /// minutes remain before the show starts.
    #[serde(default = "default_reopen_window")]
    pub reopen_window_minutes: u64,

    /// Cadence of the background hold sweep.
    #[serde(default = "default_reaper_interval")]
    pub reaper_interval_seconds: u64,

    /// How long expired/released/consumed hold records stay queryable
    /// before the sweep evicts them.
    #[serde(default = "default_hold_retention")]
    pub hold_retention_seconds: u64,
}

fn default_hold_ttl() -> u64 {
    60
}

fn default_reopen_window() -> u64 {
    30
}

fn default_reaper_interval() -> u64 {
    5
}

fn default_hold_retention() -> u64 {
    600
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of MARQUEE)
            // Eg.. `MARQUEE__SERVER__PORT=1` would set the `server.port` key
            .add_source(config::Environment::with_prefix("MARQUEE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(toml: &str) -> T {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_database_pool_defaults() {
        let db: DatabaseConfig = parse("url = \"postgres://localhost/marquee\"");
        assert_eq!(db.max_connections, 5);
        assert_eq!(db.acquire_timeout_seconds, 3);
    }

    #[test]
    fn test_business_rule_defaults() {
        let rules: BusinessRules = parse("");
        assert_eq!(rules.hold_ttl_seconds, 60);
        assert_eq!(rules.reopen_window_minutes, 30);
        assert_eq!(rules.reaper_interval_seconds, 5);
        assert_eq!(rules.hold_retention_seconds, 600);
    }
}
