use secrecy::Secret;
use service_core::config::{self as core_config, get_env, is_production};
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct PeopleConfig {
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub show_route: ShowRouteMode,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Required for the `mongo` backend.
    pub database_url: Option<Secret<String>>,
    /// Used when `database_url` names no database.
    pub database_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

/// What `GET /people/:id` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowRouteMode {
    /// Update-by-id with the request body, answering `null` on a miss. Kept
    /// for compatibility with existing clients.
    #[default]
    Legacy,
    /// Plain read-by-id, answering 404 on a miss.
    Read,
}

impl PeopleConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env, configuration.* and APP__ / PORT
        let common = core_config::Config::load()?;
        let is_prod = is_production();

        let backend: StoreBackend = get_env("STORE_BACKEND", Some("mongo"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let database_url = match backend {
            StoreBackend::Mongo => Some(Secret::new(get_env("DATABASE_URL", None, is_prod)?)),
            StoreBackend::Memory => env::var("DATABASE_URL").ok().map(Secret::new),
        };

        let show_route: ShowRouteMode = get_env("SHOW_ROUTE_MODE", Some("legacy"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        Ok(PeopleConfig {
            common,
            store: StoreConfig {
                backend,
                database_url,
                database_name: get_env("DATABASE_NAME", Some("people"), false)?,
            },
            show_route,
        })
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl FromStr for ShowRouteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(ShowRouteMode::Legacy),
            "read" => Ok(ShowRouteMode::Read),
            _ => Err(format!("Invalid show route mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backends_case_insensitively() {
        assert_eq!("MongoDB".parse::<StoreBackend>(), Ok(StoreBackend::Mongo));
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn show_route_defaults_to_legacy() {
        assert_eq!(ShowRouteMode::default(), ShowRouteMode::Legacy);
        assert_eq!("READ".parse::<ShowRouteMode>(), Ok(ShowRouteMode::Read));
        assert!("write".parse::<ShowRouteMode>().is_err());
    }
}
