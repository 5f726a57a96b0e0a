use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value. Every
/// variable has a default, so a bare environment loads successfully: the
/// storefront must come up with nothing configured and serve the fallback
/// catalog.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, which is
/// useful for testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = or_default("DATABASE_URL", "postgres://localhost:5432/shopfront");
    let env = parse_environment(&or_default("SHOPFRONT_ENV", "development"));

    let bind_addr = parse_addr("SHOPFRONT_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("SHOPFRONT_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("SHOPFRONT_CATALOG_PATH", "./config/products.yaml"));
    let cors_origin = or_default("SHOPFRONT_CORS_ORIGIN", "http://localhost:3000");

    let db_max_connections = parse_u32("SHOPFRONT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SHOPFRONT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SHOPFRONT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let store_timeout_secs = parse_u64("SHOPFRONT_STORE_TIMEOUT_SECS", "5")?;
    let rate_limit_max_requests = parse_usize("SHOPFRONT_RATE_LIMIT_MAX_REQUESTS", "100")?;
    let rate_limit_window_secs = parse_u64("SHOPFRONT_RATE_LIMIT_WINDOW_SECS", "900")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        catalog_path,
        cors_origin,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        store_timeout_secs,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_development() {
        assert_eq!(parse_environment("development"), Environment::Development);
    }

    #[test]
    fn parse_environment_test() {
        assert_eq!(parse_environment("test"), Environment::Test);
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_with_empty_environment() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).expect("defaults");

        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.database_url, "postgres://localhost:5432/shopfront");
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:5000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.cors_origin, "http://localhost:3000");
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.db_min_connections, 1);
        assert_eq!(cfg.db_acquire_timeout_secs, 10);
        assert_eq!(cfg.store_timeout_secs, 5);
        assert_eq!(cfg.rate_limit_max_requests, 100);
        assert_eq!(cfg.rate_limit_window_secs, 900);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SHOPFRONT_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPFRONT_BIND_ADDR"),
            "expected InvalidEnvVar(SHOPFRONT_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_store_timeout_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SHOPFRONT_STORE_TIMEOUT_SECS", "2");
        let cfg = build_app_config(lookup_from_map(&map)).expect("valid");
        assert_eq!(cfg.store_timeout_secs, 2);
    }

    #[test]
    fn build_app_config_store_timeout_invalid() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SHOPFRONT_STORE_TIMEOUT_SECS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPFRONT_STORE_TIMEOUT_SECS"),
            "expected InvalidEnvVar(SHOPFRONT_STORE_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rate_limit_overrides() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SHOPFRONT_RATE_LIMIT_MAX_REQUESTS", "20");
        map.insert("SHOPFRONT_RATE_LIMIT_WINDOW_SECS", "60");
        let cfg = build_app_config(lookup_from_map(&map)).expect("valid");
        assert_eq!(cfg.rate_limit_max_requests, 20);
        assert_eq!(cfg.rate_limit_window_secs, 60);
    }

    #[test]
    fn build_app_config_rate_limit_invalid() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SHOPFRONT_RATE_LIMIT_MAX_REQUESTS", "many");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPFRONT_RATE_LIMIT_MAX_REQUESTS"),
            "expected InvalidEnvVar(SHOPFRONT_RATE_LIMIT_MAX_REQUESTS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_database_url_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("DATABASE_URL", "postgres://user:pass@db:5432/shop");
        let cfg = build_app_config(lookup_from_map(&map)).expect("valid");
        assert_eq!(cfg.database_url, "postgres://user:pass@db:5432/shop");
    }

    #[test]
    fn build_app_config_catalog_path_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("SHOPFRONT_CATALOG_PATH", "/etc/shopfront/catalog.yaml");
        let cfg = build_app_config(lookup_from_map(&map)).expect("valid");
        assert_eq!(
            cfg.catalog_path.to_string_lossy(),
            "/etc/shopfront/catalog.yaml"
        );
    }

    #[test]
    fn debug_output_redacts_database_url() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).expect("defaults");
        let debug = format!("{cfg:?}");
        assert!(debug.contains("[redacted]"));
        assert!(!debug.contains("postgres://"));
    }
}
