use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "teamboard-development-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub auth_audience: String,
    pub auth_issuer_base_url: String,
    pub token_ttl_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub connection_lifetime_secs: u64,
    pub app_env: String,
}

impl Config {
    /// Loads the configuration from the process environment.
    /// A `.env` file in the working directory is read first, if present.
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| "DATABASE_URL must be set".to_string())?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using the development default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let auth_audience = lookup("AUTH_AUDIENCE")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "AUTH_AUDIENCE must be set".to_string())?;

        let auth_issuer_base_url = lookup("AUTH_ISSUER_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "AUTH_ISSUER_BASE_URL must be set".to_string())?;

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let server_port = parse_or(&lookup, "PORT", 3000u16)?;
        let token_ttl_hours = parse_or(&lookup, "TOKEN_TTL_HOURS", 24i64)?;
        if token_ttl_hours <= 0 {
            return Err("Invalid TOKEN_TTL_HOURS: must be a positive number".to_string());
        }
        let max_connections = parse_or(&lookup, "MAX_DB_CONNECTIONS", 10u32)?;
        let connection_lifetime_secs = parse_or(&lookup, "DB_CONNECTION_LIFETIME_SECS", 1800u64)?;

        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        Ok(Config {
            database_url,
            jwt_secret,
            auth_audience,
            auth_issuer_base_url,
            token_ttl_hours,
            server_host,
            server_port,
            max_connections,
            connection_lifetime_secs,
            app_env,
        })
    }

    /// Logs the configuration, hiding secrets.
    pub fn print_info(&self) {
        info!("Environment: {}", self.app_env);
        info!("Server address: {}:{}", self.server_host, self.server_port);
        info!("Database: {}", Self::mask_url(&self.database_url));
        info!("Max DB connections: {}", self.max_connections);
        info!("Connection lifetime: {}s", self.connection_lifetime_secs);
        info!("Token issuer: {}", self.auth_issuer_base_url);
        info!("Token audience: {}", self.auth_audience);
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("JWT secret: USING DEFAULT (INSECURE!)");
        } else {
            info!("JWT secret: custom secret configured");
        }
    }

    /// Masks the credentials part of the database URL.
    pub fn mask_url(url: &str) -> String {
        if let (Some(at_pos), Some(scheme_end)) = (url.rfind('@'), url.find("://")) {
            if at_pos > scheme_end {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        "***".to_string()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("Invalid {}: '{}' is not a valid number", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "mysql://root:pw@localhost:3306/teamboard"),
        ("AUTH_AUDIENCE", "https://api.teamboard.test"),
        ("AUTH_ISSUER_BASE_URL", "https://auth.teamboard.test/"),
    ];

    #[test]
    fn defaults_are_applied() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.app_env, "development");
    }

    #[test]
    fn port_is_read_from_port_variable() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "8080"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.contains("PORT"));
    }

    #[test]
    fn missing_audience_is_rejected() {
        let pairs = [REQUIRED[0], REQUIRED[2]];
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.contains("AUTH_AUDIENCE"));
    }

    #[test]
    fn missing_database_url_is_rejected() {
        let pairs = [REQUIRED[1], REQUIRED[2]];
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("TOKEN_TTL_HOURS", "0"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn mask_url_hides_credentials() {
        assert_eq!(
            Config::mask_url("mysql://root:secret@db:3306/teamboard"),
            "mysql://***@db:3306/teamboard"
        );
        assert_eq!(Config::mask_url("not a url"), "***");
    }
}
