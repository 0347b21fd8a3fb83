use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chapter_application::DEFAULT_LOOKUP_TIMEOUT;
use chapter_core::{AppError, UserId};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub lookup_timeout: Duration,
    pub role_catalog_path: Option<PathBuf>,
    pub bootstrap_admin_user_id: Option<UserId>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    fn from_lookup(
        first_arg: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let migrate_only = first_arg == Some("migrate");

        let database_url = required("DATABASE_URL")?;
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let bootstrap_token = required("AUTH_BOOTSTRAP_TOKEN")?;

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));

        let lookup_timeout = parse_lookup_timeout(optional("AUTHZ_LOOKUP_TIMEOUT_MS"))?;
        let role_catalog_path = optional("ROLE_CATALOG_PATH").map(PathBuf::from);
        let bootstrap_admin_user_id = optional("BOOTSTRAP_ADMIN_USER_ID")
            .map(|value| UserId::parse(value.as_str()))
            .transpose()?;

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            bootstrap_token,
            api_host,
            api_port,
            cookie_secure,
            lookup_timeout,
            role_catalog_path,
            bootstrap_admin_user_id,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_lookup_timeout(value: Option<String>) -> Result<Duration, AppError> {
    let Some(value) = value else {
        return Ok(DEFAULT_LOOKUP_TIMEOUT);
    };

    let millis = value.trim().parse::<u64>().map_err(|error| {
        AppError::Validation(format!("invalid AUTHZ_LOOKUP_TIMEOUT_MS '{value}': {error}"))
    })?;
    if millis == 0 {
        return Err(AppError::Validation(
            "AUTHZ_LOOKUP_TIMEOUT_MS must be greater than zero".to_owned(),
        ));
    }

    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use chapter_application::DEFAULT_LOOKUP_TIMEOUT;

    use super::{ApiConfig, parse_lookup_timeout};

    fn load_with(values: &[(&str, &str)]) -> Result<ApiConfig, chapter_core::AppError> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_lookup(None, |name| values.get(name).cloned())
    }

    #[test]
    fn minimal_environment_loads_without_session_secret() {
        let config = load_with(&[
            ("DATABASE_URL", "postgres://localhost/chapters"),
            ("AUTH_BOOTSTRAP_TOKEN", "bootstrap-token"),
        ]);

        let Ok(config) = config else {
            panic!("minimal configuration should load");
        };
        assert!(!config.migrate_only);
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.lookup_timeout, DEFAULT_LOOKUP_TIMEOUT);
        assert!(config.bootstrap_admin_user_id.is_none());
    }

    #[test]
    fn bootstrap_token_is_required() {
        let config = load_with(&[("DATABASE_URL", "postgres://localhost/chapters")]);
        assert!(config.is_err());
    }

    #[test]
    fn invalid_bootstrap_admin_id_is_rejected() {
        let config = load_with(&[
            ("DATABASE_URL", "postgres://localhost/chapters"),
            ("AUTH_BOOTSTRAP_TOKEN", "bootstrap-token"),
            ("BOOTSTRAP_ADMIN_USER_ID", "root"),
        ]);
        assert!(config.is_err());
    }

    #[test]
    fn lookup_timeout_defaults_when_unset() {
        assert_eq!(parse_lookup_timeout(None).ok(), Some(DEFAULT_LOOKUP_TIMEOUT));
    }

    #[test]
    fn lookup_timeout_is_read_in_milliseconds() {
        assert_eq!(
            parse_lookup_timeout(Some("250".to_owned())).ok(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn lookup_timeout_rejects_zero_and_garbage() {
        assert!(parse_lookup_timeout(Some("0".to_owned())).is_err());
        assert!(parse_lookup_timeout(Some("soon".to_owned())).is_err());
    }
}
