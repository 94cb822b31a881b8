use std::{env::VarError, net::SocketAddr};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_CONNECTIONS: usize = 10;
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3003",
    "http://localhost:3004",
    "http://localhost:5173",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

impl Env {
    pub fn from_env() -> Self {
        match var("ENVIRONMENT") {
            Ok(Some(env)) => Env::parse(&env),
            _ => Env::Dev,
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "dev" => Env::Dev,
            "staging" => Env::Staging,
            "production" => Env::Production,
            _ => Env::Dev,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub env: Env,
    pub listen_addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: usize,
    pub cors_origins: Vec<String>,
}

/// `Ok(None)` when `key` is unset.
fn var(key: &str) -> Result<Option<String>, String> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(format!("`{key}` is not valid unicode")),
    }
}

/// Exits the process when `key` is unset, blank or unreadable.
fn required_var(key: &str) -> String {
    match var(key) {
        Ok(Some(value)) if !value.trim().is_empty() => value,
        Ok(_) => {
            tracing::error!(key, "Required environment variable is not set");
            std::process::exit(1)
        }
        Err(e) => {
            tracing::error!(key, error = %e, "Could not read required environment variable");
            std::process::exit(1)
        }
    }
}

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
fn parsed_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match var(key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::error!("Invalid value `{raw}` for `{key}`, using the default");
            default
        }),
        _ => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}

impl ServerConfig {
    pub fn new_from_env() -> Self {
        let default_addr: SocketAddr = DEFAULT_LISTEN_ADDR
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8000)));

        ServerConfig {
            env: Env::from_env(),
            listen_addr: parsed_var("LISTEN_ADDR", default_addr),
            database_url: required_var("DATABASE_URL"),
            database_max_connections: parsed_var(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            ),
            cors_origins: match var("CORS_ORIGINS") {
                Ok(Some(raw)) => parse_origins(&raw),
                _ => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_env_parse() {
        assert_eq!(Env::parse("production"), Env::Production);
        assert_eq!(Env::parse("staging"), Env::Staging);
        assert_eq!(Env::parse("dev"), Env::Dev);
        assert_eq!(Env::parse("prod"), Env::Dev);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, https://b.test/ ,,"),
            vec!["http://a.test".to_string(), "https://b.test".to_string()]
        );
        assert!(parse_origins(" ").is_empty());
    }

    #[test]
    fn test_parsed_var_falls_back_when_unset() {
        assert_eq!(parsed_var("STUDYHUB_TEST_SURELY_UNSET_VAR", 42usize), 42);
        assert_eq!(var("STUDYHUB_TEST_SURELY_UNSET_VAR"), Ok(None));
    }

    #[test]
    fn test_parse_origins_keeps_wildcard() {
        assert_eq!(parse_origins(" * "), vec!["*".to_string()]);
    }
}
