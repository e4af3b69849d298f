use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Postgres,
}

/// Runtime configuration, read from the environment with defaults that allow
/// local operation without any setup.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub sqlite_path: String,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub server_port: u16,
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("postgres") => StoreBackend::Postgres,
            _ => StoreBackend::Sqlite,
        };

        Self {
            store_backend,
            sqlite_path: env_or("SQLITE_PATH", "agenda.db"),
            db_host: env_or("DB_HOST", "localhost"),
            db_port: env_parse("DB_PORT", 5432),
            db_user: env_or("DB_USER", "postgres"),
            db_password: env_or("DB_PASSWORD", "agenda123"),
            db_name: env_or("DB_NAME", "agendaapp"),
            server_port: env_parse("SERVER_PORT", 5000),
            debug: env::var("APP_DEBUG")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
