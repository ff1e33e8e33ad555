use std::{env, net::{SocketAddr, ToSocketAddrs as _}, path::PathBuf};

use chrono::Duration;
use sea_orm::ConnectOptions;
use tracing::{info, warn};

use crate::consts::{DEFAULT_HOST_ADDRESS, DEFAULT_LOG_FILE, DEFAULT_TOKEN_TTL_HOURS};

pub struct Config {
    pub host_address: SocketAddr,

    pub database_opt: ConnectOptions,
    
    pub jwt_key: String,

    pub token_ttl: Duration,
}

/// Runs before the subscriber exists, so only the log file location is read here
pub fn log_file() -> PathBuf {
    env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string()).into()
}

pub fn load() -> Config {
    Config {
        host_address: load_host_address(),
        database_opt: load_database_opt().into(),
        jwt_key: load_jwt_key(),
        token_ttl: load_token_ttl(),
    }
}

fn load_host_address() -> SocketAddr {
    info!("Loading environment `HOST_ADDRESS`");

    let var = env::var("HOST_ADDRESS").unwrap_or_else(|_| DEFAULT_HOST_ADDRESS.to_string());
    
    var.to_socket_addrs()
        .expect("`HOST_ADDRESS` is not in a valid format").nth(0)
        .expect("unable to resolve host from `HOST_ADDRESS`")
}

fn load_database_opt() -> impl Into<ConnectOptions> {
    info!("Loading environment `DATABASE_URL`");
    
    let var = env::var("DATABASE_URL").expect("Environment `DATABASE_URL` is required to be set");
    
    var
}

fn load_jwt_key() -> String {
    info!("Loading environment `JWT_SECRET`");

    let var = env::var("JWT_SECRET").expect("Environment `JWT_SECRET` is required to be set");
    
    var
}

fn load_token_ttl() -> Duration {
    info!("Loading environment `TOKEN_TTL_HOURS`");

    let hours = match env::var("TOKEN_TTL_HOURS") {
        Ok(var) => parse_token_ttl(&var).unwrap_or_else(|| {
            warn!(value = %var, "`TOKEN_TTL_HOURS` is not a positive number of hours, using the default");
            DEFAULT_TOKEN_TTL_HOURS
        }),
        Err(_) => DEFAULT_TOKEN_TTL_HOURS,
    };

    Duration::hours(hours)
}

fn parse_token_ttl(var: &str) -> Option<i64> {
    var.trim().parse().ok().filter(|hours| *hours > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_ttl() {
        assert_eq!(parse_token_ttl("24"), Some(24));
        assert_eq!(parse_token_ttl(" 72 "), Some(72));
        assert_eq!(parse_token_ttl("0"), None);
        assert_eq!(parse_token_ttl("-5"), None);
        assert_eq!(parse_token_ttl("a week"), None);
    }
}
