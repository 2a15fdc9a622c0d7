use std::{
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

use axum::http::HeaderValue;

use crate::error::StartupError;

/// Which query convention `GET /todos` understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pagination {
    /// `limit` + `status`, filtered in the query.
    #[default]
    Limit,
    /// `page` + `per_page` + `status`; the status filter runs over the
    /// fetched page only.
    Page,
}

impl FromStr for Pagination {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "limit" => Ok(Pagination::Limit),
            "page" => Ok(Pagination::Page),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub pagination: Pagination,
}

impl Config {
    /// Reads the process environment, after loading `.env` when present.
    pub fn init() -> Result<Self, StartupError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let database_url = var("DATABASE_URL", "sqlite://todo.db");
        let max_connections = parse("DATABASE_MAX_CONNECTIONS", var("DATABASE_MAX_CONNECTIONS", "10"))?;
        let host: IpAddr = parse("HOST", var("HOST", "0.0.0.0"))?;
        let port: u16 = parse("PORT", var("PORT", "8080"))?;
        let addr = SocketAddr::new(host, port);
        let cors_origin = parse("CORS_ORIGIN", var("CORS_ORIGIN", "http://localhost:3000"))?;
        let pagination = parse("PAGINATION", var("PAGINATION", "limit"))?;

        Ok(Config {
            database_url,
            max_connections,
            addr,
            cors_origin,
            pagination,
        })
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, StartupError> {
    value
        .parse()
        .map_err(|_| StartupError::InvalidConfig { name, value })
}
