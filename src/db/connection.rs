use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;

// The rebuild runs statements one after another; a handful of connections is plenty.
const DEFAULT_MAX_CONNECTIONS: u32 = 4;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(s) => match s.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("Invalid {}='{}'; using default", key, s);
                default
            }
        },
        Err(_) => default,
    }
}

/// Options set field by field, so credentials never pass through a URL.
pub fn connect_options(cfg: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.username)
        .password(&cfg.password)
        .database(&cfg.database)
}

pub async fn make_pool(cfg: &DatabaseConfig) -> Result<PgPool> {
    let max_conn: u32 = env_or("FORM5500_POOL_SIZE", DEFAULT_MAX_CONNECTIONS);
    let max_conn = if max_conn == 0 {
        DEFAULT_MAX_CONNECTIONS
    } else {
        max_conn
    };
    let acquire_ms: u64 = env_or("FORM5500_ACQUIRE_MS", 30_000);
    let idle_ms: u64 = env_or("FORM5500_IDLE_MS", 60_000);
    let life_ms: u64 = env_or("FORM5500_LIFETIME_MS", 1_800_000);

    log::info!(
        "Connecting to PostgreSQL at {}:{} / db {} (max_connections={})",
        cfg.host,
        cfg.port,
        cfg.database,
        max_conn
    );
    let pool = PgPoolOptions::new()
        .max_connections(max_conn)
        .acquire_timeout(Duration::from_millis(acquire_ms))
        .idle_timeout(Some(Duration::from_millis(idle_ms)))
        .max_lifetime(Some(Duration::from_millis(life_ms)))
        .connect_with(connect_options(cfg))
        .await
        .with_context(|| format!("Failed to connect to {}:{}", cfg.host, cfg.port))?;
    Ok(pool)
}
