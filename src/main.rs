// src/main.rs
mod routes;
mod handlers;
mod models;
mod database;
mod middleware;
mod state;
mod store;
mod dtos; // expose DTO modules
mod error;
mod extract;
mod auth; // expose auth module
mod config;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::fmt::init as tracing_init;
use tokio::net::TcpListener;
use dotenvy::dotenv;

use crate::auth::jwt::TokenService;
use crate::config::Config;
use crate::state::AppState;
use crate::store::{PgBookingStore, PgIdentityStore};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_init();

    // Load environment variables
    dotenv().ok();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return;
        }
    };

    let tokens = TokenService::new(&config.token_secret, config.token_ttl);

    // Create application state
    let app_state = match &config.database_url {
        Some(database_url) => {
            let db_pool = match database::create_pool(database_url).await {
                Ok(pool) => pool,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create database pool");
                    return;
                }
            };
            if let Err(e) = database::ensure_schema(&db_pool).await {
                tracing::error!(error = %e, "Failed to prepare database schema");
                return;
            }
            AppState::new(
                Arc::new(PgIdentityStore::new(db_pool.clone())),
                Arc::new(PgBookingStore::new(db_pool)),
                tokens,
            )
        }
        None => AppState::in_memory(tokens),
    };

    let app = routes::app(app_state);

    // Try port..port+20 to avoid crash when address is in use
    let listener = {
        let mut bound = None;
        for offset in 0u16..=20 {
            let port = config.port.saturating_add(offset);
            let addr = SocketAddr::from((config.host, port));
            match TcpListener::bind(addr).await {
                Ok(l) => { bound = Some((l, addr)); break; }
                Err(e) => {
                    if offset == 0 { tracing::warn!(%addr, error=%e, "Port in use, trying next"); }
                }
            }
        }
        match bound {
            Some((l, addr)) => {
                tracing::info!("Server running on {}", addr);
                l
            }
            None => {
                tracing::error!("Failed to bind to any port starting at {} on {}", config.port, config.host);
                return;
            }
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error=%e, "Server error");
    }
}
