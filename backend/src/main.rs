//! Backend entry-point: loads configuration, prepares storage, and serves the
//! loyalty API.

mod server;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use barbershop_backend::inbound::http::health::{HealthState, LedgerStorage};
use barbershop_backend::inbound::http::state::CsrfCookieConfig;
use barbershop_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use barbershop_backend::settings::AppSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let config = ServerConfig::new(settings.bind_addr()?, settings.identity()?)
        .with_csrf(
            settings.csrf_policy()?,
            CsrfCookieConfig {
                secure: settings.csrf_cookie_secure(),
            },
        )
        .with_cors_origin(settings.cors_origin.clone());
    let config = match settings.database_url.as_deref() {
        Some(url) => config.with_db_pool(connect(url, &settings).await?),
        None => config,
    };

    let storage = if config.has_database() {
        LedgerStorage::Postgres
    } else {
        LedgerStorage::InMemory
    };
    let health_state = web::Data::new(HealthState::new(storage));
    info!(addr = %config.bind_addr(), ?storage, "starting loyalty backend");
    let server =
        create_server(health_state.clone(), config).wrap_err("failed to start HTTP server")?;

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        if actix_web::rt::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested; draining");
            health_state.begin_draining();
            handle.stop(true).await;
        }
    });

    server.await.wrap_err("HTTP server terminated with an error")
}

async fn connect(database_url: &str, settings: &AppSettings) -> color_eyre::Result<DbPool> {
    if settings.run_migrations() {
        let applied = run_pending_migrations(database_url)
            .await
            .wrap_err("failed to apply database migrations")?;
        info!(applied, "database migrations complete");
    }
    let pool =
        DbPool::new(PoolConfig::new(database_url).with_max_size(settings.db_max_connections()))
            .await
            .wrap_err("failed to build database pool")?;
    let (connections, idle) = pool.connections();
    info!(connections, idle, "database pool ready");
    Ok(pool)
}
