use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;

use hrm_leave::config::{Config, StoreBackend};
use hrm_leave::db::init_db;
use hrm_leave::docs::ApiDoc;
use hrm_leave::leave::LeaveEngine;
use hrm_leave::leave::clock::SystemClock;
use hrm_leave::routes;
use hrm_leave::store::{MemoryCommitments, MemoryDirectory, MemoryStore, MySqlStore};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Leave & coverage service"
}

async fn build_engine(config: &Config) -> anyhow::Result<LeaveEngine> {
    let settings = config.engine_settings();
    let clock = Arc::new(SystemClock);

    let engine = match config.store_backend {
        StoreBackend::Mysql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the mysql backend")?;
            let pool = init_db(url, Duration::from_millis(config.store_timeout_ms))
                .await
                .context("Failed to connect to database")?;
            let store = Arc::new(MySqlStore::new(pool));
            LeaveEngine::new(store.clone(), store.clone(), store, clock, settings)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            let directory = match config.staff_roster_file.as_deref() {
                Some(path) => {
                    let raw = std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read staff roster {path}"))?;
                    MemoryDirectory::from_json(&raw)
                        .with_context(|| format!("Invalid staff roster {path}"))?
                }
                None => MemoryDirectory::default(),
            };
            if directory.is_empty() {
                tracing::warn!("Staff directory is empty, leave requests will be refused");
            } else {
                info!(staff = directory.len(), "Staff roster loaded");
            }
            LeaveEngine::new(
                Arc::new(MemoryStore::new()),
                Arc::new(directory),
                Arc::new(MemoryCommitments::new()),
                clock,
                settings,
            )
        }
    };
    Ok(engine)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = %config.store_backend, "Server starting...");

    let engine = Data::new(build_engine(&config).await?);
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(engine.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
