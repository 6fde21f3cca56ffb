use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use std::{sync::Arc, time::Duration};

mod api;
mod auth;
mod config;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use service::attendance::AttendanceService;
use store::{JsonFileStore, RecordStore};
use utils::{seed::seed_admin, token_denylist::TokenDenylist};

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance tracker is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
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

    info!("Server starting...");

    let file_store = JsonFileStore::new(&config.data_file, &config.backup_file);
    info!(path = %file_store.path().display(), "Using data file");
    let store: Arc<dyn RecordStore> = Arc::new(file_store);

    if let Some((username, password)) = &config.seed_admin {
        let seeded = seed_admin(store.as_ref(), username, password)
            .context("failed to seed admin user")?;
        if !seeded {
            info!(username = %username, "Seed admin already present");
        }
    }

    let attendance = Data::new(AttendanceService::new(store.clone()));
    let store_data: Data<dyn RecordStore> = Data::from(store);
    let denylist = Data::new(TokenDenylist::new(Duration::from_secs(
        config.access_token_ttl as u64,
    )));

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(routes::build_cors(&config))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store_data.clone())
            .app_data(attendance.clone())
            .app_data(denylist.clone())
            .app_data(config_data.clone())
            .service(index)
            // Auth + attendance routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
