pub mod envelope;
pub mod page;
pub mod routes;
pub mod session;

use std::time::Duration;

use actix_files::Files;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use credit_client::{ApiClient, ClientConfig};
use log::info;
use routes::AppState;
use session::SessionStore;

const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;
const DEFAULT_SESSION_MAX: usize = 10_000;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting credit default prediction page");

    let config = ClientConfig::from_env().context("Invalid client configuration")?;
    info!("Backend: {} ({} routes)", config.base_url, config.routes);
    let client = ApiClient::new(config).context("Failed to create HTTP client")?;

    let idle_secs = match std::env::var("SESSION_IDLE_SECS") {
        Ok(v) => v
            .parse()
            .with_context(|| format!("SESSION_IDLE_SECS must be a number of seconds, got {v:?}"))?,
        Err(_) => DEFAULT_SESSION_IDLE_SECS,
    };

    let max_sessions: usize = match std::env::var("SESSION_MAX") {
        Ok(v) => v
            .parse()
            .with_context(|| format!("SESSION_MAX must be a count, got {v:?}"))?,
        Err(_) => DEFAULT_SESSION_MAX,
    };
    if max_sessions == 0 {
        anyhow::bail!("SESSION_MAX must be at least 1");
    }
    info!("Sessions: idle {idle_secs}s, at most {max_sessions}");

    let state = web::Data::new(AppState {
        client,
        sessions: SessionStore::new(Duration::from_secs(idle_secs), max_sessions),
    });

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let workers = std::env::var("WORKERS")
        .map(|w| w.parse().unwrap_or(num_cpus::get()))
        .unwrap_or_else(|_| num_cpus::get());
    let static_dir = std::env::var("STATIC_DIR")
        .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string());

    let bind_address = format!("{}:{}", host, port);

    info!("Listening on http://{}", bind_address);
    info!("Workers: {}", workers);
    info!("Routes:");
    info!("   GET  /         - Page");
    info!("   POST /train    - Train the model");
    info!("   POST /predict  - Predict default risk");
    info!("   GET  /health   - Health check");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .app_data(state.clone())
            .configure(routes::configure)
            .service(Files::new("/static", &static_dir).prefer_utf8(true))
            .default_service(web::route().to(routes::not_found))
    })
    .workers(workers)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
