use crate::config::{Config, PublishTarget};
use crate::page::PageRenderer;
use crate::services::{
    ObjectStorageClient, PagePublisher, RefreshOptions, RefreshProcessor, SecretProvider,
    YouTubeSearch,
};
use crate::storage::on_disk::OnDiskStorage;
use crate::storage::InMemoryStorage;
use crate::types::RefreshOutcome;
use actix_rt::signal::unix;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use futures_lite::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

mod config;
mod http;
mod impls;
mod page;
mod services;
mod storage;
mod types;
mod utils;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn create_publisher(config: &Config) -> Arc<dyn PagePublisher + Send + Sync> {
    let publish = &config.publish;

    match publish.target {
        PublishTarget::Disk => {
            info!(directory = publish.directory.as_str(), "Publishing to disk");
            Arc::new(OnDiskStorage::create(publish.directory.clone()))
        }
        PublishTarget::Http => {
            let endpoint = publish
                .endpoint
                .as_deref()
                .expect("PUBLISH_ENDPOINT is required for the http publish target");
            info!(endpoint, bucket = publish.bucket.as_str(), "Publishing to object storage");
            Arc::new(
                ObjectStorageClient::create(endpoint, &publish.bucket, publish.token.clone())
                    .expect("Unable to initialize object storage client"),
            )
        }
        PublishTarget::Memory => {
            warn!("Publishing to memory; pages will not outlive the process");
            Arc::new(InMemoryStorage::new())
        }
    }
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Arc::from(Config::from_env());

    info!(version = VERSION, "Starting application...");

    let secret_provider =
        SecretProvider::from_config(&config.secret).expect("Unable to initialize secret provider");
    let youtube_search = YouTubeSearch::new(config.search.api_host.clone());
    let publisher = create_publisher(&config);

    let refresh_processor = Arc::new(RefreshProcessor::new(
        Arc::new(secret_provider),
        Arc::new(youtube_search),
        publisher,
        PageRenderer::new(config.page.clone()),
        RefreshOptions {
            query: config.search.query.clone(),
            max_results: config.search.max_results,
            object_key: config.page.object_key.clone(),
        },
    ));

    if config.server.run_once {
        let outcome = RefreshOutcome::from(refresh_processor.run().await);

        match serde_json::to_string(&outcome) {
            Ok(json) => println!("{}", json),
            Err(error) => error!(?error, "Unable to serialize refresh outcome"),
        }

        std::process::exit(if outcome.is_success() { 0 } else { 1 });
    }

    let mut terminate = unix::signal(unix::SignalKind::terminate())?;
    let mut interrupt = unix::signal(unix::SignalKind::interrupt())?;

    if let Some(interval_secs) = config.server.refresh_interval_secs.filter(|secs| *secs > 0) {
        info!(interval_secs, "Scheduling periodic page refresh");

        actix_rt::spawn({
            let refresh_processor = Arc::clone(&refresh_processor);

            async move {
                let mut interval = actix_rt::time::interval(Duration::from_secs(interval_secs));

                loop {
                    interval.tick().await;

                    // Outcome is logged by the processor.
                    let _ = refresh_processor.run().await;
                }
            }
        });
    }

    let shutdown_timeout = config.server.shutdown_timeout;
    let bind_address = config.server.bind_address.clone();

    let server = HttpServer::new({
        move || {
            App::new()
                .app_data(Data::new(Arc::clone(&refresh_processor)))
                .service(web::resource("/refresh").route(web::post().to(http::run_refresh)))
                .service(web::resource("/health").route(web::get().to(http::readiness_check)))
        }
    })
    .shutdown_timeout(shutdown_timeout)
    .bind(bind_address)?
    .run();

    let server_handle = server.handle();

    actix_rt::spawn({
        async move {
            if let Err(error) = server.await {
                error!(?error, "Error on http server");
            }
        }
    });

    info!("Application started");

    interrupt.recv().or(terminate.recv()).await;

    info!("Received shutdown signal. Shutting down gracefully...");

    server_handle.stop(true).await;

    Ok(())
}
