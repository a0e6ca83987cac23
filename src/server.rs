//! HTTP server wiring

use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use tracing::info;

use crate::api;
use crate::service::CloudIpChecker;

/// Serve the API until shutdown.
///
/// Datasets load in the background; lookups answered before they finish
/// report no match.
pub async fn run(checker: CloudIpChecker, listen: &str, static_dir: Option<PathBuf>) -> Result<()> {
    let loader = checker.clone();
    tokio::spawn(async move {
        loader.load().await;
        if loader.is_ready() {
            info!("Datasets ready");
        }
    });

    let data = web::Data::new(checker.clone());

    info!("Starting API server on http://{}", listen);
    if let Some(dir) = &static_dir {
        info!("Serving static files from {}", dir.display());
    }

    HttpServer::new(move || {
        let app = App::new()
            .wrap(Cors::permissive())
            .app_data(data.clone())
            .configure(api::init_routes);

        match &static_dir {
            Some(dir) => app.service(actix_files::Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    })
    .bind(listen)
    .with_context(|| format!("Failed to bind {}", listen))?
    .run()
    .await
    .context("API server failed")?;

    checker.metrics().print_summary();
    Ok(())
}
