use anyhow::{bail, Result};
use clap::Parser;
use tracing::{error, info, warn, Level};

use cloud_ip_check::cli::Args;
use cloud_ip_check::server;
use cloud_ip_check::service::CloudIpChecker;

#[actix_web::main]
async fn main() -> Result<()> {
    let settings = Args::parse().merge_with_config()?;

    // Initialize logging; stdout is reserved for results
    tracing_subscriber::fmt()
        .with_max_level(if settings.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("cloud-ip-check starting");
    info!(
        "Config: prefixes={}, geo_feed={}, strategy={}, timeout={}s, serve={}",
        settings.checker.prefixes,
        settings.checker.geo_feed,
        settings.checker.strategy,
        settings.checker.timeout.as_secs(),
        settings.serve
    );

    let checker = CloudIpChecker::new(settings.checker.clone())?;

    if settings.serve {
        return server::run(checker, &settings.listen, settings.static_dir.clone()).await;
    }

    if settings.addresses.is_empty() {
        bail!("No addresses given (pass one or more addresses, or --serve to run the API)");
    }

    checker.load().await;
    if !checker.is_ready() {
        warn!("Datasets unavailable, every address will report no match");
    }

    let mut malformed = 0usize;
    for address in &settings.addresses {
        match checker.check_address(address) {
            Ok(result) => println!("{}", serde_json::to_string(&result)?),
            Err(e) => {
                error!("{}: {}", address.trim(), e);
                malformed += 1;
            }
        }
    }

    if settings.verbose {
        checker.metrics().print_summary();
    }

    if malformed > 0 {
        bail!("{} of {} addresses were malformed", malformed, settings.addresses.len());
    }
    Ok(())
}
