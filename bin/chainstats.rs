use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, warn};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use chainstats::{
    fetcher::HttpTransport, ChainRegistry, CronScheduler, CronSettings, GraphClientFactory,
    PerChainAggregator, RemoteFetcher, Settings, StatsHub,
};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Settings::new()
        .context("Failed to load config.yaml. Please ensure it exists and is valid")?;

    SimpleLogger::new()
        .with_level(settings.log_level_filter())
        .init()
        .context("Failed to install logger")?;

    // Static registries are validated up front; a missing endpoint is fatal
    let registry = Arc::new(
        ChainRegistry::from_settings(&settings).context("Invalid chain configuration")?,
    );
    let graph = GraphClientFactory::from_settings(&settings)
        .context("Invalid query endpoint configuration")?;

    for chain in registry.list_active_chains() {
        let datasets = graph.datasets(chain);
        if datasets.is_empty() {
            warn!("Chain {} has no query endpoints, query features disabled", chain);
        } else {
            info!("Chain {} query datasets: {}", chain, datasets.join(", "));
        }
    }

    let transport = Arc::new(
        HttpTransport::from_settings(&settings.fetcher).context("Failed to build HTTP transport")?,
    );
    let fetcher =
        RemoteFetcher::new(transport, &settings.fetcher).context("Invalid fetcher configuration")?;
    let aggregator = PerChainAggregator::new(registry, fetcher);

    run_stats(Arc::new(settings), aggregator).await
}

async fn run_stats(settings: Arc<Settings>, aggregator: PerChainAggregator) -> anyhow::Result<()> {
    let cancellation_token = CancellationToken::new();

    let interval = Duration::from_secs(settings.fetcher.revalidate_interval_secs);
    let hub = StatsHub::start(aggregator, interval, &cancellation_token);

    info!("Stats subscriptions started - revalidating every {:?}", interval);

    // Periodic report of the latest snapshots
    let cron_scheduler = CronScheduler::new(
        hub.reader(),
        settings.display.clone(),
        CronSettings::from(&settings.report),
    );

    let cron_token = cancellation_token.child_token();
    let cron_handle = tokio::spawn(async move {
        if let Err(e) = cron_scheduler.run(cron_token).await {
            error!("Cron scheduler failed: {:#}", e);
        }
    });

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Stats service running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    info!("Finishing all tasks...");

    cancellation_token.cancel();

    info!("Waiting for subscriptions to stop...");
    hub.shutdown().await;

    info!("Waiting for cron scheduler to stop...");
    let _ = cron_handle.await;

    info!("All tasks stopped");
    Ok(())
}
