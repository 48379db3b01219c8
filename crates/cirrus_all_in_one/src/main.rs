mod config;
mod telemetry;

use cirrus_domain::{ObservationWriter, SinkKind};
use cirrus_nats::{NatsClient, RetryPolicy, SinkTopology};
use cirrus_runner::Runner;
use cirrus_store::{AggregateStore, Clock, MemoryAggregateStore, SystemClock};
use config::ServiceConfig;
use ingress_gateway::{DispatchService, HttpServerConfig, IngressGateway};
use sink_writer::SinkWriter;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use weather_aggregator::{WeatherAggregator, WeatherAggregatorConfig};

#[tokio::main]
async fn main() {
    // Initialize configuration and tracing
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    telemetry::init_telemetry(&config.log_level);

    info!(nats_url = %config.nats_url, "Starting cirrus-all-in-one service");
    debug!("Configuration: {:?}", config);

    // Shared shutdown token: the runner's signal handling cancels it, and the
    // startup retry loop watches it so a shutdown during connection
    // establishment is honored
    let shutdown_token = CancellationToken::new();

    // NATS initialization with bounded startup retry
    let retry_policy = RetryPolicy::new(
        config.connect_max_attempts,
        Duration::from_secs(config.connect_base_delay_secs),
    );
    let nats_client = match NatsClient::connect_with_retry(
        &config.nats_url,
        Duration::from_secs(config.connect_timeout_secs),
        &retry_policy,
        &shutdown_token,
    )
    .await
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to connect to NATS: {:#}", e);
            std::process::exit(1);
        }
    };

    // Shared aggregate store and clock
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn AggregateStore> = Arc::new(MemoryAggregateStore::new(clock.clone()));

    // Weather aggregator first: its initialization pings the store and
    // creates both sink streams before the gateway starts accepting reports
    let weather_aggregator = match WeatherAggregator::new(
        nats_client.clone(),
        store,
        clock,
        WeatherAggregatorConfig {
            log_stream: config.log_stream.clone(),
            queue_stream: config.queue_stream.clone(),
            log_consumer_name: config.log_consumer_name.clone(),
            queue_consumer_name: config.queue_consumer_name.clone(),
            poll_window_secs: config.poll_window_secs,
            record_ttl_secs: config.record_ttl_secs,
            scope_municipality: config.scope(),
        },
    )
    .await
    {
        Ok(aggregator) => aggregator,
        Err(e) => {
            error!("Failed to initialize weather aggregator: {:#}", e);
            std::process::exit(1);
        }
    };

    // Ingress gateway: one writer per sink behind the dispatch barrier
    let publisher = nats_client.create_publisher_client();
    let writers: Vec<(SinkKind, Arc<dyn ObservationWriter>)> = vec![
        (
            SinkKind::Log,
            Arc::new(SinkWriter::new(
                publisher.clone(),
                SinkTopology::log(&config.log_stream),
            )),
        ),
        (
            SinkKind::Queue,
            Arc::new(SinkWriter::new(
                publisher,
                SinkTopology::queue(&config.queue_stream),
            )),
        ),
    ];
    let dispatch_service = Arc::new(DispatchService::new(
        writers,
        Duration::from_secs(config.dispatch_timeout_secs),
    ));
    let ingress_gateway = IngressGateway::new(
        HttpServerConfig {
            host: config.http_host.clone(),
            port: config.http_port,
        },
        dispatch_service,
    );

    // Build runner with all processes
    let mut runner = Runner::new().with_cancellation_token(shutdown_token);

    runner = runner.with_named_process("ingress_gateway", ingress_gateway.into_runner_process());

    let aggregator_processes = weather_aggregator.into_runner_processes();
    for (i, process) in aggregator_processes.into_iter().enumerate() {
        runner = runner.with_named_process(format!("weather_aggregator_{}", i), process);
    }

    // Add cleanup handlers
    runner = runner
        .with_closer({
            let nats_for_close = nats_client;
            move || async move {
                info!("Running cleanup tasks...");
                if let Ok(client) = Arc::try_unwrap(nats_for_close) {
                    client.close().await;
                }
                info!("Cleanup complete");
                Ok(())
            }
        })
        .with_closer_timeout(Duration::from_secs(10));

    // Run the service
    runner.run().await;
}
