mod cli;

use std::sync::Arc;

use alloy_network::EthereumWallet;
use alloy_provider::ProviderBuilder;
use clap::Parser;
use cli::Cli;
use liq_chain::{signer::build_signer, AlloyChainGateway, ChainGateway};
use liq_metrics::BotMetrics;
use liq_reporting::{AnyReporter, ConsoleReporter, MetricsReporter};
use liq_types::ReportingMode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let rpc_url = cli.rpc_url.parse()?;
    let config = cli.into_config()?;
    config.validate()?;

    let signer = build_signer(&config.signer)?;
    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new().wallet(wallet).on_http(rpc_url);

    let metrics = match config.reporting {
        ReportingMode::Metrics => Some(BotMetrics::install_prometheus_exporter(cli.metrics_listen_addr)?),
        ReportingMode::Console => None
    };

    let mut gateway = AlloyChainGateway::new(
        provider,
        config.deployment_version,
        config.exchange,
        config.liquidation_bot_api_address
    );
    if let Some(metrics) = metrics {
        gateway = gateway.with_metrics(metrics);
    }
    let gateway: Arc<dyn ChainGateway> = Arc::new(gateway);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c, shutting down");
            shutdown.cancel();
        }
    });

    let reporting = config.reporting;
    let reporting_json = cli.reporting_json;
    let coordinator = liq_coordinator::Coordinator::new(gateway, config);

    let result = coordinator
        .run(
            move || match reporting {
                ReportingMode::Console => AnyReporter::Console(ConsoleReporter::new(reporting_json)),
                ReportingMode::Metrics => AnyReporter::Metrics(MetricsReporter::new(
                    metrics.unwrap_or_else(BotMetrics::default)
                ))
            },
            cancel
        )
        .await;

    if let Err(err) = &result {
        error!(%err, "bot stopped with a fatal error");
    }

    result.map_err(Into::into)
}
