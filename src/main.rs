use clap::Parser;
use orders_etl::utils::{logger, validation::Validate};
use orders_etl::{
    BigQuerySink, CliConfig, EtlEngine, EtlError, LocalStorage, OrdersPipeline, SftpSource,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting orders-etl for {}", config.date);

    // Validate configuration before touching the network
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    match run(config).await {
        Ok(summary) => {
            tracing::info!("✅ ETL run completed successfully!");
            println!("✅ {}", summary);
        }
        Err(e) => {
            tracing::error!("❌ ETL run failed: {} (severity: {:?})", e, e.severity());
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);

            // Exit code tells the scheduler whether a later retry can help
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(config: CliConfig) -> Result<String, EtlError> {
    let source = SftpSource::new(
        config.sftp_host()?,
        config.sftp_port,
        config.sftp_user()?,
        config.sftp_password()?,
    );

    let sink = BigQuerySink::connect(
        config.project_id()?,
        config.destination_table()?,
        config.service_account_key.as_deref(),
        config.parsed_write_mode()?,
    )
    .await?;

    let storage = LocalStorage::new(config.spool_dir.clone());
    let monitor_enabled = config.monitor;

    let pipeline = OrdersPipeline::new(source, sink, storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    engine.run().await
}
