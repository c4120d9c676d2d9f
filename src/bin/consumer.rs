//! Consumes the configured topics with an artificial per-message delay,
//! creating the topics first if they do not exist. Pair with the producer
//! to build up real consumer lag for the health check to flag.

use clap::Parser;
use lagwatch::config::split_csv;
use lagwatch::{InitConfig, KafkaConfig, PartialKafkaConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Consumes events with a configurable processing delay per message.
#[derive(Parser)]
#[command(name = "consumer", version)]
#[command(about = "Consumes the configured topics with an artificial processing delay")]
struct Cli {
    /// Seconds to wait before processing each event.
    #[arg(short = 'd', long)]
    delay_seconds: u64,

    /// Kafka bootstrap servers, comma separated. Falls back to
    /// KAFKA_BOOTSTRAP_SERVERS or the config file.
    #[arg(long)]
    kafka_bootstrap_servers: Option<String>,

    /// Consumer group id to consume under. Falls back to
    /// KAFKA_CONSUMER_GROUP_ID or the config file.
    #[arg(long)]
    kafka_consumer_group_id: Option<String>,

    /// Topics to consume, comma separated. Falls back to KAFKA_TOPICS or
    /// the config file.
    #[arg(long)]
    kafka_topics_csv: Option<String>,

    /// JSON config file supplying any of brokers / group_id / topics.
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn flag_layer(&self) -> PartialKafkaConfig {
        PartialKafkaConfig {
            brokers: self
                .kafka_bootstrap_servers
                .as_deref()
                .map(split_csv)
                .filter(|v| !v.is_empty()),
            group_id: self.kafka_consumer_group_id.clone(),
            topics: self
                .kafka_topics_csv
                .as_deref()
                .map(split_csv)
                .filter(|v| !v.is_empty()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    lagwatch::init_with_config(&InitConfig {
        log_filter: cli.log_level.clone(),
        ..InitConfig::default()
    })?;

    let kafka = KafkaConfig::resolve(cli.flag_layer(), cli.config_file.as_deref())?;

    lagwatch::admin::ensure_topics(&kafka).await?;
    lagwatch::consume::run_consumer(&kafka, Duration::from_secs(cli.delay_seconds)).await?;
    Ok(())
}
