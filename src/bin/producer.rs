//! Produces a batch of UUID events to the configured topics, creating them
//! first if they do not exist. A load-generation aid for exercising the
//! health check.

use clap::Parser;
use lagwatch::config::split_csv;
use lagwatch::{InitConfig, KafkaConfig, PartialKafkaConfig};
use std::path::PathBuf;

/// Sends a fixed number of UUID events to the configured topics.
#[derive(Parser)]
#[command(name = "producer", version)]
#[command(about = "Produces UUID events to the configured topics")]
struct Cli {
    /// Number of events to send to each topic.
    #[arg(short = 'n', long)]
    events: usize,

    /// Kafka bootstrap servers, comma separated. Falls back to
    /// KAFKA_BOOTSTRAP_SERVERS or the config file.
    #[arg(long)]
    kafka_bootstrap_servers: Option<String>,

    /// Consumer group id (unused by the producer but accepted so all three
    /// binaries share one config file).
    #[arg(long)]
    kafka_consumer_group_id: Option<String>,

    /// Topics to produce to, comma separated. Falls back to KAFKA_TOPICS or
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

    if cli.events == 0 {
        anyhow::bail!("must provide at least 1 event with --events");
    }

    // The producer does not care which group id it runs under; fall back to
    // a fixed one so only brokers and topics are required.
    let fallback = PartialKafkaConfig {
        group_id: Some("lagwatch-producer".to_string()),
        ..PartialKafkaConfig::default()
    };
    let kafka =
        KafkaConfig::resolve_with_fallback(cli.flag_layer(), cli.config_file.as_deref(), fallback)?;

    lagwatch::admin::ensure_topics(&kafka).await?;
    lagwatch::produce::run_producer(&kafka, cli.events).await?;
    Ok(())
}
