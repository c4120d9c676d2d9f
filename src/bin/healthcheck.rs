//! Runs one consumer-lag health-check pass and exits with a verdict-derived
//! status: 0 healthy, 1 unhealthy, 2 indeterminate.

use clap::Parser;
use lagwatch::config::split_csv;
use lagwatch::{
    CheckConfig, HealthCheck, HealthThresholds, InitConfig, KafkaConfig, LagwatchClient,
    PartialKafkaConfig,
};
use std::path::PathBuf;

/// Checks the lag of a consumer group and ensures it has not exceeded the
/// given conditions.
#[derive(Parser)]
#[command(name = "healthcheck", version)]
#[command(about = "Checks consumer group lag and staleness against the given thresholds")]
struct Cli {
    /// Maximum number of events to lag behind before the check fails.
    #[arg(short = 'L', long)]
    maximum_allowed_lag: i64,

    /// Maximum milliseconds of silence tolerated while lag is outstanding;
    /// also the staleness lookback window.
    #[arg(short = 'D', long)]
    maximum_delay_ms: i64,

    /// Kafka bootstrap servers, comma separated. Falls back to
    /// KAFKA_BOOTSTRAP_SERVERS or the config file.
    #[arg(long)]
    kafka_bootstrap_servers: Option<String>,

    /// Consumer group id to check. Falls back to KAFKA_CONSUMER_GROUP_ID or
    /// the config file.
    #[arg(long)]
    kafka_consumer_group_id: Option<String>,

    /// Topics to check, comma separated. Falls back to KAFKA_TOPICS or the
    /// config file.
    #[arg(long)]
    kafka_topics_csv: Option<String>,

    /// JSON config file supplying any of brokers / group_id / topics.
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Print the full report as JSON to stdout.
    #[arg(long)]
    json: bool,

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

    let thresholds = HealthThresholds::new(cli.maximum_allowed_lag, cli.maximum_delay_ms)?;
    let kafka = KafkaConfig::resolve(cli.flag_layer(), cli.config_file.as_deref())?;

    let client = LagwatchClient::new(&kafka)?;
    let check = HealthCheck::new(client, kafka.topics.clone(), thresholds, CheckConfig::default())?;
    let report = check.run(chrono::Utc::now().timestamp_millis()).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    std::process::exit(report.overall.exit_code());
}
