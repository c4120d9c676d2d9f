use crate::config::KafkaConfig;
use crate::error::Result;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::time::Duration;
use tracing::{error, info};

/// Consumes the configured topics forever, sleeping `delay` before
/// processing each message.
///
/// The counterpart of [`crate::produce::run_producer`]: an artificially
/// slow consumer whose committed offsets fall behind, giving the health
/// check something to flag. Offsets are committed explicitly after each
/// processed message; receive errors are logged and retried rather than
/// killing the loop.
pub async fn run_consumer(config: &KafkaConfig, delay: Duration) -> Result<()> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", config.brokers.join(","))
        .set("group.id", &config.group_id)
        .set("auto.offset.reset", "earliest")
        .set("enable.auto.commit", "false")
        .create()?;

    let topic_refs: Vec<&str> = config.topics.iter().map(String::as_str).collect();
    consumer.subscribe(&topic_refs)?;
    info!(topics = ?config.topics, group_id = %config.group_id, "consumer started");

    loop {
        match consumer.recv().await {
            Ok(message) => {
                info!(
                    topic = message.topic(),
                    partition = message.partition(),
                    offset = message.offset(),
                    delay_ms = delay.as_millis() as u64,
                    "message received, simulating processing"
                );
                tokio::time::sleep(delay).await;
                let payload_len = message.payload().map_or(0, <[u8]>::len);
                info!(
                    topic = message.topic(),
                    partition = message.partition(),
                    offset = message.offset(),
                    payload_len,
                    "message processed"
                );
                consumer.commit_message(&message, CommitMode::Async)?;
            }
            Err(e) => {
                error!(error = %e, "error receiving message, retrying");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
