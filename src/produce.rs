use crate::config::KafkaConfig;
use crate::error::{Error, Result};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Produces `events` UUID payloads to every configured topic.
///
/// A load-generation aid for exercising the health check: fill a topic,
/// leave the consumer behind, watch the verdict flip. Delivery is awaited
/// per event so the loop ends only after the broker acknowledged
/// everything.
pub async fn run_producer(config: &KafkaConfig, events: usize) -> Result<()> {
    let producer: FutureProducer = ClientConfig::new()
        .set("bootstrap.servers", config.brokers.join(","))
        .set("message.timeout.ms", "10000")
        .create()?;

    for topic in &config.topics {
        info!(topic = %topic, events, "sending events");
        for seq in 0..events {
            let event_id = Uuid::new_v4();
            let record: FutureRecord<'_, (), [u8]> =
                FutureRecord::to(topic).payload(event_id.as_bytes().as_slice());
            match producer.send(record, Duration::from_secs(10)).await {
                Ok((partition, offset)) => {
                    debug!(
                        topic = %topic,
                        partition,
                        offset,
                        event_id = %event_id,
                        seq,
                        "event delivered"
                    );
                }
                Err((e, _unsent)) => return Err(Error::Kafka(e)),
            }
        }
    }
    info!("finished sending all events");
    Ok(())
}
