use crate::config::KafkaConfig;
use crate::error::{Error, Result};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::types::RDKafkaErrorCode;
use std::time::Duration;
use tracing::{debug, info};

/// Best-effort creation of the configured topics before a demo
/// producer/consumer starts: one partition, replication factor one, an
/// already existing topic is not an error.
///
/// The health-check binary never calls this; checking health must not
/// change broker state.
pub async fn ensure_topics(config: &KafkaConfig) -> Result<()> {
    let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", config.brokers.join(","))
        .create()?;

    let new_topics: Vec<NewTopic<'_>> = config
        .topics
        .iter()
        .map(|topic| NewTopic::new(topic, 1, TopicReplication::Fixed(1)))
        .collect();
    let options = AdminOptions::new().operation_timeout(Some(Duration::from_secs(10)));

    let results = admin.create_topics(new_topics.iter(), &options).await?;
    for result in results {
        match result {
            Ok(topic) => info!(topic = %topic, "topic created"),
            Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                debug!(topic = %topic, "topic already exists")
            }
            Err((topic, code)) => {
                return Err(Error::TopicCreate {
                    topic,
                    reason: code.to_string(),
                })
            }
        }
    }
    Ok(())
}
