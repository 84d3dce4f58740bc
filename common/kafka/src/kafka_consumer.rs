use std::borrow::Cow;
use std::time::Duration;

use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::{BorrowedMessage, Headers};
use rdkafka::{ClientConfig, Message};
use thiserror::Error;

use crate::config::{ConsumerConfig, KafkaConfig};

#[derive(Debug, Error)]
pub enum PollError {
    #[error("kafka error: {0}")]
    Kafka(#[from] KafkaError),
}

/// One consumer handle, one group membership, one topic. Built once at
/// startup and released through [`TopicSubscriber::close`] so the broker
/// can reassign our partitions without waiting for a session timeout.
pub struct TopicSubscriber {
    consumer: StreamConsumer,
    topic: String,
}

/// Outcome of a single bounded poll.
pub enum Polled {
    /// The timeout elapsed with nothing to read. Not an error.
    Timeout,
    Record(ReceivedRecord),
}

/// An owned copy of a consumed record, detached from the consumer's
/// internal buffers.
#[derive(Debug)]
pub struct ReceivedRecord {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub payload: Vec<u8>,
    pub headers: Vec<(String, Vec<u8>)>,
}

impl ReceivedRecord {
    pub fn payload_utf8(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    fn from_borrowed(message: &BorrowedMessage<'_>) -> Self {
        let headers = message
            .headers()
            .map(|headers| {
                headers
                    .iter()
                    .map(|header| {
                        (
                            header.key.to_string(),
                            header.value.map(<[u8]>::to_vec).unwrap_or_default(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        ReceivedRecord {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
            headers,
        }
    }
}

pub fn build_consumer_config(
    common_config: &KafkaConfig,
    consumer_config: &ConsumerConfig,
) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &common_config.kafka_hosts)
        .set("group.id", &consumer_config.kafka_consumer_group)
        .set(
            "auto.offset.reset",
            &consumer_config.kafka_consumer_offset_reset,
        );

    if common_config.kafka_tls {
        client_config
            .set("security.protocol", "ssl")
            .set("enable.ssl.certificate.verification", "false");
    };

    client_config
}

impl TopicSubscriber {
    pub fn new(
        common_config: &KafkaConfig,
        consumer_config: &ConsumerConfig,
    ) -> Result<Self, KafkaError> {
        let client_config = build_consumer_config(common_config, consumer_config);

        let consumer: StreamConsumer = client_config.create()?;
        consumer.subscribe(&[consumer_config.kafka_consumer_topic.as_str()])?;

        Ok(Self {
            consumer,
            topic: consumer_config.kafka_consumer_topic.clone(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait up to `timeout` for one record. An elapsed timeout is reported
    /// as [`Polled::Timeout`]; only broker/client failures surface as `Err`.
    pub async fn poll(&self, timeout: Duration) -> Result<Polled, PollError> {
        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_elapsed) => Ok(Polled::Timeout),
            Ok(Err(err)) => Err(err.into()),
            Ok(Ok(message)) => Ok(Polled::Record(ReceivedRecord::from_borrowed(&message))),
        }
    }

    /// Leave the group and drop the handle. Consuming `self` guarantees no
    /// further polls after release.
    pub fn close(self) {
        self.consumer.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use envconfig::Envconfig;

    use super::*;

    fn test_configs(overrides: &[(&str, &str)]) -> (KafkaConfig, ConsumerConfig) {
        let env: HashMap<String, String> = overrides
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        (
            KafkaConfig::init_from_hashmap(&env).unwrap(),
            ConsumerConfig::init_from_hashmap(&env).unwrap(),
        )
    }

    #[test]
    fn consumer_config_assembly() {
        let (kafka, consumer) = test_configs(&[("KAFKA_HOSTS", "kafka:9092")]);

        let client_config = build_consumer_config(&kafka, &consumer);

        assert_eq!(client_config.get("bootstrap.servers"), Some("kafka:9092"));
        assert_eq!(client_config.get("group.id"), Some("baz-group"));
        assert_eq!(client_config.get("auto.offset.reset"), Some("earliest"));
        assert_eq!(client_config.get("security.protocol"), None);
    }

    #[test]
    fn consumer_config_offset_reset_passthrough() {
        for reset in ["earliest", "latest", "none"] {
            let (kafka, consumer) = test_configs(&[("KAFKA_CONSUMER_OFFSET_RESET", reset)]);
            let client_config = build_consumer_config(&kafka, &consumer);
            assert_eq!(client_config.get("auto.offset.reset"), Some(reset));
        }
    }
}
