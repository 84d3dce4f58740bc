use rdkafka::error::KafkaError;
use rdkafka::producer::{DeliveryFuture, FutureProducer};
use rdkafka::ClientConfig;
use thiserror::Error;
use tracing::debug;

use crate::config::KafkaConfig;

pub struct KafkaContext {}

impl rdkafka::ClientContext for KafkaContext {}

#[derive(Error, Debug)]
pub enum ProduceError {
    #[error("failed to enqueue message: {error}")]
    Enqueue { error: KafkaError },
    #[error("failed to produce to kafka: {error}")]
    Delivery { error: KafkaError },
    #[error("failed to produce to kafka (timeout)")]
    Canceled,
}

/// Wait for the broker's verdict on one in-flight message.
pub async fn resolve_delivery(ack: DeliveryFuture) -> Result<(i32, i64), ProduceError> {
    match ack.await {
        Ok(Ok((partition, offset))) => Ok((partition, offset)),
        Ok(Err((error, _message))) => Err(ProduceError::Delivery { error }),
        // Cancelled due to timeout while retrying
        Err(_) => Err(ProduceError::Canceled),
    }
}

pub fn build_producer_config(config: &KafkaConfig) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.kafka_hosts)
        .set("linger.ms", config.kafka_producer_linger_ms.to_string())
        .set(
            "message.timeout.ms",
            config.kafka_message_timeout_ms.to_string(),
        )
        .set(
            "compression.codec",
            config.kafka_compression_codec.to_owned(),
        )
        .set(
            "queue.buffering.max.kbytes",
            (config.kafka_producer_queue_mib * 1024).to_string(),
        )
        .set(
            "queue.buffering.max.messages",
            config.kafka_producer_queue_messages.to_string(),
        );

    if config.kafka_tls {
        client_config
            .set("security.protocol", "ssl")
            .set("enable.ssl.certificate.verification", "false");
    };

    client_config
}

pub fn create_kafka_producer(
    config: &KafkaConfig,
) -> Result<FutureProducer<KafkaContext>, KafkaError> {
    let client_config = build_producer_config(config);
    debug!("rdkafka configuration: {:?}", client_config);
    let producer: FutureProducer<KafkaContext> =
        client_config.create_with_context(KafkaContext {})?;

    Ok(producer)
}
