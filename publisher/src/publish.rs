use chrono::{DateTime, Utc};
use common_kafka::kafka_producer::{resolve_delivery, ProduceError};
use rand::Rng;
use rdkafka::producer::{DeliveryFuture, FutureProducer, FutureRecord};
use rdkafka::ClientContext;
use tracing::{error, info};

/// Completion tally for one batch. Every send ends up in exactly one
/// bucket, so `completions() == sends` once the batch is drained.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn completions(&self) -> usize {
        self.delivered + self.failed
    }
}

/// How many messages this invocation sends: uniform in [1, max].
pub fn draw_count(max_messages: u32) -> u32 {
    rand::thread_rng().gen_range(1..=max_messages.max(1))
}

pub fn build_payload(sequence: u32, count: u32, at: DateTime<Utc>) -> String {
    format!(
        "Hello, World {sequence}/{count}! The time according to Kafka is: {}",
        at.to_rfc3339()
    )
}

/// Enqueue `count` sends without blocking, then await one delivery
/// outcome per message. Failures are logged and counted, never retried,
/// and do not stop the rest of the batch.
pub async fn publish_batch<C: ClientContext + 'static>(
    producer: &FutureProducer<C>,
    topic: &str,
    key: &str,
    count: u32,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    let mut pending: Vec<(u32, DeliveryFuture)> = Vec::with_capacity(count as usize);

    for sequence in 1..=count {
        info!("sending message {sequence}/{count}");
        let payload = build_payload(sequence, count, Utc::now());
        let record = FutureRecord::to(topic).key(key).payload(&payload);

        match producer.send_result(record) {
            Ok(ack) => pending.push((sequence, ack)),
            Err((error, _record)) => {
                // Client-side queue rejection, e.g. buffer full
                let err = ProduceError::Enqueue { error };
                error!("message {sequence}/{count} failed: {err}");
                report.failed += 1;
            }
        }
    }

    for (sequence, ack) in pending {
        match resolve_delivery(ack).await {
            Ok((partition, offset)) => {
                info!(
                    "message {sequence}/{count} delivered: topic={topic} partition={partition} offset={offset}"
                );
                report.delivered += 1;
            }
            Err(err) => {
                error!("message {sequence}/{count} failed: {err}");
                report.failed += 1;
            }
        }
    }

    report
}
