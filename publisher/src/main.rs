//! Publish a bounded, random number of demo messages to one Kafka topic.

use std::time::Duration;

use clap::Parser;
use common_kafka::kafka_producer::create_kafka_producer;
use envconfig::Envconfig;
use rdkafka::producer::Producer;
use tracing::info;

use publisher::config::Config;
use publisher::publish::{draw_count, publish_batch};

#[derive(Parser)]
#[command(about = "Publish a random number of demo messages to a Kafka topic")]
struct Cli {
    /// Upper bound on the number of messages sent per invocation
    #[arg(long, default_value_t = 1)]
    max_random_message_count: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::init_from_env().expect("failed to load configuration from env");

    let producer = create_kafka_producer(&config.kafka)?;

    let count = draw_count(cli.max_random_message_count);
    let report = publish_batch(&producer, &config.kafka_topic, &config.kafka_key, count).await;

    // Do not exit while sends are still in flight
    producer.flush(Duration::from_secs(30))?;

    info!(
        "{count} messages sent: {} delivered, {} failed",
        report.delivered, report.failed
    );

    Ok(())
}
