//! Consume and print records from one Kafka topic until stopped.

use chrono::Utc;
use common_kafka::kafka_consumer::TopicSubscriber;
use envconfig::Envconfig;
use tokio::signal;
use tracing::info;

use config::Config;
use runner::{poll_until_stopped, LoopExit};

mod config;
mod runner;

async fn shutdown() {
    let mut term = signal::unix::signal(signal::unix::SignalKind::terminate())
        .expect("failed to register SIGTERM handler");

    let mut interrupt = signal::unix::signal(signal::unix::SignalKind::interrupt())
        .expect("failed to register SIGINT handler");

    tokio::select! {
        _ = term.recv() => {},
        _ = interrupt.recv() => {},
    };

    info!("Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    info!("subscriber started at: {}", Utc::now().to_rfc3339());

    let config = Config::init_from_env().expect("failed to load configuration from env");

    let subscriber = TopicSubscriber::new(&config.kafka, &config.consumer)?;
    info!("subscribed to topic: {}", subscriber.topic());

    let exit = poll_until_stopped(&subscriber, config.poll_timeout(), Box::pin(shutdown())).await;

    // Runs on both the signal and the poll-error path, so the broker can
    // hand our partitions to another group member right away
    subscriber.close();
    info!("subscriber terminating at: {}", Utc::now().to_rfc3339());

    match exit {
        LoopExit::Shutdown => Ok(()),
        LoopExit::PollError(err) => Err(err.into()),
    }
}
