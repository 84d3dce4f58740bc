use std::future::Future;
use std::time::Duration;

use common_kafka::kafka_consumer::{PollError, Polled, TopicSubscriber};
use tracing::{error, info};

/// Why the poll loop stopped.
#[derive(Debug)]
pub enum LoopExit {
    /// External shutdown signal; a clean stop.
    Shutdown,
    /// Fatal poll failure. Deliberately not retried: a broker we cannot
    /// poll means this process is done, restart is the orchestrator's job.
    PollError(PollError),
}

/// Poll indefinitely, logging every record. Empty polls keep the loop
/// alive; a poll error or the shutdown future ends it. The caller owns
/// releasing the consumer handle afterwards.
pub async fn poll_until_stopped<F>(
    subscriber: &TopicSubscriber,
    poll_timeout: Duration,
    mut shutdown: F,
) -> LoopExit
where
    F: Future<Output = ()> + Unpin,
{
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested, leaving poll loop");
                return LoopExit::Shutdown;
            }
            polled = subscriber.poll(poll_timeout) => match polled {
                Ok(Polled::Timeout) => {
                    info!("no message, will poll again");
                }
                Ok(Polled::Record(record)) => {
                    info!(
                        "message: {} topic={} partition={} offset={} headers={:?}",
                        record.payload_utf8(),
                        record.topic,
                        record.partition,
                        record.offset,
                        record.headers,
                    );
                }
                Err(err) => {
                    error!("poll failed: {err}");
                    return LoopExit::PollError(err);
                }
            }
        }
    }
}
