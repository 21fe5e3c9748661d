//! Endpoint Liveness
//!
//! The runner never gives up on a down endpoint: benchmarks are operator
//! supervised, so polling continues until a probe succeeds.

use super::execution::Runner;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use travbench_topology::MetricEvaluator;
use travbench_transport::{StreamEvent, Transport};

impl<T: Transport, E: MetricEvaluator> Runner<T, E> {
    /// Block until a probe query completes without error, then settle.
    pub async fn wait_until_up(&self) {
        let delays = self.config.delays;
        let start = Instant::now();
        let mut ticker = tokio::time::interval(delays.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempts = 0u64;
        loop {
            ticker.tick().await;
            attempts += 1;
            if self.probe().await {
                break;
            }
            debug!(attempts, "endpoint not up yet");
        }

        info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            attempts, "endpoint is up"
        );
        tokio::time::sleep(delays.settle).await;
    }

    /// One probe attempt; rows are drained and ignored
    async fn probe(&self) -> bool {
        let mut stream = self
            .transport
            .send(&self.config.endpoint, &self.config.probe_query);
        let drain = async {
            loop {
                match stream.next().await {
                    StreamEvent::Row(_) | StreamEvent::Metadata(_) => {}
                    StreamEvent::End => return true,
                    StreamEvent::Error(e) => {
                        debug!(error = %e, "probe failed");
                        return false;
                    }
                }
            }
        };
        tokio::time::timeout(self.config.delays.probe_timeout, drain)
            .await
            .unwrap_or(false)
    }
}
