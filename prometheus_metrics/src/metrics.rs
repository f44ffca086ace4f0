use anyhow::Result;
use prometheus::{histogram_opts, Histogram, IntCounter, IntGauge};

#[derive(Clone, Debug)]
pub struct Metrics {
    // Requests
    pub fork_choice_requests: IntCounter,
    pub fork_choice_errors: IntCounter,
    pub fork_choice_find_head_times: Histogram,

    // Head changes
    pub fork_choice_changed_head: IntCounter,
    pub fork_choice_reorg: IntCounter,

    // Collection sizes
    pub fork_choice_nodes: IntGauge,
    pub fork_choice_queued_attestations: IntGauge,
    pub fork_choice_votes: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // Requests
            fork_choice_requests: IntCounter::new(
                "beacon_fork_choice_requests_total",
                "Count of occasions where fork choice has tried to find a head",
            )?,

            fork_choice_errors: IntCounter::new(
                "beacon_fork_choice_errors_total",
                "Count of occasions where fork choice has returned an error when trying to find a head",
            )?,

            fork_choice_find_head_times: Histogram::with_opts(histogram_opts!(
                "beacon_fork_choice_find_head_seconds",
                "Time taken to find head in seconds",
            ))?,

            // Head changes
            fork_choice_changed_head: IntCounter::new(
                "beacon_fork_choice_changed_head_total",
                "Count of occasions fork choice has found a new head",
            )?,

            fork_choice_reorg: IntCounter::new(
                "beacon_fork_choice_reorg_total",
                "Count of occasions fork choice has switched to a different fork",
            )?,

            // Collection sizes
            fork_choice_nodes: IntGauge::new(
                "beacon_fork_choice_nodes",
                "Number of blocks in the fork choice block tree",
            )?,

            fork_choice_queued_attestations: IntGauge::new(
                "beacon_fork_choice_queued_attestations",
                "Number of attestations waiting for their slot to pass",
            )?,

            fork_choice_votes: IntGauge::new(
                "beacon_fork_choice_votes",
                "Number of validators tracked by fork choice",
            )?,
        })
    }

    pub fn register_with_default_metrics(&self) -> Result<()> {
        let default_registry = prometheus::default_registry();

        default_registry.register(Box::new(self.fork_choice_requests.clone()))?;
        default_registry.register(Box::new(self.fork_choice_errors.clone()))?;
        default_registry.register(Box::new(self.fork_choice_find_head_times.clone()))?;
        default_registry.register(Box::new(self.fork_choice_changed_head.clone()))?;
        default_registry.register(Box::new(self.fork_choice_reorg.clone()))?;
        default_registry.register(Box::new(self.fork_choice_nodes.clone()))?;
        default_registry.register(Box::new(self.fork_choice_queued_attestations.clone()))?;
        default_registry.register(Box::new(self.fork_choice_votes.clone()))?;

        Ok(())
    }

    pub fn set_collection_sizes(&self, nodes: usize, queued_attestations: usize, votes: usize) {
        self.fork_choice_nodes.set(nodes.try_into().unwrap_or(i64::MAX));
        self.fork_choice_queued_attestations
            .set(queued_attestations.try_into().unwrap_or(i64::MAX));
        self.fork_choice_votes.set(votes.try_into().unwrap_or(i64::MAX));
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    #[test]
    fn metrics_are_independent_between_instances() -> Result<()> {
        let first = Metrics::new()?;
        let second = Metrics::new()?;

        first.fork_choice_requests.inc();
        first.set_collection_sizes(3, 1, 64);

        assert_eq!(first.fork_choice_requests.get(), 1);
        assert_eq!(second.fork_choice_requests.get(), 0);
        assert_eq!(first.fork_choice_nodes.get(), 3);
        assert_eq!(first.fork_choice_votes.get(), 64);

        Ok(())
    }

    #[test]
    fn registering_with_default_registry_twice_fails() -> Result<()> {
        let metrics = Metrics::new()?;

        metrics.register_with_default_metrics()?;

        assert!(!prometheus::gather().is_empty());

        let error = metrics
            .register_with_default_metrics()
            .expect_err("metrics are already registered");

        assert!(matches!(
            error.downcast_ref::<prometheus::Error>(),
            Some(prometheus::Error::AlreadyReg),
        ));

        Ok(())
    }
}
