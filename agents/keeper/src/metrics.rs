use prometheus::{opts, register_int_counter_vec_with_registry, IntCounterVec, Registry};

use crate::dispatcher::FiringOutcome;

const METRICS_NAMESPACE: &str = "vetapp_keeper";

fn namespaced(name: &str) -> String {
    format!("{}_{}", METRICS_NAMESPACE, name)
}

#[derive(Clone, Debug)]
pub struct KeeperMetrics {
    /// Firings by trigger and outcome (`submitted`, `skipped` or a failure kind).
    pub firings: IntCounterVec,
}

impl KeeperMetrics {
    pub fn new(registry: &Registry) -> eyre::Result<Self> {
        let firings = register_int_counter_vec_with_registry!(
            opts!(namespaced("firings"), "Schedule firings by trigger and outcome"),
            &["trigger", "outcome"],
            registry.clone()
        )?;
        Ok(Self { firings })
    }

    pub(crate) fn observe(&self, trigger: &str, outcome: &FiringOutcome) {
        self.firings
            .with_label_values(&[trigger, outcome.label()])
            .inc();
    }

    #[cfg(test)]
    pub fn dummy_instance() -> Self {
        let registry = Registry::new();
        let instance = Self::new(&registry);
        instance.unwrap()
    }
}
