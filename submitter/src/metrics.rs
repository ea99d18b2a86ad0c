use prometheus::{
    histogram_opts, opts, register_histogram_vec_with_registry,
    register_int_counter_vec_with_registry, HistogramVec, IntCounterVec, Registry,
};

use crate::SubmissionAttempt;

const METRICS_NAMESPACE: &str = "vetapp_submitter";

fn namespaced(name: &str) -> String {
    format!("{}_{}", METRICS_NAMESPACE, name)
}

/// Submission counters, labelled by signer kind and terminal state.
#[derive(Clone, Debug)]
pub struct SubmitterMetrics {
    pub attempts: IntCounterVec,
    pub simulation_warnings: IntCounterVec,
    pub duration_seconds: HistogramVec,
}

impl SubmitterMetrics {
    pub fn new(registry: &Registry) -> eyre::Result<Self> {
        let attempts = register_int_counter_vec_with_registry!(
            opts!(
                namespaced("attempts"),
                "Submission attempts by signer kind and terminal state",
            ),
            &["signer", "outcome"],
            registry.clone()
        )?;
        let simulation_warnings = register_int_counter_vec_with_registry!(
            opts!(
                namespaced("simulation_warnings"),
                "Submissions that went out with default gas because simulation failed",
            ),
            &["signer"],
            registry.clone()
        )?;
        let duration_seconds = register_histogram_vec_with_registry!(
            histogram_opts!(
                namespaced("duration_seconds"),
                "Wall time from build to terminal state",
                vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
            ),
            &["signer", "outcome"],
            registry.clone()
        )?;
        Ok(Self {
            attempts,
            simulation_warnings,
            duration_seconds,
        })
    }

    pub(crate) fn observe(&self, attempt: &SubmissionAttempt, elapsed_secs: f64) {
        let signer = attempt.signer_kind.to_string();
        let outcome = match &attempt.result {
            Some(Ok(_)) => "confirmed",
            Some(Err(failure)) => failure.kind(),
            None => "unknown",
        };
        self.attempts.with_label_values(&[signer.as_str(), outcome]).inc();
        self.duration_seconds
            .with_label_values(&[signer.as_str(), outcome])
            .observe(elapsed_secs);
        if attempt.simulate_warning.is_some() {
            self.simulation_warnings.with_label_values(&[signer.as_str()]).inc();
        }
    }

    #[cfg(test)]
    pub fn dummy_instance() -> Self {
        let registry = Registry::new();
        let instance = Self::new(&registry);
        instance.unwrap()
    }
}
