use std::collections::HashMap;

use prometheus::{
    labels, opts, register_int_gauge_with_registry, Encoder, IntGauge, Registry,
};

const NAMESPACE: &str = "vetapp";

/// Prometheus registry shared by everything running in one process.
#[derive(Debug)]
pub struct CoreMetrics {
    /// Metrics registry for adding new metrics and gathering reports
    registry: Registry,
    listen_port: u16,
    agent_name: String,
    /// Set to 1 while the process runs; carries the version as a label.
    build_info: IntGauge,
}

impl CoreMetrics {
    /// Track metrics for a particular agent name.
    pub fn new(for_agent: &str, listen_port: u16, registry: Registry) -> prometheus::Result<Self> {
        let const_labels: HashMap<&str, &str> = labels! {
            "version" => env!("CARGO_PKG_VERSION"),
            "agent" => for_agent,
        };
        let build_info = register_int_gauge_with_registry!(
            opts!(
                format!("{NAMESPACE}_build_info"),
                "Always 1, labelled with the running agent and version",
                const_labels
            ),
            registry
        )?;
        build_info.set(1);

        Ok(Self {
            registry,
            listen_port,
            agent_name: for_agent.to_owned(),
            build_info,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn listen_port(&self) -> u16 {
        self.listen_port
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// Gather available metrics into an encoded (plaintext, OpenMetrics format)
    /// report.
    pub fn gather(&self) -> prometheus::Result<Vec<u8>> {
        let collected_metrics = self.registry.gather();
        let mut out_buf = Vec::with_capacity(1024 * 64);
        let encoder = prometheus::TextEncoder::new();
        encoder.encode(&collected_metrics, &mut out_buf)?;
        Ok(out_buf)
    }
}
