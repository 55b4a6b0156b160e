use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Meter};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use std::sync::Arc;

use crate::security::{Category, SpamTrigger};

pub mod labels {
    pub const CATEGORY: &str = "category";
    pub const TRIGGER: &str = "trigger";
    pub const STORE: &str = "store";
    pub const VERSION: &str = "version";
    pub const RUST_VERSION: &str = "rust_version";
}

pub mod values {
    pub const STORE_RATE_LIMIT: &str = "rate_limit";
    pub const STORE_SPAM: &str = "spam";
}

#[derive(Clone)]
pub struct Metrics {
    // Rate limiting metrics
    pub rate_limit_checks_total: Counter<u64>,
    pub rate_limit_allowed_total: Counter<u64>,
    pub rate_limit_rejected_total: Counter<u64>,

    // Spam detection metrics
    pub spam_checks_total: Counter<u64>,
    pub spam_detected_total: Counter<u64>,

    // Maintenance sweep metrics
    pub sweep_runs_total: Counter<u64>,
    pub sweep_removed_entries_total: Counter<u64>,

    // Build info
    pub build_info: Gauge<u64>,
}

impl Metrics {
    pub fn new(meter: Meter) -> Self {
        Self {
            rate_limit_checks_total: meter
                .u64_counter("guildguard_rate_limit_checks_total")
                .with_description("Total number of actions evaluated by the rate limiter")
                .build(),
            rate_limit_allowed_total: meter
                .u64_counter("guildguard_rate_limit_allowed_total")
                .with_description("Total number of actions allowed by the rate limiter")
                .build(),
            rate_limit_rejected_total: meter
                .u64_counter("guildguard_rate_limit_rejected_total")
                .with_description("Total number of actions rejected by the rate limiter")
                .build(),

            spam_checks_total: meter
                .u64_counter("guildguard_spam_checks_total")
                .with_description("Total number of messages evaluated by the spam detector")
                .build(),
            spam_detected_total: meter
                .u64_counter("guildguard_spam_detected_total")
                .with_description("Total number of messages flagged as spam by trigger (repeated_content, volume)")
                .build(),

            sweep_runs_total: meter
                .u64_counter("guildguard_sweep_runs_total")
                .with_description("Total number of maintenance sweeps")
                .build(),
            sweep_removed_entries_total: meter
                .u64_counter("guildguard_sweep_removed_entries_total")
                .with_description("Total number of stale per-actor entries removed by sweeps")
                .build(),

            build_info: meter
                .u64_gauge("guildguard_build_info")
                .with_description("Build information (version, rust version)")
                .build(),
        }
    }

    /// Set build info metric with version labels
    pub fn set_build_info(&self) {
        let version = env!("CARGO_PKG_VERSION");
        let rust_version = env!("CARGO_PKG_RUST_VERSION");

        self.build_info.record(
            1,
            &[
                KeyValue::new(labels::VERSION, version),
                KeyValue::new(labels::RUST_VERSION, rust_version),
            ],
        );
    }

    pub fn record_rate_limit_check(&self, category: Category, limited: bool) {
        let attrs = &[KeyValue::new(labels::CATEGORY, category.as_str())];
        self.rate_limit_checks_total.add(1, attrs);
        if limited {
            self.rate_limit_rejected_total.add(1, attrs);
        } else {
            self.rate_limit_allowed_total.add(1, attrs);
        }
    }

    pub fn record_spam_check(&self, trigger: Option<SpamTrigger>) {
        self.spam_checks_total.add(1, &[]);
        if let Some(trigger) = trigger {
            self.spam_detected_total
                .add(1, &[KeyValue::new(labels::TRIGGER, trigger.as_str())]);
        }
    }

    pub fn record_sweep(&self, rate_limit_removed: usize, spam_removed: usize) {
        self.sweep_runs_total.add(1, &[]);
        if rate_limit_removed > 0 {
            self.sweep_removed_entries_total.add(
                rate_limit_removed as u64,
                &[KeyValue::new(labels::STORE, values::STORE_RATE_LIMIT)],
            );
        }
        if spam_removed > 0 {
            self.sweep_removed_entries_total.add(
                spam_removed as u64,
                &[KeyValue::new(labels::STORE, values::STORE_SPAM)],
            );
        }
    }
}

pub fn init_metrics() -> Result<(Arc<Metrics>, Registry), Box<dyn std::error::Error + Send + Sync>>
{
    let registry = Registry::default();

    let exporter = opentelemetry_prometheus::exporter()
        .with_registry(registry.clone())
        .build()?;

    let meter_provider = SdkMeterProvider::builder().with_reader(exporter).build();

    global::set_meter_provider(meter_provider);

    let meter = global::meter("guildguard");
    let metrics = Arc::new(Metrics::new(meter));

    metrics.set_build_info();

    Ok((metrics, registry))
}
