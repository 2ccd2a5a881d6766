use serde::Serialize;

/// Log target for counter summaries; `logger::build_config` routes it to `metrics.log`.
pub const METRICS_TARGET: &str = "memolite::metrics";

/// Simple counters for observing cache behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub removes: u64,
    pub evictions: u64,
}

impl CacheMetrics {
    /// Fraction of lookups that hit, 0.0 when nothing was looked up.
    #[must_use]
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits.saturating_add(self.misses);
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }

    #[must_use]
    pub fn lookups(&self) -> u64 {
        self.hits.saturating_add(self.misses)
    }

    /// Writes one summary line under `METRICS_TARGET`.
    pub fn log_summary(&self, label: &str) {
        log::info!(
            target: METRICS_TARGET,
            "{label} hits={} misses={} inserts={} updates={} removes={} evictions={} hit_ratio={:.3}",
            self.hits,
            self.misses,
            self.inserts,
            self.updates,
            self.removes,
            self.evictions,
            self.hit_ratio()
        );
    }
}
