use log::warn;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Accumulated timings of one named span
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpanStats {
    pub total: Duration,
    pub count: usize,
}

/// Wall-clock timings of the phases of a timestep, accumulated by name
///
/// ```
/// use dg_seaice::kernel::profiler::Profiler;
///
/// let mut profiler = Profiler::new();
/// let sum = profiler.time("work", || (0..100).sum::<usize>());
///
/// assert_eq!(sum, 4950);
/// assert_eq!(profiler.stats("work").unwrap().count, 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Profiler {
    spans: BTreeMap<&'static str, SpanStats>,
    open: BTreeMap<&'static str, Instant>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing the span `name`
    pub fn start(&mut self, name: &'static str) {
        if self.open.insert(name, Instant::now()).is_some() {
            warn!("profiler span '{}' restarted before it was stopped", name);
        }
    }

    /// Stop timing the span `name`, adding the elapsed time to its total
    pub fn stop(&mut self, name: &'static str) {
        match self.open.remove(name) {
            Some(start) => {
                let stats = self.spans.entry(name).or_default();
                stats.total += start.elapsed();
                stats.count += 1;
            }
            None => warn!("profiler span '{}' stopped without being started", name),
        }
    }

    /// Time a closure as the span `name`
    pub fn time<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.start(name);
        let result = f();
        self.stop(name);
        result
    }

    pub fn stats(&self, name: &str) -> Option<SpanStats> {
        self.spans.get(name).copied()
    }

    pub fn total(&self, name: &str) -> Duration {
        self.stats(name).map(|s| s.total).unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.spans.clear();
        self.open.clear();
    }

    /// A table of all spans with their total and average times
    pub fn summary(&self) -> String {
        let mut table = format!("{}\n{:^60}\n{}\n", "=".repeat(60), "DYNAMICS TIMING SUMMARY", "=".repeat(60));

        for (name, stats) in self.spans.iter() {
            let total_ms = stats.total.as_secs_f64() * 1000.0;
            table.push_str(&format!(
                "  {:<26} {:>10.3}ms  (avg: {:>9.3}ms, n: {})\n",
                name,
                total_ms,
                total_ms / stats.count.max(1) as f64,
                stats.count
            ));
        }

        table.push_str(&"=".repeat(60));
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_accumulate() {
        let mut profiler = Profiler::new();
        for _ in 0..3 {
            profiler.start("advection");
            profiler.stop("advection");
        }
        profiler.time("momentum", || ());

        assert_eq!(profiler.stats("advection").unwrap().count, 3);
        assert_eq!(profiler.stats("momentum").unwrap().count, 1);
        assert_eq!(profiler.stats("forcing"), None);
        assert_eq!(profiler.total("forcing"), Duration::ZERO);

        let summary = profiler.summary();
        assert!(summary.contains("advection"));
        assert!(summary.contains("momentum"));

        profiler.reset();
        assert_eq!(profiler.stats("advection"), None);
    }

    #[test]
    fn unmatched_stop_is_ignored() {
        let mut profiler = Profiler::new();
        profiler.stop("strain");
        assert_eq!(profiler.stats("strain"), None);
    }
}
