//! Timing instrumentation
//!
//! A [`ScopedTimer`] reports the elapsed wall-clock time when it is dropped,
//! so the report is produced on every exit path of the enclosing scope,
//! including early returns and unwinding panics.

use std::time::{Duration, Instant};

/// One elapsed-time measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingReport {
    pub label: Option<String>,
    pub elapsed: Duration,
}

/// Receiver of a [`TimingReport`]
pub type TimingSink = Box<dyn FnOnce(&TimingReport) + Send>;

/// Reports elapsed time on drop
pub struct ScopedTimer {
    label: Option<String>,
    start: Instant,
    sink: Option<TimingSink>,
}

impl ScopedTimer {
    /// Start a timer that logs its report at debug level
    pub fn new(label: Option<&str>) -> Self {
        Self::with_sink(label, Box::new(log_report))
    }

    /// Start a timer that hands its report to `sink`
    pub fn with_sink(label: Option<&str>, sink: TimingSink) -> Self {
        Self {
            label: label.map(str::to_owned),
            start: Instant::now(),
            sink: Some(sink),
        }
    }

    /// Start a timer that reports nowhere
    pub fn silent() -> Self {
        Self {
            label: None,
            start: Instant::now(),
            sink: None,
        }
    }

    /// Time elapsed so far
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            let report = TimingReport {
                label: self.label.take(),
                elapsed: self.start.elapsed(),
            };
            sink(&report);
        }
    }
}

fn log_report(report: &TimingReport) {
    match &report.label {
        Some(label) => tracing::debug!(
            label = %label,
            elapsed_us = report.elapsed.as_micros() as u64,
            "elapsed time"
        ),
        None => tracing::debug!(
            elapsed_us = report.elapsed.as_micros() as u64,
            "elapsed time"
        ),
    }
}

/// Run `action`, log how long it took, and return its value unchanged
pub fn time<R>(label: Option<&str>, action: impl FnOnce() -> R) -> R {
    let _timer = ScopedTimer::new(label);
    action()
}

/// Run `action` and hand the elapsed time to `sink`
pub fn time_with<R>(label: Option<&str>, sink: TimingSink, action: impl FnOnce() -> R) -> R {
    let _timer = ScopedTimer::with_sink(label, sink);
    action()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn capture() -> (Arc<Mutex<Vec<TimingReport>>>, TimingSink) {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink_reports = Arc::clone(&reports);
        let sink: TimingSink = Box::new(move |report| sink_reports.lock().push(report.clone()));
        (reports, sink)
    }

    #[test]
    fn test_value_passes_through() {
        let (reports, sink) = capture();
        let mut runs = 0;
        let value = time_with(Some("sum"), sink, || {
            runs += 1;
            2 + 2
        });

        assert_eq!(value, 4);
        assert_eq!(runs, 1);
        let reports = reports.lock();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].label.as_deref(), Some("sum"));
        assert!(reports[0].elapsed >= Duration::ZERO);
    }

    #[test]
    fn test_error_passes_through_and_is_reported() {
        let (reports, sink) = capture();
        let mut runs = 0;
        let result: Result<(), String> = time_with(None, sink, || {
            runs += 1;
            Err("boom".to_string())
        });

        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(runs, 1);
        assert_eq!(reports.lock().len(), 1);
        assert_eq!(reports.lock()[0].label, None);
    }

    #[test]
    fn test_reported_on_panic() {
        let (reports, sink) = capture();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            time_with(Some("panics"), sink, || -> u32 { panic!("wrapped action failed") })
        }));

        assert!(outcome.is_err());
        assert_eq!(reports.lock().len(), 1);
        assert_eq!(reports.lock()[0].label.as_deref(), Some("panics"));
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let timer = ScopedTimer::silent();
        let first = timer.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.elapsed() >= first + Duration::from_millis(2));
    }

    #[test]
    fn test_default_sink_logs() {
        let value = time(Some("logged"), || "ok");
        assert_eq!(value, "ok");
    }
}
