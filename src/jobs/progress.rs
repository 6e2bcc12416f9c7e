// Progress and log event payloads emitted during batch runs
//
// Both batch types (generate, purge) use the same shape. The front-end
// (CLI, GUI, tests) supplies an EventSink; the engine never blocks on it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Progress payload emitted after every processed video.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub percent: f64,
}

impl Progress {
    pub fn new(current: u64, total: u64) -> Self {
        let total_safe = total.max(1);
        let percent = (current as f64 / total_safe as f64) * 100.0;
        Self {
            current,
            total,
            percent: percent.min(100.0),
        }
    }
}

/// Callback surface the controller wires up before starting a run.
/// Must be cheap; called from the worker thread.
pub trait EventSink {
    fn progress(&self, progress: Progress);
    fn log(&self, message: &str, level: LogLevel);
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn progress(&self, _progress: Progress) {}
    fn log(&self, _message: &str, _level: LogLevel) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_is_bounded() {
        assert_eq!(Progress::new(0, 0).percent, 0.0);
        assert_eq!(Progress::new(1, 2).percent, 50.0);
        assert_eq!(Progress::new(2, 2).percent, 100.0);
        assert!(Progress::new(5, 2).percent <= 100.0);
    }
}
