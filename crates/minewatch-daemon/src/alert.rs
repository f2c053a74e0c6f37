//! Operator alert channel.
//!
//! Alerts are short text messages raised when a transaction fails.
//! Delivery (SMS, chat webhook) is an external collaborator; sends are
//! best-effort and fire-and-forget, and a lost alert never fails an
//! orchestrator operation.

use std::sync::Mutex;

use tracing::warn;

/// Best-effort operator alerts.
pub trait AlertSink: Send + Sync {
    /// Sends one short alert message.
    fn send(&self, message: &str);
}

/// Alert sink that surfaces messages on the `alerts` tracing target.
///
/// The default when no delivery channel is wired up: alerts still reach
/// the logs instead of vanishing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn send(&self, message: &str) {
        warn!(target: "alerts", message);
    }
}

/// Recording alert sink for tests.
#[derive(Debug, Default)]
pub struct RecordingAlertSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlertSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of sent messages, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl AlertSink for RecordingAlertSink {
    fn send(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_captures_messages() {
        let alerts = RecordingAlertSink::new();
        alerts.send("minewatch: ERROR closing > 0x01");
        alerts.send("minewatch: ERROR reinforcing > 0x02");
        assert_eq!(alerts.messages().len(), 2);
        assert!(alerts.messages()[0].contains("closing"));
    }
}
