//! User-facing status messages
//!
//! Flows report progress through a [`FeedbackChannel`]. A surface (terminal,
//! UI) registers one observer at startup and clears it on teardown. Reporting
//! never fails and never changes control flow.

use std::sync::{Arc, Mutex, RwLock};
use tracing::{info, warn};

/// Receives human-readable status messages
pub trait FeedbackObserver: Send + Sync {
    fn on_message(&self, message: &str, is_error: bool);
}

/// Injectable handle to the currently registered observer
#[derive(Clone, Default)]
pub struct FeedbackChannel {
    observer: Arc<RwLock<Option<Arc<dyn FeedbackObserver>>>>,
}

impl FeedbackChannel {
    /// Channel without an observer, reports fall back to the log
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(observer: Arc<dyn FeedbackObserver>) -> Self {
        let channel = Self::new();
        channel.register(observer);
        channel
    }

    /// Replace the registered observer
    pub fn register(&self, observer: Arc<dyn FeedbackObserver>) {
        let mut slot = self.observer.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(observer);
    }

    pub fn clear(&self) {
        let mut slot = self.observer.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    pub fn is_registered(&self) -> bool {
        self.current().is_some()
    }

    fn current(&self) -> Option<Arc<dyn FeedbackObserver>> {
        self.observer
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Forward a message to the observer
    pub fn report(&self, message: &str, is_error: bool) {
        match self.current() {
            Some(observer) => observer.on_message(message, is_error),
            None => warn!("Feedback observer not registered. Message: {}", message),
        }
    }

    pub fn success(&self, message: &str) {
        self.report(message, false);
    }

    pub fn error(&self, message: &str) {
        self.report(message, true);
    }
}

/// Observer that writes messages to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FeedbackObserver for TracingObserver {
    fn on_message(&self, message: &str, is_error: bool) {
        if is_error {
            warn!(target: "authfetch::feedback", "{}", message);
        } else {
            info!(target: "authfetch::feedback", "{}", message);
        }
    }
}

/// A reported message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub message: String,
    pub is_error: bool,
}

/// Observer that keeps every message, for surfaces that poll
#[derive(Debug, Default)]
pub struct RecordingObserver {
    messages: Mutex<Vec<FeedbackMessage>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<FeedbackMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<FeedbackMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl FeedbackObserver for RecordingObserver {
    fn on_message(&self, message: &str, is_error: bool) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(FeedbackMessage {
                message: message.to_string(),
                is_error,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::{mock, predicate::eq};

    mock! {
        pub Observer {}

        impl FeedbackObserver for Observer {
            fn on_message(&self, message: &str, is_error: bool);
        }
    }

    #[test]
    fn test_report_forwards_to_observer() {
        let mut observer = MockObserver::new();
        observer
            .expect_on_message()
            .with(eq("Token refreshed successfully!"), eq(false))
            .times(1)
            .return_const(());
        observer
            .expect_on_message()
            .with(eq("Token refresh failed"), eq(true))
            .times(1)
            .return_const(());

        let channel = FeedbackChannel::with_observer(Arc::new(observer));
        channel.success("Token refreshed successfully!");
        channel.error("Token refresh failed");
    }

    #[test]
    fn test_report_without_observer_is_noop() {
        let channel = FeedbackChannel::new();
        assert!(!channel.is_registered());
        channel.report("nobody listening", true);
    }

    #[test]
    fn test_clear_detaches_observer() {
        let recorder = Arc::new(RecordingObserver::new());
        let channel = FeedbackChannel::with_observer(recorder.clone());

        channel.success("first");
        channel.clear();
        channel.success("second");

        assert_eq!(
            recorder.messages(),
            vec![FeedbackMessage {
                message: "first".to_string(),
                is_error: false,
            }]
        );
    }

    #[test]
    fn test_clones_share_registration() {
        let channel = FeedbackChannel::new();
        let clone = channel.clone();
        let recorder = Arc::new(RecordingObserver::new());

        channel.register(recorder.clone());
        clone.error("shared");

        assert_eq!(recorder.last().map(|m| m.is_error), Some(true));
    }
}
