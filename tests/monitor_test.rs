//! Tests for the monitor loop

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use stream_monitor::debounce::StreamDebouncer;
use stream_monitor::monitor::{MonitorConfig, StreamMonitor};
use stream_monitor::notification::{Notifier, SendResult};
use stream_monitor::probe::{ProbeError, StreamProbe};

/// Probe fake fed from a fixed script of samples. Signals shutdown when
/// the script runs out so the loop under test terminates.
struct ScriptedProbe {
    samples: Mutex<VecDeque<Result<bool, ProbeError>>>,
    shutdown: watch::Sender<bool>,
    closed: Arc<AtomicBool>,
}

impl ScriptedProbe {
    fn new(
        samples: Vec<Result<bool, ProbeError>>,
        shutdown: watch::Sender<bool>,
    ) -> (Self, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        (
            Self {
                samples: Mutex::new(samples.into()),
                shutdown,
                closed: closed.clone(),
            },
            closed,
        )
    }
}

#[async_trait]
impl StreamProbe for ScriptedProbe {
    async fn probe(&self) -> Result<bool, ProbeError> {
        let mut samples = self.samples.lock().unwrap();
        let sample = samples.pop_front().unwrap_or(Ok(false));
        if samples.is_empty() {
            // Last scripted sample: ask the loop to stop after this tick
            let _ = self.shutdown.send(true);
        }
        sample
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Notifier fake recording every message it is asked to deliver.
struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    attempts: Arc<AtomicUsize>,
    fail: bool,
}

impl RecordingNotifier {
    fn new(fail: bool) -> (Arc<Self>, Arc<Mutex<Vec<String>>>, Arc<AtomicUsize>) {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let attempts = Arc::new(AtomicUsize::new(0));
        (
            Arc::new(Self {
                messages: messages.clone(),
                attempts: attempts.clone(),
                fail,
            }),
            messages,
            attempts,
        )
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, text: &str) -> anyhow::Result<SendResult> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail {
            Ok(SendResult::Failed("simulated outage".to_string()))
        } else {
            Ok(SendResult::Sent)
        }
    }
}

fn test_config() -> MonitorConfig {
    MonitorConfig {
        url: "https://example.com/live".to_string(),
        interval: Duration::from_millis(5),
    }
}

async fn run_scripted(
    samples: Vec<Result<bool, ProbeError>>,
    fail_notifier: bool,
) -> (Vec<String>, usize, bool) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (probe, closed) = ScriptedProbe::new(samples, shutdown_tx);
    let (notifier, messages, attempts) = RecordingNotifier::new(fail_notifier);

    let mut monitor = StreamMonitor::new(test_config(), Box::new(probe), notifier);
    monitor.run(shutdown_rx).await;

    let messages = messages.lock().unwrap().clone();
    (
        messages,
        attempts.load(Ordering::SeqCst),
        closed.load(Ordering::SeqCst),
    )
}

#[tokio::test]
async fn test_started_and_ended_notifications() {
    // Given: samples confirming a start (2 trues) then an end (3 falses)
    let samples = vec![Ok(true), Ok(true), Ok(false), Ok(false), Ok(false)];

    // When: the loop runs the whole script
    let (messages, _, closed) = run_scripted(samples, false).await;

    // Then: exactly one started and one ended message, in order
    assert_eq!(
        messages,
        vec![
            "https://example.com/live is currently streaming".to_string(),
            "https://example.com/live is currently not streaming".to_string(),
        ]
    );
    // And: probe resources were released on stop
    assert!(closed);
}

#[tokio::test]
async fn test_probe_errors_fold_to_not_streaming() {
    // Given: a confirmed stream, then three ticks of probe failure
    let samples = vec![
        Ok(true),
        Ok(true),
        Err(ProbeError::Timeout("probe timed out".to_string())),
        Err(ProbeError::SessionClosed),
        Err(ProbeError::Timeout("probe timed out".to_string())),
    ];

    // When: the loop runs through the failures
    let (messages, _, _) = run_scripted(samples, false).await;

    // Then: the failures count as not-streaming samples and end the stream
    assert_eq!(messages.len(), 2);
    assert!(messages[1].ends_with("is currently not streaming"));
}

#[tokio::test]
async fn test_notifier_failure_does_not_stop_loop() {
    // Given: a notifier whose every delivery fails
    let samples = vec![Ok(true), Ok(true), Ok(false), Ok(false), Ok(false)];

    // When: the loop runs
    let (_, attempts, closed) = run_scripted(samples, true).await;

    // Then: both events were still attempted and the loop finished cleanly
    assert_eq!(attempts, 2);
    assert!(closed);
}

#[tokio::test]
async fn test_no_notifications_when_never_streaming() {
    // Given: nothing but not-streaming samples from a fresh start
    let samples = vec![Ok(false), Ok(false), Ok(false), Ok(false)];

    // When: the loop runs
    let (messages, attempts, _) = run_scripted(samples, false).await;

    // Then: never was streaming, nothing to announce
    assert!(messages.is_empty());
    assert_eq!(attempts, 0);
}

#[tokio::test]
async fn test_flicker_is_suppressed() {
    // Given: a short drop while streaming (single false between trues)
    let samples = vec![Ok(true), Ok(true), Ok(false), Ok(true), Ok(true)];

    // When: the loop runs
    let (messages, _, _) = run_scripted(samples, false).await;

    // Then: one started message only, no spurious ended
    assert_eq!(messages.len(), 1);
    assert!(messages[0].ends_with("is currently streaming"));
}

#[tokio::test]
async fn test_custom_debounce_thresholds() {
    // Given: a monitor debouncing with 1-sample thresholds
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (probe, _) = ScriptedProbe::new(vec![Ok(true), Ok(false)], shutdown_tx);
    let (notifier, messages, _) = RecordingNotifier::new(false);

    let mut monitor = StreamMonitor::new(test_config(), Box::new(probe), notifier)
        .with_debouncer(StreamDebouncer::with_thresholds(1, 1));

    // When: a single true then a single false arrive
    monitor.run(shutdown_rx).await;

    // Then: each sample confirms immediately
    let messages = messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 2);
}
