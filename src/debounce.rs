//! Stream status debouncing - turns noisy per-tick samples into confirmed transitions

/// Consecutive `true` samples required to confirm a stream has started.
pub const STREAM_START_THRESHOLD: u32 = 2;

/// Consecutive `false` samples required to confirm a stream has ended.
pub const STREAM_END_THRESHOLD: u32 = 3;

/// Last confirmed (debounced) status of the monitored page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// No run of samples has been confirmed yet
    Unknown,
    NotStreaming,
    Streaming,
}

/// A confirmed status change, ready to be announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEvent {
    Started,
    Ended,
}

/// Filters raw "is streaming right now" samples into at most one
/// [`StreamEvent::Started`] and one [`StreamEvent::Ended`] per genuine
/// state change.
///
/// The thresholds are asymmetric: starting is confirmed after 2
/// consecutive positive samples, ending only after 3 consecutive
/// negative ones. A single missed detection while a stream is live
/// therefore never produces an "ended" notification.
#[derive(Debug, Clone)]
pub struct StreamDebouncer {
    status: StreamStatus,
    streaming_count: u32,
    not_streaming_count: u32,
    start_threshold: u32,
    end_threshold: u32,
}

impl StreamDebouncer {
    pub fn new() -> Self {
        Self::with_thresholds(STREAM_START_THRESHOLD, STREAM_END_THRESHOLD)
    }

    /// Create a debouncer with custom confirmation thresholds.
    pub fn with_thresholds(start_threshold: u32, end_threshold: u32) -> Self {
        Self {
            status: StreamStatus::Unknown,
            streaming_count: 0,
            not_streaming_count: 0,
            start_threshold,
            end_threshold,
        }
    }

    /// Feed one raw sample; returns the confirmed transition, if any.
    ///
    /// Each sample increments its own consecutive counter and resets the
    /// opposite one, so at most one counter is nonzero at any time. The
    /// confirmed status only changes when a counter reaches its
    /// threshold while the status disagrees with the run.
    pub fn observe(&mut self, is_streaming: bool) -> Option<StreamEvent> {
        if is_streaming {
            self.streaming_count += 1;
            self.not_streaming_count = 0;

            // == rather than >=: the counter grows by exactly 1 per
            // sample, so the event fires on the confirming tick only.
            if self.streaming_count == self.start_threshold
                && self.status != StreamStatus::Streaming
            {
                self.status = StreamStatus::Streaming;
                return Some(StreamEvent::Started);
            }
            None
        } else {
            self.not_streaming_count += 1;
            self.streaming_count = 0;

            if self.not_streaming_count >= self.end_threshold
                && self.status == StreamStatus::Streaming
            {
                self.status = StreamStatus::NotStreaming;
                return Some(StreamEvent::Ended);
            }
            None
        }
    }

    /// Last confirmed status.
    pub fn status(&self) -> StreamStatus {
        self.status
    }
}

impl Default for StreamDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(debouncer: &mut StreamDebouncer, samples: &[bool]) -> Vec<Option<StreamEvent>> {
        samples.iter().map(|&s| debouncer.observe(s)).collect()
    }

    #[test]
    fn test_started_fires_on_second_true_only() {
        let mut d = StreamDebouncer::new();

        assert_eq!(d.observe(true), None);
        assert_eq!(d.observe(true), Some(StreamEvent::Started));
        assert_eq!(d.observe(true), None);
        assert_eq!(d.status(), StreamStatus::Streaming);
    }

    #[test]
    fn test_single_false_does_not_reset_confirmed_status() {
        let mut d = StreamDebouncer::new();

        let events = run(&mut d, &[true, true, false, true]);

        assert_eq!(
            events,
            vec![None, Some(StreamEvent::Started), None, None]
        );
        assert_eq!(d.status(), StreamStatus::Streaming);
    }

    #[test]
    fn test_ended_fires_on_third_consecutive_false() {
        let mut d = StreamDebouncer::new();

        let events = run(&mut d, &[true, true, false, false, false]);

        assert_eq!(
            events,
            vec![
                None,
                Some(StreamEvent::Started),
                None,
                None,
                Some(StreamEvent::Ended)
            ]
        );
        assert_eq!(d.status(), StreamStatus::NotStreaming);
    }

    #[test]
    fn test_never_started_nothing_to_end() {
        let mut d = StreamDebouncer::new();

        let events = run(&mut d, &[false, false, false, false]);

        assert_eq!(events, vec![None, None, None, None]);
        // Status stays Unknown: "confirmed never started" owes no event
        assert_eq!(d.status(), StreamStatus::Unknown);
    }

    #[test]
    fn test_flicker_delays_start_confirmation() {
        let mut d = StreamDebouncer::new();

        let events = run(&mut d, &[true, false, true, true]);

        assert_eq!(
            events,
            vec![None, None, None, Some(StreamEvent::Started)]
        );
    }

    #[test]
    fn test_no_repeat_started_while_streaming() {
        let mut d = StreamDebouncer::new();

        run(&mut d, &[true, true]);
        let events = run(&mut d, &[true, true, true, true]);

        assert!(events.iter().all(|e| e.is_none()));
    }

    #[test]
    fn test_ended_latched_after_firing() {
        let mut d = StreamDebouncer::new();

        run(&mut d, &[true, true, false, false, false]);
        // Counter keeps growing past the threshold but the status
        // guard keeps the event from repeating
        assert_eq!(d.observe(false), None);
        assert_eq!(d.observe(false), None);
    }

    #[test]
    fn test_full_cycle_restarts() {
        let mut d = StreamDebouncer::new();

        let events = run(
            &mut d,
            &[true, true, false, false, false, true, true],
        );

        assert_eq!(
            events,
            vec![
                None,
                Some(StreamEvent::Started),
                None,
                None,
                Some(StreamEvent::Ended),
                None,
                Some(StreamEvent::Started)
            ]
        );
    }

    #[test]
    fn test_counters_never_both_nonzero() {
        let mut d = StreamDebouncer::new();
        let samples = [
            true, true, false, true, false, false, false, true, true, false,
        ];

        for &s in &samples {
            d.observe(s);
            assert!(
                d.streaming_count == 0 || d.not_streaming_count == 0,
                "both counters nonzero after sample {}",
                s
            );
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let mut d = StreamDebouncer::with_thresholds(3, 1);

        // Start now needs 3 consecutive trues, firing on the 3rd
        assert_eq!(d.observe(true), None);
        assert_eq!(d.observe(true), None);
        assert_eq!(d.observe(true), Some(StreamEvent::Started));

        // End confirms on the very first false
        assert_eq!(d.observe(false), Some(StreamEvent::Ended));
    }
}
