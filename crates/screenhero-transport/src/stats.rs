//! Lock-free running counters for pipeline observability, sampled
//! periodically by the host/viewer binaries for logging.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct PipelineStats {
    pub frames_captured: AtomicU64,
    pub frames_encoded: AtomicU64,
    pub frames_sent: AtomicU64,
    pub fragments_sent: AtomicU64,
    pub frames_received: AtomicU64,
    pub frames_reassembled: AtomicU64,
    pub frames_dropped_deadline: AtomicU64,
    pub frames_decoded: AtomicU64,
    pub input_events_sent: AtomicU64,
    pub input_events_injected: AtomicU64,
    /// Running sum of capture->send latency samples, nanoseconds. Paired
    /// with `capture_to_send_latency_samples` to derive the average;
    /// updated atomically so readers never see a sum without its count.
    capture_to_send_latency_ns_sum: AtomicU64,
    capture_to_send_latency_samples: AtomicU64,
}

impl PipelineStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one capture->send latency sample, in nanoseconds.
    pub fn record_capture_to_send_latency(&self, latency_ns: u64) {
        self.capture_to_send_latency_ns_sum.fetch_add(latency_ns, Ordering::Relaxed);
        self.capture_to_send_latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Average capture->send latency across all samples so far, or `None`
    /// before the first frame is sent.
    #[must_use]
    pub fn average_capture_to_send_latency_ns(&self) -> Option<u64> {
        let samples = self.capture_to_send_latency_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return None;
        }
        Some(self.capture_to_send_latency_ns_sum.load(Ordering::Relaxed) / samples)
    }

    #[must_use]
    pub fn snapshot(&self) -> PipelineStatsSnapshot {
        PipelineStatsSnapshot {
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            frames_encoded: self.frames_encoded.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            fragments_sent: self.fragments_sent.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_reassembled: self.frames_reassembled.load(Ordering::Relaxed),
            frames_dropped_deadline: self.frames_dropped_deadline.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            input_events_sent: self.input_events_sent.load(Ordering::Relaxed),
            input_events_injected: self.input_events_injected.load(Ordering::Relaxed),
            average_capture_to_send_latency_ns: self.average_capture_to_send_latency_ns(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStatsSnapshot {
    pub frames_captured: u64,
    pub frames_encoded: u64,
    pub frames_sent: u64,
    pub fragments_sent: u64,
    pub frames_received: u64,
    pub frames_reassembled: u64,
    pub frames_dropped_deadline: u64,
    pub frames_decoded: u64,
    pub input_events_sent: u64,
    pub input_events_injected: u64,
    pub average_capture_to_send_latency_ns: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let stats = PipelineStats::new();
        assert_eq!(stats.snapshot(), PipelineStatsSnapshot::default());

        PipelineStats::incr(&stats.frames_captured);
        PipelineStats::incr(&stats.frames_captured);
        assert_eq!(stats.frames_captured.load(Ordering::Relaxed), 2);
        assert_eq!(stats.snapshot().frames_captured, 2);
    }

    #[test]
    fn capture_to_send_latency_averages_its_samples() {
        let stats = PipelineStats::new();
        assert_eq!(stats.average_capture_to_send_latency_ns(), None);

        stats.record_capture_to_send_latency(10_000_000);
        stats.record_capture_to_send_latency(20_000_000);
        assert_eq!(stats.average_capture_to_send_latency_ns(), Some(15_000_000));
        assert_eq!(stats.snapshot().average_capture_to_send_latency_ns, Some(15_000_000));
    }
}
