//! Receiver-side fragment reassembly.
//!
//! Holds a bounded number of in-progress frames, keyed by `frame_id`. A
//! frame that does not complete within its deadline is dropped rather than
//! held forever; a full table evicts its oldest entry to make room for a
//! newer frame rather than stall on a frame that will never arrive
//! complete. Fragments for a frame_id at or below the last
//! completed/evicted one are late stragglers and are discarded silently.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use screenhero_codec::Codec;

use crate::wire::VideoFragmentHeader;

/// Default number of frames the reassembler tracks concurrently.
pub const DEFAULT_CAPACITY: usize = 8;

#[derive(Debug, Clone)]
pub struct ReassembledFrame {
    pub frame_id: u64,
    pub codec: Codec,
    pub width: u16,
    pub height: u16,
    pub capture_time_ns: u64,
    pub presentation_time_ns: u64,
    pub is_keyframe: bool,
    pub parameter_sets: Option<Vec<u8>>,
    pub data: Vec<u8>,
}

struct PartialFrame {
    header: VideoFragmentHeader,
    /// This frame's fragments, indexed by `fragment_index`. Storing each
    /// fragment's own bytes (rather than copying into a pre-sized buffer at
    /// a byte offset) needs no assumption about fragment size beyond the
    /// last one being shorter.
    fragments: Vec<Option<Vec<u8>>>,
    received_count: u16,
    deadline: Instant,
}

impl PartialFrame {
    fn new(header: VideoFragmentHeader, deadline: Instant) -> Self {
        Self {
            fragments: vec![None; header.fragment_count as usize],
            received_count: 0,
            header,
            deadline,
        }
    }

    fn ingest_fragment(&mut self, fragment_index: u16, fragment_payload: &[u8]) {
        let idx = fragment_index as usize;
        let Some(slot) = self.fragments.get_mut(idx) else {
            return;
        };
        if slot.is_some() {
            return;
        }
        *slot = Some(fragment_payload.to_vec());
        self.received_count += 1;
    }

    fn is_complete(&self) -> bool {
        self.received_count as usize == self.fragments.len()
    }

    fn finish(self) -> ReassembledFrame {
        let PartialFrame { header, fragments, .. } = self;
        let mut combined = Vec::new();
        for fragment in fragments.into_iter().flatten() {
            combined.extend_from_slice(&fragment);
        }
        let split = header.parameter_set_len as usize;
        let (parameter_sets, data) = if split > 0 && split <= combined.len() {
            (Some(combined[..split].to_vec()), combined[split..].to_vec())
        } else {
            (None, combined)
        };
        ReassembledFrame {
            frame_id: header.frame_id,
            codec: header.codec,
            width: header.width,
            height: header.height,
            capture_time_ns: header.capture_time_ns,
            presentation_time_ns: header.presentation_time_ns,
            is_keyframe: header.is_keyframe,
            parameter_sets,
            data,
        }
    }
}

pub struct Reassembler {
    capacity: usize,
    deadline: Duration,
    order: VecDeque<u64>,
    partials: HashMap<u64, PartialFrame>,
    /// Highest frame_id completed or evicted so far; anything at or below
    /// this is a late straggler.
    high_water: Option<u64>,
    /// Frame ids evicted (deadline or capacity) whose header, seen on at
    /// least one received fragment, marked them as a keyframe. Drained by
    /// the receive loop to decide whether to ask the encoder for a fresh
    /// one.
    dropped_keyframes: Vec<u64>,
}

impl Reassembler {
    #[must_use]
    pub fn new(capacity: usize, deadline: Duration) -> Self {
        Self {
            capacity,
            deadline,
            order: VecDeque::new(),
            partials: HashMap::new(),
            high_water: None,
            dropped_keyframes: Vec::new(),
        }
    }

    /// Compute the default deadline for a given capture frame rate:
    /// `min(3 frame intervals, 100ms)`.
    #[must_use]
    pub fn default_deadline_for_fps(fps: u32) -> Duration {
        let frame_interval = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        (frame_interval * 3).min(Duration::from_millis(100))
    }

    fn is_late_straggler(&self, frame_id: u64) -> bool {
        self.high_water.is_some_and(|hw| frame_id <= hw)
    }

    fn evict(&mut self, frame_id: u64) {
        if let Some(partial) = self.partials.remove(&frame_id) {
            if partial.header.is_keyframe {
                self.dropped_keyframes.push(frame_id);
            }
        }
        self.order.retain(|id| *id != frame_id);
        self.high_water = Some(self.high_water.map_or(frame_id, |hw| hw.max(frame_id)));
    }

    /// Drain the frame ids dropped since the last call that were known to
    /// be keyframes (from a header seen on at least one received
    /// fragment). Non-empty iff a caller should request a fresh keyframe.
    pub fn take_dropped_keyframes(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.dropped_keyframes)
    }

    /// Drop any frames whose deadline has passed. Returns the frame_ids
    /// dropped, so the caller can request a fresh keyframe.
    pub fn reap_expired(&mut self, now: Instant) -> Vec<u64> {
        let expired: Vec<u64> = self
            .partials
            .iter()
            .filter(|(_, p)| now >= p.deadline)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.evict(*id);
        }
        expired
    }

    /// Feed one fragment's header and body into the reassembler. Returns
    /// `Some` when this fragment completed its frame.
    pub fn ingest(
        &mut self,
        header: VideoFragmentHeader,
        fragment_payload: &[u8],
        now: Instant,
    ) -> Option<ReassembledFrame> {
        if self.is_late_straggler(header.frame_id) {
            return None;
        }
        self.reap_expired(now);

        if !self.partials.contains_key(&header.frame_id) {
            if self.partials.len() >= self.capacity {
                if let Some(oldest) = self.order.front().copied() {
                    self.evict(oldest);
                }
            }
            let deadline = now + self.deadline;
            self.partials.insert(header.frame_id, PartialFrame::new(header, deadline));
            self.order.push_back(header.frame_id);
        }

        let partial = self.partials.get_mut(&header.frame_id)?;
        partial.ingest_fragment(header.fragment_index, fragment_payload);

        if partial.is_complete() {
            let partial = self.partials.remove(&header.frame_id).unwrap();
            self.order.retain(|id| *id != header.frame_id);
            self.high_water = Some(self.high_water.map_or(header.frame_id, |hw| hw.max(header.frame_id)));
            Some(partial.finish())
        } else {
            None
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.partials.len()
    }
}
