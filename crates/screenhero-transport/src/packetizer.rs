//! Splits an `EncodedPacket` into MTU-sized datagrams.
//!
//! Parameter sets (present only on keyframes) are prefixed to the encoded
//! payload before fragmentation, so the reassembled buffer on the receiver
//! is exactly `[parameter_sets][data]` with the split point recorded in
//! the header. All fragments for a frame are produced up front; the
//! sender is expected to push them all out before starting the next
//! frame.

use screenhero_codec::EncodedPacket;

use crate::error::TransportError;
use crate::wire::{VideoFragmentHeader, VIDEO_FRAGMENT_HEADER_LEN, WIRE_VERSION};

pub struct Packetizer {
    max_packet_size: usize,
}

impl Packetizer {
    #[must_use]
    pub fn new(max_packet_size: u32) -> Self {
        Self {
            max_packet_size: max_packet_size as usize,
        }
    }

    /// Fragment one encoded frame into wire-ready datagrams, in order.
    pub fn fragment(&self, packet: &EncodedPacket) -> Result<Vec<Vec<u8>>, TransportError> {
        let max_fragment_payload = self
            .max_packet_size
            .checked_sub(VIDEO_FRAGMENT_HEADER_LEN)
            .filter(|&n| n > 0)
            .ok_or(TransportError::TooLarge(self.max_packet_size))?;

        let parameter_sets = packet.parameter_sets.as_deref().unwrap_or(&[]);
        let mut combined = Vec::with_capacity(parameter_sets.len() + packet.data.len());
        combined.extend_from_slice(parameter_sets);
        combined.extend_from_slice(&packet.data);

        let total_len = combined.len();
        let fragment_count = total_len.div_ceil(max_fragment_payload).max(1);
        if fragment_count > usize::from(u16::MAX) {
            return Err(TransportError::TooLarge(total_len));
        }

        let mut datagrams = Vec::with_capacity(fragment_count);
        for (index, chunk) in combined.chunks(max_fragment_payload.max(1)).enumerate() {
            let header = VideoFragmentHeader {
                version: WIRE_VERSION,
                is_keyframe: packet.is_keyframe,
                has_parameter_sets: !parameter_sets.is_empty(),
                codec: packet.codec,
                frame_id: packet.frame_id,
                capture_time_ns: packet.capture_ts_ns,
                presentation_time_ns: packet.presentation_time_ns,
                width: packet.width as u16,
                height: packet.height as u16,
                fragment_index: index as u16,
                fragment_count: fragment_count as u16,
                parameter_set_len: parameter_sets.len() as u32,
                payload_len: chunk.len() as u32,
            };
            let mut datagram = Vec::with_capacity(VIDEO_FRAGMENT_HEADER_LEN + chunk.len());
            datagram.extend_from_slice(&header.encode());
            datagram.extend_from_slice(chunk);
            datagrams.push(datagram);
        }
        if combined.is_empty() {
            // Degenerate empty payload still gets exactly one fragment.
            let header = VideoFragmentHeader {
                version: WIRE_VERSION,
                is_keyframe: packet.is_keyframe,
                has_parameter_sets: false,
                codec: packet.codec,
                frame_id: packet.frame_id,
                capture_time_ns: packet.capture_ts_ns,
                presentation_time_ns: packet.presentation_time_ns,
                width: packet.width as u16,
                height: packet.height as u16,
                fragment_index: 0,
                fragment_count: 1,
                parameter_set_len: 0,
                payload_len: 0,
            };
            datagrams.push(header.encode().to_vec());
        }
        Ok(datagrams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenhero_codec::Codec;

    fn packet(data_len: usize, keyframe: bool) -> EncodedPacket {
        EncodedPacket {
            frame_id: 7,
            data: vec![0xABu8; data_len],
            presentation_time_ns: 1_000,
            is_keyframe: keyframe,
            codec: Codec::H264,
            width: 1920,
            height: 1080,
            capture_ts_ns: 500,
            encode_ts_ns: 600,
            parameter_sets: keyframe.then(|| vec![0, 0, 0, 1, 0x67]),
        }
    }

    #[test]
    fn single_fragment_when_payload_fits() {
        let packetizer = Packetizer::new(1400);
        let fragments = packetizer.fragment(&packet(100, false)).unwrap();
        assert_eq!(fragments.len(), 1);
        let header = VideoFragmentHeader::decode(&fragments[0]).unwrap();
        assert_eq!(header.fragment_count, 1);
        assert_eq!(header.payload_len, 100);
        assert_eq!(header.width, 1920);
        assert_eq!(header.height, 1080);
        assert_eq!(header.codec, Codec::H264);
        assert_eq!(header.capture_time_ns, 500);
    }

    #[test]
    fn splits_into_multiple_fragments_when_oversized() {
        let packetizer = Packetizer::new(100);
        let fragments = packetizer.fragment(&packet(1000, true)).unwrap();
        assert!(fragments.len() > 1);
        for (i, fragment) in fragments.iter().enumerate() {
            let header = VideoFragmentHeader::decode(fragment).unwrap();
            assert_eq!(header.fragment_index as usize, i);
            assert_eq!(header.fragment_count as usize, fragments.len());
            assert!(header.is_keyframe);
            assert!(header.has_parameter_sets);
            assert_eq!(header.parameter_set_len, 5);
        }
    }

    #[test]
    fn rejects_mtu_too_small_for_header() {
        let packetizer = Packetizer::new(10);
        assert!(packetizer.fragment(&packet(10, false)).is_err());
    }
}
