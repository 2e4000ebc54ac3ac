//! Wire protocol, fragmentation, reassembly and sockets for the
//! screenhero streaming pipeline.
//!
//! - `wire.rs`: magic constants and the video fragment header
//! - `packetizer.rs`: splits an encoded frame into MTU-sized fragments
//! - `reassembly.rs`: bounded, deadline-gated fragment reassembly
//! - `tile.rs`: damage-rect tile update wire format
//! - `config_msg.rs`: JSON control-plane messages
//! - `socket.rs`: unicast/multicast UDP socket abstraction
//! - `stats.rs`: atomic pipeline counters

pub mod config_msg;
pub mod error;
pub mod packetizer;
pub mod reassembly;
pub mod socket;
pub mod stats;
pub mod tile;
pub mod wire;

pub use config_msg::ConfigMessage;
pub use error::TransportError;
pub use packetizer::Packetizer;
pub use reassembly::{ReassembledFrame, Reassembler, DEFAULT_CAPACITY};
pub use socket::{ScreenSocket, SocketMode};
pub use stats::{PipelineStats, PipelineStatsSnapshot};
pub use tile::TileUpdate;
pub use wire::{peek_magic, VideoFragmentHeader, MAGIC_CONFIG, MAGIC_INPUT, MAGIC_TILE, MAGIC_VIDEO};
