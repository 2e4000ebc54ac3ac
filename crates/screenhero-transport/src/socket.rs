//! UDP socket abstraction supporting both a direct unicast peer and a
//! LAN multicast group, so one host can serve several viewers without a
//! separate send per viewer when the network allows it.

use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::error::TransportError;

/// Multicast datagrams never leave the local subnet: one router hop kills
/// them. Keeps a misconfigured session from leaking onto the wider network.
const MULTICAST_TTL: u32 = 1;

pub enum SocketMode {
    Unicast { peer: SocketAddr },
    Multicast { group: Ipv4Addr, interface: Ipv4Addr },
}

/// A bound UDP socket plus the send target it was configured with.
pub struct ScreenSocket {
    socket: UdpSocket,
    mode: SocketMode,
}

impl ScreenSocket {
    pub async fn bind_unicast(bind_addr: SocketAddr, peer: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(bind_addr).await?;
        Ok(Self {
            socket,
            mode: SocketMode::Unicast { peer },
        })
    }

    pub async fn bind_multicast(
        bind_port: u16,
        group: Ipv4Addr,
        interface: Ipv4Addr,
    ) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, bind_port)).await?;
        socket.join_multicast_v4(group, interface)?;
        socket.set_multicast_ttl_v4(MULTICAST_TTL)?;
        Ok(Self {
            socket,
            mode: SocketMode::Multicast { group, interface },
        })
    }

    /// Send one datagram to the configured target (the unicast peer, or
    /// the joined multicast group).
    pub async fn send(&self, buf: &[u8]) -> Result<usize, TransportError> {
        let target: SocketAddr = match &self.mode {
            SocketMode::Unicast { peer } => *peer,
            SocketMode::Multicast { group, .. } => SocketAddr::new((*group).into(), self.socket.local_addr()?.port()),
        };
        Ok(self.socket.send_to(buf, target).await?)
    }

    pub async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), TransportError> {
        Ok(self.socket.recv_from(buf).await?)
    }

    #[must_use]
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}
