use super::FrameSender;
use crate::foundation::error::{MotionError, MotionResult};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

pub const ARTNET_PORT: u16 = 6454;

const HEADER: &[u8; 8] = b"Art-Net\0";
const OP_OUTPUT: u16 = 0x5000;
const PROTOCOL_VERSION: u16 = 14;
const DMX_LEN: usize = 512;

/// Build an ArtDmx (OpOutput) packet carrying one 512-slot universe.
///
/// `port_address` is the 15-bit Art-Net port address (Net in bits 8..15, Sub-Net and Universe in
/// the low byte). `data` is zero-padded or truncated to 512 slots.
pub fn build_artdmx_packet(sequence: u8, port_address: u16, data: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(18 + DMX_LEN);
    packet.extend_from_slice(HEADER);
    packet.extend_from_slice(&OP_OUTPUT.to_le_bytes());
    packet.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    packet.push(sequence);
    packet.push(0x00); // physical
    packet.push((port_address & 0xFF) as u8);
    packet.push(((port_address >> 8) & 0x7F) as u8);
    packet.extend_from_slice(&(DMX_LEN as u16).to_be_bytes());
    let n = data.len().min(DMX_LEN);
    packet.extend_from_slice(&data[..n]);
    packet.resize(18 + DMX_LEN, 0);
    packet
}

/// Sends frames as ArtDmx packets over UDP.
#[derive(Debug)]
pub struct ArtNetSender {
    socket: UdpSocket,
    target: SocketAddr,
    universe: u16,
    sequence: u8,
}

impl ArtNetSender {
    /// Bind an ephemeral local socket and resolve `address:port` as the destination.
    pub fn connect(address: &str, port: u16, universe: u16) -> MotionResult<Self> {
        let target = (address, port)
            .to_socket_addrs()
            .map_err(|e| MotionError::io(format!("resolve art-net target '{address}': {e}")))?
            .next()
            .ok_or_else(|| MotionError::io(format!("art-net target '{address}' has no address")))?;
        let bind: SocketAddr = if target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(bind)
            .map_err(|e| MotionError::io(format!("bind art-net socket: {e}")))?;
        socket
            .set_broadcast(true)
            .map_err(|e| MotionError::io(format!("enable broadcast: {e}")))?;
        tracing::debug!(addr = %target, universe, "art-net sender ready");
        Ok(Self {
            socket,
            target,
            universe: universe & 0x7FFF,
            sequence: 0,
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn universe(&self) -> u16 {
        self.universe
    }
}

impl FrameSender for ArtNetSender {
    fn send(&mut self, frame: &[u8]) {
        // Sequence 0 disables reordering on receivers, so it wraps from 255 to 1.
        self.sequence = self.sequence.checked_add(1).unwrap_or(1);
        let packet = build_artdmx_packet(self.sequence, self.universe, frame);
        if let Err(err) = self.socket.send_to(&packet, self.target) {
            tracing::warn!(addr = %self.target, error = %err, "art-net send failed");
        }
    }

    fn set_universe(&mut self, universe: u16) {
        self.universe = universe & 0x7FFF;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/output/artnet.rs"]
mod tests;
