//! UDP implementation of the [`Transport`] trait.

use std::net::SocketAddr;

use tokio::net::UdpSocket;

use sidekick_types::{DATAGRAM_CAPACITY, Datagram, Transport, TransportError};

/// A datagram transport over a UDP socket bound to an ephemeral local port.
///
/// Each receive copies the payload into a fresh buffer, so the message
/// handed downstream is immutable and never aliases the next receive.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind a fresh socket on an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns the underlying socket error if binding fails.
    pub async fn bind() -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        Ok(Self { socket })
    }

    /// The local address the socket is bound to.
    ///
    /// # Errors
    ///
    /// Returns the underlying socket error if the address is unavailable.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

impl Transport for UdpTransport {
    async fn recv(&mut self) -> Result<Datagram, TransportError> {
        let mut buffer = [0u8; DATAGRAM_CAPACITY];
        let (len, from) = self.socket.recv_from(&mut buffer).await?;
        Ok(Datagram {
            payload: buffer[..len].to_vec(),
            from,
        })
    }

    async fn send_to(&mut self, payload: &[u8], peer: SocketAddr) -> Result<(), TransportError> {
        self.socket.send_to(payload, peer).await?;
        Ok(())
    }
}
