//! UDP command/sign channel for the engine profile.
//!
//! Two sockets, matching the peer's expectations: one bound socket listens
//! for plain-text `START`/`STOP` commands, one unbound socket fires sign
//! datagrams at a fixed destination. No framing beyond the datagram itself,
//! no acknowledgement, no retry.
//!
//! The command poll waits on the socket with a read timeout instead of
//! sleeping, so the loop stays responsive without busy polling.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::Direction;

/// Inbound capture-gating commands. Anything else is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineCommand {
    Start,
    Stop,
}

impl EngineCommand {
    fn parse(payload: &[u8]) -> Option<Self> {
        match std::str::from_utf8(payload).ok()?.trim() {
            "START" => Some(EngineCommand::Start),
            "STOP" => Some(EngineCommand::Stop),
            _ => None,
        }
    }
}

/// Addresses for the engine's two UDP endpoints.
#[derive(Clone, Debug)]
pub struct DatagramConfig {
    /// Local address receiving commands from the client.
    pub listen_addr: String,
    /// Destination for outbound sign datagrams.
    pub peer_addr: String,
}

impl Default for DatagramConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5006".to_string(),
            peer_addr: "127.0.0.1:5005".to_string(),
        }
    }
}

/// Bound command listener plus outbound sign sender.
pub struct DatagramChannel {
    listen: UdpSocket,
    send: UdpSocket,
    peer: SocketAddr,
}

impl DatagramChannel {
    pub fn bind(config: &DatagramConfig) -> Result<Self> {
        let listen = UdpSocket::bind(&config.listen_addr)
            .map_err(|e| anyhow!("failed to bind command port {}: {}", config.listen_addr, e))?;
        let send = UdpSocket::bind("0.0.0.0:0")?;
        let peer: SocketAddr = config
            .peer_addr
            .parse()
            .map_err(|e| anyhow!("invalid peer address '{}': {}", config.peer_addr, e))?;
        log::info!(
            "engine channel: commands on {}, signs to {}",
            listen.local_addr()?,
            peer
        );
        Ok(Self { listen, send, peer })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listen.local_addr()?)
    }

    /// Wait up to `timeout` for one command datagram.
    ///
    /// Returns `Ok(None)` on timeout and on unrecognized payloads; a
    /// malformed command is not an error the sender ever learns about.
    pub fn poll_command(&self, timeout: Duration) -> Result<Option<EngineCommand>> {
        self.listen.set_read_timeout(Some(timeout))?;
        let mut buf = [0u8; 1024];
        match self.listen.recv_from(&mut buf) {
            Ok((len, from)) => {
                let command = EngineCommand::parse(&buf[..len]);
                if command.is_none() {
                    log::debug!("ignoring unrecognized datagram from {}", from);
                }
                Ok(command)
            }
            Err(err)
                if err.kind() == std::io::ErrorKind::WouldBlock
                    || err.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fire one sign datagram at the peer.
    pub fn send_sign(&self, sign: Direction) -> Result<()> {
        self.send.send_to(sign.as_str().as_bytes(), self.peer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_channel() -> (DatagramChannel, UdpSocket) {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let config = DatagramConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            peer_addr: peer.local_addr().unwrap().to_string(),
        };
        (DatagramChannel::bind(&config).unwrap(), peer)
    }

    #[test]
    fn parses_start_and_stop_commands() {
        let (channel, _peer) = loopback_channel();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = channel.local_addr().unwrap();

        sender.send_to(b"START", addr).unwrap();
        assert_eq!(
            channel.poll_command(Duration::from_millis(500)).unwrap(),
            Some(EngineCommand::Start)
        );

        sender.send_to(b"STOP\n", addr).unwrap();
        assert_eq!(
            channel.poll_command(Duration::from_millis(500)).unwrap(),
            Some(EngineCommand::Stop)
        );
    }

    #[test]
    fn unknown_payloads_are_silently_ignored() {
        let (channel, _peer) = loopback_channel();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender
            .send_to(b"REBOOT", channel.local_addr().unwrap())
            .unwrap();
        assert_eq!(channel.poll_command(Duration::from_millis(500)).unwrap(), None);
    }

    #[test]
    fn poll_times_out_to_none() {
        let (channel, _peer) = loopback_channel();
        assert_eq!(channel.poll_command(Duration::from_millis(10)).unwrap(), None);
    }

    #[test]
    fn signs_arrive_as_plain_text() {
        let (channel, peer) = loopback_channel();
        channel.send_sign(Direction::Up).unwrap();

        peer.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
        let mut buf = [0u8; 64];
        let (len, _) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"up");
    }
}
