//! Accept-one-client TCP stream emitter.
//!
//! The server accepts exactly one client and streams newline-terminated JSON
//! records to it until a write fails. There is no reconnect: a dropped client
//! ends the session and a new external client must re-initiate against a
//! fresh process.

use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Result};

use super::OutboundRecord;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Listening half of the stream profile.
pub struct StreamServer {
    listener: TcpListener,
}

impl StreamServer {
    /// Bind the listener. Fails fast when the port is taken.
    pub fn bind(addr: &str) -> Result<Self> {
        let configured: SocketAddr = addr
            .parse()
            .map_err(|e| anyhow!("invalid stream address '{}': {}", addr, e))?;
        let listener = TcpListener::bind(configured)?;
        listener.set_nonblocking(true)?;
        log::info!("stream server listening on {}", listener.local_addr()?);
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Block until one client connects or `shutdown` is raised.
    ///
    /// Returns `None` on shutdown. Only one client is served per process
    /// lifetime; callers do not loop back here after a session ends.
    pub fn accept_one(&self, shutdown: &AtomicBool) -> Result<Option<StreamSession>> {
        loop {
            if shutdown.load(Ordering::SeqCst) {
                return Ok(None);
            }
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    stream.set_nonblocking(false)?;
                    log::info!("client connected from {}", peer);
                    return Ok(Some(StreamSession { stream, peer }));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// One accepted client connection.
pub struct StreamSession {
    stream: TcpStream,
    peer: SocketAddr,
}

impl StreamSession {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Serialize and send one record as a single JSON line.
    ///
    /// A write error means the client is gone; the caller ends the session.
    pub fn send(&mut self, record: &OutboundRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        self.stream
            .write_all(line.as_bytes())
            .map_err(|e| anyhow!("client write failed: {}", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::sync::atomic::AtomicBool;

    #[test]
    fn bind_rejects_garbage_addresses() {
        assert!(StreamServer::bind("not-an-addr").is_err());
    }

    #[test]
    fn accept_returns_none_on_shutdown() {
        let server = StreamServer::bind("127.0.0.1:0").unwrap();
        let shutdown = AtomicBool::new(true);
        assert!(server.accept_one(&shutdown).unwrap().is_none());
    }

    #[test]
    fn sends_one_json_object_per_line() {
        let server = StreamServer::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = AtomicBool::new(false);

        let client = std::thread::spawn(move || {
            let stream = TcpStream::connect(addr).unwrap();
            let mut lines = BufReader::new(stream).lines();
            let first = lines.next().unwrap().unwrap();
            let second = lines.next().unwrap().unwrap();
            (first, second)
        });

        let mut session = server.accept_one(&shutdown).unwrap().unwrap();
        session.send(&OutboundRecord::default()).unwrap();
        let mut record = OutboundRecord::default();
        record.pinch = true;
        session.send(&record).unwrap();
        drop(session);

        let (first, second) = client.join().unwrap();
        let first: OutboundRecord = serde_json::from_str(&first).unwrap();
        let second: OutboundRecord = serde_json::from_str(&second).unwrap();
        assert!(!first.pinch);
        assert!(second.pinch);
    }
}
