//! Sequential TCP accept loop and command dispatch.
//!
//! One connection per exchange, one connection at a time: the Motion
//! Controller is the sole intended client and blocks on each response
//! before issuing the next request. A per-connection read timeout keeps a
//! silent client from holding the loop forever.
//!
//! Dispatch ordering is the durability contract: for a query the snapshot
//! is written *before* the response token, so a client that has a position
//! in hand knows the disk is at least that fresh. The snapshot may lag the
//! live counters by the edges since the last write, but never runs ahead
//! of what was reported.

use crate::error::TrackerError;
use crate::persist::{Snapshot, SnapshotStore};
use crate::store::AxisStore;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tuner_common::protocol::{encode_position, Command, ProtocolError};

/// Poll interval for the shutdown flag while no client is connected.
const ACCEPT_POLL: Duration = Duration::from_millis(10);

/// The Position Tracker's query channel server.
pub struct TrackerServer {
    store: Arc<AxisStore>,
    snapshots: SnapshotStore,
    listener: TcpListener,
    read_timeout: Duration,
    running: Arc<AtomicBool>,
}

impl TrackerServer {
    /// Bind the query channel.
    ///
    /// # Errors
    /// Returns `TrackerError::Io` if the address cannot be bound.
    pub fn bind<A: ToSocketAddrs>(
        addr: A,
        store: Arc<AxisStore>,
        snapshots: SnapshotStore,
        read_timeout: Duration,
    ) -> Result<Self, TrackerError> {
        let listener = TcpListener::bind(addr)?;
        // Non-blocking accept so the loop can observe the shutdown flag.
        listener.set_nonblocking(true)?;

        Ok(Self {
            store,
            snapshots,
            listener,
            read_timeout,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the server is listening on (port is resolved when binding
    /// to port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, TrackerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Get the running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Serve connections until the running flag is cleared.
    ///
    /// One client at a time; a failed connection is logged and the loop
    /// keeps accepting.
    pub fn run(&self) -> Result<(), TrackerError> {
        self.running.store(true, Ordering::SeqCst);
        info!(
            "serving {} axes on {}",
            self.store.len(),
            self.local_addr()?
        );

        while self.running.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    debug!("connection from {peer}");
                    if let Err(e) = self.handle_connection(stream) {
                        warn!("connection from {peer} failed: {e}");
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    warn!("accept failed: {e}");
                }
            }
        }

        info!("accept loop stopped");
        Ok(())
    }

    /// Request shutdown of the accept loop.
    pub fn shutdown(&self) {
        info!("shutdown requested");
        self.running.store(false, Ordering::SeqCst);
    }

    /// Serve one connection: read a single command token, dispatch, close.
    fn handle_connection(&self, mut stream: TcpStream) -> Result<(), TrackerError> {
        // The listener is non-blocking; the accepted socket must not be.
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(self.read_timeout))?;

        let mut buf = [0u8; 64];
        let n = stream.read(&mut buf)?;
        let raw = std::str::from_utf8(&buf[..n]).map_err(|_| {
            TrackerError::from(ProtocolError::BadToken(format!("{n} non-UTF-8 bytes")))
        })?;

        match Command::parse(raw)? {
            Command::Calibrate => {
                self.store.calibrate();
                self.persist(&self.store.snapshot());
                info!("calibrated {} axes to zero", self.store.len());
                // No reply body for calibrate; closing the connection is
                // the acknowledgement.
            }
            Command::Query(id) => match self.store.get(id) {
                Some(axis) => {
                    // One point-in-time snapshot is both the persisted
                    // state and the response, so the disk can never run
                    // ahead of what the client saw.
                    let snapshot = self.store.snapshot();
                    let position = snapshot
                        .axes
                        .iter()
                        .find(|entry| entry.axis_id == id.get())
                        .map_or_else(|| axis.position(), |entry| entry.position);
                    self.persist(&snapshot);
                    stream.write_all(encode_position(position).as_bytes())?;
                    debug!("axis {id} at {position}");
                }
                None => {
                    // Documented sentinel: closing without a token means
                    // "no such axis". The snapshot is left untouched.
                    warn!("query for unknown axis {id}; closing without reply");
                }
            },
        }

        Ok(())
    }

    /// Write the snapshot; a failure is reported but never halts request
    /// handling; the in-memory counters stay authoritative until the next
    /// successful save.
    fn persist(&self, snapshot: &Snapshot) {
        if let Err(e) = self.snapshots.save(snapshot) {
            error!("snapshot save failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpStream;
    use tempfile::tempdir;
    use tuner_common::axis::default_axis_table;

    fn spawn_server(snapshot_path: std::path::PathBuf) -> (Arc<AxisStore>, SocketAddr, Arc<AtomicBool>) {
        let store = Arc::new(AxisStore::from_defaults(&default_axis_table()));
        let server = TrackerServer::bind(
            "127.0.0.1:0",
            Arc::clone(&store),
            SnapshotStore::new(snapshot_path),
            Duration::from_millis(200),
        )
        .unwrap();

        let addr = server.local_addr().unwrap();
        let running = server.running_flag();
        std::thread::spawn(move || server.run().unwrap());
        (store, addr, running)
    }

    fn exchange(addr: SocketAddr, token: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(token.as_bytes()).unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn query_returns_position_token() {
        let dir = tempdir().unwrap();
        let (store, addr, running) = spawn_server(dir.path().join("encoders.bin"));

        store
            .get(tuner_common::axis::AxisId::new(1).unwrap())
            .unwrap()
            .apply(42);

        assert_eq!(exchange(addr, "1"), "42");
        running.store(false, Ordering::SeqCst);
    }

    #[test]
    fn unknown_axis_closes_without_reply() {
        let dir = tempdir().unwrap();
        let (_store, addr, running) = spawn_server(dir.path().join("encoders.bin"));

        assert_eq!(exchange(addr, "9"), "");
        // The service must survive the unknown axis and keep answering.
        assert_eq!(exchange(addr, "2"), "0");
        running.store(false, Ordering::SeqCst);
    }

    #[test]
    fn garbage_token_drops_connection_and_service_survives() {
        let dir = tempdir().unwrap();
        let (_store, addr, running) = spawn_server(dir.path().join("encoders.bin"));

        assert_eq!(exchange(addr, "position please"), "");
        assert_eq!(exchange(addr, "3"), "0");
        running.store(false, Ordering::SeqCst);
    }

    #[test]
    fn idle_client_is_dropped_on_timeout() {
        let dir = tempdir().unwrap();
        let (_store, addr, running) = spawn_server(dir.path().join("encoders.bin"));

        // Connect, send nothing. The server must give up on us and then
        // still serve the next client.
        let silent = TcpStream::connect(addr).unwrap();
        std::thread::sleep(Duration::from_millis(400));
        assert_eq!(exchange(addr, "1"), "0");
        drop(silent);
        running.store(false, Ordering::SeqCst);
    }

    #[test]
    fn snapshot_save_failure_does_not_break_queries() {
        // Unwritable snapshot location: queries must still be answered.
        let (_store, addr, running) = spawn_server(
            std::path::PathBuf::from("/proc/tuner-does-not-exist/encoders.bin"),
        );

        assert_eq!(exchange(addr, "1"), "0");
        running.store(false, Ordering::SeqCst);
    }
}
