//! Position Tracker client stub.
//!
//! One fresh TCP connection per exchange, mirroring the tracker's
//! one-connection-per-request design. A connection failure is always a
//! distinct, typed error; callers such as the sweep loop decide whether
//! to abort or retry, never silently continue on a stale position.

use std::io::{Read, Write};
use std::net::TcpStream;
use thiserror::Error;
use tracing::debug;
use tuner_common::axis::AxisId;
use tuner_common::protocol::{parse_position, Command, ProtocolError};

/// Errors surfaced by the client stub.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The tracker could not be reached.
    #[error("cannot connect to tracker at {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// The connection was established but an exchange failed mid-flight.
    #[error("channel I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// The tracker closed the connection without a response token.
    ///
    /// The tracker signals "no such axis" this way.
    #[error("tracker closed the connection without a response")]
    EmptyResponse,

    /// The response token did not parse as a position.
    #[error("bad response from tracker: {source}")]
    BadResponse {
        #[from]
        source: ProtocolError,
    },
}

/// Client for the tracker's query channel.
pub struct TrackerClient {
    addr: String,
}

impl TrackerClient {
    /// Create a client targeting the given tracker address.
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Ask the tracker for an axis's current position.
    ///
    /// # Errors
    /// - `ClientError::Connect` if the tracker is unreachable
    /// - `ClientError::EmptyResponse` if the tracker closed without a
    ///   token (unknown axis, or a dropped connection)
    /// - `ClientError::BadResponse` if the token is not a position
    pub fn request_position(&self, axis: AxisId) -> Result<i64, ClientError> {
        let response = self.exchange(&Command::Query(axis).token())?;
        if response.trim().is_empty() {
            return Err(ClientError::EmptyResponse);
        }

        let position = parse_position(&response)?;
        debug!("axis {axis} at {position}");
        Ok(position)
    }

    /// Reset every axis position to zero.
    ///
    /// The calibrate command carries no reply body; this waits for the
    /// tracker to close the connection, so the reset has been persisted
    /// by the time this returns.
    ///
    /// # Errors
    /// Returns `ClientError::Connect` or `ClientError::Io` on channel
    /// failure.
    pub fn calibrate(&self) -> Result<(), ClientError> {
        self.exchange(&Command::Calibrate.token())?;
        debug!("calibrate acknowledged by close");
        Ok(())
    }

    /// Send one token, read until the tracker closes the connection.
    fn exchange(&self, token: &str) -> Result<String, ClientError> {
        let mut stream = TcpStream::connect(&self.addr).map_err(|source| ClientError::Connect {
            addr: self.addr.clone(),
            source,
        })?;

        stream.write_all(token.as_bytes())?;
        let mut response = String::new();
        stream.read_to_string(&mut response)?;
        Ok(response)
    }
}
