//! Channel protocol command/response codec.
//!
//! One short-lived TCP connection per exchange: the client sends exactly one
//! ASCII decimal token, and for queries the tracker sends exactly one decimal
//! token back. Message boundary is the connection close: no framing, no
//! version field, no error codes.
//!
//! Token `0` is the calibrate command; any other positive integer `N`
//! queries axis `N`. A query response is the axis position as a signed
//! decimal integer.

use crate::axis::AxisId;
use thiserror::Error;

/// Error types for protocol token handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Token was empty after trimming.
    #[error("empty command token")]
    Empty,

    /// Token is not a decimal integer in the accepted range.
    #[error("invalid command token: {0:?}")]
    BadToken(String),

    /// Response token is not a valid position.
    #[error("invalid position token: {0:?}")]
    BadPosition(String),
}

/// A single request on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reset every axis position to zero and persist.
    Calibrate,
    /// Report the current position of one axis.
    Query(AxisId),
}

impl Command {
    /// Parse a raw request token.
    ///
    /// Surrounding ASCII whitespace is ignored, matching what the peer
    /// produces.
    ///
    /// # Errors
    /// Returns `ProtocolError::Empty` for a blank token and
    /// `ProtocolError::BadToken` for anything that is not a decimal `u8`.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(ProtocolError::Empty);
        }

        let value: u8 = token
            .parse()
            .map_err(|_| ProtocolError::BadToken(token.to_string()))?;

        match AxisId::new(value) {
            Some(id) => Ok(Self::Query(id)),
            None => Ok(Self::Calibrate),
        }
    }

    /// Wire token for this command.
    pub fn token(&self) -> String {
        match self {
            Self::Calibrate => "0".to_string(),
            Self::Query(id) => id.get().to_string(),
        }
    }
}

/// Encode a position for the query response.
pub fn encode_position(position: i64) -> String {
    position.to_string()
}

/// Parse a query response token back into a position.
///
/// # Errors
/// Returns `ProtocolError::Empty` for a blank response and
/// `ProtocolError::BadPosition` for a non-decimal token.
pub fn parse_position(raw: &str) -> Result<i64, ProtocolError> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(ProtocolError::Empty);
    }

    token
        .parse()
        .map_err(|_| ProtocolError::BadPosition(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_calibrate() {
        assert_eq!(Command::parse("0").unwrap(), Command::Calibrate);
        assert_eq!(Command::parse(" 0\n").unwrap(), Command::Calibrate);
    }

    #[test]
    fn parse_query() {
        let cmd = Command::parse("3").unwrap();
        assert_eq!(cmd, Command::Query(AxisId::new(3).unwrap()));

        // Any positive id is valid on the wire; existence is checked at dispatch.
        let cmd = Command::parse("9").unwrap();
        assert_eq!(cmd, Command::Query(AxisId::new(9).unwrap()));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Command::parse("   "), Err(ProtocolError::Empty));
        assert!(matches!(
            Command::parse("abc"),
            Err(ProtocolError::BadToken(_))
        ));
        assert!(matches!(
            Command::parse("-1"),
            Err(ProtocolError::BadToken(_))
        ));
        assert!(matches!(
            Command::parse("300"),
            Err(ProtocolError::BadToken(_))
        ));
    }

    #[test]
    fn command_tokens_roundtrip() {
        for raw in ["0", "1", "4"] {
            let cmd = Command::parse(raw).unwrap();
            assert_eq!(cmd.token(), raw);
        }
    }

    #[test]
    fn position_tokens() {
        assert_eq!(encode_position(-42), "-42");
        assert_eq!(parse_position("-42").unwrap(), -42);
        assert_eq!(parse_position(" 17 ").unwrap(), 17);
        assert_eq!(parse_position(""), Err(ProtocolError::Empty));
        assert!(matches!(
            parse_position("12.5"),
            Err(ProtocolError::BadPosition(_))
        ));
    }
}
