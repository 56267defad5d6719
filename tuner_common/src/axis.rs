//! Axis identity and static pin configuration.
//!
//! An axis is one independently actuated degree of freedom: a stepper motor
//! plus a rotary encoder. `AxisId` is the stable addressing key used by the
//! channel protocol and the snapshot file; `AxisPins` carries the encoder's
//! input line assignments.

use crate::consts::MAX_AXES;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU8;

/// Identifies one encoder/motor pair. Stable across restarts.
///
/// Ids are small positive integers; `0` is reserved on the wire for the
/// calibrate command and is never a valid axis id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxisId(NonZeroU8);

impl AxisId {
    /// Convert from a raw `u8`. Returns `None` for `0`.
    #[inline]
    pub const fn new(raw: u8) -> Option<Self> {
        match NonZeroU8::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Raw numeric id.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encoder input line assignments for one axis (BCM numbering).
///
/// The index line is wired on the reference hardware but never consulted by
/// the decoder; it is reserved for a future absolute-reference feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisPins {
    /// Quadrature channel A input.
    pub channel_a: u8,
    /// Quadrature channel B input.
    pub channel_b: u8,
    /// Index channel input (reserved).
    pub index: u8,
}

/// Static configuration for one axis: identity plus encoder wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisConfig {
    pub id: AxisId,
    pub pins: AxisPins,
}

/// Compiled-in default axis table for the reference hardware.
///
/// Used when no snapshot file is present at tracker startup. Pin numbers
/// match the bench wiring of the four tuning capacitors.
pub fn default_axis_table() -> Vec<AxisConfig> {
    const PINS: [(u8, u8, u8); MAX_AXES] = [
        (6, 13, 17),
        (25, 8, 7),
        (1, 12, 16),
        (20, 21, 26),
    ];

    PINS.iter()
        .enumerate()
        .map(|(idx, &(channel_a, channel_b, index))| AxisConfig {
            // idx + 1 is always a valid non-zero id
            id: AxisId::new(idx as u8 + 1).unwrap(),
            pins: AxisPins {
                channel_a,
                channel_b,
                index,
            },
        })
        .collect()
}
