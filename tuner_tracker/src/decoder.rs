//! Quadrature transition rule and listener attachment.
//!
//! Two-phase decode at half resolution: only channel A edges are observed.
//! On every A transition the current level of channel B decides direction:
//! equal levels count up, unequal levels count down. The 200 ppr encoders
//! this targets give 200 counts per revolution under this rule.
//!
//! The rule itself is a pure function; [`attach`] wires it to the backend
//! by subscribing one listener per axis. Each listener samples channel B
//! through the backend *at the instant the edge is delivered*, never a
//! cached level.

use crate::store::AxisStore;
use std::sync::Arc;
use tracing::warn;
use tuner_common::hal::{GpioBackend, HalError, Level};

/// Signed position delta for one channel-A transition.
///
/// `channel_a` is the level A just transitioned to; `channel_b` is B's
/// level sampled at that instant. Cannot fail: any pair of levels maps to
/// exactly +1 or -1. Noise on the lines shows up as counts, not errors.
#[inline]
pub fn quadrature_delta(channel_a: Level, channel_b: Level) -> i64 {
    if channel_a == channel_b {
        1
    } else {
        -1
    }
}

/// Subscribe an edge listener for every axis in the store.
///
/// Each listener owns a handle to the store and the backend: on an A edge
/// it reads the axis's B pin and applies the delta to that axis's counter.
/// The index pin is deliberately not subscribed.
///
/// # Errors
/// Returns the backend's error if any subscription cannot be armed; axes
/// subscribed before the failure stay armed.
pub fn attach(store: &Arc<AxisStore>, backend: &Arc<dyn GpioBackend>) -> Result<(), HalError> {
    for axis in store.axes() {
        let id = axis.id();
        let b_pin = axis.pins().channel_b;
        let store = Arc::clone(store);
        let backend_handle = Arc::clone(backend);

        backend.subscribe(
            axis.pins().channel_a,
            Box::new(move |a_level| {
                let b_level = match backend_handle.read(b_pin) {
                    Ok(level) => level,
                    Err(e) => {
                        warn!("axis {id}: cannot sample channel B on pin {b_pin}: {e}");
                        return;
                    }
                };
                if let Some(axis) = store.get(id) {
                    axis.apply(quadrature_delta(a_level, b_level));
                }
            }),
        )?;
    }
    Ok(())
}
