//! Per-axis atomic counters.
//!
//! The store owns one signed 64-bit counter per configured axis. Edge
//! listeners mutate a counter through [`TrackedAxis::apply`] from whatever
//! context the backend delivers transitions in, concurrently with the query
//! path reading it and the calibrate path resetting it. Per-axis atomics
//! mean unrelated axes never serialize against each other and a reset can
//! never tear against an in-flight edge.

use crate::persist::{Snapshot, SnapshotAxis};
use std::sync::atomic::{AtomicI64, Ordering};
use tuner_common::axis::{AxisConfig, AxisId, AxisPins};

/// One axis under tracking: identity, encoder wiring and the live counter.
pub struct TrackedAxis {
    id: AxisId,
    pins: AxisPins,
    position: AtomicI64,
}

impl TrackedAxis {
    fn new(id: AxisId, pins: AxisPins, position: i64) -> Self {
        Self {
            id,
            pins,
            position: AtomicI64::new(position),
        }
    }

    pub fn id(&self) -> AxisId {
        self.id
    }

    pub fn pins(&self) -> AxisPins {
        self.pins
    }

    /// Current position in pulse units.
    pub fn position(&self) -> i64 {
        self.position.load(Ordering::SeqCst)
    }

    /// Apply a signed delta from the decoder.
    pub fn apply(&self, delta: i64) {
        self.position.fetch_add(delta, Ordering::SeqCst);
    }

    /// Reset the counter to zero.
    pub fn reset(&self) {
        self.position.store(0, Ordering::SeqCst);
    }
}

/// The full set of tracked axes.
pub struct AxisStore {
    axes: Vec<TrackedAxis>,
}

impl AxisStore {
    /// Build a store from static axis configuration, all positions zero.
    pub fn from_defaults(configs: &[AxisConfig]) -> Self {
        Self {
            axes: configs
                .iter()
                .map(|config| TrackedAxis::new(config.id, config.pins, 0))
                .collect(),
        }
    }

    /// Restore a store from a persisted snapshot.
    ///
    /// Axes whose saved id is invalid (zero) are skipped; the snapshot
    /// format has no way to produce them short of hand-editing the file.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            axes: snapshot
                .axes
                .iter()
                .filter_map(|axis| {
                    AxisId::new(axis.axis_id)
                        .map(|id| TrackedAxis::new(id, axis.pins, axis.position))
                })
                .collect(),
        }
    }

    /// Look up one axis by id.
    pub fn get(&self, id: AxisId) -> Option<&TrackedAxis> {
        self.axes.iter().find(|axis| axis.id == id)
    }

    /// All axes, in configuration order.
    pub fn axes(&self) -> &[TrackedAxis] {
        &self.axes
    }

    /// Number of tracked axes.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Reset every axis position to zero.
    pub fn calibrate(&self) {
        for axis in &self.axes {
            axis.reset();
        }
    }

    /// Point-in-time snapshot of all axes for persistence.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: Snapshot::CURRENT_VERSION,
            axes: self
                .axes
                .iter()
                .map(|axis| SnapshotAxis {
                    axis_id: axis.id.get(),
                    position: axis.position(),
                    pins: axis.pins,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tuner_common::axis::default_axis_table;

    #[test]
    fn defaults_start_at_zero() {
        let store = AxisStore::from_defaults(&default_axis_table());
        assert_eq!(store.len(), 4);
        for axis in store.axes() {
            assert_eq!(axis.position(), 0);
        }
    }

    #[test]
    fn apply_and_reset() {
        let store = AxisStore::from_defaults(&default_axis_table());
        let axis = store.get(AxisId::new(2).unwrap()).unwrap();

        axis.apply(1);
        axis.apply(1);
        axis.apply(-1);
        assert_eq!(axis.position(), 1);

        store.calibrate();
        assert_eq!(axis.position(), 0);
    }

    #[test]
    fn unknown_axis_lookup_is_none() {
        let store = AxisStore::from_defaults(&default_axis_table());
        assert!(store.get(AxisId::new(9).unwrap()).is_none());
    }

    #[test]
    fn snapshot_reflects_positions_and_pins() {
        let table = default_axis_table();
        let store = AxisStore::from_defaults(&table);
        store.get(AxisId::new(1).unwrap()).unwrap().apply(7);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.axes.len(), 4);
        assert_eq!(snapshot.axes[0].axis_id, 1);
        assert_eq!(snapshot.axes[0].position, 7);
        assert_eq!(snapshot.axes[0].pins, table[0].pins);

        let restored = AxisStore::from_snapshot(&snapshot);
        assert_eq!(
            restored.get(AxisId::new(1).unwrap()).unwrap().position(),
            7
        );
    }

    #[test]
    fn concurrent_edges_are_never_lost() {
        const THREADS: usize = 8;
        const EDGES_PER_THREAD: i64 = 10_000;

        let store = Arc::new(AxisStore::from_defaults(&default_axis_table()));
        let id = AxisId::new(3).unwrap();

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let axis = store.get(id).unwrap();
                    for _ in 0..EDGES_PER_THREAD {
                        axis.apply(1);
                    }
                })
            })
            .collect();

        // Concurrent reads must always observe a value some interleaving
        // could have produced.
        let axis = store.get(id).unwrap();
        let max = THREADS as i64 * EDGES_PER_THREAD;
        for _ in 0..1000 {
            let seen = axis.position();
            assert!((0..=max).contains(&seen));
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(axis.position(), max);
    }

    #[test]
    fn edges_on_one_axis_do_not_touch_another() {
        let store = AxisStore::from_defaults(&default_axis_table());
        store.get(AxisId::new(1).unwrap()).unwrap().apply(5);
        assert_eq!(store.get(AxisId::new(2).unwrap()).unwrap().position(), 0);
    }
}
