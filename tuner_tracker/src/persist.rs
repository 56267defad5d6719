//! Snapshot DTO and durable storage.
//!
//! Positions survive process restarts through a small bincode file: the
//! encoders have no absolute reference, so a cold counter of zero would
//! silently misstate real position. The on-disk record is a plain DTO,
//! deliberately distinct from the runtime axis type, so the persistence format
//! and the runtime representation evolve independently.
//!
//! Saves go through a sibling temporary file and an atomic rename, so a
//! restart racing a save can never read back a partial snapshot.

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tuner_common::axis::AxisPins;

/// Persisted record for a single axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotAxis {
    /// Raw axis id (matches `AxisId` on load).
    pub axis_id: u8,
    /// Last persisted position in pulse units.
    pub position: i64,
    /// Encoder wiring, so a re-pinned bench keeps its layout across restarts.
    pub pins: AxisPins,
}

/// Persisted record for the full axis set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Snapshot {
    /// Snapshot format version (for migration).
    pub version: u32,
    /// Axis records, in configuration order.
    pub axes: Vec<SnapshotAxis>,
}

impl Snapshot {
    /// Current snapshot format version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Create an empty snapshot at the current version.
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            axes: Vec::new(),
        }
    }
}

/// Durable storage for the snapshot file.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store writing to the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a snapshot, fully replacing any prior content.
    ///
    /// The bytes land in a sibling `.tmp` file first and are renamed over
    /// the target, so a concurrent reader sees either the old snapshot or
    /// the new one, never a torn write.
    ///
    /// # Errors
    /// Returns `TrackerError::Persistence` on any filesystem or
    /// serialization failure. The caller's in-memory counters remain
    /// authoritative; a later save may still succeed.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), TrackerError> {
        debug!("saving snapshot to {:?}", self.path);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    TrackerError::Persistence(format!("failed to create {parent:?}: {e}"))
                })?;
            }
        }

        let bytes = bincode::serialize(snapshot)
            .map_err(|e| TrackerError::Persistence(format!("failed to serialize snapshot: {e}")))?;

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, bytes).map_err(|e| {
            TrackerError::Persistence(format!("failed to write {tmp_path:?}: {e}"))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            // Leave no stale temp file behind on a failed rename.
            let _ = fs::remove_file(&tmp_path);
            TrackerError::Persistence(format!("failed to replace {:?}: {e}", self.path))
        })?;

        debug!("saved {} axes to {:?}", snapshot.axes.len(), self.path);
        Ok(())
    }

    /// Load the snapshot, if a usable one exists.
    ///
    /// Returns `None` when the file is missing, unreadable, corrupt or of
    /// a different format version; all four mean "no snapshot" and the
    /// caller falls back to the compiled-in default axis table.
    pub fn load(&self) -> Option<Snapshot> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no snapshot at {:?}, starting fresh", self.path);
                return None;
            }
            Err(e) => {
                warn!("cannot read snapshot {:?}: {e}; starting fresh", self.path);
                return None;
            }
        };

        let snapshot: Snapshot = match bincode::deserialize(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    "corrupt snapshot {:?}: {e}; starting fresh",
                    self.path
                );
                return None;
            }
        };

        if snapshot.version != Snapshot::CURRENT_VERSION {
            warn!(
                "snapshot version {} differs from current {}; starting fresh",
                snapshot.version,
                Snapshot::CURRENT_VERSION
            );
            return None;
        }

        info!(
            "restored {} axes from {:?}",
            snapshot.axes.len(),
            self.path
        );
        Some(snapshot)
    }

    /// Delete the snapshot file if present.
    pub fn delete(&self) -> Result<(), TrackerError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                TrackerError::Persistence(format!("failed to delete {:?}: {e}", self.path))
            })?;
            info!("deleted snapshot {:?}", self.path);
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut raw = self.path.as_os_str().to_os_string();
        raw.push(".tmp");
        PathBuf::from(raw)
    }
}
