//! Linear snapshot history with a cursor.
//!
//! Every completed edit pushes a full-frame [`Snapshot`]. The cursor points
//! at the snapshot currently on screen; undo and redo only move the cursor.
//! Pushing while the cursor is not at the end prunes the redo branch.

use crate::canvas::Snapshot;

const INITIAL_CAPACITY: usize = 16;

/// Linear history of canvas snapshots, unbounded unless a depth is given.
#[derive(Debug)]
pub struct History {
    snapshots: Vec<Snapshot>,
    /// `None` only before the first capture.
    cursor: Option<usize>,
    /// Maximum number of retained snapshots (at least 1), if bounded.
    max_depth: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(None)
    }
}

impl History {
    pub fn new(max_depth: Option<usize>) -> Self {
        let max_depth = max_depth.map(|depth| depth.max(1));
        Self {
            snapshots: Vec::with_capacity(max_depth.unwrap_or(INITIAL_CAPACITY).min(INITIAL_CAPACITY)),
            cursor: None,
            max_depth,
        }
    }

    /// Discard everything after the cursor, append `snapshot`, and move the
    /// cursor onto it. Drops the oldest entry when a depth bound is hit.
    pub fn push(&mut self, snapshot: Snapshot) {
        if let Some(cursor) = self.cursor {
            let pruned = self.snapshots.len() - (cursor + 1);
            if pruned > 0 {
                log::debug!("history: pruning {pruned} redo snapshot(s)");
            }
            self.snapshots.truncate(cursor + 1);
        }
        self.snapshots.push(snapshot);
        if let Some(max_depth) = self.max_depth
            && self.snapshots.len() > max_depth
        {
            self.snapshots.remove(0);
        }
        self.cursor = Some(self.snapshots.len() - 1);
    }

    /// Step back one snapshot. Returns the snapshot to repaint, or `None` at
    /// the start of history.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        let cursor = self.cursor?;
        if cursor == 0 {
            return None;
        }
        self.cursor = Some(cursor - 1);
        self.snapshots.get(cursor - 1)
    }

    /// Step forward one snapshot. Returns the snapshot to repaint, or `None`
    /// at the end of history.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let cursor = self.cursor?;
        if cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor = Some(cursor + 1);
        self.snapshots.get(cursor + 1)
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.cursor?)
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.snapshots.len())
    }
}
