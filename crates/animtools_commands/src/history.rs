// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history of curve snapshots.
//!
//! Every command records the state of each curve it touched before and
//! after it ran. Undo restores the before snapshots, redo the after ones.

use animtools_curve::{CurveId, KeyframeCurve};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Maximum undo history depth
const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Unique operation ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(u64);

impl OperationId {
    /// Get the raw ID value
    pub fn value(&self) -> u64 {
        self.0
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Serialized curve state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveSnapshot {
    /// Serialized curve
    pub data: Vec<u8>,
    /// Timestamp when snapshot was taken
    pub timestamp: u64,
}

impl CurveSnapshot {
    /// Snapshot a curve
    pub fn capture(curve: &KeyframeCurve) -> Result<Self> {
        Ok(Self {
            data: bincode::serialize(curve)?,
            timestamp: now(),
        })
    }

    /// Rebuild the curve
    pub fn restore(&self) -> Result<KeyframeCurve> {
        Ok(bincode::deserialize(&self.data)?)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Change of one curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveChange {
    /// Changed curve
    pub curve: CurveId,
    /// State before the command (for undo)
    pub before: CurveSnapshot,
    /// State after the command (for redo)
    pub after: CurveSnapshot,
}

impl CurveChange {
    /// Get memory size of this change
    pub fn memory_size(&self) -> usize {
        self.before.size() + self.after.size()
    }
}

/// Changes that are undone/redone together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationGroup {
    /// Group ID
    pub id: OperationId,
    /// Human-readable description
    pub description: String,
    /// Curve changes in this group
    pub changes: Vec<CurveChange>,
    /// Timestamp
    pub timestamp: u64,
}

impl OperationGroup {
    /// Create a new operation group
    pub fn new(id: OperationId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            changes: Vec::new(),
            timestamp: now(),
        }
    }

    /// Record a curve change, ignoring curves that did not change
    pub fn add_change(&mut self, change: CurveChange) {
        if change.before.data != change.after.data {
            self.changes.push(change);
        }
    }

    /// Get total memory size of this group
    pub fn memory_size(&self) -> usize {
        self.changes.iter().map(CurveChange::memory_size).sum()
    }

    /// Get change count
    pub fn count(&self) -> usize {
        self.changes.len()
    }
}

/// History statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Groups in undo stack
    pub undo_count: usize,
    /// Groups in redo stack
    pub redo_count: usize,
    /// Memory used by the undo stack (bytes)
    pub memory_used: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History {
    /// Undo stack
    undo_stack: VecDeque<OperationGroup>,
    /// Redo stack
    redo_stack: VecDeque<OperationGroup>,
    /// Next operation ID
    next_id: u64,
    /// Maximum history depth
    max_depth: usize,
    /// Total memory used
    memory_used: usize,
}

impl History {
    /// Create a new history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            next_id: 1,
            max_depth,
            memory_used: 0,
        }
    }

    /// Begin a new operation group
    pub fn begin_operation(&mut self, description: &str) -> OperationGroup {
        let id = OperationId(self.next_id);
        self.next_id += 1;
        OperationGroup::new(id, description)
    }

    /// Commit an operation group.
    ///
    /// Empty groups are dropped. Returns whether the group was recorded.
    pub fn commit(&mut self, group: OperationGroup) -> bool {
        if group.changes.is_empty() {
            return false;
        }

        self.redo_stack.clear();

        self.memory_used += group.memory_size();
        self.undo_stack.push_back(group);

        while self.undo_stack.len() > self.max_depth {
            if let Some(old_group) = self.undo_stack.pop_front() {
                self.memory_used = self.memory_used.saturating_sub(old_group.memory_size());
            }
        }

        true
    }

    /// Undo the last operation
    pub fn undo(&mut self) -> Result<OperationGroup> {
        let group = self
            .undo_stack
            .pop_back()
            .ok_or(HistoryError::NothingToUndo)?;

        self.memory_used = self.memory_used.saturating_sub(group.memory_size());
        self.redo_stack.push_back(group.clone());

        Ok(group)
    }

    /// Redo the last undone operation
    pub fn redo(&mut self) -> Result<OperationGroup> {
        let group = self
            .redo_stack
            .pop_back()
            .ok_or(HistoryError::NothingToRedo)?;

        self.memory_used += group.memory_size();
        self.undo_stack.push_back(group.clone());

        Ok(group)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.memory_used = 0;
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            memory_used: self.memory_used,
            max_depth: self.max_depth,
        }
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|g| g.description.as_str())
    }

    /// Get description of next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|g| g.description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
