// src/boundary.rs
//
// Row tracking across render calls and song-mode boundary detection.

use crate::state::{PendingJump, PlaybackSnapshot};

/// Result of running one playback regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// The regime owned this render call; later regimes are skipped.
    Handled,
    /// The regime is inactive; try the next one.
    Continue,
}

/// What happened to the position across one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same row.
    None,
    /// Moved to another row within the same order.
    Row,
    /// Row went back to 0 from a later row, same order.
    RowWrap,
    /// Order changed.
    OrderChange,
}

impl Transition {
    /// Order changes and row wraps are pattern boundaries.
    pub fn is_boundary(self) -> bool {
        matches!(self, Transition::RowWrap | Transition::OrderChange)
    }
}

/// A song-mode jump waiting for the next boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedJump {
    pub jump: PendingJump,
    /// Row to land on in the target order.
    pub row: usize,
}

/// Row sentinel plus the song-mode queued jump. Render thread only.
#[derive(Debug, Clone, Default)]
pub struct BoundaryDetector {
    /// Row seen at the end of the previous call. `None` right after a
    /// reposition, so the next call cannot mistake the jump for a wrap.
    prev_row: Option<usize>,

    queued_jump: Option<QueuedJump>,
}

impl BoundaryDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prev_row(&self) -> Option<usize> {
        self.prev_row
    }

    pub fn track_row(&mut self, row: usize) {
        self.prev_row = Some(row);
    }

    /// Forget the row sentinel after a reposition.
    pub fn reset_row(&mut self) {
        self.prev_row = None;
    }

    /// Classify the move from `before` to `after`.
    pub fn classify(&self, before: PlaybackSnapshot, after: PlaybackSnapshot) -> Transition {
        if before.order != after.order {
            return Transition::OrderChange;
        }
        match self.prev_row {
            Some(prev) if prev != 0 && after.row == 0 => Transition::RowWrap,
            _ if before.row != after.row => Transition::Row,
            _ => Transition::None,
        }
    }

    // -------------------------------
    // MARK: Song-mode queued jump
    // -------------------------------

    pub fn queued_jump(&self) -> Option<QueuedJump> {
        self.queued_jump
    }

    pub fn queue_jump(&mut self, jump: PendingJump, row: usize) {
        self.queued_jump = match jump {
            PendingJump::None => None,
            _ => Some(QueuedJump { jump, row }),
        };
    }

    pub fn take_queued_jump(&mut self) -> Option<QueuedJump> {
        self.queued_jump.take()
    }

    pub fn clear_queued_jump(&mut self) {
        self.queued_jump = None;
    }
}
