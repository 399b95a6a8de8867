// src/callbacks.rs
//
// Listener trait and the dispatcher that fires it once per render call.
//
// Dispatch order within one call:
//   1. loop-pattern / pattern-mode notifications, in the order they happened
//   2. order change
//   3. notes of the new row
//   4. row change
//
// Everything is evaluated on the position the decoder settled on after all
// repositioning, so each transition is reported exactly once.

use crate::decoder::Decoder;
use crate::note_event::{NoteEvent, NoteEventExtractor};
use crate::state::{PatternModeReason, PlaybackSnapshot};

/// Receives playback notifications, synchronously, on the render thread.
///
/// Implementations must not block.
pub trait PlaybackListener: Send {
    fn on_order_change(&mut self, _order: usize, _pattern: usize) {}

    fn on_row_change(&mut self, _order: usize, _row: usize) {}

    /// Playback was repositioned to (or re-targeted at) a loop target.
    fn on_loop_pattern(&mut self, _order: usize, _pattern: usize) {}

    fn on_pattern_mode_change(&mut self, _active: bool, _reason: PatternModeReason) {}

    fn on_note(&mut self, _event: &NoteEvent) {}
}

/// Listener that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoListener;

impl PlaybackListener for NoListener {}

/// Notifications raised while commands and regimes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notification {
    LoopPattern { order: usize, pattern: usize },
    PatternMode { active: bool, reason: PatternModeReason },
}

/// Result of a dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    pub order_changed: bool,
    pub row_changed: bool,
}

/// De-duplicates and fires listener callbacks.
pub struct CallbackDispatcher {
    notifications: Vec<Notification>,
    last_order: Option<usize>,
    /// (order, row) of the last row dispatched.
    last_row: Option<(usize, usize)>,
    extractor: NoteEventExtractor,
}

impl CallbackDispatcher {
    pub fn new(num_channels: usize) -> Self {
        Self {
            notifications: Vec::with_capacity(16),
            last_order: None,
            last_row: None,
            extractor: NoteEventExtractor::new(num_channels),
        }
    }

    pub fn loop_pattern(&mut self, order: usize, pattern: usize) {
        self.notifications
            .push(Notification::LoopPattern { order, pattern });
    }

    pub fn pattern_mode_changed(&mut self, active: bool, reason: PatternModeReason) {
        self.notifications
            .push(Notification::PatternMode { active, reason });
    }

    /// Re-arm the row callbacks after a reposition, so the row playback
    /// lands on is reported (and its notes sent) even if it equals the last.
    pub fn invalidate_row(&mut self) {
        self.last_row = None;
    }

    /// Fire everything pending for the settled `position`.
    pub fn dispatch(
        &mut self,
        listener: &mut dyn PlaybackListener,
        decoder: &dyn Decoder,
        position: PlaybackSnapshot,
        muted: &[bool],
        volumes: &[f64],
    ) -> DispatchReport {
        for notification in self.notifications.drain(..) {
            match notification {
                Notification::LoopPattern { order, pattern } => {
                    listener.on_loop_pattern(order, pattern)
                }
                Notification::PatternMode { active, reason } => {
                    listener.on_pattern_mode_change(active, reason)
                }
            }
        }

        let mut report = DispatchReport::default();

        if self.last_order != Some(position.order) {
            self.last_order = Some(position.order);
            report.order_changed = true;
            listener.on_order_change(position.order, position.pattern);
        }

        let row_key = (position.order, position.row);
        if self.last_row != Some(row_key) {
            self.last_row = Some(row_key);
            report.row_changed = true;

            for event in self.extractor.extract(decoder, position, muted, volumes) {
                listener.on_note(event);
            }
            listener.on_row_change(position.order, position.row);
        }

        report
    }
}
