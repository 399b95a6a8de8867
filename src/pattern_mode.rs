// src/pattern_mode.rs
//
// "Lock to current pattern" playback.
//
// While active, playback wraps back to row 0 of the locked order at the end
// of the pattern (or after `custom_loop_rows` rows), also when one render
// call ran past that end into the next order. Queued jumps fire at that
// boundary. If the module's own break/jump effects move playback to a
// different order, the new order becomes the locked one.

use log::{debug, warn};

use crate::decoder::Decoder;
use crate::note_event::parse_cell;
use crate::state::{PendingJump, PlaybackSnapshot};

/// How the post-render position relates to the locked pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternBoundary {
    /// Custom loop length reached.
    pub at_custom_end: bool,
    /// Wrapped from the last row of the pattern to row 0.
    pub at_full_end: bool,
    /// Order changed without reaching a normal boundary.
    pub escaped: bool,
}

impl PatternBoundary {
    pub fn at_pattern_end(&self) -> bool {
        self.at_custom_end || self.at_full_end
    }
}

/// What the engine has to do after a pattern-mode evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternStep {
    /// Nothing to do.
    Continue,
    /// A pending jump landed on the order playback already advanced to.
    Adopted { order: usize, pattern: usize },
    /// A pending jump must reposition to `(order, 0)` and re-render.
    JumpTo { order: usize, pattern: usize },
    /// Normal end of the locked pattern: back to `(order, 0)`.
    Wrap { order: usize, pattern: usize },
    /// Playback escaped into `order`, which is now locked.
    Escaped { order: usize, pattern: usize },
    /// Playback escaped into an order that cannot be locked; pattern mode
    /// is now off.
    AutoExit,
}

#[derive(Debug, Clone, Default)]
pub struct PatternModeController {
    active: bool,

    loop_order: usize,
    loop_pattern: usize,
    full_loop_rows: usize,

    /// Rows to loop; 0 = the whole pattern.
    custom_loop_rows: usize,

    /// Always `None` while inactive.
    pending_jump: PendingJump,

    /// Scratch for cell scans.
    cell_text: String,
}

impl PatternModeController {
    pub fn new() -> Self {
        Self {
            cell_text: String::with_capacity(32),
            ..Self::default()
        }
    }

    // -------------------------------
    // MARK: Accessors
    // -------------------------------

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn loop_order(&self) -> usize {
        self.loop_order
    }

    pub fn loop_pattern(&self) -> usize {
        self.loop_pattern
    }

    pub fn full_loop_rows(&self) -> usize {
        self.full_loop_rows
    }

    pub fn custom_loop_rows(&self) -> usize {
        self.custom_loop_rows
    }

    pub fn pending_jump(&self) -> PendingJump {
        self.pending_jump
    }

    // -------------------------------
    // MARK: Control
    // -------------------------------

    /// Enable or disable pattern mode. Enabling locks the pattern at
    /// `position`. Returns `true` if the active flag changed.
    pub fn set_enabled(
        &mut self,
        enabled: bool,
        position: PlaybackSnapshot,
        decoder: &dyn Decoder,
    ) -> bool {
        let changed = self.active != enabled;
        self.active = enabled;
        self.pending_jump = PendingJump::None;

        if enabled {
            self.lock(position.order, position.pattern, decoder.pattern_rows(position.pattern));
            debug!(
                "Pattern mode on: order {} pattern {} ({} rows)",
                self.loop_order, self.loop_pattern, self.full_loop_rows
            );
        } else if changed {
            debug!("Pattern mode off");
        }
        changed
    }

    /// Make `(order, pattern)` the locked target and reset the custom length.
    pub fn lock(&mut self, order: usize, pattern: usize, rows: usize) {
        self.loop_order = order;
        self.loop_pattern = pattern;
        self.full_loop_rows = rows;
        self.custom_loop_rows = 0;
    }

    /// Queue a jump for the next boundary. Ignored while inactive.
    pub fn queue_jump(&mut self, jump: PendingJump) -> bool {
        if !self.active {
            return false;
        }
        self.pending_jump = jump;
        true
    }

    pub fn clear_pending_jump(&mut self) {
        self.pending_jump = PendingJump::None;
    }

    pub fn set_custom_loop_rows(&mut self, rows: usize) {
        self.custom_loop_rows = rows;
    }

    /// The pattern now playing changed length.
    pub fn refresh_full_rows(&mut self, rows: usize) {
        self.full_loop_rows = rows;
    }

    // -------------------------------
    // MARK: Evaluation
    // -------------------------------

    /// Classify one render call that went from `before` to `after`.
    ///
    /// `span_rows` is the number of rows one render call can cover. A call
    /// may run past the end of the locked pattern without either edge row
    /// being seen; that still counts as reaching the end as long as playback
    /// landed on the next order in sequence and no Bxx/Dxx sent it there.
    pub fn classify(
        &mut self,
        before: PlaybackSnapshot,
        after: PlaybackSnapshot,
        prev_row: Option<usize>,
        span_rows: usize,
        decoder: &dyn Decoder,
    ) -> PatternBoundary {
        let ran_off_end = self.ran_off_pattern_end(before, after, span_rows, decoder);

        let at_custom_end =
            self.custom_loop_rows > 0 && (after.row >= self.custom_loop_rows || ran_off_end);
        let at_full_end = self.custom_loop_rows == 0
            && self.full_loop_rows > 0
            && ((prev_row == Some(self.full_loop_rows - 1) && after.row == 0) || ran_off_end);
        let escaped = after.order != self.loop_order
            && !at_custom_end
            && !at_full_end
            && prev_row.is_some();

        PatternBoundary {
            at_custom_end,
            at_full_end,
            escaped,
        }
    }

    /// Decide what to do with the post-render position.
    pub fn evaluate(
        &mut self,
        before: PlaybackSnapshot,
        after: PlaybackSnapshot,
        prev_row: Option<usize>,
        span_rows: usize,
        decoder: &dyn Decoder,
    ) -> PatternStep {
        if !self.active {
            return PatternStep::Continue;
        }

        let boundary = self.classify(before, after, prev_row, span_rows, decoder);
        if boundary.at_pattern_end() {
            if let Some(step) = self.fire_pending_jump(after, decoder) {
                return step;
            }
            return PatternStep::Wrap {
                order: self.loop_order,
                pattern: self.loop_pattern,
            };
        }

        if boundary.escaped {
            return self.adopt_escape(after, decoder);
        }

        PatternStep::Continue
    }

    /// Playback left the locked order by simply playing past its last row.
    fn ran_off_pattern_end(
        &mut self,
        before: PlaybackSnapshot,
        after: PlaybackSnapshot,
        span_rows: usize,
        decoder: &dyn Decoder,
    ) -> bool {
        let num_orders = decoder.num_orders();
        if self.full_loop_rows == 0 || num_orders == 0 || before.order != self.loop_order {
            return false;
        }

        let next_order = (self.loop_order + 1) % num_orders;
        if after.order != next_order {
            return false;
        }
        // Single-order song: the next order is the locked one.
        if next_order == self.loop_order && after.row >= before.row {
            return false;
        }

        let rows_left = self.full_loop_rows.saturating_sub(before.row);
        if rows_left + after.row > span_rows + 1 {
            return false;
        }

        !self.has_position_effect(before.row, decoder)
    }

    /// Any Bxx/Dxx in the locked pattern from `from_row` to its end.
    fn has_position_effect(&mut self, from_row: usize, decoder: &dyn Decoder) -> bool {
        for row in from_row..self.full_loop_rows {
            for channel in 0..decoder.num_channels() {
                self.cell_text.clear();
                if decoder.format_cell(self.loop_pattern, row, channel, &mut self.cell_text)
                    && parse_cell(&self.cell_text).changes_position()
                {
                    return true;
                }
            }
        }
        false
    }

    /// Resolve a pending jump at a pattern boundary. `None` if there is no
    /// usable jump and the boundary is a normal wrap.
    fn fire_pending_jump(
        &mut self,
        position: PlaybackSnapshot,
        decoder: &dyn Decoder,
    ) -> Option<PatternStep> {
        let jump = std::mem::take(&mut self.pending_jump);
        let target = jump.target_order()?;

        if target == position.order {
            self.lock(position.order, position.pattern, decoder.pattern_rows(position.pattern));
            return Some(PatternStep::Adopted {
                order: position.order,
                pattern: position.pattern,
            });
        }

        let Some(pattern) = decoder.order_pattern(target) else {
            warn!("Pattern jump to invalid order {} discarded", target);
            return None;
        };
        let rows = decoder.pattern_rows(pattern);
        if rows == 0 {
            warn!("Pattern jump to empty pattern {} discarded", pattern);
            return None;
        }

        self.lock(target, pattern, rows);
        Some(PatternStep::JumpTo {
            order: target,
            pattern,
        })
    }

    fn adopt_escape(&mut self, position: PlaybackSnapshot, decoder: &dyn Decoder) -> PatternStep {
        let rows = decoder.pattern_rows(position.pattern);
        self.lock(position.order, position.pattern, rows);

        if rows == 0 {
            self.active = false;
            self.pending_jump = PendingJump::None;
            debug!("Pattern mode off: escaped into empty order {}", position.order);
            return PatternStep::AutoExit;
        }

        debug!(
            "Pattern mode follows escape to order {} pattern {}",
            position.order, position.pattern
        );
        PatternStep::Escaped {
            order: position.order,
            pattern: position.pattern,
        }
    }
}
