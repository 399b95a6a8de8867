// src/loop_range.rs
//
// OFF -> ARMED -> ACTIVE loop-range state machine.
//
//   OFF    --play_to_loop-->  ARMED
//   ARMED  --reach start-->   ACTIVE
//   any    --trigger_loop-->  ACTIVE (with a jump to the start)
//   ARMED/ACTIVE --play_to_loop--> OFF
//
// While ACTIVE, reaching the end position wraps playback to the start.

use log::debug;

use crate::state::{LoopRange, LoopState, PlaybackSnapshot};

/// Loop bounds with "current order" substituted for unset orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLoop {
    pub start_order: usize,
    pub start_row: usize,
    pub end_order: usize,
    pub end_row: usize,
}

impl ResolvedLoop {
    pub fn is_at_end(&self, position: PlaybackSnapshot) -> bool {
        (position.order == self.end_order && position.row >= self.end_row)
            || position.order > self.end_order
    }

    pub fn is_at_start(&self, position: PlaybackSnapshot) -> bool {
        (position.order == self.start_order && position.row >= self.start_row)
            || (position.order > self.start_order && position.order <= self.end_order)
    }
}

/// Outcome of one loop-range evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStep {
    /// Loop range is off; another regime decides.
    Off,
    /// Keep playing.
    Continue,
    /// Reposition to the loop start.
    WrapTo { order: usize, row: usize },
}

#[derive(Debug, Clone, Default)]
pub struct LoopRangeController {
    state: LoopState,
    range: LoopRange,
}

impl LoopRangeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn range(&self) -> LoopRange {
        self.range
    }

    /// Replace the bounds. The state is left alone.
    pub fn set_range(&mut self, range: LoopRange) {
        self.range = range;
    }

    /// Resolve unset orders against `current_order`.
    pub fn resolve(&self, current_order: usize) -> ResolvedLoop {
        ResolvedLoop {
            start_order: self.range.start_order.unwrap_or(current_order),
            start_row: self.range.start_row,
            end_order: self.range.end_order.unwrap_or(current_order),
            end_row: self.range.end_row,
        }
    }

    /// Toggle between OFF and ARMED. ACTIVE turns off.
    pub fn play_to_loop(&mut self) {
        self.state = match self.state {
            LoopState::Off => LoopState::Armed,
            LoopState::Armed | LoopState::Active => LoopState::Off,
        };
        debug!("Loop range {:?}", self.state);
    }

    /// Enter ACTIVE and return where playback must jump to.
    ///
    /// An unset or out-of-range start order falls back to `current_order`.
    pub fn trigger(&mut self, current_order: usize, num_orders: usize) -> (usize, usize) {
        let order = self
            .range
            .start_order
            .filter(|&order| order < num_orders)
            .unwrap_or(current_order);
        self.state = LoopState::Active;
        debug!("Loop range triggered at order {}", order);
        (order, self.range.start_row)
    }

    /// Evaluate the post-render position.
    ///
    /// An ARMED loop that reaches its start becomes ACTIVE, and may wrap in
    /// the same call if the end is already reached.
    pub fn evaluate(&mut self, position: PlaybackSnapshot) -> LoopStep {
        if self.state == LoopState::Off {
            return LoopStep::Off;
        }

        let bounds = self.resolve(position.order);

        if self.state == LoopState::Armed && bounds.is_at_start(position) {
            self.state = LoopState::Active;
            debug!(
                "Loop range armed -> active at order {} row {}",
                position.order, position.row
            );
        }

        if self.state == LoopState::Active && bounds.is_at_end(position) {
            return LoopStep::WrapTo {
                order: bounds.start_order,
                row: bounds.start_row,
            };
        }

        LoopStep::Continue
    }
}
