// Playback-position value types shared by the controllers, the engine and
// the control-side readback.

/// Read-only view of the decoder position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackSnapshot {
    pub order: usize,
    pub pattern: usize,
    pub row: usize,
}

impl PlaybackSnapshot {
    pub fn new(order: usize, pattern: usize, row: usize) -> Self {
        Self {
            order,
            pattern,
            row,
        }
    }
}

/// Loop-range state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Off,
    /// Waiting for playback to reach the loop start.
    Armed,
    /// Enforcing the loop end.
    Active,
}

impl LoopState {
    /// Numeric code used by the C ABI and the readback atomics.
    pub fn code(self) -> u8 {
        match self {
            LoopState::Off => 0,
            LoopState::Armed => 1,
            LoopState::Active => 2,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            1 => LoopState::Armed,
            2 => LoopState::Active,
            _ => LoopState::Off,
        }
    }
}

/// An order/row bounded loop region.
///
/// `None` for an order means "the order playing when the boundary is
/// evaluated". The end is expected to be reachable from the start by
/// forward playback; this is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopRange {
    pub start_order: Option<usize>,
    pub start_row: usize,
    pub end_order: Option<usize>,
    pub end_row: usize,
}

impl LoopRange {
    pub fn new(
        start_order: Option<usize>,
        start_row: usize,
        end_order: Option<usize>,
        end_row: usize,
    ) -> Self {
        Self {
            start_order,
            start_row,
            end_order,
            end_row,
        }
    }
}

/// A queued order change, waiting for the next boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingJump {
    #[default]
    None,
    Next(usize),
    Prev(usize),
    Order(usize),
    Pattern(usize),
}

impl PendingJump {
    /// Order the jump lands on.
    pub fn target_order(self) -> Option<usize> {
        match self {
            PendingJump::None => None,
            PendingJump::Next(order)
            | PendingJump::Prev(order)
            | PendingJump::Order(order)
            | PendingJump::Pattern(order) => Some(order),
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, PendingJump::None)
    }

    /// 0=none, 1=next, 2=prev, 3=order, 4=pattern.
    pub fn code(self) -> u8 {
        match self {
            PendingJump::None => 0,
            PendingJump::Next(_) => 1,
            PendingJump::Prev(_) => 2,
            PendingJump::Order(_) => 3,
            PendingJump::Pattern(_) => 4,
        }
    }

    pub fn from_code(code: u8, order: usize) -> Self {
        match code {
            1 => PendingJump::Next(order),
            2 => PendingJump::Prev(order),
            3 => PendingJump::Order(order),
            4 => PendingJump::Pattern(order),
            _ => PendingJump::None,
        }
    }
}

/// What a channel has queued for the next boundary (for UI highlighting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuedAction {
    #[default]
    None,
    Mute,
    Solo,
}

impl QueuedAction {
    pub fn code(self) -> u8 {
        match self {
            QueuedAction::None => 0,
            QueuedAction::Mute => 1,
            QueuedAction::Solo => 2,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            1 => QueuedAction::Mute,
            2 => QueuedAction::Solo,
            _ => QueuedAction::None,
        }
    }
}

/// Why pattern mode changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternModeReason {
    /// A `SetPatternMode` command.
    Manual,
    /// Playback escaped into an order that cannot be locked.
    AutoExit,
}

impl PatternModeReason {
    pub fn code(self) -> i32 {
        match self {
            PatternModeReason::Manual => 0,
            PatternModeReason::AutoExit => 1,
        }
    }
}
