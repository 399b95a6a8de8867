// Commands from the control thread to the render thread.
//
// Commands are the ONLY way a UI (or MIDI mapping, or script) can mutate
// playback state. They travel through the bounded command queue and are
// applied at the start of the next render call.

use crate::config::RenderSettings;

use super::LoopRange;

/// A command from the control side to the engine.
///
/// Commands are:
/// - Immutable once created
/// - `Copy`, so the queue never allocates
/// - Applied in FIFO order before any audio of the next buffer is rendered
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    // ═══════════════════════════════════════════
    // Order / pattern navigation
    // ═══════════════════════════════════════════
    /// Queue a jump to `order` at the next boundary.
    QueueOrder { order: usize, row: usize },

    /// Queue a jump to the order after the current one.
    QueueNextOrder,

    /// Queue a jump to the order before the current one.
    QueuePrevOrder,

    /// Queue a jump to the first order that plays `pattern`.
    QueuePattern { pattern: usize },

    /// Jump immediately to `pattern` and make it the loop target.
    ///
    /// `order` pins the order to use; `None` searches the order list.
    JumpToPattern { pattern: usize, order: Option<usize> },

    /// Move to `row` within the current order.
    SetPositionRow { row: usize },

    /// Drop any queued order/pattern jump.
    ClearPendingJump,

    // ═══════════════════════════════════════════
    // Loop range
    // ═══════════════════════════════════════════
    /// Replace the loop range. Does not change the loop state.
    SetLoopRange(LoopRange),

    /// Jump to the loop start and start looping.
    TriggerLoop,

    /// Toggle: OFF -> ARMED, ARMED/ACTIVE -> OFF.
    PlayToLoop,

    // ═══════════════════════════════════════════
    // Pattern mode
    // ═══════════════════════════════════════════
    /// Lock playback to the current pattern, or release the lock.
    SetPatternMode { enabled: bool },

    /// Restart the current order from row 0.
    RetriggerPattern,

    /// Loop only the first `rows` rows of the locked pattern (0 = all).
    SetCustomLoopRows { rows: usize },

    // ═══════════════════════════════════════════
    // Channels
    // ═══════════════════════════════════════════
    /// Toggle a channel's mute immediately.
    ToggleChannelMute { channel: usize },

    /// Solo a channel immediately (or un-solo if already soloed).
    ToggleChannelSolo { channel: usize },

    /// Toggle a channel's mute at the next boundary.
    QueueChannelMute { channel: usize },

    /// Solo a channel at the next boundary.
    QueueChannelSolo { channel: usize },

    /// Mute every channel immediately.
    MuteAll,

    /// Unmute every channel immediately.
    UnmuteAll,

    /// Set a channel's volume slider, `0.0..=1.0`.
    SetChannelVolume { channel: usize, volume: f64 },

    /// Set a channel's panning, `0.0` = left, `0.5` = center, `1.0` = right.
    SetChannelPanning { channel: usize, pan: f64 },

    // ═══════════════════════════════════════════
    // Transport / rendering
    // ═══════════════════════════════════════════
    /// Set the playback rate multiplier.
    SetPitch { pitch: f64 },

    /// Forward new render settings to the decoder.
    SetRenderSettings(RenderSettings),
}

impl Command {
    /// Channel index this command targets, if any.
    pub fn channel(&self) -> Option<usize> {
        match *self {
            Command::ToggleChannelMute { channel }
            | Command::ToggleChannelSolo { channel }
            | Command::QueueChannelMute { channel }
            | Command::QueueChannelSolo { channel }
            | Command::SetChannelVolume { channel, .. }
            | Command::SetChannelPanning { channel, .. } => Some(channel),
            _ => None,
        }
    }
}
