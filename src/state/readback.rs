// Engine -> control readback values.

use super::{LoopState, PendingJump, PlaybackSnapshot, QueuedAction};

/// Snapshot of engine state published after every render call.
///
/// Values lag the render thread by at most one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineReadback {
    /// Position after the last render call settled.
    pub position: PlaybackSnapshot,

    pub loop_state: LoopState,

    pub pattern_mode: bool,

    pub pending_jump: PendingJump,

    pub has_pending_mute_changes: bool,

    /// Playback-rate multiplier.
    pub pitch: f64,

    /// Module tempo before pitch adjustment.
    pub bpm: f64,

    /// Ticks per row.
    pub speed: u32,
}

impl EngineReadback {
    /// Tempo as heard, after pitch adjustment.
    pub fn effective_bpm(&self) -> f64 {
        if self.pitch > 0.0 {
            self.bpm / self.pitch
        } else {
            self.bpm
        }
    }
}

/// Per-channel mute state as seen by the control side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelReadback {
    pub muted: bool,
    /// Mute state after the next boundary commit.
    pub pending_muted: bool,
    pub queued: QueuedAction,
}

impl ChannelReadback {
    const MUTED: u8 = 0b0001;
    const PENDING: u8 = 0b0010;
    const ACTION_SHIFT: u8 = 2;

    /// Pack into one byte for atomic publication.
    pub fn pack(self) -> u8 {
        let mut bits = self.queued.code() << Self::ACTION_SHIFT;
        if self.muted {
            bits |= Self::MUTED;
        }
        if self.pending_muted {
            bits |= Self::PENDING;
        }
        bits
    }

    pub fn unpack(bits: u8) -> Self {
        Self {
            muted: bits & Self::MUTED != 0,
            pending_muted: bits & Self::PENDING != 0,
            queued: QueuedAction::from_code(bits >> Self::ACTION_SHIFT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_readback_packing() {
        let state = ChannelReadback {
            muted: false,
            pending_muted: true,
            queued: QueuedAction::Solo,
        };
        assert_eq!(ChannelReadback::unpack(state.pack()), state);
        assert_eq!(ChannelReadback::unpack(0), ChannelReadback::default());
    }

    #[test]
    fn test_effective_bpm() {
        let readback = EngineReadback {
            pitch: 2.0,
            bpm: 125.0,
            ..Default::default()
        };
        assert_eq!(readback.effective_bpm(), 62.5);
    }
}
