// src/mute_solo.rs
//
// Current vs. pending per-channel mute state.
//
// Immediate operations change `current` directly. Queued operations build a
// pending mute vector that is committed at the next boundary. A per-channel
// annotation records what was queued so a UI can highlight it.

use crate::state::{ChannelReadback, QueuedAction};

/// Per-channel mute/solo bookkeeping. Render thread only.
#[derive(Debug, Clone)]
pub struct MuteSoloLedger {
    current: Vec<bool>,

    /// Mute state after the next commit. `None` = no change requested.
    pending: Option<Vec<bool>>,

    /// Storage recycled for `pending` so queueing never allocates.
    spare: Vec<bool>,

    queued: Vec<QueuedAction>,

    /// `pending` exists and differs from `current` somewhere.
    has_pending: bool,
}

impl MuteSoloLedger {
    pub fn new(num_channels: usize) -> Self {
        Self {
            current: vec![false; num_channels],
            pending: None,
            spare: Vec::with_capacity(num_channels),
            queued: vec![QueuedAction::None; num_channels],
            has_pending: false,
        }
    }

    // -------------------------------
    // MARK: Queries
    // -------------------------------

    pub fn num_channels(&self) -> usize {
        self.current.len()
    }

    /// Current mute flags, one per channel.
    pub fn current(&self) -> &[bool] {
        &self.current
    }

    pub fn is_muted(&self, channel: usize) -> bool {
        self.current.get(channel).copied().unwrap_or(false)
    }

    /// Mute state the channel will have after the next commit.
    pub fn pending_muted(&self, channel: usize) -> bool {
        match &self.pending {
            Some(pending) => pending.get(channel).copied().unwrap_or(false),
            None => self.is_muted(channel),
        }
    }

    pub fn queued_action(&self, channel: usize) -> QueuedAction {
        self.queued.get(channel).copied().unwrap_or_default()
    }

    pub fn has_pending(&self) -> bool {
        self.has_pending
    }

    pub fn readback(&self, channel: usize) -> ChannelReadback {
        ChannelReadback {
            muted: self.is_muted(channel),
            pending_muted: self.pending_muted(channel),
            queued: self.queued_action(channel),
        }
    }

    // -------------------------------
    // MARK: Queued (boundary-gated)
    // -------------------------------

    /// Toggle the channel's pending mute. Queueing the same channel twice
    /// before a boundary cancels the change. Returns `false` for an invalid
    /// channel.
    pub fn queue_mute(&mut self, channel: usize) -> bool {
        if channel >= self.num_channels() {
            return false;
        }

        let current = self.current[channel];
        let pending = self.pending_mut();
        pending[channel] = !pending[channel];
        let changed = pending[channel] != current;

        self.queued[channel] = if changed {
            QueuedAction::Mute
        } else {
            QueuedAction::None
        };
        self.refresh_pending();
        true
    }

    /// Queue a solo of `channel`, or an un-solo if it is already the only
    /// channel left unmuted in the pending state.
    pub fn queue_solo(&mut self, channel: usize) -> bool {
        if channel >= self.num_channels() {
            return false;
        }

        let pending = self.pending_mut();
        let already_solo = pending
            .iter()
            .enumerate()
            .all(|(i, &muted)| muted == (i != channel));

        if already_solo {
            pending.fill(false);
        } else {
            for (i, muted) in pending.iter_mut().enumerate() {
                *muted = i != channel;
            }
        }

        self.queued.fill(QueuedAction::None);
        if !already_solo {
            self.queued[channel] = QueuedAction::Solo;
        }
        self.refresh_pending();
        true
    }

    /// Apply pending changes to `current`. Returns `true` if anything was
    /// committed; the caller must then re-mirror the mixer into the decoder.
    pub fn commit(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        let committed = self.has_pending;
        if committed {
            self.current.copy_from_slice(&pending);
        }
        self.spare = pending;
        self.queued.fill(QueuedAction::None);
        self.has_pending = false;
        committed
    }

    // -------------------------------
    // MARK: Immediate
    // -------------------------------

    pub fn toggle_mute(&mut self, channel: usize) -> bool {
        let Some(muted) = self.current.get_mut(channel) else {
            return false;
        };
        *muted = !*muted;
        self.refresh_pending();
        true
    }

    /// Mute everything except `channel`, or unmute everything if `channel`
    /// is already soloed.
    pub fn toggle_solo(&mut self, channel: usize) -> bool {
        if channel >= self.num_channels() {
            return false;
        }

        let soloed = self
            .current
            .iter()
            .enumerate()
            .all(|(i, &muted)| muted == (i != channel));

        for (i, muted) in self.current.iter_mut().enumerate() {
            *muted = !soloed && i != channel;
        }
        self.refresh_pending();
        true
    }

    pub fn mute_all(&mut self) {
        self.current.fill(true);
        self.refresh_pending();
    }

    pub fn unmute_all(&mut self) {
        self.current.fill(false);
        self.refresh_pending();
    }

    // -------------------------------
    // MARK: Internals
    // -------------------------------

    /// Pending vector, created from `current` on first use.
    fn pending_mut(&mut self) -> &mut Vec<bool> {
        let current = &self.current;
        let spare = &mut self.spare;
        self.pending.get_or_insert_with(|| {
            let mut pending = std::mem::take(spare);
            pending.clear();
            pending.extend_from_slice(current);
            pending
        })
    }

    /// Recompute `has_pending`; drop the pending vector once it is a no-op.
    fn refresh_pending(&mut self) {
        self.has_pending = match &self.pending {
            Some(pending) => pending != &self.current,
            None => false,
        };

        if !self.has_pending
            && let Some(pending) = self.pending.take()
        {
            self.spare = pending;
            self.queued.fill(QueuedAction::None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_mute_twice_cancels() {
        let mut ledger = MuteSoloLedger::new(4);
        ledger.queue_mute(1);
        assert!(ledger.has_pending());
        assert!(ledger.pending_muted(1));
        assert_eq!(ledger.queued_action(1), QueuedAction::Mute);

        ledger.queue_mute(1);
        assert!(!ledger.has_pending());
        assert_eq!(ledger.pending_muted(1), ledger.is_muted(1));
        assert_eq!(ledger.queued_action(1), QueuedAction::None);
    }

    #[test]
    fn test_queue_solo_and_unsolo() {
        let mut ledger = MuteSoloLedger::new(4);
        ledger.queue_solo(2);
        for ch in 0..4 {
            assert_eq!(ledger.pending_muted(ch), ch != 2);
        }
        assert_eq!(ledger.queued_action(2), QueuedAction::Solo);
        assert_eq!(ledger.queued_action(0), QueuedAction::None);

        ledger.queue_solo(2);
        for ch in 0..4 {
            assert!(!ledger.pending_muted(ch));
        }
        assert!(!ledger.has_pending());
        assert_eq!(ledger.queued_action(2), QueuedAction::None);
    }

    #[test]
    fn test_queue_solo_replaces_queued_mutes() {
        let mut ledger = MuteSoloLedger::new(3);
        ledger.queue_mute(0);
        ledger.queue_solo(1);
        assert_eq!(ledger.queued_action(0), QueuedAction::None);
        assert_eq!(ledger.queued_action(1), QueuedAction::Solo);
    }

    #[test]
    fn test_commit_applies_and_clears() {
        let mut ledger = MuteSoloLedger::new(3);
        ledger.queue_mute(0);
        ledger.queue_mute(2);
        assert!(!ledger.is_muted(0));

        assert!(ledger.commit());
        assert_eq!(ledger.current(), &[true, false, true]);
        assert!(!ledger.has_pending());
        assert_eq!(ledger.queued_action(0), QueuedAction::None);

        assert!(!ledger.commit());
    }

    #[test]
    fn test_immediate_toggle_solo() {
        let mut ledger = MuteSoloLedger::new(3);
        ledger.toggle_solo(1);
        assert_eq!(ledger.current(), &[true, false, true]);
        ledger.toggle_solo(1);
        assert_eq!(ledger.current(), &[false, false, false]);
    }

    #[test]
    fn test_immediate_change_can_satisfy_pending() {
        let mut ledger = MuteSoloLedger::new(2);
        ledger.queue_mute(0);
        assert!(ledger.has_pending());

        ledger.toggle_mute(0);
        assert!(ledger.is_muted(0));
        assert!(!ledger.has_pending());
        assert_eq!(ledger.queued_action(0), QueuedAction::None);
    }

    #[test]
    fn test_mute_all_unmute_all() {
        let mut ledger = MuteSoloLedger::new(3);
        ledger.mute_all();
        assert_eq!(ledger.current(), &[true, true, true]);
        ledger.unmute_all();
        assert_eq!(ledger.current(), &[false, false, false]);
    }

    #[test]
    fn test_invalid_channel_is_ignored() {
        let mut ledger = MuteSoloLedger::new(2);
        assert!(!ledger.queue_mute(2));
        assert!(!ledger.queue_solo(5));
        assert!(!ledger.toggle_mute(2));
        assert!(!ledger.toggle_solo(2));
        assert!(!ledger.has_pending());
        assert!(!ledger.is_muted(7));
    }

    #[test]
    fn test_readback_packs_pending_state() {
        let mut ledger = MuteSoloLedger::new(2);
        ledger.queue_mute(1);
        let state = ledger.readback(1);
        assert!(!state.muted);
        assert!(state.pending_muted);
        assert_eq!(state.queued, QueuedAction::Mute);
    }
}
