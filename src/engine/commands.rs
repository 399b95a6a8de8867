// src/engine/commands.rs
//
// Applying control-side commands on the render thread.
//
// Invalid arguments make a command a no-op (logged at warn). Nothing here
// can fail or panic.

use log::{debug, warn};

use super::Engine;
use crate::decoder::Decoder;
use crate::state::{Command, PatternModeReason, PendingJump};

impl<D: Decoder> Engine<D> {
    /// Apply one command.
    pub(super) fn apply_command(&mut self, command: Command) {
        if let Some(channel) = command.channel()
            && channel >= self.ledger.num_channels()
        {
            warn!("Ignoring {:?}: no channel {}", command, channel);
            return;
        }

        match command {
            // ═══════════════════════════════════════════
            // Order / pattern navigation
            // ═══════════════════════════════════════════
            Command::QueueOrder { order, row } => {
                if order >= self.decoder.num_orders() {
                    warn!("Ignoring queue of invalid order {}", order);
                    return;
                }
                self.queue_jump(PendingJump::Order(order), row);
            }

            Command::QueueNextOrder => {
                let next = self.decoder.current_order() + 1;
                if next < self.decoder.num_orders() {
                    self.queue_jump(PendingJump::Next(next), 0);
                }
            }

            Command::QueuePrevOrder => {
                let prev = self.decoder.current_order().saturating_sub(1);
                self.queue_jump(PendingJump::Prev(prev), 0);
            }

            Command::QueuePattern { pattern } => {
                let order = self.decoder.find_order_for_pattern(pattern).unwrap_or(0);
                self.queue_jump(PendingJump::Pattern(order), 0);
            }

            Command::JumpToPattern { pattern, order } => {
                self.jump_to_pattern(pattern, order);
            }

            Command::SetPositionRow { row } => {
                let position = self.decoder.snapshot();
                let rows = self.decoder.pattern_rows(position.pattern);
                self.jump(position.order, row.min(rows.saturating_sub(1)));
            }

            Command::ClearPendingJump => {
                self.pattern_mode.clear_pending_jump();
                self.boundary.clear_queued_jump();
            }

            // ═══════════════════════════════════════════
            // Loop range
            // ═══════════════════════════════════════════
            Command::SetLoopRange(range) => {
                self.loop_range.set_range(range);
            }

            Command::TriggerLoop => {
                let current = self.decoder.current_order();
                let (order, row) = self.loop_range.trigger(current, self.decoder.num_orders());
                self.jump(order, row);
                self.commit_mutes();
            }

            Command::PlayToLoop => {
                self.loop_range.play_to_loop();
            }

            // ═══════════════════════════════════════════
            // Pattern mode
            // ═══════════════════════════════════════════
            Command::SetPatternMode { enabled } => {
                let position = self.decoder.snapshot();
                let changed = self.pattern_mode.set_enabled(enabled, position, &self.decoder);
                self.boundary.clear_queued_jump();
                self.boundary.reset_row();
                if changed {
                    self.dispatcher
                        .pattern_mode_changed(enabled, PatternModeReason::Manual);
                }
            }

            Command::RetriggerPattern => {
                let order = self.decoder.current_order();
                self.jump(order, 0);
            }

            Command::SetCustomLoopRows { rows } => {
                self.pattern_mode.set_custom_loop_rows(rows);
                self.boundary.reset_row();
            }

            // ═══════════════════════════════════════════
            // Channels
            // ═══════════════════════════════════════════
            Command::ToggleChannelMute { channel } => {
                self.ledger.toggle_mute(channel);
                let muted = self.ledger.is_muted(channel);
                self.decoder.set_channel_mute(channel, muted);
                self.mix.mirror_volume(&mut self.decoder, channel, muted);
            }

            Command::ToggleChannelSolo { channel } => {
                self.ledger.toggle_solo(channel);
                self.mirror_mix();
            }

            Command::QueueChannelMute { channel } => {
                self.ledger.queue_mute(channel);
            }

            Command::QueueChannelSolo { channel } => {
                self.ledger.queue_solo(channel);
            }

            Command::MuteAll => {
                self.ledger.mute_all();
                self.mirror_mix();
            }

            Command::UnmuteAll => {
                self.ledger.unmute_all();
                self.mirror_mix();
            }

            Command::SetChannelVolume { channel, volume } => {
                if self.mix.set_volume(channel, volume).is_some() {
                    let muted = self.ledger.is_muted(channel);
                    self.mix.mirror_volume(&mut self.decoder, channel, muted);
                }
            }

            Command::SetChannelPanning { channel, pan } => {
                if self.mix.set_panning(channel, pan).is_some() {
                    self.mix.mirror_panning(&mut self.decoder, channel);
                }
            }

            // ═══════════════════════════════════════════
            // Transport / rendering
            // ═══════════════════════════════════════════
            Command::SetPitch { pitch } => {
                self.transport.set_pitch(pitch);
            }

            Command::SetRenderSettings(settings) => {
                self.render_settings = settings;
                self.decoder.apply_render_settings(&settings);
            }
        }
    }

    /// Queue a jump in whichever mode is active.
    fn queue_jump(&mut self, jump: PendingJump, row: usize) {
        if self.pattern_mode.is_active() {
            self.pattern_mode.queue_jump(jump);
        } else {
            self.boundary.queue_jump(jump, row);
        }
    }

    /// Jump immediately and make the pattern the loop target.
    fn jump_to_pattern(&mut self, pattern: usize, order: Option<usize>) {
        let num_orders = self.decoder.num_orders();
        let order = match order {
            Some(order) if order < num_orders => order,
            Some(order) => {
                warn!("Ignoring jump to invalid order {}", order);
                return;
            }
            None => self.decoder.find_order_for_pattern(pattern).unwrap_or(0),
        };

        let pattern = self.decoder.order_pattern(order).unwrap_or(pattern);
        let rows = self.decoder.pattern_rows(pattern);
        self.pattern_mode.lock(order, pattern, rows);
        debug!("Jump to order {} pattern {}", order, pattern);
        self.jump(order, 0);
    }
}
