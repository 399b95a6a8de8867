// src/engine.rs

mod commands;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use log::debug;

use crate::boundary::{BoundaryDetector, Flow};
use crate::bridge::SharedReadback;
use crate::callbacks::{CallbackDispatcher, NoListener, PlaybackListener};
use crate::command_queue::CommandReceiver;
use crate::config::{EngineConfig, RenderSettings};
use crate::decoder::Decoder;
use crate::loop_range::{LoopRangeController, LoopStep};
use crate::mix::ChannelMix;
use crate::mute_solo::MuteSoloLedger;
use crate::pattern_mode::{PatternModeController, PatternStep};
use crate::state::{
    ChannelReadback, EngineReadback, LoopRange, LoopState, PatternModeReason, PendingJump,
    PlaybackSnapshot, QueuedAction,
};
use crate::transport::Transport;

/// Real-time playback control engine.
///
/// This struct runs exclusively on the render thread. It owns the decoder
/// and all playback state; the control side talks to it only through the
/// command queue and reads it back through atomics.
///
/// After construction, `render` does not allocate, lock or block.
pub struct Engine<D: Decoder> {
    decoder: D,

    commands: CommandReceiver,

    transport: Transport,

    render_settings: RenderSettings,

    ledger: MuteSoloLedger,

    mix: ChannelMix,

    loop_range: LoopRangeController,

    pattern_mode: PatternModeController,

    boundary: BoundaryDetector,

    dispatcher: CallbackDispatcher,

    listener: Box<dyn PlaybackListener>,

    readback: Arc<SharedReadback>,
}

impl<D: Decoder> Engine<D> {
    pub(crate) fn new(
        mut decoder: D,
        config: EngineConfig,
        commands: CommandReceiver,
        readback: Arc<SharedReadback>,
    ) -> Self {
        let num_channels = decoder.num_channels();
        let ledger = MuteSoloLedger::new(num_channels);
        let mix = ChannelMix::from_decoder(&decoder);

        decoder.apply_render_settings(&config.render);
        mix.mirror_all(&mut decoder, ledger.current());

        let mut pattern_mode = PatternModeController::new();
        let start = decoder.snapshot();
        pattern_mode.lock(start.order, start.pattern, decoder.pattern_rows(start.pattern));

        let engine = Self {
            decoder,
            commands,
            transport: Transport::new(config.sample_rate),
            render_settings: config.render,
            ledger,
            mix,
            loop_range: LoopRangeController::new(),
            pattern_mode,
            boundary: BoundaryDetector::new(),
            dispatcher: CallbackDispatcher::new(num_channels),
            listener: Box::new(NoListener),
            readback,
        };
        engine.publish_readback();
        engine
    }

    /// Install the listener that receives playback callbacks.
    pub fn set_listener(&mut self, listener: Box<dyn PlaybackListener>) {
        self.listener = listener;
    }

    /// Remove the listener.
    pub fn clear_listener(&mut self) {
        self.listener = Box::new(NoListener);
    }

    // -------------------------------
    // MARK: Render
    // -------------------------------

    /// Render one buffer of interleaved stereo into `output`.
    ///
    /// Called once per audio callback. Applies queued commands first, then
    /// renders, then lets the active regime (loop range, pattern mode or
    /// song mode) correct the position, then fires callbacks.
    ///
    /// Returns the number of frames written.
    pub fn render(&mut self, output: &mut [f32]) -> usize {
        while let Some(command) = self.commands.pop() {
            self.apply_command(command);
        }

        let before = self.decoder.snapshot();
        let rate = self.transport.render_rate();
        let mut frames = self.decoder.render(rate, output);
        let after = self.decoder.snapshot();

        let mut flow = self.run_loop_range(after);
        if flow == Flow::Continue {
            flow = self.run_pattern_mode(before, after, rate, output, &mut frames);
        }
        if flow == Flow::Continue {
            self.run_song_mode(before, after);
        }

        self.dispatch_callbacks();
        self.publish_readback();
        frames
    }

    /// Loop range regime. Owns the call whenever the loop is not OFF.
    fn run_loop_range(&mut self, position: PlaybackSnapshot) -> Flow {
        match self.loop_range.evaluate(position) {
            LoopStep::Off => Flow::Continue,
            LoopStep::Continue => {
                self.boundary.track_row(position.row);
                Flow::Handled
            }
            LoopStep::WrapTo { order, row } => {
                self.jump(order, row);
                self.commit_mutes();
                let pattern = self.decoder.order_pattern(order).unwrap_or(0);
                self.dispatcher.loop_pattern(order, pattern);
                Flow::Handled
            }
        }
    }

    /// Pattern mode regime. Owns the call while pattern mode is on.
    fn run_pattern_mode(
        &mut self,
        before: PlaybackSnapshot,
        position: PlaybackSnapshot,
        rate: f64,
        output: &mut [f32],
        frames: &mut usize,
    ) -> Flow {
        if !self.pattern_mode.is_active() {
            return Flow::Continue;
        }

        let prev_row = self.boundary.prev_row();
        let span_rows = self.rows_per_render(rate, *frames);
        match self
            .pattern_mode
            .evaluate(before, position, prev_row, span_rows, &self.decoder)
        {
            PatternStep::Continue => {
                self.boundary.track_row(position.row);
            }
            PatternStep::Adopted { order, pattern } => {
                self.commit_mutes();
                self.boundary.reset_row();
                self.dispatcher.loop_pattern(order, pattern);
            }
            PatternStep::JumpTo { order, pattern } => {
                self.jump(order, 0);
                self.commit_mutes();
                // Replace the buffer rendered from the old position.
                *frames = self.decoder.render(rate, output);
                self.dispatcher.loop_pattern(order, pattern);
            }
            PatternStep::Wrap { order, pattern } => {
                self.jump(order, 0);
                self.commit_mutes();
                self.dispatcher.loop_pattern(order, pattern);
            }
            PatternStep::Escaped { order, pattern } => {
                self.boundary.track_row(position.row);
                self.dispatcher.loop_pattern(order, pattern);
            }
            PatternStep::AutoExit => {
                self.boundary.track_row(position.row);
                self.dispatcher
                    .pattern_mode_changed(false, PatternModeReason::AutoExit);
            }
        }
        Flow::Handled
    }

    /// Song mode: commit mutes and fire queued jumps at pattern boundaries.
    fn run_song_mode(&mut self, before: PlaybackSnapshot, after: PlaybackSnapshot) {
        let transition = self.boundary.classify(before, after);
        self.boundary.track_row(after.row);

        if !transition.is_boundary() {
            return;
        }

        self.commit_mutes();

        if let Some(queued) = self.boundary.take_queued_jump()
            && let Some(order) = queued.jump.target_order()
            && order < self.decoder.num_orders()
        {
            debug!("Queued jump to order {} row {}", order, queued.row);
            self.jump(order, queued.row);
        }
    }

    // -------------------------------
    // MARK: Position helpers
    // -------------------------------

    /// Rows a render call of `frames` frames at `rate` can cover, rounded up.
    fn rows_per_render(&self, rate: f64, frames: usize) -> usize {
        // One tick lasts 2.5 / bpm seconds.
        let frames_per_row = rate * 2.5 * self.decoder.speed() as f64 / self.decoder.tempo();
        if frames_per_row.is_finite() && frames_per_row > 0.0 {
            ((frames as f64 / frames_per_row).ceil() as usize).max(1)
        } else {
            1
        }
    }

    /// Reposition the decoder and restore the mixer it may have reset.
    fn jump(&mut self, order: usize, row: usize) {
        self.decoder.set_position(order, row);
        self.mirror_mix();
        self.boundary.reset_row();
        self.dispatcher.invalidate_row();
    }

    /// Commit pending mute/solo changes, if any.
    fn commit_mutes(&mut self) {
        if self.ledger.commit() {
            self.mirror_mix();
        }
    }

    fn mirror_mix(&mut self) {
        self.mix.mirror_all(&mut self.decoder, self.ledger.current());
    }

    fn dispatch_callbacks(&mut self) {
        let position = self.decoder.snapshot();
        let report = self.dispatcher.dispatch(
            self.listener.as_mut(),
            &self.decoder,
            position,
            self.ledger.current(),
            self.mix.volumes(),
        );

        if report.order_changed {
            let rows = self.decoder.pattern_rows(position.pattern);
            self.pattern_mode.refresh_full_rows(rows);
        }
    }

    fn publish_readback(&self) {
        self.readback.publish(&self.state());
        for channel in 0..self.ledger.num_channels() {
            self.readback
                .publish_channel(channel, self.ledger.readback(channel));
        }
    }

    // -------------------------------
    // MARK: Queries (render thread)
    // -------------------------------

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn position(&self) -> PlaybackSnapshot {
        self.decoder.snapshot()
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_range.state()
    }

    pub fn loop_range(&self) -> LoopRange {
        self.loop_range.range()
    }

    pub fn is_pattern_mode(&self) -> bool {
        self.pattern_mode.is_active()
    }

    /// Queued jump of the active mode.
    pub fn pending_jump(&self) -> PendingJump {
        if self.pattern_mode.is_active() {
            self.pattern_mode.pending_jump()
        } else {
            self.boundary
                .queued_jump()
                .map_or(PendingJump::None, |queued| queued.jump)
        }
    }

    pub fn custom_loop_rows(&self) -> usize {
        self.pattern_mode.custom_loop_rows()
    }

    pub fn full_loop_rows(&self) -> usize {
        self.pattern_mode.full_loop_rows()
    }

    pub fn loop_order(&self) -> usize {
        self.pattern_mode.loop_order()
    }

    pub fn is_channel_muted(&self, channel: usize) -> bool {
        self.ledger.is_muted(channel)
    }

    pub fn is_channel_pending_muted(&self, channel: usize) -> bool {
        self.ledger.pending_muted(channel)
    }

    pub fn queued_action(&self, channel: usize) -> QueuedAction {
        self.ledger.queued_action(channel)
    }

    pub fn has_pending_mute_changes(&self) -> bool {
        self.ledger.has_pending()
    }

    pub fn channel(&self, channel: usize) -> ChannelReadback {
        self.ledger.readback(channel)
    }

    pub fn channel_volume(&self, channel: usize) -> f64 {
        self.mix.volume(channel)
    }

    pub fn channel_panning(&self, channel: usize) -> f64 {
        self.mix.panning(channel)
    }

    pub fn pitch(&self) -> f64 {
        self.transport.pitch()
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.render_settings
    }

    pub fn sample_rate(&self) -> f64 {
        self.transport.sample_rate()
    }

    /// Tempo as heard, after pitch adjustment.
    pub fn effective_bpm(&self) -> f64 {
        self.transport.effective_bpm(self.decoder.tempo())
    }

    /// Full state snapshot.
    pub fn state(&self) -> EngineReadback {
        EngineReadback {
            position: self.decoder.snapshot(),
            loop_state: self.loop_range.state(),
            pattern_mode: self.pattern_mode.is_active(),
            pending_jump: self.pending_jump(),
            has_pending_mute_changes: self.ledger.has_pending(),
            pitch: self.transport.pitch(),
            bpm: self.decoder.tempo(),
            speed: self.decoder.speed(),
        }
    }
}
