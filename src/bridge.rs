//! Thread-safe bridge between the control side and the render thread.
//!
//! # Architecture
//!
//! - **Control thread** (UI, MIDI mapping, scripting) owns [`ControlHandle`]
//! - **Render thread** owns the [`Engine`] and the decoder
//! - Commands travel through a bounded lock-free ring; state comes back
//!   through atomics published after every render call
//!
//! # Usage
//!
//! ```ignore
//! let (mut control, mut engine) = create_bridge(decoder, EngineConfig::default())?;
//!
//! // Control thread: send commands
//! control.set_pattern_mode(true);
//! control.queue_next_order();
//!
//! // Render thread: once per audio callback
//! engine.render(&mut buffer);
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, AtomicUsize, Ordering},
};

use log::{debug, info};

use crate::command_queue::{CommandSender, command_queue};
use crate::config::{EngineConfig, RenderSettings};
use crate::decoder::Decoder;
use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::state::{
    ChannelReadback, Command, EngineReadback, LoopRange, LoopState, PendingJump, PlaybackSnapshot,
};

/// Static module layout, captured at construction so the control side can
/// validate commands without touching the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub num_channels: usize,
    pub num_patterns: usize,
    /// Pattern played by each order.
    pub order_patterns: Vec<usize>,
    /// Row count of each pattern.
    pub pattern_rows: Vec<usize>,
}

impl ModuleInfo {
    pub fn from_decoder(decoder: &dyn Decoder) -> Self {
        let num_patterns = decoder.num_patterns();
        Self {
            num_channels: decoder.num_channels(),
            num_patterns,
            order_patterns: (0..decoder.num_orders())
                .map(|order| decoder.order_pattern(order).unwrap_or(0))
                .collect(),
            pattern_rows: (0..num_patterns)
                .map(|pattern| decoder.pattern_rows(pattern))
                .collect(),
        }
    }

    pub fn num_orders(&self) -> usize {
        self.order_patterns.len()
    }

    pub fn order_pattern(&self, order: usize) -> Option<usize> {
        self.order_patterns.get(order).copied()
    }

    pub fn pattern_rows(&self, pattern: usize) -> usize {
        self.pattern_rows.get(pattern).copied().unwrap_or(0)
    }

    /// Whether the engine can act on `command`.
    pub fn accepts(&self, command: &Command) -> bool {
        if let Some(channel) = command.channel()
            && channel >= self.num_channels
        {
            return false;
        }

        match *command {
            Command::QueueOrder { order, .. } => order < self.num_orders(),
            Command::QueuePattern { pattern } => pattern < self.num_patterns,
            Command::JumpToPattern { pattern, order } => {
                pattern < self.num_patterns && order.is_none_or(|o| o < self.num_orders())
            }
            Command::SetChannelVolume { volume, .. } => !volume.is_nan(),
            Command::SetChannelPanning { pan, .. } => !pan.is_nan(),
            Command::SetPitch { pitch } => pitch.is_finite(),
            _ => true,
        }
    }
}

/// Lock-free engine -> control readback.
///
/// f64 values are stored as bits (no AtomicF64 in std).
pub(crate) struct SharedReadback {
    order: AtomicUsize,
    pattern: AtomicUsize,
    row: AtomicUsize,
    loop_state: AtomicU8,
    pattern_mode: AtomicBool,
    pending_jump_kind: AtomicU8,
    pending_jump_order: AtomicUsize,
    has_pending_mutes: AtomicBool,
    pitch_bits: AtomicU64,
    bpm_bits: AtomicU64,
    speed: AtomicU32,
    /// `ChannelReadback::pack` per channel.
    channels: Vec<AtomicU8>,
}

impl SharedReadback {
    fn new(num_channels: usize) -> Self {
        Self {
            order: AtomicUsize::new(0),
            pattern: AtomicUsize::new(0),
            row: AtomicUsize::new(0),
            loop_state: AtomicU8::new(LoopState::Off.code()),
            pattern_mode: AtomicBool::new(false),
            pending_jump_kind: AtomicU8::new(0),
            pending_jump_order: AtomicUsize::new(0),
            has_pending_mutes: AtomicBool::new(false),
            pitch_bits: AtomicU64::new(1.0_f64.to_bits()),
            bpm_bits: AtomicU64::new(0.0_f64.to_bits()),
            speed: AtomicU32::new(0),
            channels: (0..num_channels).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    pub(crate) fn publish(&self, state: &EngineReadback) {
        self.order.store(state.position.order, Ordering::Relaxed);
        self.pattern.store(state.position.pattern, Ordering::Relaxed);
        self.row.store(state.position.row, Ordering::Relaxed);
        self.loop_state
            .store(state.loop_state.code(), Ordering::Relaxed);
        self.pattern_mode
            .store(state.pattern_mode, Ordering::Relaxed);
        self.pending_jump_kind
            .store(state.pending_jump.code(), Ordering::Relaxed);
        self.pending_jump_order.store(
            state.pending_jump.target_order().unwrap_or(0),
            Ordering::Relaxed,
        );
        self.has_pending_mutes
            .store(state.has_pending_mute_changes, Ordering::Relaxed);
        self.pitch_bits
            .store(state.pitch.to_bits(), Ordering::Relaxed);
        self.bpm_bits.store(state.bpm.to_bits(), Ordering::Relaxed);
        self.speed.store(state.speed, Ordering::Relaxed);
    }

    pub(crate) fn publish_channel(&self, channel: usize, state: ChannelReadback) {
        if let Some(slot) = self.channels.get(channel) {
            slot.store(state.pack(), Ordering::Relaxed);
        }
    }

    fn load(&self) -> EngineReadback {
        EngineReadback {
            position: PlaybackSnapshot::new(
                self.order.load(Ordering::Relaxed),
                self.pattern.load(Ordering::Relaxed),
                self.row.load(Ordering::Relaxed),
            ),
            loop_state: LoopState::from_code(self.loop_state.load(Ordering::Relaxed)),
            pattern_mode: self.pattern_mode.load(Ordering::Relaxed),
            pending_jump: PendingJump::from_code(
                self.pending_jump_kind.load(Ordering::Relaxed),
                self.pending_jump_order.load(Ordering::Relaxed),
            ),
            has_pending_mute_changes: self.has_pending_mutes.load(Ordering::Relaxed),
            pitch: f64::from_bits(self.pitch_bits.load(Ordering::Relaxed)),
            bpm: f64::from_bits(self.bpm_bits.load(Ordering::Relaxed)),
            speed: self.speed.load(Ordering::Relaxed),
        }
    }

    fn channel(&self, channel: usize) -> ChannelReadback {
        self.channels
            .get(channel)
            .map(|slot| ChannelReadback::unpack(slot.load(Ordering::Relaxed)))
            .unwrap_or_default()
    }
}

/// Handle for the control thread.
///
/// All methods are non-blocking. Commands with invalid arguments are not
/// sent; commands sent to a full queue are dropped. Both return `false`.
pub struct ControlHandle {
    commands: CommandSender,

    module: ModuleInfo,

    /// Last loop range sent (optimistic local copy).
    loop_range: LoopRange,

    readback: Arc<SharedReadback>,
}

/// Create the control handle and the engine for `decoder`.
///
/// Fails if the module has no channels or orders, or the sample rate is
/// unusable.
pub fn create_bridge<D: Decoder>(
    decoder: D,
    config: EngineConfig,
) -> EngineResult<(ControlHandle, Engine<D>)> {
    if !(config.sample_rate.is_finite() && config.sample_rate > 0.0) {
        return Err(EngineError::InvalidSampleRate(config.sample_rate));
    }
    if decoder.num_channels() == 0 {
        return Err(EngineError::NoChannels);
    }
    if decoder.num_orders() == 0 {
        return Err(EngineError::NoOrders);
    }

    let module = ModuleInfo::from_decoder(&decoder);
    let (sender, receiver) = command_queue();
    let readback = Arc::new(SharedReadback::new(module.num_channels));

    info!(
        "Engine created: {} channels, {} orders, {} patterns at {} Hz",
        module.num_channels,
        module.num_orders(),
        module.num_patterns,
        config.sample_rate
    );

    let engine = Engine::new(decoder, config, receiver, Arc::clone(&readback));
    let control = ControlHandle {
        commands: sender,
        module,
        loop_range: LoopRange::default(),
        readback,
    };

    Ok((control, engine))
}

// ═══════════════════════════════════════════════════════════════════
// ControlHandle - control thread API
// ═══════════════════════════════════════════════════════════════════

impl ControlHandle {
    /// Validate and enqueue a command.
    pub fn send(&mut self, command: Command) -> bool {
        if !self.module.accepts(&command) {
            debug!("Not sending invalid {:?}", command);
            return false;
        }

        self.apply_local(&command);
        self.commands.send(command)
    }

    /// Mirror commands the control side keeps a local copy of.
    fn apply_local(&mut self, command: &Command) {
        if let Command::SetLoopRange(range) = command {
            self.loop_range = *range;
        }
    }

    pub fn module(&self) -> &ModuleInfo {
        &self.module
    }

    // -------------------------------
    // MARK: Navigation
    // -------------------------------

    pub fn queue_order(&mut self, order: usize, row: usize) -> bool {
        self.send(Command::QueueOrder { order, row })
    }

    pub fn queue_next_order(&mut self) -> bool {
        self.send(Command::QueueNextOrder)
    }

    pub fn queue_prev_order(&mut self) -> bool {
        self.send(Command::QueuePrevOrder)
    }

    pub fn queue_pattern(&mut self, pattern: usize) -> bool {
        self.send(Command::QueuePattern { pattern })
    }

    pub fn jump_to_pattern(&mut self, pattern: usize) -> bool {
        self.send(Command::JumpToPattern {
            pattern,
            order: None,
        })
    }

    pub fn jump_to_order(&mut self, order: usize) -> bool {
        let Some(pattern) = self.module.order_pattern(order) else {
            return false;
        };
        self.send(Command::JumpToPattern {
            pattern,
            order: Some(order),
        })
    }

    pub fn set_position_row(&mut self, row: usize) -> bool {
        self.send(Command::SetPositionRow { row })
    }

    pub fn clear_pending_jump(&mut self) -> bool {
        self.send(Command::ClearPendingJump)
    }

    // -------------------------------
    // MARK: Loop range
    // -------------------------------

    pub fn set_loop_range(&mut self, range: LoopRange) -> bool {
        self.send(Command::SetLoopRange(range))
    }

    /// Last loop range sent.
    pub fn loop_range(&self) -> LoopRange {
        self.loop_range
    }

    /// Move the loop start to the current playback position.
    pub fn set_loop_start_here(&mut self) -> bool {
        let position = self.readback().position;
        let range = LoopRange {
            start_order: Some(position.order),
            start_row: position.row,
            ..self.loop_range
        };
        self.set_loop_range(range)
    }

    /// Move the loop end to the current playback position.
    pub fn set_loop_end_here(&mut self) -> bool {
        let position = self.readback().position;
        let range = LoopRange {
            end_order: Some(position.order),
            end_row: position.row,
            ..self.loop_range
        };
        self.set_loop_range(range)
    }

    pub fn trigger_loop(&mut self) -> bool {
        self.send(Command::TriggerLoop)
    }

    pub fn play_to_loop(&mut self) -> bool {
        self.send(Command::PlayToLoop)
    }

    // -------------------------------
    // MARK: Pattern mode
    // -------------------------------

    pub fn set_pattern_mode(&mut self, enabled: bool) -> bool {
        self.send(Command::SetPatternMode { enabled })
    }

    pub fn retrigger_pattern(&mut self) -> bool {
        self.send(Command::RetriggerPattern)
    }

    pub fn set_custom_loop_rows(&mut self, rows: usize) -> bool {
        self.send(Command::SetCustomLoopRows { rows })
    }

    // -------------------------------
    // MARK: Channels
    // -------------------------------

    pub fn toggle_channel_mute(&mut self, channel: usize) -> bool {
        self.send(Command::ToggleChannelMute { channel })
    }

    pub fn toggle_channel_solo(&mut self, channel: usize) -> bool {
        self.send(Command::ToggleChannelSolo { channel })
    }

    pub fn queue_channel_mute(&mut self, channel: usize) -> bool {
        self.send(Command::QueueChannelMute { channel })
    }

    pub fn queue_channel_solo(&mut self, channel: usize) -> bool {
        self.send(Command::QueueChannelSolo { channel })
    }

    pub fn mute_all(&mut self) -> bool {
        self.send(Command::MuteAll)
    }

    pub fn unmute_all(&mut self) -> bool {
        self.send(Command::UnmuteAll)
    }

    pub fn set_channel_volume(&mut self, channel: usize, volume: f64) -> bool {
        self.send(Command::SetChannelVolume { channel, volume })
    }

    pub fn set_channel_panning(&mut self, channel: usize, pan: f64) -> bool {
        self.send(Command::SetChannelPanning { channel, pan })
    }

    // -------------------------------
    // MARK: Transport / rendering
    // -------------------------------

    pub fn set_pitch(&mut self, pitch: f64) -> bool {
        self.send(Command::SetPitch { pitch })
    }

    pub fn set_render_settings(&mut self, settings: RenderSettings) -> bool {
        self.send(Command::SetRenderSettings(settings))
    }

    // -------------------------------
    // MARK: Readback
    // -------------------------------

    /// Engine state as of the last render call.
    pub fn readback(&self) -> EngineReadback {
        self.readback.load()
    }

    pub fn channel(&self, channel: usize) -> ChannelReadback {
        self.readback.channel(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::SimModule;

    fn sim() -> SimModule {
        let mut sim = SimModule::new(4);
        let a = sim.add_pattern(16);
        let b = sim.add_pattern(32);
        sim.set_orders(&[a, b, a]);
        sim
    }

    #[test]
    fn test_create_bridge_rejects_bad_modules() {
        let empty = SimModule::new(0);
        assert!(matches!(
            create_bridge(empty, EngineConfig::default()),
            Err(EngineError::NoChannels)
        ));

        let no_orders = SimModule::new(2);
        assert!(matches!(
            create_bridge(no_orders, EngineConfig::default()),
            Err(EngineError::NoOrders)
        ));

        assert!(matches!(
            create_bridge(sim(), EngineConfig::with_sample_rate(0.0)),
            Err(EngineError::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn test_module_info() {
        let info = ModuleInfo::from_decoder(&sim());
        assert_eq!(info.num_orders(), 3);
        assert_eq!(info.order_pattern(1), Some(1));
        assert_eq!(info.pattern_rows(1), 32);
        assert_eq!(info.pattern_rows(7), 0);
    }

    #[test]
    fn test_invalid_commands_are_not_sent() {
        let (mut control, _engine) = create_bridge(sim(), EngineConfig::default()).unwrap();
        assert!(!control.queue_order(3, 0));
        assert!(!control.queue_pattern(2));
        assert!(!control.toggle_channel_mute(4));
        assert!(!control.set_channel_volume(0, f64::NAN));
        assert!(!control.jump_to_order(9));
        assert!(control.queue_order(2, 0));
        assert!(control.toggle_channel_mute(3));
    }

    #[test]
    fn test_loop_here_uses_readback_position() {
        let (mut control, mut engine) = create_bridge(sim(), EngineConfig::default()).unwrap();
        control.jump_to_order(1);
        engine.render(&mut [0.0; 16]);

        assert!(control.set_loop_start_here());
        let range = control.loop_range();
        assert_eq!(range.start_order, Some(1));
        assert_eq!(range.end_order, None);

        engine.render(&mut [0.0; 16]);
        assert_eq!(engine.loop_range(), range);
    }

    #[test]
    fn test_readback_is_published() {
        let (mut control, mut engine) = create_bridge(sim(), EngineConfig::default()).unwrap();
        control.set_pattern_mode(true);
        control.queue_channel_mute(2);
        control.set_pitch(2.0);
        engine.render(&mut [0.0; 16]);

        let state = control.readback();
        assert!(state.pattern_mode);
        assert!(state.has_pending_mute_changes);
        assert_eq!(state.pitch, 2.0);
        assert_eq!(state.bpm, 125.0);
        assert_eq!(state.effective_bpm(), 62.5);
        assert!(control.channel(2).pending_muted);
        assert!(!control.channel(2).muted);
    }
}
