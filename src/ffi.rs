// C-compatible FFI bindings for Swift/iOS and other native hosts.
//
// Safety requirements:
// - All handles must be created by this module and not fabricated
// - NULL handles are accepted everywhere and turn the call into a no-op
// - Decoder and callback userdata must stay valid until the engine is
//   destroyed
// - Caller must call the corresponding _destroy function for each _create

use std::ffi::{c_char, c_void};

use crate::bridge::{ControlHandle, create_bridge};
use crate::callbacks::PlaybackListener;
use crate::config::{
    AmigaFilter, DEFAULT_SAMPLE_RATE, Dither, EngineConfig, InterpolationFilter, RenderSettings,
};
use crate::decoder::Decoder;
use crate::engine::Engine;
use crate::note_event::NoteEvent;
use crate::state::{EngineReadback, LoopRange, PatternModeReason};

use log::{info, warn};

#[cfg(feature = "ios")]
use log::LevelFilter;
#[cfg(feature = "ios")]
use oslog::OsLogger;

// Logger subsystem identifier
#[cfg(feature = "ios")]
const LOG_SUBSYSTEM: &str = "com.groovelock.engine";

/// Scratch size for one formatted cell.
const CELL_TEXT_CAPACITY: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════
// Logger Initialization
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize the oslog logger.
///
/// Call once at application startup. Log output appears in Console.app and
/// Xcode's debug console.
#[cfg(feature = "ios")]
#[unsafe(no_mangle)]
pub extern "C" fn groove_init_logger() {
    OsLogger::new(LOG_SUBSYSTEM)
        .level_filter(LevelFilter::Debug)
        .init()
        .ok();
}

// ═══════════════════════════════════════════════════════════════════════════
// Decoder VTable
// ═══════════════════════════════════════════════════════════════════════════

/// Decoder supplied by the host as C function pointers.
///
/// Every entry except `default_channel_panning`, `apply_render_settings`
/// and `destroy` is required; creation fails if one is missing.
/// All functions are called on the render thread only.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct GrooveDecoderVTable {
    pub userdata: *mut c_void,

    pub num_channels: Option<extern "C" fn(*mut c_void) -> u32>,
    pub num_orders: Option<extern "C" fn(*mut c_void) -> u32>,
    pub num_patterns: Option<extern "C" fn(*mut c_void) -> u32>,
    /// Pattern for an order, or -1 for an invalid order.
    pub order_pattern: Option<extern "C" fn(*mut c_void, u32) -> i32>,
    pub pattern_rows: Option<extern "C" fn(*mut c_void, u32) -> u32>,

    pub current_order: Option<extern "C" fn(*mut c_void) -> u32>,
    pub current_pattern: Option<extern "C" fn(*mut c_void) -> u32>,
    pub current_row: Option<extern "C" fn(*mut c_void) -> u32>,
    pub set_position: Option<extern "C" fn(*mut c_void, u32, u32)>,

    pub set_channel_mute: Option<extern "C" fn(*mut c_void, u32, bool)>,
    pub set_channel_volume: Option<extern "C" fn(*mut c_void, u32, f64)>,
    /// Panning in decoder units, -1 (left) to 1 (right).
    pub set_channel_panning: Option<extern "C" fn(*mut c_void, u32, f64)>,
    /// Writes the module default panning and returns true, if known.
    pub default_channel_panning: Option<extern "C" fn(*mut c_void, u32, *mut f64) -> bool>,

    /// Render `frames` interleaved stereo frames at `rate` Hz. Returns the
    /// frames written.
    pub render: Option<extern "C" fn(*mut c_void, f64, *mut f32, usize) -> usize>,

    /// Write the formatted cell into `buf` (at most `len` bytes, no NUL
    /// needed). Returns the byte count, or -1 if the cell does not exist.
    pub format_cell: Option<extern "C" fn(*mut c_void, u32, u32, u32, *mut c_char, usize) -> i32>,

    pub tempo: Option<extern "C" fn(*mut c_void) -> f64>,
    pub speed: Option<extern "C" fn(*mut c_void) -> u32>,

    pub apply_render_settings: Option<extern "C" fn(*mut c_void, *const GrooveRenderSettings)>,

    /// Called once when the engine is destroyed.
    pub destroy: Option<extern "C" fn(*mut c_void)>,
}

/// `Decoder` over a host vtable. Required entries are unwrapped once.
struct FfiDecoder {
    userdata: *mut c_void,
    num_channels: extern "C" fn(*mut c_void) -> u32,
    num_orders: extern "C" fn(*mut c_void) -> u32,
    num_patterns: extern "C" fn(*mut c_void) -> u32,
    order_pattern: extern "C" fn(*mut c_void, u32) -> i32,
    pattern_rows: extern "C" fn(*mut c_void, u32) -> u32,
    current_order: extern "C" fn(*mut c_void) -> u32,
    current_pattern: extern "C" fn(*mut c_void) -> u32,
    current_row: extern "C" fn(*mut c_void) -> u32,
    set_position: extern "C" fn(*mut c_void, u32, u32),
    set_channel_mute: extern "C" fn(*mut c_void, u32, bool),
    set_channel_volume: extern "C" fn(*mut c_void, u32, f64),
    set_channel_panning: extern "C" fn(*mut c_void, u32, f64),
    default_channel_panning: Option<extern "C" fn(*mut c_void, u32, *mut f64) -> bool>,
    render: extern "C" fn(*mut c_void, f64, *mut f32, usize) -> usize,
    format_cell: extern "C" fn(*mut c_void, u32, u32, u32, *mut c_char, usize) -> i32,
    tempo: extern "C" fn(*mut c_void) -> f64,
    speed: extern "C" fn(*mut c_void) -> u32,
    apply_render_settings: Option<extern "C" fn(*mut c_void, *const GrooveRenderSettings)>,
    destroy: Option<extern "C" fn(*mut c_void)>,
}

// The host guarantees its decoder may be driven from the render thread.
unsafe impl Send for FfiDecoder {}

impl FfiDecoder {
    fn from_vtable(vtable: &GrooveDecoderVTable) -> Option<Self> {
        Some(Self {
            userdata: vtable.userdata,
            num_channels: vtable.num_channels?,
            num_orders: vtable.num_orders?,
            num_patterns: vtable.num_patterns?,
            order_pattern: vtable.order_pattern?,
            pattern_rows: vtable.pattern_rows?,
            current_order: vtable.current_order?,
            current_pattern: vtable.current_pattern?,
            current_row: vtable.current_row?,
            set_position: vtable.set_position?,
            set_channel_mute: vtable.set_channel_mute?,
            set_channel_volume: vtable.set_channel_volume?,
            set_channel_panning: vtable.set_channel_panning?,
            default_channel_panning: vtable.default_channel_panning,
            render: vtable.render?,
            format_cell: vtable.format_cell?,
            tempo: vtable.tempo?,
            speed: vtable.speed?,
            apply_render_settings: vtable.apply_render_settings,
            destroy: vtable.destroy,
        })
    }
}

impl Drop for FfiDecoder {
    fn drop(&mut self) {
        if let Some(destroy) = self.destroy {
            destroy(self.userdata);
        }
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl Decoder for FfiDecoder {
    fn num_channels(&self) -> usize {
        (self.num_channels)(self.userdata) as usize
    }

    fn num_orders(&self) -> usize {
        (self.num_orders)(self.userdata) as usize
    }

    fn num_patterns(&self) -> usize {
        (self.num_patterns)(self.userdata) as usize
    }

    fn order_pattern(&self, order: usize) -> Option<usize> {
        let pattern = (self.order_pattern)(self.userdata, to_u32(order));
        usize::try_from(pattern).ok()
    }

    fn pattern_rows(&self, pattern: usize) -> usize {
        (self.pattern_rows)(self.userdata, to_u32(pattern)) as usize
    }

    fn current_order(&self) -> usize {
        (self.current_order)(self.userdata) as usize
    }

    fn current_pattern(&self) -> usize {
        (self.current_pattern)(self.userdata) as usize
    }

    fn current_row(&self) -> usize {
        (self.current_row)(self.userdata) as usize
    }

    fn set_position(&mut self, order: usize, row: usize) {
        (self.set_position)(self.userdata, to_u32(order), to_u32(row));
    }

    fn set_channel_mute(&mut self, channel: usize, muted: bool) {
        (self.set_channel_mute)(self.userdata, to_u32(channel), muted);
    }

    fn set_channel_volume(&mut self, channel: usize, volume: f64) {
        (self.set_channel_volume)(self.userdata, to_u32(channel), volume);
    }

    fn set_channel_panning(&mut self, channel: usize, pan: f64) {
        (self.set_channel_panning)(self.userdata, to_u32(channel), pan);
    }

    fn default_channel_panning(&self, channel: usize) -> Option<f64> {
        let query = self.default_channel_panning?;
        let mut pan = 0.0;
        query(self.userdata, to_u32(channel), &mut pan).then_some(pan)
    }

    fn render(&mut self, rate: f64, output: &mut [f32]) -> usize {
        let frames = output.len() / 2;
        let written = (self.render)(self.userdata, rate, output.as_mut_ptr(), frames);
        written.min(frames)
    }

    fn format_cell(&self, pattern: usize, row: usize, channel: usize, out: &mut String) -> bool {
        let mut buf = [0u8; CELL_TEXT_CAPACITY];
        let len = (self.format_cell)(
            self.userdata,
            to_u32(pattern),
            to_u32(row),
            to_u32(channel),
            buf.as_mut_ptr().cast::<c_char>(),
            buf.len(),
        );
        let Ok(len) = usize::try_from(len) else {
            return false;
        };
        let bytes = &buf[..len.min(buf.len())];
        let text = bytes.split(|&b| b == 0).next().unwrap_or_default();
        match std::str::from_utf8(text) {
            Ok(text) => out.push_str(text),
            Err(_) => out.push_str(&String::from_utf8_lossy(text)),
        }
        true
    }

    fn tempo(&self) -> f64 {
        (self.tempo)(self.userdata)
    }

    fn speed(&self) -> u32 {
        (self.speed)(self.userdata)
    }

    fn apply_render_settings(&mut self, settings: &RenderSettings) {
        if let Some(apply) = self.apply_render_settings {
            let raw = GrooveRenderSettings::from(*settings);
            apply(self.userdata, &raw);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Callbacks
// ═══════════════════════════════════════════════════════════════════════════

/// Playback callbacks. Each entry may be NULL.
///
/// Called synchronously on the render thread from `groove_render`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct GrooveCallbacks {
    pub userdata: *mut c_void,
    pub on_order_change: Option<extern "C" fn(*mut c_void, u32, u32)>,
    pub on_row_change: Option<extern "C" fn(*mut c_void, u32, u32)>,
    pub on_loop_pattern: Option<extern "C" fn(*mut c_void, u32, u32)>,
    /// `(active, reason)`, reason 0 = manual, 1 = automatic exit.
    pub on_pattern_mode_change: Option<extern "C" fn(*mut c_void, bool, i32)>,
    /// `(channel, note, instrument, velocity, effect_cmd, effect_param)`.
    /// note: -1 none, -2 note off. instrument/effect: -1 absent.
    pub on_note: Option<extern "C" fn(*mut c_void, u32, i32, i32, i32, i32, i32)>,
}

struct FfiListener {
    callbacks: GrooveCallbacks,
}

unsafe impl Send for FfiListener {}

impl PlaybackListener for FfiListener {
    fn on_order_change(&mut self, order: usize, pattern: usize) {
        if let Some(f) = self.callbacks.on_order_change {
            f(self.callbacks.userdata, to_u32(order), to_u32(pattern));
        }
    }

    fn on_row_change(&mut self, order: usize, row: usize) {
        if let Some(f) = self.callbacks.on_row_change {
            f(self.callbacks.userdata, to_u32(order), to_u32(row));
        }
    }

    fn on_loop_pattern(&mut self, order: usize, pattern: usize) {
        if let Some(f) = self.callbacks.on_loop_pattern {
            f(self.callbacks.userdata, to_u32(order), to_u32(pattern));
        }
    }

    fn on_pattern_mode_change(&mut self, active: bool, reason: PatternModeReason) {
        if let Some(f) = self.callbacks.on_pattern_mode_change {
            f(self.callbacks.userdata, active, reason.code());
        }
    }

    fn on_note(&mut self, event: &NoteEvent) {
        if let Some(f) = self.callbacks.on_note {
            let (effect_cmd, effect_param) = event
                .effect
                .map_or((-1, -1), |e| (e.command as i32, e.param as i32));
            f(
                self.callbacks.userdata,
                to_u32(event.channel),
                event.note_code(),
                event.instrument.map_or(-1, i32::from),
                event.velocity as i32,
                effect_cmd,
                effect_param,
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Opaque Handle Types
// ═══════════════════════════════════════════════════════════════════════════

/// Opaque handle to the ControlHandle (control thread).
pub struct GrooveControl {
    inner: ControlHandle,
}

/// Opaque handle to the Engine (render thread).
pub struct GrooveEngine {
    inner: Engine<FfiDecoder>,
}

// ═══════════════════════════════════════════════════════════════════════════
// FFI Value Types
// ═══════════════════════════════════════════════════════════════════════════

/// Render settings as raw codes.
///
/// interpolation: 0, 1, 2 or 4. dither: 0..=3. amiga_filter: 0..=3.
/// stereo_separation: percent, clamped to 0..=200.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrooveRenderSettings {
    pub interpolation: i32,
    pub stereo_separation: i32,
    pub dither: i32,
    pub amiga_resampler: bool,
    pub amiga_filter: i32,
}

impl From<RenderSettings> for GrooveRenderSettings {
    fn from(s: RenderSettings) -> Self {
        Self {
            interpolation: s.interpolation.code(),
            stereo_separation: s.stereo_separation as i32,
            dither: s.dither.code(),
            amiga_resampler: s.amiga_resampler,
            amiga_filter: s.amiga_filter.code(),
        }
    }
}

impl GrooveRenderSettings {
    /// Apply onto `base`. Invalid codes leave that setting unchanged.
    fn apply_to(&self, mut base: RenderSettings) -> RenderSettings {
        match InterpolationFilter::from_code(self.interpolation) {
            Some(filter) => base.interpolation = filter,
            None => warn!("Ignoring interpolation code {}", self.interpolation),
        }
        match Dither::from_code(self.dither) {
            Some(dither) => base.dither = dither,
            None => warn!("Ignoring dither code {}", self.dither),
        }
        match AmigaFilter::from_code(self.amiga_filter) {
            Some(filter) => base.amiga_filter = filter,
            None => warn!("Ignoring amiga filter code {}", self.amiga_filter),
        }
        base.set_stereo_separation(self.stereo_separation);
        base.amiga_resampler = self.amiga_resampler;
        base
    }
}

/// Configuration for creating an engine.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GrooveConfig {
    /// Sample rate in Hz (e.g., 44100.0, 48000.0).
    pub sample_rate: f64,
    pub render: GrooveRenderSettings,
}

impl Default for GrooveConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            render: RenderSettings::default().into(),
        }
    }
}

/// Loop range; -1 for an order means "the order playing".
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrooveLoopRange {
    pub start_order: i32,
    pub start_row: u32,
    pub end_order: i32,
    pub end_row: u32,
}

fn order_to_raw(order: Option<usize>) -> i32 {
    order.map_or(-1, |o| i32::try_from(o).unwrap_or(i32::MAX))
}

fn order_from_raw(order: i32) -> Option<usize> {
    usize::try_from(order).ok()
}

impl From<LoopRange> for GrooveLoopRange {
    fn from(r: LoopRange) -> Self {
        Self {
            start_order: order_to_raw(r.start_order),
            start_row: to_u32(r.start_row),
            end_order: order_to_raw(r.end_order),
            end_row: to_u32(r.end_row),
        }
    }
}

/// Engine state for UI displays.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrooveReadback {
    pub order: u32,
    pub pattern: u32,
    pub row: u32,
    /// 0 = off, 1 = armed, 2 = active.
    pub loop_state: i32,
    pub pattern_mode: bool,
    /// 0 = none, 1 = next, 2 = prev, 3 = order, 4 = pattern.
    pub pending_jump_kind: i32,
    /// Target order, -1 when nothing is pending.
    pub pending_jump_order: i32,
    pub has_pending_mute_changes: bool,
    pub pitch: f64,
    pub bpm: f64,
    pub effective_bpm: f64,
    pub speed: u32,
}

impl From<EngineReadback> for GrooveReadback {
    fn from(r: EngineReadback) -> Self {
        Self {
            order: to_u32(r.position.order),
            pattern: to_u32(r.position.pattern),
            row: to_u32(r.position.row),
            loop_state: r.loop_state.code() as i32,
            pattern_mode: r.pattern_mode,
            pending_jump_kind: r.pending_jump.code() as i32,
            pending_jump_order: order_to_raw(r.pending_jump.target_order()),
            has_pending_mute_changes: r.has_pending_mute_changes,
            pitch: r.pitch,
            bpm: r.bpm,
            effective_bpm: r.effective_bpm(),
            speed: r.speed,
        }
    }
}

/// Per-channel mute state.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrooveChannelState {
    pub muted: bool,
    pub pending_muted: bool,
    /// 0 = none, 1 = mute, 2 = solo.
    pub queued_action: i32,
}

// ═══════════════════════════════════════════════════════════════════════════
// Creation / Destruction
// ═══════════════════════════════════════════════════════════════════════════

/// Get the default configuration values.
#[unsafe(no_mangle)]
pub extern "C" fn groove_default_config() -> GrooveConfig {
    GrooveConfig::default()
}

/// Create a control handle and engine pair around a host decoder.
///
/// Returns the control handle; the engine handle is returned via
/// `out_engine`. Returns NULL (and leaves `out_engine` untouched) if the
/// vtable is incomplete or the module cannot be played; the decoder's
/// `destroy` is then called right away. NULL `vtable` or `out_engine`
/// returns NULL without touching the decoder.
///
/// # Safety
/// - `vtable` must point to a valid `GrooveDecoderVTable`
/// - `config` must be NULL or point to a valid `GrooveConfig`
/// - `out_engine` must be a valid pointer to store the engine handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_create(
    vtable: *const GrooveDecoderVTable,
    config: *const GrooveConfig,
    out_engine: *mut *mut GrooveEngine,
) -> *mut GrooveControl {
    if vtable.is_null() || out_engine.is_null() {
        return std::ptr::null_mut();
    }

    let vtable = unsafe { &*vtable };
    let Some(decoder) = FfiDecoder::from_vtable(vtable) else {
        warn!("groove_create: decoder vtable is incomplete");
        if let Some(destroy) = vtable.destroy {
            destroy(vtable.userdata);
        }
        return std::ptr::null_mut();
    };

    let cfg = if config.is_null() {
        GrooveConfig::default()
    } else {
        unsafe { std::ptr::read(config) }
    };
    let engine_config = EngineConfig {
        sample_rate: cfg.sample_rate,
        render: cfg.render.apply_to(RenderSettings::default()),
    };

    match create_bridge(decoder, engine_config) {
        Ok((control, engine)) => {
            unsafe {
                *out_engine = Box::into_raw(Box::new(GrooveEngine { inner: engine }));
            }
            Box::into_raw(Box::new(GrooveControl { inner: control }))
        }
        Err(err) => {
            warn!("groove_create: {}", err);
            std::ptr::null_mut()
        }
    }
}

/// Destroy a control handle.
///
/// # Safety
/// `control` must be NULL or a pointer returned by `groove_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_control_destroy(control: *mut GrooveControl) {
    if !control.is_null() {
        unsafe { drop(Box::from_raw(control)) };
    }
}

/// Destroy an engine handle. Calls the decoder's `destroy`.
///
/// # Safety
/// `engine` must be NULL or a pointer returned via `groove_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_engine_destroy(engine: *mut GrooveEngine) {
    if !engine.is_null() {
        unsafe { drop(Box::from_raw(engine)) };
        info!("Engine destroyed");
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Engine - Render Thread
// ═══════════════════════════════════════════════════════════════════════════

/// Render `frames` interleaved stereo frames into `output`.
///
/// Returns the number of frames written.
///
/// # Safety
/// `output` must point to at least `frames * 2` writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_render(
    engine: *mut GrooveEngine,
    output: *mut f32,
    frames: usize,
) -> usize {
    if engine.is_null() || output.is_null() {
        return 0;
    }
    let buffer = unsafe { std::slice::from_raw_parts_mut(output, frames * 2) };
    unsafe { (*engine).inner.render(buffer) }
}

/// Install playback callbacks. NULL removes them.
///
/// # Safety
/// `callbacks` must be NULL or point to a valid `GrooveCallbacks`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_callbacks(
    engine: *mut GrooveEngine,
    callbacks: *const GrooveCallbacks,
) {
    if engine.is_null() {
        return;
    }
    let engine = unsafe { &mut (*engine).inner };
    if callbacks.is_null() {
        engine.clear_listener();
    } else {
        let callbacks = unsafe { std::ptr::read(callbacks) };
        engine.set_listener(Box::new(FfiListener { callbacks }));
    }
}

/// Rows looped in pattern mode (0 = whole pattern).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_custom_loop_rows(engine: *const GrooveEngine) -> u32 {
    if engine.is_null() {
        return 0;
    }
    unsafe { to_u32((*engine).inner.custom_loop_rows()) }
}

/// Row count of the pattern locked by pattern mode.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_full_loop_rows(engine: *const GrooveEngine) -> u32 {
    if engine.is_null() {
        return 0;
    }
    unsafe { to_u32((*engine).inner.full_loop_rows()) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_channel_volume(engine: *const GrooveEngine, channel: u32) -> f64 {
    if engine.is_null() {
        return 0.0;
    }
    unsafe { (*engine).inner.channel_volume(channel as usize) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_channel_panning(
    engine: *const GrooveEngine,
    channel: u32,
) -> f64 {
    if engine.is_null() {
        return 0.5;
    }
    unsafe { (*engine).inner.channel_panning(channel as usize) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_render_settings(
    engine: *const GrooveEngine,
) -> GrooveRenderSettings {
    if engine.is_null() {
        return RenderSettings::default().into();
    }
    unsafe { (*(*engine).inner.render_settings()).into() }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Navigation
// ═══════════════════════════════════════════════════════════════════════════

/// Queue a jump to `order` (starting at `row`) for the next boundary.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_queue_order(control: *mut GrooveControl, order: u32, row: u32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.queue_order(order as usize, row as usize) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_queue_next_order(control: *mut GrooveControl) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.queue_next_order() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_queue_prev_order(control: *mut GrooveControl) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.queue_prev_order() }
}

/// Queue a jump to the first order playing `pattern`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_queue_pattern(control: *mut GrooveControl, pattern: u32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.queue_pattern(pattern as usize) }
}

/// Jump to `pattern` now and make it the pattern-mode loop target.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_jump_to_pattern(control: *mut GrooveControl, pattern: u32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.jump_to_pattern(pattern as usize) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_jump_to_order(control: *mut GrooveControl, order: u32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.jump_to_order(order as usize) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_position_row(control: *mut GrooveControl, row: u32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_position_row(row as usize) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_clear_pending_jump(control: *mut GrooveControl) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.clear_pending_jump() }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Loop Range
// ═══════════════════════════════════════════════════════════════════════════

/// Set the loop range. An order of -1 means "the order playing".
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_loop_range(
    control: *mut GrooveControl,
    start_order: i32,
    start_row: u32,
    end_order: i32,
    end_row: u32,
) -> bool {
    if control.is_null() {
        return false;
    }
    let range = LoopRange::new(
        order_from_raw(start_order),
        start_row as usize,
        order_from_raw(end_order),
        end_row as usize,
    );
    unsafe { (*control).inner.set_loop_range(range) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_loop_range(control: *const GrooveControl) -> GrooveLoopRange {
    if control.is_null() {
        return LoopRange::default().into();
    }
    unsafe { (*control).inner.loop_range().into() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_loop_start_here(control: *mut GrooveControl) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_loop_start_here() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_loop_end_here(control: *mut GrooveControl) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_loop_end_here() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_trigger_loop(control: *mut GrooveControl) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.trigger_loop() }
}

/// Toggle between off and armed (active turns off).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_play_to_loop(control: *mut GrooveControl) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.play_to_loop() }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Pattern Mode
// ═══════════════════════════════════════════════════════════════════════════

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_pattern_mode(control: *mut GrooveControl, enabled: bool) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_pattern_mode(enabled) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_retrigger_pattern(control: *mut GrooveControl) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.retrigger_pattern() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_custom_loop_rows(control: *mut GrooveControl, rows: u32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_custom_loop_rows(rows as usize) }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Channels
// ═══════════════════════════════════════════════════════════════════════════

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_toggle_channel_mute(control: *mut GrooveControl, channel: u32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.toggle_channel_mute(channel as usize) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_toggle_channel_solo(control: *mut GrooveControl, channel: u32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.toggle_channel_solo(channel as usize) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_queue_channel_mute(control: *mut GrooveControl, channel: u32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.queue_channel_mute(channel as usize) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_queue_channel_solo(control: *mut GrooveControl, channel: u32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.queue_channel_solo(channel as usize) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_mute_all(control: *mut GrooveControl) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.mute_all() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_unmute_all(control: *mut GrooveControl) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.unmute_all() }
}

/// Channel volume slider, 0..1.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_channel_volume(
    control: *mut GrooveControl,
    channel: u32,
    volume: f64,
) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_channel_volume(channel as usize, volume) }
}

/// Channel panning, 0 = left, 0.5 = center, 1 = right.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_channel_panning(
    control: *mut GrooveControl,
    channel: u32,
    pan: f64,
) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_channel_panning(channel as usize, pan) }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Transport
// ═══════════════════════════════════════════════════════════════════════════

/// Playback-rate multiplier, clamped to 0.01..=4.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_pitch(control: *mut GrooveControl, pitch: f64) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_pitch(pitch) }
}

/// Forward render settings to the decoder. Invalid codes keep the
/// default for that setting.
///
/// # Safety
/// `settings` must be NULL or point to a valid `GrooveRenderSettings`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_set_render_settings(
    control: *mut GrooveControl,
    settings: *const GrooveRenderSettings,
) -> bool {
    if control.is_null() || settings.is_null() {
        return false;
    }
    let settings = unsafe { (*settings).apply_to(RenderSettings::default()) };
    unsafe { (*control).inner.set_render_settings(settings) }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Readback
// ═══════════════════════════════════════════════════════════════════════════

/// Get the current engine readback state.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_readback(control: *const GrooveControl) -> GrooveReadback {
    if control.is_null() {
        return EngineReadback::default().into();
    }
    unsafe { (*control).inner.readback().into() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_current_order(control: *const GrooveControl) -> u32 {
    unsafe { groove_get_readback(control).order }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_current_pattern(control: *const GrooveControl) -> u32 {
    unsafe { groove_get_readback(control).pattern }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_current_row(control: *const GrooveControl) -> u32 {
    unsafe { groove_get_readback(control).row }
}

/// 0 = off, 1 = armed, 2 = active.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_loop_state(control: *const GrooveControl) -> i32 {
    unsafe { groove_get_readback(control).loop_state }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_is_pattern_mode(control: *const GrooveControl) -> bool {
    unsafe { groove_get_readback(control).pattern_mode }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_pending_jump_kind(control: *const GrooveControl) -> i32 {
    unsafe { groove_get_readback(control).pending_jump_kind }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_pending_jump_order(control: *const GrooveControl) -> i32 {
    unsafe { groove_get_readback(control).pending_jump_order }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_has_pending_mute_changes(control: *const GrooveControl) -> bool {
    unsafe { groove_get_readback(control).has_pending_mute_changes }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_pitch(control: *const GrooveControl) -> f64 {
    unsafe { groove_get_readback(control).pitch }
}

/// Module tempo before pitch adjustment.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_bpm(control: *const GrooveControl) -> f64 {
    unsafe { groove_get_readback(control).bpm }
}

/// Tempo as heard (module tempo divided by pitch).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_effective_bpm(control: *const GrooveControl) -> f64 {
    unsafe { groove_get_readback(control).effective_bpm }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_speed(control: *const GrooveControl) -> u32 {
    unsafe { groove_get_readback(control).speed }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_channel_state(
    control: *const GrooveControl,
    channel: u32,
) -> GrooveChannelState {
    if control.is_null() {
        return GrooveChannelState::default();
    }
    let state = unsafe { (*control).inner.channel(channel as usize) };
    GrooveChannelState {
        muted: state.muted,
        pending_muted: state.pending_muted,
        queued_action: state.queued.code() as i32,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_is_channel_muted(control: *const GrooveControl, channel: u32) -> bool {
    unsafe { groove_get_channel_state(control, channel).muted }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_is_channel_pending_muted(
    control: *const GrooveControl,
    channel: u32,
) -> bool {
    unsafe { groove_get_channel_state(control, channel).pending_muted }
}

/// 0 = none, 1 = mute, 2 = solo.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_get_channel_queued_action(
    control: *const GrooveControl,
    channel: u32,
) -> i32 {
    unsafe { groove_get_channel_state(control, channel).queued_action }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Module Layout
// ═══════════════════════════════════════════════════════════════════════════

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_num_channels(control: *const GrooveControl) -> u32 {
    if control.is_null() {
        return 0;
    }
    unsafe { to_u32((*control).inner.module().num_channels) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_num_orders(control: *const GrooveControl) -> u32 {
    if control.is_null() {
        return 0;
    }
    unsafe { to_u32((*control).inner.module().num_orders()) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_num_patterns(control: *const GrooveControl) -> u32 {
    if control.is_null() {
        return 0;
    }
    unsafe { to_u32((*control).inner.module().num_patterns) }
}

/// Pattern played by `order`, or -1.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_order_pattern(control: *const GrooveControl, order: u32) -> i32 {
    if control.is_null() {
        return -1;
    }
    let pattern = unsafe { (*control).inner.module().order_pattern(order as usize) };
    order_to_raw(pattern)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn groove_pattern_rows(control: *const GrooveControl, pattern: u32) -> u32 {
    if control.is_null() {
        return 0;
    }
    unsafe { to_u32((*control).inner.module().pattern_rows(pattern as usize)) }
}
