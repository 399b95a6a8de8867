// src/decoder/mod.rs
//
// The module decoder seam.
//
// The engine never touches sample data or pattern storage. Everything it
// knows about the song comes through this trait, and every position change
// it makes goes back through it.

mod sim;

pub use sim::SimModule;

use crate::config::RenderSettings;
use crate::state::PlaybackSnapshot;

/// A module-file player.
///
/// Decoders:
/// - own samples, patterns and the playback position
/// - render interleaved stereo
/// - may reset per-channel state when the position is set
///
/// All methods are called from the render thread only.
pub trait Decoder: Send {
    /// Number of tracker channels.
    fn num_channels(&self) -> usize;

    /// Length of the order list.
    fn num_orders(&self) -> usize;

    /// Number of patterns in the module.
    fn num_patterns(&self) -> usize;

    /// Pattern referenced by `order`, or `None` for an invalid order.
    fn order_pattern(&self, order: usize) -> Option<usize>;

    /// Row count of `pattern` (0 for an invalid pattern).
    fn pattern_rows(&self, pattern: usize) -> usize;

    fn current_order(&self) -> usize;

    fn current_pattern(&self) -> usize;

    fn current_row(&self) -> usize;

    /// Move playback to `(order, row)`.
    fn set_position(&mut self, order: usize, row: usize);

    fn set_channel_mute(&mut self, channel: usize, muted: bool);

    /// Channel volume, `0.0..=1.0`.
    fn set_channel_volume(&mut self, channel: usize, volume: f64);

    /// Channel panning in decoder units, `-1.0` (left) ..= `1.0` (right).
    fn set_channel_panning(&mut self, channel: usize, pan: f64);

    /// Module default panning in decoder units, if the decoder exposes it.
    fn default_channel_panning(&self, _channel: usize) -> Option<f64> {
        None
    }

    /// Render interleaved stereo frames into `output`.
    ///
    /// `rate` is the sample rate the decoder should render for.
    /// Returns the number of frames written.
    fn render(&mut self, rate: f64, output: &mut [f32]) -> usize;

    /// Write the formatted text of one pattern cell into `out`.
    ///
    /// Returns `false` if the cell does not exist.
    fn format_cell(&self, pattern: usize, row: usize, channel: usize, out: &mut String) -> bool;

    /// Module tempo in BPM (before pitch adjustment).
    fn tempo(&self) -> f64;

    /// Ticks per row.
    fn speed(&self) -> u32;

    /// Apply render quality settings. Decoders without such knobs ignore them.
    fn apply_render_settings(&mut self, _settings: &RenderSettings) {}

    /// Current position.
    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot::new(self.current_order(), self.current_pattern(), self.current_row())
    }

    /// First order that plays `pattern`.
    fn find_order_for_pattern(&self, pattern: usize) -> Option<usize> {
        (0..self.num_orders()).find(|&order| self.order_pattern(order) == Some(pattern))
    }
}
