// src/decoder/sim.rs
//
// A small deterministic module player.
//
// Used by the tests and the demo binary. It keeps real tracker timing
// (tempo/speed -> frames per row), honours the Bxx (position jump) and Dxx
// (pattern break) effects, triggers a sine voice per channel on notes, and
// applies mute/volume/pan to its output.

use std::f64::consts::TAU;

use crate::config::RenderSettings;
use crate::note_event::{EFFECT_PATTERN_BREAK, EFFECT_POSITION_JUMP, Note, parse_cell};

use super::Decoder;

/// Text of an empty cell.
pub const EMPTY_CELL: &str = "... .. .. ....";

#[derive(Debug, Clone)]
struct SimPattern {
    rows: usize,
    /// `rows * channels` cells, row-major.
    cells: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SimVoice {
    frequency: f64,
    gain: f64,
    phase: f64,
}

/// Deterministic in-memory module.
#[derive(Debug, Clone)]
pub struct SimModule {
    channels: usize,
    patterns: Vec<SimPattern>,
    orders: Vec<usize>,
    tempo: f64,
    speed: u32,

    // Position
    order: usize,
    row: usize,
    frames_into_row: f64,

    // Mixer
    voices: Vec<SimVoice>,
    mutes: Vec<bool>,
    volumes: Vec<f64>,
    pans: Vec<f64>,
    default_pans: Vec<Option<f64>>,

    // Observed by tests
    settings: RenderSettings,
    last_render_rate: f64,
    position_sets: usize,
}

impl SimModule {
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            patterns: Vec::new(),
            orders: Vec::new(),
            tempo: 125.0,
            speed: 6,
            order: 0,
            row: 0,
            frames_into_row: 0.0,
            voices: vec![SimVoice::default(); channels],
            mutes: vec![false; channels],
            volumes: vec![1.0; channels],
            pans: vec![0.0; channels],
            default_pans: vec![None; channels],
            settings: RenderSettings::default(),
            last_render_rate: 0.0,
            position_sets: 0,
        }
    }

    // -------------------------------
    // MARK: Builder
    // -------------------------------

    /// Add an empty pattern and return its index.
    pub fn add_pattern(&mut self, rows: usize) -> usize {
        self.patterns.push(SimPattern {
            rows,
            cells: vec![EMPTY_CELL.to_string(); rows * self.channels],
        });
        self.patterns.len() - 1
    }

    /// Replace the order list and rewind to the start.
    pub fn set_orders(&mut self, orders: &[usize]) {
        self.orders = orders.to_vec();
        self.order = 0;
        self.row = 0;
        self.frames_into_row = 0.0;
    }

    /// Set one cell's text. Out-of-range cells are ignored.
    pub fn set_cell(&mut self, pattern: usize, row: usize, channel: usize, text: &str) {
        let channels = self.channels;
        if channel >= channels {
            return;
        }
        if let Some(p) = self.patterns.get_mut(pattern)
            && row < p.rows
        {
            p.cells[row * channels + channel] = text.to_string();
        }
    }

    pub fn set_tempo(&mut self, tempo: f64, speed: u32) {
        self.tempo = tempo.max(1.0);
        self.speed = speed.max(1);
    }

    /// Module default panning (decoder units, -1..1).
    pub fn set_default_panning(&mut self, channel: usize, pan: f64) {
        if let Some(slot) = self.default_pans.get_mut(channel) {
            *slot = Some(pan.clamp(-1.0, 1.0));
        }
    }

    // -------------------------------
    // MARK: Inspection
    // -------------------------------

    pub fn channel_muted(&self, channel: usize) -> bool {
        self.mutes.get(channel).copied().unwrap_or(false)
    }

    pub fn channel_volume(&self, channel: usize) -> f64 {
        self.volumes.get(channel).copied().unwrap_or(0.0)
    }

    pub fn channel_panning(&self, channel: usize) -> f64 {
        self.pans.get(channel).copied().unwrap_or(0.0)
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Rate passed to the most recent `render` call.
    pub fn last_render_rate(&self) -> f64 {
        self.last_render_rate
    }

    /// Number of `set_position` calls so far.
    pub fn position_sets(&self) -> usize {
        self.position_sets
    }

    /// Output frames one row lasts at `rate`.
    pub fn frames_per_row(&self, rate: f64) -> f64 {
        rate * 2.5 / self.tempo * self.speed as f64
    }

    // -------------------------------
    // MARK: Playback internals
    // -------------------------------

    fn cell(&self, pattern: usize, row: usize, channel: usize) -> Option<&str> {
        let p = self.patterns.get(pattern)?;
        if row >= p.rows || channel >= self.channels {
            return None;
        }
        Some(p.cells[row * self.channels + channel].as_str())
    }

    fn current_pattern_index(&self) -> usize {
        self.orders.get(self.order).copied().unwrap_or(0)
    }

    /// Trigger or release voices for the row just entered.
    fn enter_row(&mut self) {
        let pattern = self.current_pattern_index();
        for channel in 0..self.channels {
            let Some(text) = self.cell(pattern, self.row, channel) else {
                continue;
            };
            let cell = parse_cell(text);
            let voice = &mut self.voices[channel];
            match cell.note {
                Some(Note::On(note)) => {
                    voice.frequency = 440.0 * 2f64.powf((note as f64 - 57.0) / 12.0);
                    voice.gain = cell.volume.unwrap_or(64).min(64) as f64 / 64.0;
                    voice.phase = 0.0;
                }
                Some(Note::Off) => voice.gain = 0.0,
                None => {}
            }
        }
    }

    /// Leave the current row, following Bxx/Dxx on it.
    fn advance_row(&mut self) {
        let pattern = self.current_pattern_index();
        let mut jump_order = None;
        let mut break_row = None;

        for channel in 0..self.channels {
            let Some(effect) = self.cell(pattern, self.row, channel).and_then(|t| parse_cell(t).effect)
            else {
                continue;
            };
            match effect.command {
                EFFECT_POSITION_JUMP => jump_order = Some(effect.param as usize),
                EFFECT_PATTERN_BREAK => break_row = Some(effect.param as usize),
                _ => {}
            }
        }

        let num_orders = self.orders.len().max(1);
        match (jump_order, break_row) {
            (None, None) => {
                let rows = self.pattern_rows(pattern);
                if self.row + 1 < rows {
                    self.row += 1;
                } else {
                    self.row = 0;
                    self.order = (self.order + 1) % num_orders;
                }
            }
            (jump, row) => {
                self.order = jump.unwrap_or(self.order + 1) % num_orders;
                let rows = self.pattern_rows(self.current_pattern_index());
                self.row = row.filter(|&r| r < rows).unwrap_or(0);
            }
        }

        self.enter_row();
    }
}

impl Decoder for SimModule {
    fn num_channels(&self) -> usize {
        self.channels
    }

    fn num_orders(&self) -> usize {
        self.orders.len()
    }

    fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    fn order_pattern(&self, order: usize) -> Option<usize> {
        self.orders.get(order).copied()
    }

    fn pattern_rows(&self, pattern: usize) -> usize {
        self.patterns.get(pattern).map_or(0, |p| p.rows)
    }

    fn current_order(&self) -> usize {
        self.order
    }

    fn current_pattern(&self) -> usize {
        self.current_pattern_index()
    }

    fn current_row(&self) -> usize {
        self.row
    }

    fn set_position(&mut self, order: usize, row: usize) {
        self.position_sets += 1;
        if order >= self.orders.len() {
            return;
        }
        self.order = order;
        self.row = row;
        self.frames_into_row = 0.0;
        for voice in &mut self.voices {
            voice.gain = 0.0;
        }
        self.enter_row();
    }

    fn set_channel_mute(&mut self, channel: usize, muted: bool) {
        if let Some(slot) = self.mutes.get_mut(channel) {
            *slot = muted;
        }
    }

    fn set_channel_volume(&mut self, channel: usize, volume: f64) {
        if let Some(slot) = self.volumes.get_mut(channel) {
            *slot = volume;
        }
    }

    fn set_channel_panning(&mut self, channel: usize, pan: f64) {
        if let Some(slot) = self.pans.get_mut(channel) {
            *slot = pan;
        }
    }

    fn default_channel_panning(&self, channel: usize) -> Option<f64> {
        self.default_pans.get(channel).copied().flatten()
    }

    fn render(&mut self, rate: f64, output: &mut [f32]) -> usize {
        self.last_render_rate = rate;
        let frames = output.len() / 2;
        if self.orders.is_empty() || rate <= 0.0 {
            output.fill(0.0);
            return frames;
        }

        let frames_per_row = self.frames_per_row(rate).max(1.0);

        for frame in output.chunks_exact_mut(2) {
            if self.frames_into_row >= frames_per_row {
                self.frames_into_row -= frames_per_row;
                self.advance_row();
            }

            let mut left = 0.0;
            let mut right = 0.0;
            for channel in 0..self.channels {
                let voice = &mut self.voices[channel];
                if voice.gain <= 0.0 {
                    continue;
                }
                let sample = voice.phase.sin() * voice.gain;
                voice.phase = (voice.phase + TAU * voice.frequency / rate) % TAU;
                if self.mutes[channel] {
                    continue;
                }
                let level = sample * self.volumes[channel] / self.channels as f64;
                let pan = self.pans[channel];
                left += level * (1.0 - pan) * 0.5;
                right += level * (1.0 + pan) * 0.5;
            }
            frame[0] = left as f32;
            frame[1] = right as f32;

            self.frames_into_row += 1.0;
        }

        frames
    }

    fn format_cell(&self, pattern: usize, row: usize, channel: usize, out: &mut String) -> bool {
        match self.cell(pattern, row, channel) {
            Some(text) => {
                out.push_str(text);
                true
            }
            None => false,
        }
    }

    fn tempo(&self) -> f64 {
        self.tempo
    }

    fn speed(&self) -> u32 {
        self.speed
    }

    fn apply_render_settings(&mut self, settings: &RenderSettings) {
        self.settings = *settings;
    }
}
