// src/note_event.rs
//
// Turns the decoder's formatted pattern cells into structured note events.
//
// Cell layout (fixed columns):
//
//   0..3   note        "C-4", "D#5", "===" / "OFF" (note off), "..." (none)
//   4..6   instrument  two hex digits
//   7..9   volume      two hex digits (0x00..=0x40)
//   10..   effect      "CPP" (one-digit command) or "CCPP" (two-digit command)
//
// A '.' anywhere in a field means the field is empty. Anything that does not
// parse is treated as empty.

use crate::decoder::Decoder;
use crate::state::PlaybackSnapshot;

/// Pattern volume used when a cell has no volume column.
pub const DEFAULT_NOTE_VOLUME: u8 = 64;

/// Bxx: jump to order xx.
pub const EFFECT_POSITION_JUMP: u8 = 0x0B;
/// Dxx: break to row xx of the next order.
pub const EFFECT_PATTERN_BREAK: u8 = 0x0D;

/// Note column contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    /// Tracker note number, `octave * 12 + semitone` (C-4 = 48).
    On(u8),
    /// Note off / key off.
    Off,
}

/// Effect column contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub command: u8,
    pub param: u8,
}

/// One decoded pattern cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub note: Option<Note>,
    pub instrument: Option<u8>,
    /// Raw pattern volume.
    pub volume: Option<u8>,
    pub effect: Option<Effect>,
}

impl Cell {
    /// Effect command, 0 when the column is empty.
    pub fn effect_command(&self) -> u8 {
        self.effect.map_or(0, |e| e.command)
    }

    /// Bxx or Dxx: the cell moves playback on its own.
    pub fn changes_position(&self) -> bool {
        matches!(
            self.effect_command(),
            EFFECT_POSITION_JUMP | EFFECT_PATTERN_BREAK
        )
    }

    /// A cell produces an event when it has a note or a non-zero effect.
    pub fn is_event(&self) -> bool {
        self.note.is_some() || self.effect_command() != 0
    }
}

/// A note event for listeners (UI, MIDI out).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub channel: usize,
    pub note: Option<Note>,
    pub instrument: Option<u8>,
    /// Pattern volume scaled by the channel volume slider.
    pub velocity: u8,
    pub effect: Option<Effect>,
}

impl NoteEvent {
    /// Note as a signed code: note number, -1 = none, -2 = note off.
    pub fn note_code(&self) -> i32 {
        match self.note {
            Some(Note::On(n)) => n as i32,
            Some(Note::Off) => -2,
            None => -1,
        }
    }
}

/// Decode a formatted cell. Never fails; bad fields come back empty.
pub fn parse_cell(text: &str) -> Cell {
    let bytes = text.as_bytes();

    Cell {
        note: parse_note(bytes),
        instrument: hex_field(bytes, 4, 6),
        volume: hex_field(bytes, 7, 9),
        effect: parse_effect(bytes),
    }
}

fn parse_note(bytes: &[u8]) -> Option<Note> {
    let field = bytes.get(0..3)?;
    if field == b"===" || field == b"OFF" {
        return Some(Note::Off);
    }

    let semitone = match field[0] {
        b'C' => 0,
        b'D' => 2,
        b'E' => 4,
        b'F' => 5,
        b'G' => 7,
        b'A' => 9,
        b'B' => 11,
        _ => return None,
    };
    let sharp = match field[1] {
        b'#' => 1,
        b'-' => 0,
        _ => return None,
    };
    if !field[2].is_ascii_digit() {
        return None;
    }
    let octave = field[2] - b'0';

    Some(Note::On(octave * 12 + semitone + sharp))
}

fn parse_effect(bytes: &[u8]) -> Option<Effect> {
    // Two-digit command form first ("0F01"), then the one-digit form ("F01").
    if let (Some(command), Some(param)) = (hex_field(bytes, 10, 12), hex_field(bytes, 12, 14)) {
        return Some(Effect { command, param });
    }
    let command = hex_field(bytes, 10, 11)?;
    let param = hex_field(bytes, 11, 13)?;
    Some(Effect { command, param })
}

fn hex_field(bytes: &[u8], start: usize, end: usize) -> Option<u8> {
    let field = bytes.get(start..end)?;
    let mut value: u32 = 0;
    for &b in field {
        let digit = (b as char).to_digit(16)?;
        value = value * 16 + digit;
    }
    u8::try_from(value).ok()
}

/// Velocity for a note: pattern volume (or the default) times the slider.
pub fn scaled_velocity(volume: Option<u8>, channel_volume: f64) -> u8 {
    let raw = volume.unwrap_or(DEFAULT_NOTE_VOLUME) as f64;
    (raw * channel_volume.clamp(0.0, 1.0)).round() as u8
}

/// Extracts note events for one row.
///
/// Holds scratch buffers so extraction does not allocate once warmed up.
pub struct NoteEventExtractor {
    cell_text: String,
    events: Vec<NoteEvent>,
}

impl NoteEventExtractor {
    pub fn new(num_channels: usize) -> Self {
        Self {
            cell_text: String::with_capacity(32),
            events: Vec::with_capacity(num_channels),
        }
    }

    /// Decode every unmuted channel at `position`.
    pub fn extract(
        &mut self,
        decoder: &dyn Decoder,
        position: PlaybackSnapshot,
        muted: &[bool],
        volumes: &[f64],
    ) -> &[NoteEvent] {
        self.events.clear();

        for channel in 0..decoder.num_channels() {
            if muted.get(channel).copied().unwrap_or(false) {
                continue;
            }

            self.cell_text.clear();
            if !decoder.format_cell(position.pattern, position.row, channel, &mut self.cell_text) {
                continue;
            }

            let cell = parse_cell(&self.cell_text);
            if !cell.is_event() {
                continue;
            }

            let channel_volume = volumes.get(channel).copied().unwrap_or(1.0);
            self.events.push(NoteEvent {
                channel,
                note: cell.note,
                instrument: cell.instrument,
                velocity: scaled_velocity(cell.volume, channel_volume),
                effect: cell.effect,
            });
        }

        &self.events
    }
}
