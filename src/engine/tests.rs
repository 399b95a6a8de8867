// src/engine/tests.rs
//
// Scenario tests: control handle -> command queue -> engine -> SimModule.
//
// Timing used throughout: 1000 Hz, tempo 125, speed 1 gives 20 frames per
// row. Most render calls are 8 frames, so each row is seen at least twice;
// the `render_frames` cases use calls that span more than one row.

use std::sync::{Arc, Mutex};

use super::Engine;
use crate::bridge::{ControlHandle, create_bridge};
use crate::callbacks::PlaybackListener;
use crate::config::{EngineConfig, InterpolationFilter, RenderSettings};
use crate::decoder::{Decoder, SimModule};
use crate::note_event::{Effect, Note, NoteEvent};
use crate::state::{LoopRange, LoopState, PatternModeReason, PendingJump, QueuedAction};

const RATE: f64 = 1000.0;
const FRAMES: usize = 8;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Order(usize, usize),
    Row(usize, usize),
    Loop(usize, usize),
    Mode(bool, PatternModeReason),
    Note(NoteEvent),
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn loops(&self) -> Vec<(usize, usize)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Loop(order, pattern) => Some((*order, *pattern)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl PlaybackListener for Recorder {
    fn on_order_change(&mut self, order: usize, pattern: usize) {
        self.push(Event::Order(order, pattern));
    }

    fn on_row_change(&mut self, order: usize, row: usize) {
        self.push(Event::Row(order, row));
    }

    fn on_loop_pattern(&mut self, order: usize, pattern: usize) {
        self.push(Event::Loop(order, pattern));
    }

    fn on_pattern_mode_change(&mut self, active: bool, reason: PatternModeReason) {
        self.push(Event::Mode(active, reason));
    }

    fn on_note(&mut self, event: &NoteEvent) {
        self.push(Event::Note(*event));
    }
}

/// One pattern per order, pattern `i` at order `i`, with the given rows.
fn song(rows: &[usize]) -> SimModule {
    let mut sim = SimModule::new(4);
    let orders: Vec<usize> = rows.iter().map(|&r| sim.add_pattern(r)).collect();
    sim.set_orders(&orders);
    sim.set_tempo(125.0, 1);
    sim
}

fn setup(sim: SimModule) -> (ControlHandle, Engine<SimModule>, Recorder) {
    let (control, mut engine) =
        create_bridge(sim, EngineConfig::with_sample_rate(RATE)).unwrap();
    let recorder = Recorder::default();
    engine.set_listener(Box::new(recorder.clone()));
    (control, engine, recorder)
}

fn render(engine: &mut Engine<SimModule>) -> usize {
    let mut buffer = [0.0f32; FRAMES * 2];
    engine.render(&mut buffer)
}

fn render_frames(engine: &mut Engine<SimModule>, frames: usize) -> usize {
    let mut buffer = vec![0.0f32; frames * 2];
    engine.render(&mut buffer)
}

/// Render until `done` holds after a call. Returns `false` on timeout.
fn render_until(
    engine: &mut Engine<SimModule>,
    max_calls: usize,
    mut done: impl FnMut(&Engine<SimModule>) -> bool,
) -> bool {
    for _ in 0..max_calls {
        render(engine);
        if done(engine) {
            return true;
        }
    }
    false
}

// ═══════════════════════════════════════════
// Command queue
// ═══════════════════════════════════════════

#[test]
fn test_queue_drop_law() {
    let mut sim = SimModule::new(8);
    let p = sim.add_pattern(16);
    sim.set_orders(&[p]);
    let (mut control, mut engine, _) = setup(sim);

    let sent: Vec<bool> = (0..8).map(|ch| control.queue_channel_mute(ch)).collect();
    assert_eq!(sent, vec![true, true, true, true, true, true, true, false]);

    render(&mut engine);
    for ch in 0..7 {
        assert!(engine.is_channel_pending_muted(ch));
    }
    assert!(!engine.is_channel_pending_muted(7));
}

// ═══════════════════════════════════════════
// Mute / solo
// ═══════════════════════════════════════════

#[test]
fn test_queued_mute_toggle_is_idempotent() {
    let (mut control, mut engine, _) = setup(song(&[16, 16]));
    control.queue_channel_mute(1);
    control.queue_channel_mute(1);
    render(&mut engine);

    assert_eq!(engine.is_channel_pending_muted(1), engine.is_channel_muted(1));
    assert!(!engine.has_pending_mute_changes());
    assert_eq!(engine.queued_action(1), QueuedAction::None);
}

#[test]
fn test_queued_solo_exclusivity() {
    let (mut control, mut engine, _) = setup(song(&[16, 16]));
    control.queue_channel_solo(2);
    render(&mut engine);
    for ch in 0..4 {
        assert_eq!(engine.is_channel_pending_muted(ch), ch != 2);
        assert!(!engine.is_channel_muted(ch));
    }
    assert_eq!(engine.queued_action(2), QueuedAction::Solo);
    assert_eq!(control.channel(2).queued, QueuedAction::Solo);

    control.queue_channel_solo(2);
    render(&mut engine);
    for ch in 0..4 {
        assert!(!engine.is_channel_pending_muted(ch));
    }
    assert!(!engine.has_pending_mute_changes());
}

#[test]
fn test_queued_mute_commits_at_song_boundary() {
    let (mut control, mut engine, _) = setup(song(&[4, 4, 4]));
    control.queue_channel_mute(1);
    render(&mut engine);
    assert!(engine.has_pending_mute_changes());
    assert!(!engine.decoder().channel_muted(1));

    let crossed = render_until(&mut engine, 20, |e| e.position().order == 1);
    assert!(crossed);
    assert!(engine.is_channel_muted(1));
    assert!(engine.decoder().channel_muted(1));
    assert!(!engine.has_pending_mute_changes());
    assert_eq!(engine.queued_action(1), QueuedAction::None);
}

#[test]
fn test_immediate_mute_solo_and_mute_all() {
    let (mut control, mut engine, _) = setup(song(&[16]));
    control.toggle_channel_solo(3);
    render(&mut engine);
    for ch in 0..4 {
        assert_eq!(engine.decoder().channel_muted(ch), ch != 3);
    }

    control.unmute_all();
    render(&mut engine);
    assert!((0..4).all(|ch| !engine.is_channel_muted(ch)));

    control.mute_all();
    control.toggle_channel_mute(0);
    render(&mut engine);
    assert!(!engine.decoder().channel_muted(0));
    assert!(engine.decoder().channel_muted(1));
}

// ═══════════════════════════════════════════
// Mixer
// ═══════════════════════════════════════════

#[test]
fn test_volume_and_panning_apply_immediately() {
    let (mut control, mut engine, _) = setup(song(&[16]));
    control.set_channel_volume(1, 0.25);
    control.set_channel_panning(1, 1.0);
    render(&mut engine);
    assert_eq!(engine.decoder().channel_volume(1), 0.25);
    assert_eq!(engine.decoder().channel_panning(1), 1.0);
    assert_eq!(engine.channel_panning(1), 1.0);

    // A muted channel keeps its slider value but the decoder is not touched.
    control.toggle_channel_mute(1);
    control.set_channel_volume(1, 0.5);
    render(&mut engine);
    assert_eq!(engine.channel_volume(1), 0.5);
    assert_eq!(engine.decoder().channel_volume(1), 0.25);

    control.toggle_channel_mute(1);
    render(&mut engine);
    assert_eq!(engine.decoder().channel_volume(1), 0.5);
}

#[test]
fn test_mixer_is_restored_after_reposition() {
    let (mut control, mut engine, _) = setup(song(&[16, 16]));
    control.set_channel_volume(0, 0.3);
    control.toggle_channel_mute(2);
    render(&mut engine);

    control.jump_to_order(1);
    render(&mut engine);
    assert_eq!(engine.position().order, 1);
    assert_eq!(engine.decoder().channel_volume(0), 0.3);
    assert!(engine.decoder().channel_muted(2));
}

// ═══════════════════════════════════════════
// Loop range
// ═══════════════════════════════════════════

#[test]
fn test_trigger_loop_jumps_and_activates() {
    let (mut control, mut engine, _) = setup(song(&[64; 8]));
    control.set_loop_range(LoopRange::new(Some(2), 0, Some(5), 63));
    control.trigger_loop();
    render(&mut engine);

    assert_eq!(engine.loop_state(), LoopState::Active);
    assert_eq!(control.readback().loop_state, LoopState::Active);
    let position = engine.position();
    assert_eq!((position.order, position.row), (2, 0));
}

#[test]
fn test_armed_loop_activates_when_start_is_reached() {
    let (mut control, mut engine, recorder) = setup(song(&[4; 6]));
    control.set_loop_range(LoopRange::new(Some(1), 0, Some(3), 63));
    control.play_to_loop();
    render(&mut engine);
    assert_eq!(engine.loop_state(), LoopState::Armed);

    let reached = render_until(&mut engine, 20, |e| {
        if e.position().order == 0 {
            assert_eq!(e.loop_state(), LoopState::Armed);
        }
        e.position().order == 1
    });
    assert!(reached);
    assert_eq!(engine.loop_state(), LoopState::Active);

    // Playing past order 3 wraps back to the loop start.
    let wrapped = render_until(&mut engine, 60, |_| !recorder.loops().is_empty());
    assert!(wrapped);
    assert_eq!(recorder.loops(), vec![(1, 1)]);
    let position = engine.position();
    assert_eq!((position.order, position.row), (1, 0));
}

#[test]
fn test_play_to_loop_turns_active_loop_off() {
    let (mut control, mut engine, _) = setup(song(&[4; 4]));
    control.set_loop_range(LoopRange::new(Some(0), 0, Some(0), 2));
    control.trigger_loop();
    render(&mut engine);
    control.play_to_loop();
    render(&mut engine);
    assert_eq!(engine.loop_state(), LoopState::Off);

    let escaped = render_until(&mut engine, 20, |e| e.position().order == 1);
    assert!(escaped);
}

#[test]
fn test_trigger_loop_commits_pending_mutes() {
    let (mut control, mut engine, _) = setup(song(&[16, 16]));
    control.queue_channel_mute(2);
    control.set_loop_range(LoopRange::new(None, 4, None, 8));
    control.trigger_loop();
    render(&mut engine);

    assert!(engine.is_channel_muted(2));
    assert_eq!(engine.position().row, 4);
}

#[test]
fn test_loop_range_takes_priority_over_pattern_mode() {
    let (mut control, mut engine, recorder) = setup(song(&[4, 4, 4]));
    control.set_pattern_mode(true);
    control.set_loop_range(LoopRange::new(Some(0), 0, Some(1), 1));
    control.trigger_loop();

    let mut reached_order_1 = false;
    let wrapped = render_until(&mut engine, 40, |e| {
        reached_order_1 |= e.position().order == 1;
        !recorder.loops().is_empty()
    });
    assert!(wrapped);
    assert!(reached_order_1);
    assert_eq!(recorder.loops(), vec![(0, 0)]);
}

#[test]
fn test_loop_range_wraps_with_renders_longer_than_a_row() {
    let (mut control, mut engine, recorder) = setup(song(&[4, 4, 4, 4]));
    control.set_loop_range(LoopRange::new(Some(0), 0, Some(0), 3));
    control.trigger_loop();

    // 30 frames = 1.5 rows; the third call runs from row 3 into order 1.
    for _ in 0..12 {
        render_frames(&mut engine, 30);
        assert_eq!(engine.position().order, 0);
    }
    assert_eq!(recorder.loops(), vec![(0, 0); 4]);
    assert_eq!(engine.loop_state(), LoopState::Active);
}

// ═══════════════════════════════════════════
// Pattern mode
// ═══════════════════════════════════════════

#[test]
fn test_pattern_mode_holds_with_renders_longer_than_a_row() {
    let (mut control, mut engine, recorder) = setup(song(&[4, 4, 4, 4]));
    control.set_pattern_mode(true);

    // Neither row 3 nor row 0 of order 1 ends a call, yet the pattern
    // end is recognised every third call.
    for _ in 0..12 {
        render_frames(&mut engine, 30);
        assert_eq!(engine.position().order, 0);
        assert_eq!(engine.loop_order(), 0);
    }
    assert_eq!(recorder.loops(), vec![(0, 0); 4]);
    assert!(engine.is_pattern_mode());
}

#[test]
fn test_pattern_mode_holds_when_a_render_covers_the_whole_pattern() {
    let (mut control, mut engine, recorder) = setup(song(&[4, 4, 4, 4]));
    control.set_pattern_mode(true);

    // 90 frames = 4.5 rows: every call crosses into order 1.
    for _ in 0..5 {
        render_frames(&mut engine, 90);
        let position = engine.position();
        assert_eq!((position.order, position.row), (0, 0));
    }
    assert_eq!(recorder.loops(), vec![(0, 0); 5]);
}

#[test]
fn test_pattern_break_escapes_with_renders_longer_than_a_row() {
    let mut sim = song(&[8, 8, 8, 8]);
    // A break on the last row lands where the pattern end would have.
    sim.set_cell(0, 7, 1, "... .. .. 0D00");
    let (mut control, mut engine, recorder) = setup(sim);
    control.set_pattern_mode(true);

    // 50 frames = 2.5 rows; the fourth call runs from row 7 to (1, 1).
    for _ in 0..4 {
        render_frames(&mut engine, 50);
    }
    assert_eq!(engine.position().order, 1);
    assert_eq!(engine.loop_order(), 1);
    assert_eq!(recorder.loops(), vec![(1, 1)]);
    assert!(engine.is_pattern_mode());
}

#[test]
fn test_pattern_mode_wraps_once_per_pattern_end() {
    let (mut control, mut engine, recorder) = setup(song(&[64; 8]));
    control.jump_to_order(4);
    control.set_pattern_mode(true);

    let wrapped = render_until(&mut engine, 400, |e| {
        assert_eq!(e.position().order, 4);
        !recorder.loops().is_empty()
    });
    assert!(wrapped);
    assert_eq!(recorder.loops(), vec![(4, 4)]);
    let position = engine.position();
    assert_eq!((position.order, position.row), (4, 0));

    for _ in 0..10 {
        render(&mut engine);
    }
    assert_eq!(recorder.loops().len(), 1);

    let events = recorder.take();
    let modes: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::Mode(..)))
        .collect();
    assert_eq!(modes, vec![&Event::Mode(true, PatternModeReason::Manual)]);
}

#[test]
fn test_pattern_mode_escape_adopts_new_order() {
    let mut sim = song(&[16; 8]);
    sim.set_cell(4, 10, 0, "... .. .. 0B07");
    let (mut control, mut engine, recorder) = setup(sim);
    control.jump_to_order(4);
    control.set_pattern_mode(true);

    let escaped = render_until(&mut engine, 200, |e| e.position().order != 4);
    assert!(escaped);
    assert_eq!(engine.position().order, 7);
    assert_eq!(engine.loop_order(), 7);
    assert_eq!(engine.full_loop_rows(), 16);
    assert_eq!(recorder.loops(), vec![(7, 7)]);
    assert!(engine.is_pattern_mode());

    // Order 7 is now locked: its end wraps back to itself.
    let wrapped = render_until(&mut engine, 200, |e| {
        assert_eq!(e.position().order, 7);
        recorder.loops().len() == 2
    });
    assert!(wrapped);
    assert_eq!(recorder.loops(), vec![(7, 7), (7, 7)]);
}

#[test]
fn test_pattern_mode_escape_into_empty_pattern_exits() {
    let mut sim = song(&[8, 8, 0, 8]);
    sim.set_cell(0, 1, 2, "... .. .. 0B02");
    let (mut control, mut engine, recorder) = setup(sim);
    control.set_pattern_mode(true);

    let exited = render_until(&mut engine, 40, |e| !e.is_pattern_mode());
    assert!(exited);
    let modes: Vec<Event> = recorder
        .take()
        .into_iter()
        .filter(|e| matches!(e, Event::Mode(..)))
        .collect();
    assert_eq!(
        modes,
        vec![
            Event::Mode(true, PatternModeReason::Manual),
            Event::Mode(false, PatternModeReason::AutoExit),
        ]
    );
    assert!(!control.readback().pattern_mode);
}

#[test]
fn test_pending_jump_to_natural_next_order_is_adopted() {
    let (mut control, mut engine, recorder) = setup(song(&[4, 4, 4]));
    control.set_pattern_mode(true);
    control.queue_next_order();
    render(&mut engine);
    assert_eq!(engine.pending_jump(), PendingJump::Next(1));
    assert_eq!(control.readback().pending_jump, PendingJump::Next(1));

    let fired = render_until(&mut engine, 40, |_| !recorder.loops().is_empty());
    assert!(fired);
    assert_eq!(recorder.loops(), vec![(1, 1)]);
    assert_eq!(engine.loop_order(), 1);
    assert_eq!(engine.position().order, 1);
    assert_eq!(engine.pending_jump(), PendingJump::None);
    // The decoder got there on its own.
    assert_eq!(engine.decoder().position_sets(), 0);
}

#[test]
fn test_pending_jump_elsewhere_repositions_and_rerenders() {
    let (mut control, mut engine, recorder) = setup(song(&[4, 4, 4, 4]));
    control.set_pattern_mode(true);
    control.queue_order(3, 0);

    let fired = render_until(&mut engine, 40, |_| !recorder.loops().is_empty());
    assert!(fired);
    assert_eq!(recorder.loops(), vec![(3, 3)]);
    assert_eq!(engine.loop_order(), 3);
    assert_eq!(engine.decoder().position_sets(), 1);

    // The buffer was re-rendered from the new position.
    let position = engine.position();
    assert_eq!((position.order, position.row), (3, 0));
    assert_eq!(engine.pending_jump(), PendingJump::None);

    let events = recorder.take();
    assert!(events.contains(&Event::Order(3, 3)));
}

#[test]
fn test_queue_pattern_in_pattern_mode_targets_first_order() {
    let mut sim = SimModule::new(2);
    let a = sim.add_pattern(4);
    let b = sim.add_pattern(4);
    sim.set_orders(&[a, a, b, b]);
    sim.set_tempo(125.0, 1);
    let (mut control, mut engine, _) = setup(sim);

    control.set_pattern_mode(true);
    control.queue_pattern(b);
    render(&mut engine);
    assert_eq!(engine.pending_jump(), PendingJump::Pattern(2));

    control.clear_pending_jump();
    render(&mut engine);
    assert_eq!(engine.pending_jump(), PendingJump::None);
}

#[test]
fn test_custom_loop_rows_limit_the_loop() {
    let (mut control, mut engine, recorder) = setup(song(&[16, 16]));
    control.set_pattern_mode(true);
    control.set_custom_loop_rows(4);

    for _ in 0..60 {
        render(&mut engine);
        let position = engine.position();
        assert_eq!(position.order, 0);
        assert!(position.row < 4);
    }
    assert!(!recorder.loops().is_empty());
    assert_eq!(engine.custom_loop_rows(), 4);
}

#[test]
fn test_jump_to_pattern_sets_loop_target() {
    let (mut control, mut engine, recorder) = setup(song(&[4, 4, 4, 4]));
    control.set_pattern_mode(true);
    control.jump_to_pattern(2);
    render(&mut engine);
    assert_eq!(engine.position().order, 2);
    assert_eq!(engine.loop_order(), 2);

    let wrapped = render_until(&mut engine, 40, |_| !recorder.loops().is_empty());
    assert!(wrapped);
    assert_eq!(recorder.loops(), vec![(2, 2)]);
    assert_eq!(engine.position().order, 2);
}

#[test]
fn test_pattern_mode_toggle_notifies_on_change_only() {
    let (mut control, mut engine, recorder) = setup(song(&[16]));
    control.set_pattern_mode(true);
    control.set_pattern_mode(true);
    control.set_pattern_mode(false);
    control.set_pattern_mode(false);
    render(&mut engine);

    let modes: Vec<Event> = recorder
        .take()
        .into_iter()
        .filter(|e| matches!(e, Event::Mode(..)))
        .collect();
    assert_eq!(
        modes,
        vec![
            Event::Mode(true, PatternModeReason::Manual),
            Event::Mode(false, PatternModeReason::Manual),
        ]
    );
}

// ═══════════════════════════════════════════
// Song mode navigation
// ═══════════════════════════════════════════

#[test]
fn test_song_mode_queued_jump_fires_at_boundary() {
    let (mut control, mut engine, _) = setup(song(&[4, 4, 4, 8]));
    control.queue_order(3, 2);
    render(&mut engine);
    assert_eq!(engine.pending_jump(), PendingJump::Order(3));
    assert_eq!(engine.position().order, 0);

    let jumped = render_until(&mut engine, 20, |e| e.position().order != 0);
    assert!(jumped);
    let position = engine.position();
    assert_eq!((position.order, position.row), (3, 2));
    assert_eq!(engine.pending_jump(), PendingJump::None);
}

#[test]
fn test_queue_next_on_last_order_is_ignored() {
    let (mut control, mut engine, _) = setup(song(&[4, 4]));
    control.jump_to_order(1);
    control.queue_next_order();
    render(&mut engine);
    assert_eq!(engine.pending_jump(), PendingJump::None);

    control.queue_prev_order();
    render(&mut engine);
    assert_eq!(engine.pending_jump(), PendingJump::Prev(0));
}

#[test]
fn test_retrigger_and_set_position_row() {
    let (mut control, mut engine, _) = setup(song(&[16, 16]));
    control.set_position_row(100);
    render(&mut engine);
    assert_eq!(engine.position().row, 15);

    control.set_position_row(6);
    render(&mut engine);
    assert_eq!(engine.position().row, 6);

    control.retrigger_pattern();
    render(&mut engine);
    let position = engine.position();
    assert_eq!((position.order, position.row), (0, 0));
}

// ═══════════════════════════════════════════
// Callbacks
// ═══════════════════════════════════════════

#[test]
fn test_notes_are_scaled_and_precede_row_change() {
    let mut sim = song(&[4, 4]);
    sim.set_cell(0, 1, 0, "C-4 01 40 0F01");
    sim.set_cell(0, 1, 1, "D-4 02 40 ....");
    let (mut control, mut engine, recorder) = setup(sim);
    control.set_channel_volume(0, 0.5);
    control.toggle_channel_mute(1);

    render(&mut engine);
    assert_eq!(
        recorder.take(),
        vec![Event::Order(0, 0), Event::Row(0, 0)]
    );

    let reached = render_until(&mut engine, 10, |e| e.position().row == 1);
    assert!(reached);
    let expected_note = NoteEvent {
        channel: 0,
        note: Some(Note::On(48)),
        instrument: Some(1),
        velocity: 32,
        effect: Some(Effect {
            command: 0x0F,
            param: 0x01,
        }),
    };
    assert_eq!(
        recorder.take(),
        vec![Event::Note(expected_note), Event::Row(0, 1)]
    );
}

#[test]
fn test_row_callback_fires_once_per_row() {
    let (_control, mut engine, recorder) = setup(song(&[4, 4]));
    for _ in 0..20 {
        render(&mut engine);
    }
    let rows: Vec<Event> = recorder
        .take()
        .into_iter()
        .filter(|e| matches!(e, Event::Row(..)))
        .collect();
    // 160 frames = 8 rows.
    assert_eq!(
        rows,
        vec![
            Event::Row(0, 0),
            Event::Row(0, 1),
            Event::Row(0, 2),
            Event::Row(0, 3),
            Event::Row(1, 0),
            Event::Row(1, 1),
            Event::Row(1, 2),
            Event::Row(1, 3),
        ]
    );
}

// ═══════════════════════════════════════════
// Transport / settings
// ═══════════════════════════════════════════

#[test]
fn test_pitch_scales_render_rate_and_is_clamped() {
    let (mut control, mut engine, _) = setup(song(&[16]));
    control.set_pitch(2.0);
    render(&mut engine);
    assert_eq!(engine.decoder().last_render_rate(), 2000.0);
    assert_eq!(engine.effective_bpm(), 62.5);

    control.set_pitch(100.0);
    render(&mut engine);
    assert_eq!(engine.pitch(), crate::config::MAX_PITCH);
    assert_eq!(control.readback().pitch, crate::config::MAX_PITCH);
}

#[test]
fn test_render_settings_are_forwarded() {
    let (mut control, mut engine, _) = setup(song(&[16]));
    let mut settings = RenderSettings {
        interpolation: InterpolationFilter::Cubic,
        ..RenderSettings::default()
    };
    settings.set_stereo_separation(150);
    control.set_render_settings(settings);
    render(&mut engine);

    assert_eq!(engine.decoder().render_settings(), &settings);
    assert_eq!(engine.render_settings(), &settings);
}

#[test]
fn test_render_returns_frame_count() {
    let (_control, mut engine, _) = setup(song(&[16]));
    assert_eq!(render(&mut engine), FRAMES);
    assert_eq!(engine.decoder().num_channels(), 4);
}
