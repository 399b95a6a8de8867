// src/main.rs
//
// Demo: drive the engine against the simulated decoder and print callbacks.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use groovelock::{
    EngineConfig, LoopRange, NoteEvent, PatternModeReason, PlaybackListener, SimModule,
    create_bridge,
};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[value(rename_all = "lower")]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Tracker playback control engine demo", long_about = None)]
struct Args {
    /// Output sample rate in Hz
    #[arg(long, default_value_t = 48_000.0)]
    sample_rate: f64,

    /// Frames per render call
    #[arg(long, default_value_t = 512)]
    buffer_size: usize,

    /// Number of render calls
    #[arg(long, default_value_t = 400)]
    buffers: usize,

    /// Lock playback to the first pattern
    #[arg(long)]
    pattern_mode: bool,

    /// Playback-rate multiplier
    #[arg(long, default_value_t = 1.0)]
    pitch: f64,

    /// Set the application log level
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,
}

/// Prints every callback.
struct PrintListener;

impl PlaybackListener for PrintListener {
    fn on_order_change(&mut self, order: usize, pattern: usize) {
        println!("order   {:>3}  pattern {}", order, pattern);
    }

    fn on_row_change(&mut self, order: usize, row: usize) {
        println!("row     {:>3}:{:02}", order, row);
    }

    fn on_loop_pattern(&mut self, order: usize, pattern: usize) {
        println!("loop    {:>3}  pattern {}", order, pattern);
    }

    fn on_pattern_mode_change(&mut self, active: bool, reason: PatternModeReason) {
        println!("pattern mode {} ({:?})", if active { "on" } else { "off" }, reason);
    }

    fn on_note(&mut self, event: &NoteEvent) {
        println!(
            "  note  ch{} {:>3} ins {:?} vel {:>2} fx {:?}",
            event.channel,
            event.note_code(),
            event.instrument,
            event.velocity,
            event.effect
        );
    }
}

/// Four orders of 16 rows; order 2 breaks back to order 1 halfway through.
fn demo_song() -> SimModule {
    let mut song = SimModule::new(4);
    let patterns: Vec<usize> = (0..4).map(|_| song.add_pattern(16)).collect();
    song.set_orders(&patterns);
    song.set_tempo(125.0, 6);

    let bass = ["C-3", "C-3", "G-2", "A#2"];
    for (i, &pattern) in patterns.iter().enumerate() {
        for row in (0..16).step_by(4) {
            song.set_cell(pattern, row, 0, &format!("{} 01 40 ....", bass[i]));
        }
        for row in (2..16).step_by(4) {
            song.set_cell(pattern, row, 1, "E-5 02 30 ....");
        }
        song.set_cell(pattern, 15, 2, "=== .. .. ....");
    }
    song.set_cell(patterns[2], 8, 3, "... .. .. 0B01");
    song
}

fn main() -> Result<()> {
    let args = Args::parse();

    // --- Setup logging ---
    let log_level = match args.log_level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let config = EngineConfig::with_sample_rate(args.sample_rate);
    let (mut control, mut engine) = create_bridge(demo_song(), config)?;
    engine.set_listener(Box::new(PrintListener));

    control.set_pitch(args.pitch);
    if args.pattern_mode {
        control.set_pattern_mode(true);
    }

    let mut buffer = vec![0.0f32; args.buffer_size * 2];
    let mut peak = 0.0f32;

    for index in 0..args.buffers {
        // A little scripted interaction.
        if index == args.buffers / 4 {
            control.queue_channel_mute(1);
        }
        if index == args.buffers / 2 {
            control.queue_next_order();
        }
        if index == args.buffers * 3 / 4 {
            control.set_loop_range(LoopRange::new(Some(0), 0, Some(0), 7));
            control.trigger_loop();
        }

        engine.render(&mut buffer);
        peak = buffer.iter().fold(peak, |p, s| p.max(s.abs()));
    }

    let state = control.readback();
    println!(
        "done: order {} row {}  loop {:?}  pattern mode {}  {:.1} bpm  peak {:.3}",
        state.position.order,
        state.position.row,
        state.loop_state,
        state.pattern_mode,
        state.effective_bpm(),
        peak
    );

    Ok(())
}
