// src/lib.rs
//
// Library entry point for Rust hosts and FFI consumers (iOS/Swift, C).

mod boundary;
mod bridge;
mod callbacks;
mod command_queue;
mod config;
mod decoder;
mod engine;
mod error;
mod loop_range;
mod mix;
mod mute_solo;
mod note_event;
mod pattern_mode;
mod state;
mod transport;

pub mod ffi;

// Re-export key types for Rust consumers
pub use boundary::{BoundaryDetector, Flow, QueuedJump, Transition};
pub use bridge::{ControlHandle, ModuleInfo, create_bridge};
pub use callbacks::{CallbackDispatcher, DispatchReport, NoListener, PlaybackListener};
pub use command_queue::{
    COMMAND_CAPACITY, COMMAND_SLOTS, CommandReceiver, CommandSender, command_queue,
};
pub use config::{
    AmigaFilter, DEFAULT_SAMPLE_RATE, Dither, EngineConfig, InterpolationFilter, MAX_PITCH,
    MIN_PITCH, RenderSettings,
};
pub use decoder::{Decoder, SimModule};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use loop_range::{LoopRangeController, LoopStep, ResolvedLoop};
pub use mix::{CENTER_PAN, ChannelMix, DEFAULT_VOLUME};
pub use mute_solo::MuteSoloLedger;
pub use note_event::{Cell, Effect, Note, NoteEvent, NoteEventExtractor, parse_cell};
pub use pattern_mode::{PatternBoundary, PatternModeController, PatternStep};
pub use state::{
    ChannelReadback, Command, EngineReadback, LoopRange, LoopState, PatternModeReason,
    PendingJump, PlaybackSnapshot, QueuedAction,
};
pub use transport::Transport;
