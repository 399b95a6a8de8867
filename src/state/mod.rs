// src/state/mod.rs
//
// Value types shared between the control side and the render side.
//
// Key principles:
// - Everything here is plain data (`Copy` where possible)
// - The control side only ever builds Commands and reads the readback
// - Only the render thread mutates playback state

mod command;
mod playback;
mod readback;

pub use command::*;
pub use playback::*;
pub use readback::*;
