// src/command_queue.rs
//
// Bounded control -> render command queue.
//
// Single producer (control thread), single consumer (render thread).
// Never blocks, never allocates after creation. When the queue is full
// new commands are dropped.

use log::debug;
use ringbuf::{
    HeapCons, HeapProd, HeapRb,
    traits::{Consumer, Observer, Producer, Split},
};

use crate::state::Command;

/// Ring slots. One slot is kept free, so at most `COMMAND_SLOTS - 1`
/// commands can be pending at once.
pub const COMMAND_SLOTS: usize = 8;

/// Maximum number of commands pending between two render calls.
pub const COMMAND_CAPACITY: usize = COMMAND_SLOTS - 1;

/// Control-side end of the queue.
pub struct CommandSender {
    producer: HeapProd<Command>,
}

/// Render-side end of the queue.
pub struct CommandReceiver {
    consumer: HeapCons<Command>,
}

/// Create a linked sender/receiver pair.
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (producer, consumer) = HeapRb::<Command>::new(COMMAND_CAPACITY).split();
    (CommandSender { producer }, CommandReceiver { consumer })
}

impl CommandSender {
    /// Enqueue a command. Returns `false` if the queue was full and the
    /// command was dropped.
    pub fn send(&mut self, command: Command) -> bool {
        match self.producer.try_push(command) {
            Ok(()) => true,
            Err(dropped) => {
                debug!("Command queue full, dropping {:?}", dropped);
                false
            }
        }
    }

    /// Commands waiting to be drained.
    pub fn pending(&self) -> usize {
        self.producer.occupied_len()
    }
}

impl CommandReceiver {
    /// Pop the oldest pending command.
    pub fn pop(&mut self) -> Option<Command> {
        self.consumer.try_pop()
    }
}
