// src/error.rs

/// Error creating an engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The decoder reports no channels.
    #[error("Module has no channels")]
    NoChannels,

    /// The decoder reports an empty order list.
    #[error("Module has an empty order list")]
    NoOrders,

    /// The sample rate is not a positive finite number.
    #[error("Invalid sample rate {0}")]
    InvalidSampleRate(f64),
}

/// Result of engine creation.
pub type EngineResult<T> = Result<T, EngineError>;
