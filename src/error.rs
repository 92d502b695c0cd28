use std::fmt;

/// Failure of a bounded queue operation.
///
/// Dequeuing from an empty queue is not an error; it yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Enqueue attempted while the queue already holds `capacity` items.
    Full { capacity: usize },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => write!(f, "queue full (capacity {capacity})"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Rejected simulation configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroQuantum { level: &'static str },
    ZeroQueueCapacity,
    ProbabilityOutOfRange { value: f64 },
    ZeroIoDuration { device: &'static str },
    EmptyBurstRange { min: u64, max: u64 },
    ZeroBurst { job: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroQuantum { level } => write!(f, "{level} quantum must be at least 1 tick"),
            Self::ZeroQueueCapacity => write!(f, "queue capacity must be at least 1"),
            Self::ProbabilityOutOfRange { value } => {
                write!(f, "I/O probability {value} is outside [0, 1]")
            }
            Self::ZeroIoDuration { device } => {
                write!(f, "{device} I/O duration must be at least 1 tick")
            }
            Self::EmptyBurstRange { min, max } => {
                write!(f, "burst range [{min}, {max}] is empty or starts at 0")
            }
            Self::ZeroBurst { job } => write!(f, "job {job} has a zero-length CPU burst"),
        }
    }
}

impl std::error::Error for ConfigError {}
