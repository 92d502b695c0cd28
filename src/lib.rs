pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use error::{ConfigError, QueueError};
pub use scheduler::Scheduler;
pub use sim::{MlfqSim, Sim, SimConfig, SimReport, Workload};
