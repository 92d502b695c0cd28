pub mod config;
pub mod driver;
pub mod stats;
pub mod workload;

pub use config::{IoDurations, SimConfig};
pub use driver::{MlfqSim, Sim};
pub use stats::{ProcessStats, SimReport, cpu_utilization};
pub use workload::Workload;
