use serde::{Deserialize, Serialize};

use crate::core::{IoKind, Ticks};
use crate::error::ConfigError;

/// Fixed service time per device kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoDurations {
    pub disk: Ticks,
    pub tape: Ticks,
    pub printer: Ticks,
}

impl IoDurations {
    pub fn of(&self, kind: IoKind) -> Ticks {
        match kind {
            IoKind::Disk => self.disk,
            IoKind::Tape => self.tape,
            IoKind::Printer => self.printer,
        }
    }
}

impl Default for IoDurations {
    fn default() -> Self {
        Self {
            disk: 5,
            tape: 3,
            printer: 4,
        }
    }
}

/// Tuning constants for one simulation run.
///
/// The defaults reproduce the reference workload: five processes, quanta of
/// 2 and 4 ticks, a 10% chance per running tick of an I/O request, and a
/// 1000-tick ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub process_count: usize,
    pub quantum_high: Ticks,
    pub quantum_low: Ticks,
    /// Chance, per tick of execution, that the running process requests I/O.
    pub io_probability: f64,
    pub time_ceiling: Ticks,
    /// Capacity of each of the three queues. Enqueues past it are dropped.
    pub queue_capacity: usize,
    pub io_durations: IoDurations,
    /// Inclusive bounds for generated CPU bursts.
    pub burst_min: Ticks,
    pub burst_max: Ticks,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            process_count: 5,
            quantum_high: 2,
            quantum_low: 4,
            io_probability: 0.10,
            time_ceiling: 1000,
            queue_capacity: 100,
            io_durations: IoDurations::default(),
            burst_min: 5,
            burst_max: 30,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quantum_high == 0 {
            return Err(ConfigError::ZeroQuantum { level: "high" });
        }
        if self.quantum_low == 0 {
            return Err(ConfigError::ZeroQuantum { level: "low" });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if !(0.0..=1.0).contains(&self.io_probability) {
            return Err(ConfigError::ProbabilityOutOfRange {
                value: self.io_probability,
            });
        }
        for kind in IoKind::ALL {
            if self.io_durations.of(kind) == 0 {
                return Err(ConfigError::ZeroIoDuration {
                    device: kind.name(),
                });
            }
        }
        if self.burst_min == 0 || self.burst_min > self.burst_max {
            return Err(ConfigError::EmptyBurstRange {
                min: self.burst_min,
                max: self.burst_max,
            });
        }
        Ok(())
    }
}
