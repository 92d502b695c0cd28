use rand::Rng;

use super::config::SimConfig;
use crate::core::Ticks;
use crate::error::ConfigError;

/// CPU demand of each process, in creation order. Process `i + 1` gets
/// `bursts[i]`; every process arrives at tick 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    bursts: Vec<Ticks>,
}

impl Workload {
    /// Draws `config.process_count` bursts uniformly from
    /// `[config.burst_min, config.burst_max]`.
    pub fn generate<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Self {
        let bursts = (0..config.process_count)
            .map(|_| rng.random_range(config.burst_min..=config.burst_max))
            .collect();
        Self { bursts }
    }

    pub fn from_bursts(bursts: Vec<Ticks>) -> Result<Self, ConfigError> {
        if let Some(job) = bursts.iter().position(|&burst| burst == 0) {
            return Err(ConfigError::ZeroBurst { job });
        }
        Ok(Self { bursts })
    }

    pub fn bursts(&self) -> &[Ticks] {
        &self.bursts
    }

    pub fn len(&self) -> usize {
        self.bursts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }
}
