use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{config::SimConfig, stats::SimReport, workload::Workload};
use crate::{
    core::{SimEvent, Ticks, driver::SchedCore},
    error::ConfigError,
    scheduler::{MlfqScheduler, Scheduler},
};

pub type MlfqSim = Sim<MlfqScheduler>;

/// Drives a `SchedCore` tick by tick until every process has terminated or
/// the time ceiling is reached.
pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
    config: SimConfig,
}

impl<S: Scheduler> Sim<S> {
    /// Builds a simulation with a random workload. The generator is seeded
    /// once here and shared by workload generation and execution.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let workload = Workload::generate(&config, &mut rng);
        Ok(Self::build(config, &workload, rng))
    }

    /// Builds a simulation over an explicit workload. `config.process_count`
    /// is replaced by the workload size.
    pub fn with_workload(
        mut config: SimConfig,
        workload: &Workload,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.process_count = workload.len();
        config.validate()?;
        Ok(Self::build(config, workload, StdRng::seed_from_u64(seed)))
    }

    fn build(config: SimConfig, workload: &Workload, rng: StdRng) -> Self {
        let mut core = SchedCore::<S>::new(&config, rng);
        for &burst in workload.bursts() {
            core.admit(burst);
        }
        log::debug!(
            "admitted {} processes, bursts {:?}",
            workload.len(),
            workload.bursts()
        );
        Self { core, config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn now(&self) -> Ticks {
        self.core.now()
    }

    pub fn is_finished(&self) -> bool {
        self.core.now() >= self.config.time_ceiling || self.core.ctx.all_terminated()
    }

    /// True when the run stopped with unfinished processes.
    pub fn hit_time_ceiling(&self) -> bool {
        self.core.now() >= self.config.time_ceiling && !self.core.ctx.all_terminated()
    }

    /// Advances one tick. Returns no events once the run is finished.
    pub fn step(&mut self) -> Vec<SimEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        self.core.tick()
    }

    pub fn run(&mut self) -> SimReport {
        self.run_with(|_, _| {})
    }

    /// Runs to completion, passing every event and its tick to `sink`.
    pub fn run_with(&mut self, mut sink: impl FnMut(Ticks, &SimEvent)) -> SimReport {
        while !self.is_finished() {
            let now = self.now();
            for event in self.step() {
                sink(now, &event);
            }
        }
        if self.hit_time_ceiling() {
            log::warn!(
                "time ceiling {} reached with {}/{} processes finished",
                self.config.time_ceiling,
                self.core.ctx.terminated,
                self.core.ctx.process_count()
            );
        }
        self.report()
    }

    pub fn report(&self) -> SimReport {
        SimReport::from_ctx(&self.core.ctx, &self.config)
    }
}
