use std::fmt;

use average::{Estimate, Mean};
use serde::Serialize;

use super::config::SimConfig;
use crate::core::{Pid, ProcState, SimCtx, Ticks};

/// Per-process line of the final report.
///
/// `turnaround` is `wait + burst_total`, which ignores time spent on I/O.
/// `elapsed_turnaround` is completion tick minus arrival tick, the same
/// figure the termination event carries. The two agree only for processes
/// that never performed I/O.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessStats {
    pub pid: Pid,
    pub state: ProcState,
    pub burst_total: Ticks,
    pub wait: Ticks,
    pub turnaround: Ticks,
    pub elapsed_turnaround: Option<Ticks>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub config: SimConfig,
    pub total_ticks: Ticks,
    pub idle_ticks: Ticks,
    pub process_count: usize,
    pub terminated: usize,
    pub dropped: usize,
    pub hit_time_ceiling: bool,
    pub processes: Vec<ProcessStats>,
    pub mean_wait: f64,
    pub mean_turnaround: f64,
    pub cpu_utilization: f64,
}

impl SimReport {
    pub fn from_ctx(ctx: &SimCtx, config: &SimConfig) -> Self {
        let processes: Vec<ProcessStats> = ctx
            .processes
            .iter()
            .map(|p| ProcessStats {
                pid: p.id,
                state: p.state,
                burst_total: p.burst_total,
                wait: p.wait_accumulated,
                turnaround: p.wait_accumulated + p.burst_total,
                elapsed_turnaround: p.completion_time.map(|t| t - p.arrival_time),
            })
            .collect();

        let mean_wait = mean(processes.iter().map(|p| p.wait));
        let mean_turnaround = mean(processes.iter().map(|p| p.turnaround));

        Self {
            config: config.clone(),
            total_ticks: ctx.now,
            idle_ticks: ctx.idle_ticks,
            process_count: ctx.process_count(),
            terminated: ctx.terminated,
            dropped: ctx.dropped.len(),
            hit_time_ceiling: !ctx.all_terminated() && ctx.now >= config.time_ceiling,
            processes,
            mean_wait,
            mean_turnaround,
            cpu_utilization: cpu_utilization(ctx.now, ctx.idle_ticks),
        }
    }
}

/// Busy share of the run as a percentage; 0 for an empty run.
pub fn cpu_utilization(total_ticks: Ticks, idle_ticks: Ticks) -> f64 {
    if total_ticks == 0 {
        return 0.0;
    }
    100.0 * total_ticks.saturating_sub(idle_ticks) as f64 / total_ticks as f64
}

fn mean(values: impl Iterator<Item = Ticks>) -> f64 {
    let mean: Mean = values.map(|v| v as f64).collect();
    if mean.is_empty() {
        0.0
    } else {
        mean.estimate()
    }
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "======== SIMULATION STATISTICS ========")?;
        writeln!(f, "PID  Burst  Wait  Turnaround  Elapsed")?;
        writeln!(f, "--------------------------------------")?;
        for p in &self.processes {
            let elapsed = match p.elapsed_turnaround {
                Some(t) => t.to_string(),
                None => "-".to_owned(),
            };
            writeln!(
                f,
                "{:>3}  {:>5}  {:>4}  {:>10}  {:>7}",
                p.pid, p.burst_total, p.wait, p.turnaround, elapsed
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Totals:")?;
        writeln!(f, "- simulated time: {} ticks", self.total_ticks)?;
        writeln!(f, "- completed: {}/{}", self.terminated, self.process_count)?;
        if self.dropped > 0 {
            writeln!(f, "- dropped on queue overflow: {}", self.dropped)?;
        }
        if self.hit_time_ceiling {
            writeln!(f, "- stopped at time ceiling ({} ticks)", self.config.time_ceiling)?;
        }
        writeln!(f, "- mean wait: {:.2}", self.mean_wait)?;
        writeln!(f, "- mean turnaround: {:.2}", self.mean_turnaround)?;
        writeln!(f, "- CPU utilization: {:.2}%", self.cpu_utilization)?;
        write!(f, "=======================================")
    }
}
