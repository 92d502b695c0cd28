use std::fmt;

use super::state::{ProcState, QueueLevel, SimCtx, Ticks};

/// Broken simulation invariant, with the tick it was detected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub tick: Ticks,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}: {}", self.tick, self.message)
    }
}

/// Checks the scheduler invariants at the end of every tick.
#[derive(Debug)]
pub struct Observer {
    quantum_high: Ticks,
    quantum_low: Ticks,
    last_burst: Vec<Ticks>,
    violations: Vec<Violation>,
}

impl Observer {
    pub fn new(quantum_high: Ticks, quantum_low: Ticks) -> Self {
        Self {
            quantum_high,
            quantum_low,
            last_burst: Vec::new(),
            violations: Vec::new(),
        }
    }

    pub fn observe(&mut self, ctx: &SimCtx) {
        if let Err(violation) = self.check(ctx) {
            log::error!("invariant violated at {violation}");
            debug_assert!(false, "invariant violated at {violation}");
            self.violations.push(violation);
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Validates `ctx` against the previous observation and records the
    /// burst counters for the next one.
    pub fn check(&mut self, ctx: &SimCtx) -> Result<(), Violation> {
        let fail = |message: String| Violation {
            tick: ctx.now,
            message,
        };

        let running: Vec<_> = ctx
            .processes
            .iter()
            .filter(|p| p.state == ProcState::Running)
            .map(|p| p.id)
            .collect();
        if running.len() > 1 {
            return Err(fail(format!("several processes running: {running:?}")));
        }
        if running.first().copied() != ctx.running() {
            return Err(fail(format!(
                "cpu holds {:?} but running states are {running:?}",
                ctx.running()
            )));
        }

        if let Some(dispatch) = ctx.cpu.current {
            let level_quantum = match dispatch.level {
                QueueLevel::High => self.quantum_high,
                QueueLevel::Low => self.quantum_low,
            };
            if dispatch.quantum > level_quantum || dispatch.quantum > dispatch.burst_at_dispatch {
                return Err(fail(format!(
                    "process {} got quantum {} (level max {level_quantum}, burst {})",
                    dispatch.pid, dispatch.quantum, dispatch.burst_at_dispatch
                )));
            }
            let consumed = dispatch.burst_at_dispatch - ctx.process(dispatch.pid).burst_remaining;
            if consumed > dispatch.quantum {
                return Err(fail(format!(
                    "process {} ran {consumed} ticks on quantum {}",
                    dispatch.pid, dispatch.quantum
                )));
            }
        }

        let mut queued = 0;
        for process in &ctx.processes {
            let pid = process.id;
            if ctx.dropped.contains(&pid) {
                continue;
            }
            let expected = match process.state {
                ProcState::ReadyHigh => Some(ctx.high_queue_id),
                ProcState::ReadyLow => Some(ctx.low_queue_id),
                ProcState::WaitingIo => Some(ctx.io_queue_id),
                ProcState::Running | ProcState::Terminated => None,
            };
            let actual = ctx.process_to_queue.get(&pid).copied();
            if actual != expected {
                return Err(fail(format!(
                    "process {pid} is {:?} but queued on {:?}",
                    process.state,
                    actual.map(|q| ctx.queue_role(q))
                )));
            }
            if let Some(queue_id) = expected {
                if !ctx.queue(queue_id).contains(pid) {
                    return Err(fail(format!(
                        "membership says process {pid} is on the {}, queue disagrees",
                        ctx.queue_role(queue_id)
                    )));
                }
                queued += 1;
            }

            if process.burst_remaining > process.burst_total {
                return Err(fail(format!("process {pid} remaining exceeds total")));
            }
            let finished = process.state == ProcState::Terminated;
            if finished != (process.burst_remaining == 0) {
                return Err(fail(format!(
                    "process {pid} is {:?} with {} ticks left",
                    process.state, process.burst_remaining
                )));
            }
        }

        let queue_total: usize = [ctx.high_queue_id, ctx.low_queue_id, ctx.io_queue_id]
            .into_iter()
            .map(|q| ctx.queue(q).len())
            .sum();
        if queue_total != queued {
            return Err(fail(format!(
                "queues hold {queue_total} entries for {queued} waiting processes"
            )));
        }

        let terminated = ctx.count_in_state(ProcState::Terminated);
        if terminated != ctx.terminated {
            return Err(fail(format!(
                "terminated counter {} but {terminated} processes terminated",
                ctx.terminated
            )));
        }

        let accounted = queued + running.len() + terminated + ctx.dropped.len();
        if accounted != ctx.process_count() {
            return Err(fail(format!(
                "{accounted} processes accounted for out of {}",
                ctx.process_count()
            )));
        }

        if self.last_burst.len() != ctx.process_count() {
            self.last_burst = ctx.processes.iter().map(|p| p.burst_total).collect();
        }
        for (last, process) in self.last_burst.iter_mut().zip(&ctx.processes) {
            if process.burst_remaining > *last {
                return Err(fail(format!(
                    "process {} remaining burst grew from {last} to {}",
                    process.id, process.burst_remaining
                )));
            }
            *last = process.burst_remaining;
        }

        Ok(())
    }
}
