use super::{DispatchError, EnqueueReason, Pid, QueueLevel, Scheduler, SimCtx};
use crate::core::{IoKind, Ticks};
use crate::sim::SimConfig;

/// Two-level feedback queue with strict priority.
///
/// New arrivals and tape/printer completions join the high queue; quantum
/// expiry and disk completions demote to the low queue. The low queue is
/// only served while the high queue is empty, so low-priority work can
/// starve under sustained high-priority load.
#[derive(Debug)]
pub struct MlfqScheduler {
    quantum_high: Ticks,
    quantum_low: Ticks,
}

impl MlfqScheduler {
    pub fn quantum(&self, level: QueueLevel) -> Ticks {
        match level {
            QueueLevel::High => self.quantum_high,
            QueueLevel::Low => self.quantum_low,
        }
    }
}

impl Scheduler for MlfqScheduler {
    fn init(_ctx: &mut SimCtx, config: &SimConfig) -> Self {
        Self {
            quantum_high: config.quantum_high,
            quantum_low: config.quantum_low,
        }
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid, reason: EnqueueReason) -> QueueLevel {
        let level = match reason {
            EnqueueReason::Admitted => QueueLevel::High,
            EnqueueReason::QuantumExpired => QueueLevel::Low,
            EnqueueReason::IoCompleted(IoKind::Disk) => QueueLevel::Low,
            EnqueueReason::IoCompleted(IoKind::Tape | IoKind::Printer) => QueueLevel::High,
        };
        ctx.make_ready(pid, level);
        level
    }

    fn dispatch(&mut self, ctx: &mut SimCtx) -> Result<Pid, DispatchError> {
        for level in [QueueLevel::High, QueueLevel::Low] {
            if let Some(pid) = ctx.queue_pop(ctx.ready_queue(level)) {
                let quantum = self.quantum(level).min(ctx.process(pid).burst_remaining);
                ctx.set_running(pid, level, quantum);
                return Ok(pid);
            }
        }
        Err(DispatchError::NoRunnableProcess)
    }
}
