pub mod mlfq;

use crate::core::{IoKind, Pid, QueueLevel, SimCtx};
use crate::sim::SimConfig;
pub use mlfq::MlfqScheduler;

/// Why a process is being handed back to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueReason {
    Admitted,
    QuantumExpired,
    IoCompleted(IoKind),
}

#[derive(Debug, PartialEq, Eq)]
pub enum DispatchError {
    NoRunnableProcess,
}

pub trait Scheduler {
    fn init(ctx: &mut SimCtx, config: &SimConfig) -> Self;

    /// Places a ready process on one of the ready queues and returns the
    /// level chosen.
    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid, reason: EnqueueReason) -> QueueLevel;

    /// Picks the next process and puts it on the idle CPU via
    /// `SimCtx::set_running`.
    fn dispatch(&mut self, ctx: &mut SimCtx) -> Result<Pid, DispatchError>;
}
