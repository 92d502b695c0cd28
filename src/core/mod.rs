pub mod driver;
pub mod event;
pub mod observer;
pub mod queue;
pub mod state;

pub use driver::SchedCore;
pub use event::SimEvent;
pub use observer::{Observer, Violation};
pub use queue::BoundedQueue;
pub use state::{
    CpuState, Dispatch, IoKind, Pid, ProcState, Process, QueueId, QueueLevel, QueueRole,
    ROOT_PID, SimCtx, Ticks,
};
