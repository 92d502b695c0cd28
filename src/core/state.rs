use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;
use slotmap::{SlotMap, new_key_type};

use super::event::SimEvent;
use super::queue::BoundedQueue;

// Process ids start at 1; slot `pid - 1` in the process table
pub type Pid = usize;
pub type Ticks = u64;

/// Parent of every generated process.
pub const ROOT_PID: Pid = 0;

new_key_type! {
    pub struct QueueId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProcState {
    ReadyHigh,
    ReadyLow,
    Running,
    WaitingIo,
    Terminated,
}

/// Ready-queue priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueueLevel {
    High,
    Low,
}

impl QueueLevel {
    pub fn ready_state(self) -> ProcState {
        match self {
            Self::High => ProcState::ReadyHigh,
            Self::Low => ProcState::ReadyLow,
        }
    }
}

impl fmt::Display for QueueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("high queue"),
            Self::Low => f.write_str("low queue"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IoKind {
    Disk,
    Tape,
    Printer,
}

impl IoKind {
    pub const ALL: [IoKind; 3] = [IoKind::Disk, IoKind::Tape, IoKind::Printer];

    pub fn name(self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::Tape => "tape",
            Self::Printer => "printer",
        }
    }
}

impl fmt::Display for IoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which of the three queues a `QueueId` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueRole {
    Ready(QueueLevel),
    Io,
}

impl fmt::Display for QueueRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(level) => write!(f, "{level}"),
            Self::Io => f.write_str("I/O queue"),
        }
    }
}

/// Process control block.
#[derive(Debug, Clone)]
pub struct Process {
    pub id: Pid,
    pub parent_id: Pid,
    pub state: ProcState,
    pub arrival_time: Ticks,
    pub burst_total: Ticks,
    pub burst_remaining: Ticks,
    pub wait_accumulated: Ticks,
    pub wait_interval_start: Ticks,
    /// Device in use; only set while `WaitingIo`.
    pub io_kind: Option<IoKind>,
    pub io_remaining: Ticks,
    pub completion_time: Option<Ticks>,
}

/// Assignment made by the dispatcher for the process currently on the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub pid: Pid,
    pub level: QueueLevel,
    pub quantum: Ticks,
    pub quantum_left: Ticks,
    pub burst_at_dispatch: Ticks,
}

#[derive(Debug, Default)]
pub struct CpuState {
    pub current: Option<Dispatch>,
}

#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub cpu: CpuState,
    pub processes: Vec<Process>,
    pub queues: SlotMap<QueueId, BoundedQueue>,
    pub process_to_queue: FxHashMap<Pid, QueueId>,
    pub high_queue_id: QueueId,
    pub low_queue_id: QueueId,
    pub io_queue_id: QueueId,

    pub terminated: usize,
    pub idle_ticks: Ticks,
    // Lost to queue overflow; never scheduled again
    pub dropped: Vec<Pid>,

    events: Vec<SimEvent>,
}

impl SimCtx {
    pub fn new(queue_capacity: usize) -> Self {
        let mut queues = SlotMap::with_capacity_and_key(3);
        let high_queue_id = queues.insert(BoundedQueue::with_capacity(queue_capacity));
        let low_queue_id = queues.insert(BoundedQueue::with_capacity(queue_capacity));
        let io_queue_id = queues.insert(BoundedQueue::with_capacity(queue_capacity));

        Self {
            now: 0,
            cpu: CpuState::default(),
            processes: Vec::new(),
            queues,
            process_to_queue: FxHashMap::default(),
            high_queue_id,
            low_queue_id,
            io_queue_id,
            terminated: 0,
            idle_ticks: 0,
            dropped: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Registers a new process that arrives now. It is not queued yet.
    pub fn create_process(&mut self, burst_total: Ticks) -> Pid {
        let id = self.processes.len() + 1;
        self.processes.push(Process {
            id,
            parent_id: ROOT_PID,
            state: ProcState::ReadyHigh,
            arrival_time: self.now,
            burst_total,
            burst_remaining: burst_total,
            wait_accumulated: 0,
            wait_interval_start: self.now,
            io_kind: None,
            io_remaining: 0,
            completion_time: None,
        });
        id
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn process(&self, pid: Pid) -> &Process {
        &self.processes[pid - 1]
    }

    pub fn process_mut(&mut self, pid: Pid) -> &mut Process {
        &mut self.processes[pid - 1]
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn ready_queue(&self, level: QueueLevel) -> QueueId {
        match level {
            QueueLevel::High => self.high_queue_id,
            QueueLevel::Low => self.low_queue_id,
        }
    }

    pub fn io_queue(&self) -> QueueId {
        self.io_queue_id
    }

    pub fn queue(&self, queue_id: QueueId) -> &BoundedQueue {
        &self.queues[queue_id]
    }

    pub fn queue_role(&self, queue_id: QueueId) -> QueueRole {
        if queue_id == self.high_queue_id {
            QueueRole::Ready(QueueLevel::High)
        } else if queue_id == self.low_queue_id {
            QueueRole::Ready(QueueLevel::Low)
        } else {
            QueueRole::Io
        }
    }

    pub fn queue_is_empty(&self, queue_id: QueueId) -> bool {
        self.queues[queue_id].is_empty()
    }

    /// Appends `pid` to a queue. On overflow the process is dropped from
    /// scheduling: it is logged, recorded in `dropped`, and reported as an
    /// event. Returns whether the process was queued.
    pub fn queue_push(&mut self, queue_id: QueueId, pid: Pid) -> bool {
        assert!(
            !self.process_to_queue.contains_key(&pid),
            "Process {pid} already present in some queue"
        );

        match self.queues[queue_id].enqueue(pid) {
            Ok(()) => {
                self.process_to_queue.insert(pid, queue_id);
                true
            }
            Err(err) => {
                let queue = self.queue_role(queue_id);
                log::warn!("{queue}: {err}; process {pid} dropped from scheduling");
                self.dropped.push(pid);
                self.emit(SimEvent::QueueOverflow { pid, queue });
                false
            }
        }
    }

    pub fn queue_pop(&mut self, queue_id: QueueId) -> Option<Pid> {
        let pid = self.queues[queue_id].dequeue()?;
        let removed = self.process_to_queue.remove(&pid);
        debug_assert_eq!(removed, Some(queue_id), "Process {pid} membership mismatch");
        Some(pid)
    }

    pub fn process_in_any_queue(&self, pid: Pid) -> bool {
        self.process_to_queue.contains_key(&pid)
    }

    /// Puts `pid` at the back of the ready queue for `level` and starts a
    /// fresh wait interval.
    pub fn make_ready(&mut self, pid: Pid, level: QueueLevel) -> bool {
        let now = self.now;
        let process = self.process_mut(pid);
        debug_assert!(
            process.state != ProcState::Terminated,
            "Terminated process {pid} cannot become ready"
        );
        process.state = level.ready_state();
        process.wait_interval_start = now;
        process.io_kind = None;
        self.queue_push(self.ready_queue(level), pid)
    }

    /// Gives the CPU to `pid` and closes its current wait interval.
    pub fn set_running(&mut self, pid: Pid, level: QueueLevel, quantum: Ticks) {
        debug_assert!(
            !self.process_to_queue.contains_key(&pid),
            "Running process {pid} must not be queued"
        );
        debug_assert!(self.cpu.current.is_none(), "CPU already running a process");

        let now = self.now;
        let process = self.process_mut(pid);
        debug_assert_eq!(process.state, level.ready_state());
        process.state = ProcState::Running;
        process.wait_accumulated += now - process.wait_interval_start;
        let burst_at_dispatch = process.burst_remaining;

        self.cpu.current = Some(Dispatch {
            pid,
            level,
            quantum,
            quantum_left: quantum,
            burst_at_dispatch,
        });
    }

    pub fn clear_cpu(&mut self) {
        self.cpu.current = None;
    }

    pub fn cpu_is_idle(&self) -> bool {
        self.cpu.current.is_none()
    }

    pub fn running(&self) -> Option<Pid> {
        self.cpu.current.map(|dispatch| dispatch.pid)
    }

    pub fn mark_terminated(&mut self, pid: Pid) {
        debug_assert!(
            !self.process_to_queue.contains_key(&pid),
            "Terminating process {pid} that is still queued"
        );
        let now = self.now;
        let process = self.process_mut(pid);
        debug_assert_eq!(process.state, ProcState::Running);
        process.state = ProcState::Terminated;
        process.completion_time = Some(now);
        self.terminated += 1;
    }

    /// Moves `pid` to the shared I/O queue with `duration` ticks of service.
    pub fn start_io(&mut self, pid: Pid, kind: IoKind, duration: Ticks) -> bool {
        let process = self.process_mut(pid);
        debug_assert_eq!(process.state, ProcState::Running);
        process.state = ProcState::WaitingIo;
        process.io_kind = Some(kind);
        process.io_remaining = duration;
        self.queue_push(self.io_queue_id, pid)
    }

    pub fn count_in_state(&self, state: ProcState) -> usize {
        self.processes.iter().filter(|p| p.state == state).count()
    }

    pub fn all_terminated(&self) -> bool {
        self.terminated == self.processes.len()
    }
}
