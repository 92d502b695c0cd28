use std::fmt;

use crate::core::{IoKind, Pid, QueueLevel, QueueRole, Ticks};

/// Notable transition observed during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    IoCompleted {
        pid: Pid,
        device: IoKind,
        to: QueueLevel,
    },
    Dispatched {
        pid: Pid,
        from: QueueLevel,
        quantum: Ticks,
    },
    // `turnaround` is elapsed time since arrival
    Terminated {
        pid: Pid,
        wait: Ticks,
        turnaround: Ticks,
    },
    IoRequested {
        pid: Pid,
        device: IoKind,
    },
    Preempted {
        pid: Pid,
    },
    // CPU idle even after dispatch
    CpuIdle,
    QueueOverflow {
        pid: Pid,
        queue: QueueRole,
    },
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::IoCompleted { pid, device, to } => {
                write!(f, "process {pid:>2} completed I/O ({device}) -> {to}")
            }
            Self::Dispatched { pid, from, quantum } => {
                write!(f, "process {pid:>2} started running ({from}, quantum: {quantum})")
            }
            Self::Terminated {
                pid,
                wait,
                turnaround,
            } => write!(
                f,
                "process {pid:>2} terminated. wait: {wait:>2}, turnaround: {turnaround:>2}"
            ),
            Self::IoRequested { pid, device } => {
                write!(f, "process {pid:>2} requested I/O ({device})")
            }
            Self::Preempted { pid } => write!(f, "process {pid:>2} preempted -> low queue"),
            Self::CpuIdle => f.write_str("CPU idle"),
            Self::QueueOverflow { pid, queue } => {
                write!(f, "{queue} full, process {pid:>2} dropped")
            }
        }
    }
}
