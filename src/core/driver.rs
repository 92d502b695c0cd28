use rand::Rng;
use rand::rngs::StdRng;

use super::{
    event::SimEvent,
    observer::Observer,
    state::{IoKind, Pid, SimCtx, Ticks},
};
use crate::scheduler::{DispatchError, EnqueueReason, Scheduler};
use crate::sim::{IoDurations, SimConfig};

/// Single-CPU tick engine: I/O service, dispatch and execution.
pub struct SchedCore<S: Scheduler> {
    pub ctx: SimCtx,
    pub scheduler: S,
    observer: Observer,
    rng: StdRng,
    io_probability: f64,
    io_durations: IoDurations,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(config: &SimConfig, rng: StdRng) -> Self {
        let mut ctx = SimCtx::new(config.queue_capacity);
        let scheduler = S::init(&mut ctx, config);
        let observer = Observer::new(config.quantum_high, config.quantum_low);
        Self {
            ctx,
            scheduler,
            observer,
            rng,
            io_probability: config.io_probability,
            io_durations: config.io_durations,
        }
    }

    /// Creates a process and hands it to the scheduler as a new arrival.
    pub fn admit(&mut self, burst_total: Ticks) -> Pid {
        let pid = self.ctx.create_process(burst_total);
        self.scheduler
            .enqueue(&mut self.ctx, pid, EnqueueReason::Admitted);
        pid
    }

    /// Runs one tick and returns the events it produced.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        if !self.ctx.queue_is_empty(self.ctx.io_queue()) {
            self.advance_io();
        }

        if self.ctx.cpu_is_idle() {
            self.try_dispatch();
        }

        if self.ctx.cpu_is_idle() {
            self.ctx.idle_ticks += 1;
            self.ctx.emit(SimEvent::CpuIdle);
        } else {
            self.execute();
        }

        self.observer.observe(&self.ctx);
        self.ctx.advance_time(1);
        self.ctx.take_events()
    }

    // One tick of service for every entry present when the pass starts.
    // Entries re-queued during the pass are not visited twice.
    fn advance_io(&mut self) {
        let io_queue = self.ctx.io_queue();
        let pending = self.ctx.queue(io_queue).len();

        for _ in 0..pending {
            let Some(pid) = self.ctx.queue_pop(io_queue) else {
                break;
            };

            let (io_remaining, device) = {
                let process = self.ctx.process_mut(pid);
                process.io_remaining = process.io_remaining.saturating_sub(1);
                (process.io_remaining, process.io_kind)
            };
            if io_remaining > 0 {
                self.ctx.queue_push(io_queue, pid);
                continue;
            }

            let device = device.expect("Process on the I/O queue must have a device");
            let to = self
                .scheduler
                .enqueue(&mut self.ctx, pid, EnqueueReason::IoCompleted(device));
            self.ctx.emit(SimEvent::IoCompleted { pid, device, to });
        }
    }

    fn try_dispatch(&mut self) {
        if let Err(DispatchError::NoRunnableProcess) = self.scheduler.dispatch(&mut self.ctx) {
            // Both ready queues empty; CPU stays idle this tick.
            return;
        }

        if let Some(dispatch) = self.ctx.cpu.current {
            log::trace!(
                "t={} dispatch pid {} from {} (burst left {})",
                self.ctx.now,
                dispatch.pid,
                dispatch.level,
                dispatch.burst_at_dispatch
            );
            self.ctx.emit(SimEvent::Dispatched {
                pid: dispatch.pid,
                from: dispatch.level,
                quantum: dispatch.quantum,
            });
        }
    }

    // Outcomes are checked in a fixed order: terminate, I/O, quantum expiry.
    fn execute(&mut self) {
        let Some(mut dispatch) = self.ctx.cpu.current else {
            return;
        };
        let pid = dispatch.pid;

        let process = self.ctx.process_mut(pid);
        debug_assert!(process.burst_remaining > 0, "Running process {pid} has no burst left");
        process.burst_remaining -= 1;
        let burst_remaining = process.burst_remaining;
        dispatch.quantum_left = dispatch.quantum_left.saturating_sub(1);
        self.ctx.cpu.current = Some(dispatch);

        if burst_remaining == 0 {
            self.ctx.clear_cpu();
            self.ctx.mark_terminated(pid);
            let process = self.ctx.process(pid);
            let event = SimEvent::Terminated {
                pid,
                wait: process.wait_accumulated,
                turnaround: self.ctx.now - process.arrival_time,
            };
            self.ctx.emit(event);
            return;
        }

        if self.rng.random::<f64>() < self.io_probability {
            let device = IoKind::ALL[self.rng.random_range(0..IoKind::ALL.len())];
            let duration = self.io_durations.of(device);
            self.ctx.clear_cpu();
            self.ctx.start_io(pid, device, duration);
            self.ctx.emit(SimEvent::IoRequested { pid, device });
            return;
        }

        if dispatch.quantum_left == 0 {
            self.ctx.clear_cpu();
            self.scheduler
                .enqueue(&mut self.ctx, pid, EnqueueReason::QuantumExpired);
            self.ctx.emit(SimEvent::Preempted { pid });
        }
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::core::{ProcState, QueueLevel, QueueRole};
    use crate::scheduler::MlfqScheduler;

    fn core_with(io_probability: f64, bursts: &[Ticks]) -> SchedCore<MlfqScheduler> {
        let config = SimConfig {
            io_probability,
            ..SimConfig::default()
        };
        let mut core = SchedCore::new(&config, StdRng::seed_from_u64(7));
        for &burst in bursts {
            core.admit(burst);
        }
        core
    }

    #[test]
    fn first_tick_dispatches_and_runs_head_of_high_queue() {
        let mut core = core_with(0.0, &[5, 5]);
        let events = core.tick();
        assert_eq!(
            events,
            vec![SimEvent::Dispatched {
                pid: 1,
                from: QueueLevel::High,
                quantum: 2,
            }]
        );
        assert_eq!(core.ctx.process(1).burst_remaining, 4);
        assert_eq!(core.now(), 1);
    }

    #[test]
    fn quantum_expiry_demotes_to_low_queue() {
        let mut core = core_with(0.0, &[5]);
        core.tick();
        let events = core.tick();
        assert_eq!(events, vec![SimEvent::Preempted { pid: 1 }]);
        let process = core.ctx.process(1);
        assert_eq!(process.state, ProcState::ReadyLow);
        assert_eq!(process.wait_interval_start, 1);
        assert!(core.ctx.cpu_is_idle());
    }

    #[test]
    fn completion_beats_io_request_on_last_tick() {
        let mut core = core_with(1.0, &[1]);
        let events = core.tick();
        assert_eq!(
            events[1],
            SimEvent::Terminated {
                pid: 1,
                wait: 0,
                turnaround: 0,
            }
        );
        assert!(core.ctx.all_terminated());
    }

    #[test]
    fn io_request_frees_cpu_and_queues_device_wait() {
        let mut core = core_with(1.0, &[10]);
        let events = core.tick();
        let SimEvent::IoRequested { pid, device } = events[1] else {
            panic!("expected an I/O request, got {events:?}");
        };
        assert_eq!(pid, 1);
        let process = core.ctx.process(1);
        assert_eq!(process.state, ProcState::WaitingIo);
        assert_eq!(process.io_kind, Some(device));
        assert_eq!(process.io_remaining, SimConfig::default().io_durations.of(device));
        assert!(core.ctx.process_in_any_queue(1));
        assert!(core.ctx.cpu_is_idle());
    }

    #[test]
    fn io_pass_visits_each_waiting_process_once() {
        let mut core = core_with(0.0, &[10, 10]);
        // Park both processes on the I/O queue by hand
        for (pid, device, duration) in [(1, IoKind::Tape, 2), (2, IoKind::Disk, 1)] {
            let popped = core.ctx.queue_pop(core.ctx.high_queue_id);
            assert_eq!(popped, Some(pid));
            core.ctx.set_running(pid, QueueLevel::High, 2);
            core.ctx.clear_cpu();
            core.ctx.start_io(pid, device, duration);
        }

        core.advance_io();
        assert_eq!(core.ctx.process(1).io_remaining, 1);
        assert_eq!(core.ctx.process(2).state, ProcState::ReadyLow);
        assert_eq!(
            core.ctx.take_events(),
            vec![SimEvent::IoCompleted {
                pid: 2,
                device: IoKind::Disk,
                to: QueueLevel::Low,
            }]
        );

        core.advance_io();
        assert_eq!(core.ctx.process(1).state, ProcState::ReadyHigh);
        assert!(core.ctx.queue_is_empty(core.ctx.io_queue()));
    }

    // Capacity-1 queues with process 1 high and process 2 already filling
    // the low queue, so any demotion of process 1 overflows
    fn full_low_queue_core() -> SchedCore<MlfqScheduler> {
        let config = SimConfig {
            io_probability: 0.0,
            queue_capacity: 1,
            ..SimConfig::default()
        };
        let mut core = SchedCore::new(&config, StdRng::seed_from_u64(7));
        let first = core.ctx.create_process(5);
        let second = core.ctx.create_process(5);
        assert!(core.ctx.make_ready(first, QueueLevel::High));
        assert!(core.ctx.make_ready(second, QueueLevel::Low));
        core
    }

    #[test]
    fn quantum_expiry_into_full_low_queue_drops_process() {
        let mut core = full_low_queue_core();
        core.tick();
        let events = core.tick();
        assert_eq!(
            events,
            vec![
                SimEvent::QueueOverflow {
                    pid: 1,
                    queue: QueueRole::Ready(QueueLevel::Low),
                },
                SimEvent::Preempted { pid: 1 },
            ]
        );
        assert_eq!(core.ctx.dropped, vec![1]);
        assert_eq!(core.ctx.process(1).state, ProcState::ReadyLow);
        assert!(!core.ctx.process_in_any_queue(1));

        for _ in 0..10 {
            core.tick();
        }
        assert_eq!(core.ctx.process(2).state, ProcState::Terminated);
        assert_eq!(core.ctx.process(1).burst_remaining, 3);
        assert!(!core.ctx.all_terminated());
        assert!(core.observer().violations().is_empty());
    }

    #[test]
    fn disk_completion_into_full_low_queue_drops_process() {
        let mut core = full_low_queue_core();
        assert_eq!(core.ctx.queue_pop(core.ctx.high_queue_id), Some(1));
        core.ctx.set_running(1, QueueLevel::High, 2);
        core.ctx.clear_cpu();
        assert!(core.ctx.start_io(1, IoKind::Disk, 1));

        let events = core.tick();
        assert_eq!(
            events,
            vec![
                SimEvent::QueueOverflow {
                    pid: 1,
                    queue: QueueRole::Ready(QueueLevel::Low),
                },
                SimEvent::IoCompleted {
                    pid: 1,
                    device: IoKind::Disk,
                    to: QueueLevel::Low,
                },
                SimEvent::Dispatched {
                    pid: 2,
                    from: QueueLevel::Low,
                    quantum: 4,
                },
            ]
        );
        assert_eq!(core.ctx.dropped, vec![1]);
        assert!(core.ctx.queue_is_empty(core.ctx.io_queue()));
        assert!(core.observer().violations().is_empty());
    }

    #[test]
    fn idle_tick_is_counted_when_nothing_is_ready() {
        let mut core = core_with(0.0, &[]);
        assert_eq!(core.tick(), vec![SimEvent::CpuIdle]);
        assert_eq!(core.ctx.idle_ticks, 1);
    }
}
