use mlfq_model::core::{ProcState, QueueLevel, SimEvent, Ticks};
use mlfq_model::sim::cpu_utilization;
use mlfq_model::{MlfqSim, SimConfig};
use proptest::prelude::*;

fn config_strategy() -> impl Strategy<Value = SimConfig> {
    (0usize..12, 1u64..5, 1u64..8, 0.0f64..=1.0, 1u64..400).prop_map(
        |(process_count, quantum_high, quantum_low, io_probability, time_ceiling)| SimConfig {
            process_count,
            quantum_high,
            quantum_low,
            io_probability,
            time_ceiling,
            ..SimConfig::default()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_runs_uphold_scheduler_invariants(config in config_strategy(), seed in any::<u64>()) {
        let mut sim = MlfqSim::new(config.clone(), seed).unwrap();
        let mut idle_events = 0;
        let mut last_burst: Vec<Ticks> = sim
            .core
            .ctx
            .processes
            .iter()
            .map(|p| p.burst_total)
            .collect();

        while !sim.is_finished() {
            for event in sim.step() {
                if let SimEvent::Dispatched { pid, quantum, from } = event {
                    let level_quantum = match from {
                        QueueLevel::High => config.quantum_high,
                        QueueLevel::Low => config.quantum_low,
                    };
                    prop_assert!(quantum <= level_quantum);
                    prop_assert!(quantum >= 1);
                    prop_assert!(pid >= 1 && pid <= config.process_count);
                }
                if event == SimEvent::CpuIdle {
                    idle_events += 1;
                }
            }

            let ctx = &sim.core.ctx;
            prop_assert!(ctx.count_in_state(ProcState::Running) <= 1);
            for (last, p) in last_burst.iter_mut().zip(&ctx.processes) {
                prop_assert!(p.burst_remaining <= *last);
                *last = p.burst_remaining;
            }
        }

        prop_assert!(sim.core.observer().violations().is_empty());

        let report = sim.report();
        prop_assert!(report.total_ticks <= config.time_ceiling);
        prop_assert_eq!(report.idle_ticks, idle_events);
        prop_assert!((0.0..=100.0).contains(&report.cpu_utilization));
        prop_assert_eq!(
            report.cpu_utilization,
            cpu_utilization(report.total_ticks, report.idle_ticks)
        );
        if report.hit_time_ceiling {
            prop_assert_eq!(report.total_ticks, config.time_ceiling);
            prop_assert!(report.terminated < report.process_count);
        } else {
            prop_assert_eq!(report.terminated, report.process_count);
        }

        for row in &report.processes {
            prop_assert!((config.burst_min..=config.burst_max).contains(&row.burst_total));
            prop_assert_eq!(row.turnaround, row.wait + row.burst_total);
            match row.state {
                ProcState::Terminated => {
                    let elapsed = row.elapsed_turnaround.unwrap();
                    prop_assert!(elapsed + 1 >= row.burst_total);
                }
                _ => prop_assert!(row.elapsed_turnaround.is_none()),
            }
        }
    }

    #[test]
    fn prop_zero_io_probability_never_requests_io(
        seed in any::<u64>(),
        process_count in 1usize..8,
    ) {
        let config = SimConfig {
            process_count,
            io_probability: 0.0,
            ..SimConfig::default()
        };
        let mut sim = MlfqSim::new(config, seed).unwrap();
        let mut saw_io = false;
        let report = sim.run_with(|_, event| {
            saw_io |= matches!(event, SimEvent::IoRequested { .. } | SimEvent::IoCompleted { .. });
        });
        prop_assert!(!saw_io);
        prop_assert_eq!(report.idle_ticks, 0);
        let total_burst: Ticks = report.processes.iter().map(|p| p.burst_total).sum();
        prop_assert_eq!(report.total_ticks, total_burst);
    }
}
