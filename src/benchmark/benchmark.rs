use std::time::Instant;

use crate::simulation::backend::{CpuBackend, ParallelBackend, StepBackend};
use crate::simulation::coupled::CoupledSystem;
use crate::simulation::params::{BodyParams, Coupling};
use crate::simulation::states::Body;

/// Helper to build a chain of `n` bodies, each coupled to the next
/// Deterministic initial displacements, no rand needed
fn make_chain(n: usize) -> Option<CoupledSystem> {
    let params = BodyParams::new(1.0, 0.05, 2.0).ok()?;
    let bodies = (0..n)
        .map(|i| {
            let i_f = i as f64;
            Body {
                x: (i_f * 0.37).sin(),
                v: (i_f * 0.13).cos() * 0.1,
                params,
            }
        })
        .collect();
    let couplings = (1..n).map(|i| Coupling::new(i - 1, i, 1.0)).collect();
    CoupledSystem::from_bodies(bodies, couplings).ok()
}

/// Average wall time of one step, in seconds
fn time_steps(system: &CoupledSystem, backend: &dyn StepBackend, h: f64, steps: usize) -> Option<f64> {
    let state = system.initial_state();

    // Warm up
    system.advance(backend, 0.0, state, h, 1).ok()?;

    let t0 = Instant::now();
    system.advance(backend, 0.0, state, h, steps).ok()?;
    Some(t0.elapsed().as_secs_f64() / steps as f64)
}

/// Compare per-step cost of the sequential and parallel backends
pub fn bench_backends() {
    let ns = [200, 400, 800, 1600, 3200, 6400, 12800, 25600];
    let steps = 20;
    let h = 0.001;

    for n in ns {
        let Some(system) = make_chain(n) else {
            println!("N = {n:5}, failed to build chain");
            continue;
        };

        let cpu = time_steps(&system, &CpuBackend, h, steps);
        let par = time_steps(&system, &ParallelBackend::default(), h, steps);

        match (cpu, par) {
            (Some(cpu), Some(par)) => {
                println!("N = {:5}, cpu step = {:8.6} s,   parallel step = {:8.6} s", n, cpu, par)
            }
            _ => println!("N = {n:5}, step failed"),
        }
    }
}

/// Same comparison over a fine range of n
/// Paste output directly into a spreadsheet to graph
pub fn bench_backends_curve() {
    println!("N,cpu_ms,parallel_ms");

    for n in (1000..=50000).step_by(1000) {
        // Small n: average over more steps to smooth noise
        let steps = if n <= 10000 { 50 } else { 10 };

        let Some(system) = make_chain(n) else {
            continue;
        };

        let cpu = time_steps(&system, &CpuBackend, 0.001, steps);
        let par = time_steps(&system, &ParallelBackend::default(), 0.001, steps);

        if let (Some(cpu), Some(par)) = (cpu, par) {
            println!("{},{:.6},{:.6}", n, cpu * 1000.0, par * 1000.0);
        }
    }
}
