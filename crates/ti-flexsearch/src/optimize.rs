//! Differential evolution (spec §4.5 "Optimizer"): a derivative-free
//! global optimizer over the bounded `2k`-dimensional box, driven by
//! `OptimizerSettings`'s population size, iteration cap, recombination
//! rate, and mutation range, with an optional coordinate-descent local
//! polish from the global optimum.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ti_core::config::OptimizerSettings;
use ti_core::error::Result;
use ti_guard::cancel::CancelToken;

use crate::candidate::clamp;

/// The result of one optimizer run: the best decision vector found, its
/// cost, and whether the run ended early via cancellation (spec §4.5
/// "return the best point found so far plus a `cancelled=true` marker").
#[derive(Debug, Clone)]
pub struct OptimizeResult {
    pub best_params: Vec<f64>,
    pub best_cost: f64,
    pub generations_run: usize,
    pub cancelled: bool,
}

/// Runs differential evolution to (approximately) minimize `cost_fn` over
/// `bounds`, honoring `cancel` between generations (spec §5). `cost_fn`
/// returning `Err` aborts the whole run; a `+inf` cost (the convention for
/// a per-evaluation solver failure) is treated as an ordinary, very bad
/// value and never discards the run.
///
/// `cost_fn` takes a flat, concatenated batch of candidates (each
/// `bounds.len()` long) and returns one cost per candidate in the same
/// order — batching the whole generation into one call is what lets the
/// caller evaluate it in parallel (spec §5 "within a generation,
/// evaluations may run in parallel") without this function knowing
/// anything about threads.
pub fn differential_evolution<F>(settings: &OptimizerSettings, bounds: &[(f64, f64)], cancel: &CancelToken, mut cost_fn: F) -> Result<OptimizeResult>
where
    F: FnMut(&[f64]) -> Result<Vec<f64>>,
{
    let dim = bounds.len();
    let mut rng = StdRng::seed_from_u64(settings.seed.unwrap_or_else(rand::random));

    let mut population: Vec<Vec<f64>> = (0..settings.population_size)
        .map(|_| bounds.iter().map(|&(lo, hi)| rng.random_range(lo..=hi)).collect())
        .collect();
    let mut costs = cost_fn(&population.concat())?;
    debug_assert_eq!(costs.len(), population.len());

    let mut generations_run = 0;
    let mut cancelled = false;

    for _gen in 0..settings.max_iterations {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        generations_run += 1;

        let (f_lo, f_hi) = settings.mutation_range;
        let mut trials = Vec::with_capacity(population.len());
        for i in 0..population.len() {
            let mut idxs: Vec<usize> = (0..population.len()).filter(|&j| j != i).collect();
            // Partial Fisher-Yates on just the first three slots is enough;
            // a full shuffle would waste work we never use.
            for slot in 0..3.min(idxs.len()) {
                let pick = rng.random_range(slot..idxs.len());
                idxs.swap(slot, pick);
            }
            let (a, b, c) = (idxs[0], idxs[1], idxs[2]);
            let f_scale = if (f_hi - f_lo).abs() < f64::EPSILON { f_lo } else { rng.random_range(f_lo..=f_hi) };

            let mut trial = population[i].clone();
            let forced_dim = rng.random_range(0..dim);
            for d in 0..dim {
                if d == forced_dim || rng.random::<f64>() < settings.recombination_rate {
                    let mutant = population[a][d] + f_scale * (population[b][d] - population[c][d]);
                    let (lo, hi) = bounds[d];
                    trial[d] = clamp(mutant, lo, hi);
                }
            }
            trials.push(trial);
        }

        let trial_costs = cost_fn(&trials.concat())?;
        for i in 0..population.len() {
            if trial_costs[i] <= costs[i] {
                population[i] = trials[i].clone();
                costs[i] = trial_costs[i];
            }
        }

        let (min, max) = costs.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(mn, mx), &c| (mn.min(c), mx.max(c)));
        if (max - min).abs() < settings.convergence_tolerance {
            break;
        }
    }

    let (best_idx, &best_cost) = costs.iter().enumerate().min_by(|(_, a), (_, b)| a.total_cmp(b)).expect("population is non-empty");
    let mut result = OptimizeResult { best_params: population[best_idx].clone(), best_cost, generations_run, cancelled };

    if !cancelled {
        local_polish(bounds, cancel, &mut result, &mut cost_fn)?;
    }
    Ok(result)
}

/// A bounded coordinate-descent refinement from the global optimum (spec
/// §4.5 "an optional local polish pass is run from the global optimum"):
/// for each dimension, try a shrinking step in both directions and keep
/// any improvement.
fn local_polish<F>(bounds: &[(f64, f64)], cancel: &CancelToken, result: &mut OptimizeResult, cost_fn: &mut F) -> Result<()>
where
    F: FnMut(&[f64]) -> Result<Vec<f64>>,
{
    const SWEEPS: usize = 4;
    for _ in 0..SWEEPS {
        if cancel.is_cancelled() {
            result.cancelled = true;
            return Ok(());
        }
        for d in 0..bounds.len() {
            let (lo, hi) = bounds[d];
            let step = (hi - lo) * 0.02;
            if step <= 0.0 {
                continue;
            }
            for &delta in &[step, -step] {
                let mut candidate = result.best_params.clone();
                candidate[d] = clamp(candidate[d] + delta, lo, hi);
                let cost = cost_fn(&candidate)?[0];
                if cost < result.best_cost {
                    result.best_params = candidate;
                    result.best_cost = cost;
                }
            }
        }
    }
    Ok(())
}
