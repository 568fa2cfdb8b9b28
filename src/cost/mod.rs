//! Cost Curve Stage.
//!
//! Closed-form cost trajectories for training and fine-tuning over the fixed
//! horizon, plus the FLOP-based compute model that converts fine-tuning step
//! counts into dollar costs (and back).
//!
//! The central shape is a *damped* exponential decline: costs fall fast at
//! first (a golden era of efficiency gains), the rate of decline itself
//! decays (diminishing returns), and the curve asymptotes at a physical
//! floor. With `k0 = ln(rate)`:
//!
//! ```text
//! cumulative_decline(t) = (k0 / damping) * (1 - exp(-damping * t))
//! cost(t)               = floor + (base - floor) * exp(-cumulative_decline(t))
//! rate(t)               = exp(k0 * exp(-damping * t))
//! ```
//!
//! `cost(0)` equals `base` exactly and `cost(t)` never drops below `floor`.
//! The undamped comparison curve `base * rate^-t` is also produced so
//! consumers can chart how much the plateau changes the picture.

use serde::{Deserialize, Serialize};

use crate::params::{Parameters, HORIZON_YEARS};

/// Minimum damping substituted when the configured value is ~0, keeping the
/// `k0 / damping` division finite. Below this the curve is indistinguishable
/// from pure exponential decay over the horizon.
pub const MIN_DAMPING: f64 = 0.001;

/// Tokens per fine-tuning step: batch size 8 x sequence length 2048.
pub const TOKENS_PER_STEP: f64 = 8.0 * 2048.0;

/// FLOPs per parameter per token (forward + backward).
pub const FLOPS_PER_PARAM_TOKEN: f64 = 6.0;

/// Theoretical peak cluster throughput, FLOP/s.
pub const PEAK_THROUGHPUT: f64 = 3e15;

/// Empirical derating: real fine-tuning runs ~15x slower than theoretical
/// peak throughput would predict (kernel launch overhead, memory stalls,
/// communication).
pub const EFFICIENCY_FACTOR: f64 = 15.0;

/// One point on a cost trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostPoint {
    /// Year offset from now (0..=horizon).
    pub year: u32,
    /// Cost in absolute currency units.
    pub cost: f64,
}

/// An ordered sequence of (year, cost) pairs, non-increasing toward a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTrajectory {
    /// Points for years 0 through the horizon, inclusive.
    pub points: Vec<CostPoint>,
}

impl CostTrajectory {
    /// Cost at a given year. Years beyond the horizon return the final value
    /// (the curve has plateaued by then).
    pub fn cost_at(&self, year: usize) -> f64 {
        self.points
            .get(year)
            .or_else(|| self.points.last())
            .map_or(0.0, |p| p.cost)
    }

    /// First year at which the cost is at or below `budget`, or `None` if it
    /// never is within the horizon.
    pub fn first_year_at_or_below(&self, budget: f64) -> Option<usize> {
        self.points.iter().position(|p| p.cost <= budget)
    }
}

/// Damped-decay cost at year `t`.
///
/// `base` and `floor` are in absolute currency units; `rate` is the initial
/// annual cost-division factor (> 1); `damping` attenuates the decline over
/// time. Total over its validated domain.
pub fn damped_cost(base: f64, rate: f64, damping: f64, floor: f64, t: f64) -> f64 {
    let k0 = rate.ln();
    let d_eff = damping.max(MIN_DAMPING);
    let cumulative_decline = (k0 / d_eff) * (1.0 - (-d_eff * t).exp());
    (floor + (base - floor) * (-cumulative_decline).exp()).max(floor)
}

/// Instantaneous annual cost-division multiplier at year `t`.
///
/// Starts at `rate` and decays toward 1 as the damping bites.
pub fn instantaneous_rate(rate: f64, damping: f64, t: f64) -> f64 {
    let k0 = rate.ln();
    let d_eff = damping.max(MIN_DAMPING);
    (k0 * (-d_eff * t).exp()).exp()
}

/// Undamped, floorless comparison curve: `base * rate^-t`.
pub fn naive_cost(base: f64, rate: f64, t: f64) -> f64 {
    base * rate.powf(-t)
}

fn trajectory(base: f64, rate: f64, damping: f64, floor: f64) -> CostTrajectory {
    let points = (0..=HORIZON_YEARS)
        .map(|year| CostPoint {
            year: year as u32,
            cost: damped_cost(base, rate, damping, floor, year as f64),
        })
        .collect();
    CostTrajectory { points }
}

fn naive_trajectory(base: f64, rate: f64) -> CostTrajectory {
    let points = (0..=HORIZON_YEARS)
        .map(|year| CostPoint {
            year: year as u32,
            cost: naive_cost(base, rate, year as f64),
        })
        .collect();
    CostTrajectory { points }
}

fn rate_sequence(rate: f64, damping: f64) -> Vec<f64> {
    (0..=HORIZON_YEARS)
        .map(|year| instantaneous_rate(rate, damping, year as f64))
        .collect()
}

/// Training cost trajectory in absolute currency units.
pub fn training_trajectory(params: &Parameters) -> CostTrajectory {
    trajectory(
        params.training_base_abs(),
        params.training_decay_rate,
        params.training_damping,
        params.training_floor_abs(),
    )
}

/// Undamped training comparison curve.
pub fn training_naive_trajectory(params: &Parameters) -> CostTrajectory {
    naive_trajectory(params.training_base_abs(), params.training_decay_rate)
}

/// Per-year training cost-division multipliers.
pub fn training_rate_sequence(params: &Parameters) -> Vec<f64> {
    rate_sequence(params.training_decay_rate, params.training_damping)
}

/// Fine-tune cost trajectory in absolute currency units.
pub fn fine_tune_trajectory(params: &Parameters) -> CostTrajectory {
    trajectory(
        params.fine_tune_base_abs(),
        params.fine_tune_decay_rate,
        params.fine_tune_damping,
        params.fine_tune_floor_abs(),
    )
}

/// Undamped fine-tune comparison curve.
pub fn fine_tune_naive_trajectory(params: &Parameters) -> CostTrajectory {
    naive_trajectory(params.fine_tune_base_abs(), params.fine_tune_decay_rate)
}

/// Per-year fine-tune cost-division multipliers.
pub fn fine_tune_rate_sequence(params: &Parameters) -> Vec<f64> {
    rate_sequence(params.fine_tune_decay_rate, params.fine_tune_damping)
}

/// Wall-clock seconds per fine-tuning step for a model of the given size,
/// after the empirical efficiency derating.
pub fn seconds_per_step(model_size_b: f64) -> f64 {
    let flops_per_step = FLOPS_PER_PARAM_TOKEN * model_size_b * 1e9 * TOKENS_PER_STEP;
    let seconds_theoretical = flops_per_step / PEAK_THROUGHPUT;
    seconds_theoretical * EFFICIENCY_FACTOR
}

/// GPU-hours needed for `steps` fine-tuning steps.
pub fn gpu_hours_for_steps(steps: u32, model_size_b: f64) -> f64 {
    f64::from(steps) * seconds_per_step(model_size_b) / 3600.0
}

/// Dollar cost of `steps` fine-tuning steps at the given GPU-hour price.
pub fn steps_to_cost(steps: u32, model_size_b: f64, gpu_hour_cost: f64) -> f64 {
    gpu_hours_for_steps(steps, model_size_b) * gpu_hour_cost
}

/// Inverse query: the (fractional) step count whose cost equals `budget`.
///
/// Plain algebraic inversion of [`steps_to_cost`]; no iteration involved.
pub fn budget_to_steps(budget: f64, model_size_b: f64, gpu_hour_cost: f64) -> f64 {
    let gpu_hours = budget / gpu_hour_cost;
    gpu_hours * 3600.0 / seconds_per_step(model_size_b)
}

/// Break cost at year 0: cost to defeat the safeguard via adversarial
/// fine-tuning at today's GPU prices.
pub fn break_cost_now(params: &Parameters) -> f64 {
    steps_to_cost(params.steps_to_break, params.model_size_b, params.gpu_hour_cost)
}

/// Break cost per year over the horizon.
///
/// Compute prices fall slower than turnkey fine-tuning services, so the break
/// cost decays at a fraction of the fine-tune rate's excess over 1
/// (`break_cost_decay_fraction`, default one half). Undamped and floorless.
pub fn break_cost_over_time(params: &Parameters) -> Vec<f64> {
    let now = break_cost_now(params);
    let effective_rate =
        1.0 + (params.fine_tune_decay_rate - 1.0) * params.break_cost_decay_fraction;
    (0..=HORIZON_YEARS)
        .map(|year| naive_cost(now, effective_rate, year as f64))
        .collect()
}
