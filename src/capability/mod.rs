//! Capability Stage.
//!
//! Maps model scale to dangerous-capability probabilities and models how
//! safeguard effectiveness erodes once an attacker can outspend the barrier.
//!
//! Capability follows a logistic curve in log-scale: a model at the
//! configured midpoint has a 50% probability of dangerous capability, and
//! each decade of scale above it pushes the probability toward 1. "Novel"
//! capability (designing agents beyond the known threat list) is either
//! gated on additional scale (midpoint 2.5x higher) or assumed to track
//! dangerous capability at a flat 0.7, selected by a policy switch.

use crate::params::Parameters;

/// Logistic steepness in log10-scale units.
pub const DEFAULT_STEEPNESS: f64 = 1.5;

/// Novel capability midpoint multiplier when novelty is scale-gated.
pub const NOVEL_MIDPOINT_MULT: f64 = 2.5;

/// Novel capability fraction of dangerous capability when not scale-gated.
pub const NOVEL_FLAT_MULT: f64 = 0.7;

/// Exponent coefficient for safeguard erosion under budget pressure.
pub const PRESSURE_DECAY: f64 = 0.5;

/// Probability that a model of `model_size_b` billions of parameters has a
/// given capability, with `midpoint_b` the 50% crossing point.
pub fn logistic_capability(model_size_b: f64, midpoint_b: f64) -> f64 {
    let x = model_size_b.log10() - midpoint_b.log10();
    let p = 1.0 / (1.0 + (-DEFAULT_STEEPNESS * 5.0 * x).exp());
    p.clamp(0.0, 1.0)
}

/// Dangerous-capability probability at the configured model size.
pub fn dangerous_capability(params: &Parameters) -> f64 {
    logistic_capability(params.model_size_b, params.dangerous_cap_threshold_b)
}

/// Novel-capability probability at the configured model size.
///
/// Scale-gated novelty shifts the logistic midpoint up by
/// [`NOVEL_MIDPOINT_MULT`]; otherwise novelty is a flat
/// [`NOVEL_FLAT_MULT`] fraction of the dangerous-capability value.
pub fn novel_capability(params: &Parameters) -> f64 {
    if params.novelty_requires_scale {
        logistic_capability(
            params.model_size_b,
            params.dangerous_cap_threshold_b * NOVEL_MIDPOINT_MULT,
        )
    } else {
        (dangerous_capability(params) * NOVEL_FLAT_MULT).clamp(0.0, 1.0)
    }
}

/// Safeguard effectiveness after budget pressure.
///
/// `base` is the undiminished effectiveness (any unit); `budget_ratio` is the
/// attacker's budget over the cost the safeguard is meant to deter.
/// Effectiveness is undiminished at ratios up to 1 and decays exponentially
/// beyond it: an attacker with twice the deterrence budget sees
/// `base * exp(-0.5)`, roughly a 39% reduction.
pub fn effectiveness_under_pressure(base: f64, budget_ratio: f64) -> f64 {
    base * (-PRESSURE_DECAY * (budget_ratio - 1.0).max(0.0)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_gives_half_probability() {
        let p = logistic_capability(30.0, 30.0);
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_capability_increases_with_scale() {
        let small = logistic_capability(1.0, 30.0);
        let mid = logistic_capability(30.0, 30.0);
        let large = logistic_capability(1000.0, 30.0);
        assert!(small < mid && mid < large);
        assert!(small > 0.0 && large < 1.0);
    }

    #[test]
    fn test_decade_above_midpoint_is_near_certain() {
        // One decade above the midpoint: 1/(1+exp(-7.5)) ~ 0.99945.
        let p = logistic_capability(300.0, 30.0);
        assert!(p > 0.999);
    }

    #[test]
    fn test_scale_gated_novelty_lags_dangerous() {
        let params = Parameters {
            novelty_requires_scale: true,
            ..Default::default()
        };
        assert!(novel_capability(&params) < dangerous_capability(&params));
    }

    #[test]
    fn test_flat_novelty_is_fixed_fraction() {
        let params = Parameters {
            novelty_requires_scale: false,
            ..Default::default()
        };
        let expected = dangerous_capability(&params) * NOVEL_FLAT_MULT;
        assert!((novel_capability(&params) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_effectiveness_undiminished_below_ratio_one() {
        assert_eq!(effectiveness_under_pressure(0.8, 0.3), 0.8);
        assert_eq!(effectiveness_under_pressure(0.8, 1.0), 0.8);
    }

    // Budget $1000 against a $500 fine-tune cost: ratio 2, a ~39% reduction.
    #[test]
    fn test_effectiveness_at_double_budget() {
        let base = 0.8;
        let eff = effectiveness_under_pressure(base, 2.0);
        let expected = base * (-0.5f64).exp();
        assert!((eff - expected).abs() < 1e-12);
        assert!((1.0 - eff / base - 0.3935).abs() < 0.001);
    }

    #[test]
    fn test_effectiveness_vanishes_under_overwhelming_budget() {
        let eff = effectiveness_under_pressure(1.0, 50.0);
        assert!(eff < 1e-10);
    }
}
