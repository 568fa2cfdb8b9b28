//! Model engine: `evaluate(&Parameters) -> Results`.
//!
//! The engine is the sole collaboration boundary with any presentation
//! layer. It is pure and synchronous: no interior state, no I/O, no
//! suspension points. Identical parameters always produce identical results,
//! and independent evaluations may run concurrently without coordination.
//!
//! Stage order: the Cost Curve and Capability stages are independent leaves;
//! the Threat Stage consumes both; the Decision Stage consumes the Threat
//! and Cost Curve outputs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capability::{dangerous_capability, effectiveness_under_pressure, novel_capability};
use crate::cost::{
    break_cost_now, break_cost_over_time, fine_tune_naive_trajectory, fine_tune_rate_sequence,
    fine_tune_trajectory, gpu_hours_for_steps, training_naive_trajectory, training_rate_sequence,
    training_trajectory, CostTrajectory,
};
use crate::decision::{assess, decision_metrics, RelevanceAssessment, RelevanceLevel};
use crate::error::{ModelError, Result};
use crate::params::{Parameters, HORIZON_YEARS};
use crate::threat::{intervention_values, threat_matrix, InterventionValue, ThreatMatrix};

/// Capability probabilities at the configured model size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySummary {
    /// P(dangerous capability present).
    pub dangerous: f64,
    /// P(novel capability present).
    pub novel: f64,
}

/// Break-cost figures: now and over the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakCost {
    /// Dollar cost to defeat the safeguard at year 0.
    pub cost_now: f64,
    /// GPU-hours behind that cost.
    pub gpu_hours: f64,
    /// Break cost per year over the horizon.
    pub over_time: Vec<f64>,
}

/// Per-attacker affordability over the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackerAffordability {
    /// Attacker name, matching the parameter order.
    pub name: String,
    /// Whether training from scratch is affordable at each year.
    pub can_train: Vec<bool>,
    /// Whether fine-tuning is affordable at each year.
    pub can_fine_tune: Vec<bool>,
    /// Fraction of nominal safeguard effectiveness retained against this
    /// attacker's budget, relative to the calibrated budget threshold.
    pub safeguard_retention: f64,
}

/// Everything one evaluation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    /// Training cost trajectory (damped, floored), absolute units.
    pub training_cost: CostTrajectory,
    /// Undamped floorless training comparison curve.
    pub training_cost_naive: CostTrajectory,
    /// Fine-tune cost trajectory (damped, floored), absolute units.
    pub fine_tune_cost: CostTrajectory,
    /// Undamped floorless fine-tune comparison curve.
    pub fine_tune_cost_naive: CostTrajectory,
    /// Instantaneous training cost-division multiplier per year.
    pub training_rate: Vec<f64>,
    /// Instantaneous fine-tune cost-division multiplier per year.
    pub fine_tune_rate: Vec<f64>,
    /// Capability probabilities at the configured model size.
    pub capability: CapabilitySummary,
    /// Residual-threat grid, attacker x year.
    pub threat: ThreatMatrix,
    /// Interventions with configured strengths and live flags.
    pub interventions: Vec<InterventionValue>,
    /// Break-cost figures.
    pub break_cost: BreakCost,
    /// Per-attacker affordability bands.
    pub affordability: Vec<AttackerAffordability>,
    /// The relevance verdict and its contributing metrics.
    pub assessment: RelevanceAssessment,
}

/// Evaluate the full model for one parameter set.
///
/// Validates first and fails fast on any out-of-domain parameter; past
/// validation every formula is total and the result is finite everywhere.
pub fn evaluate(params: &Parameters) -> Result<Results> {
    params.validate()?;

    let training_cost = training_trajectory(params);
    let fine_tune_cost = fine_tune_trajectory(params);
    debug!(
        training_year0 = training_cost.cost_at(0),
        training_final = training_cost.cost_at(HORIZON_YEARS),
        "cost stage"
    );

    let capability = CapabilitySummary {
        dangerous: dangerous_capability(params),
        novel: novel_capability(params),
    };
    debug!(dangerous = capability.dangerous, novel = capability.novel, "capability stage");

    let threat = threat_matrix(params, &training_cost, &fine_tune_cost);
    debug!(peak = threat.peak(), "threat stage");

    let over_time = break_cost_over_time(params);
    let metrics = decision_metrics(params, &training_cost, &fine_tune_cost, &over_time);
    let assessment = assess(metrics);
    debug!(
        score = assessment.score,
        level = %assessment.level,
        reason = %assessment.reason,
        "decision stage"
    );

    let interventions = intervention_values(params, &training_cost);
    let affordability = params
        .attackers
        .iter()
        .map(|attacker| AttackerAffordability {
            name: attacker.name.clone(),
            can_train: (0..=HORIZON_YEARS)
                .map(|year| attacker.budget >= training_cost.cost_at(year))
                .collect(),
            can_fine_tune: (0..=HORIZON_YEARS)
                .map(|year| attacker.budget >= fine_tune_cost.cost_at(year))
                .collect(),
            safeguard_retention: effectiveness_under_pressure(
                1.0,
                attacker.budget / params.safeguard_budget_threshold,
            ),
        })
        .collect();

    Ok(Results {
        training_cost,
        training_cost_naive: training_naive_trajectory(params),
        fine_tune_cost,
        fine_tune_cost_naive: fine_tune_naive_trajectory(params),
        training_rate: training_rate_sequence(params),
        fine_tune_rate: fine_tune_rate_sequence(params),
        capability,
        threat,
        interventions,
        break_cost: BreakCost {
            cost_now: break_cost_now(params),
            gpu_hours: gpu_hours_for_steps(params.steps_to_break, params.model_size_b),
            over_time,
        },
        affordability,
        assessment,
    })
}

/// One point of a sensitivity sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// The swept parameter's value at this point.
    pub value: f64,
    /// Relevance score at this value.
    pub score: f64,
    /// Relevance level at this value.
    pub level: RelevanceLevel,
}

/// Sweep one named scalar parameter over a linear range and collect the
/// relevance verdict at each point.
///
/// Evaluations are independent and microsecond-cheap, so this runs them
/// sequentially. A value that leaves the parameter's domain surfaces as the
/// usual validation error.
pub fn sweep_scores(
    base: &Parameters,
    param: &str,
    start: f64,
    end: f64,
    points: usize,
) -> Result<Vec<SweepPoint>> {
    if points < 2 {
        return Err(ModelError::Validation(
            "sweep needs at least 2 points".to_string(),
        ));
    }
    let step = (end - start) / (points - 1) as f64;
    (0..points)
        .map(|i| {
            let value = start + step * i as f64;
            let mut params = base.clone();
            set_scalar(&mut params, param, value)?;
            let results = evaluate(&params)?;
            Ok(SweepPoint {
                value,
                score: results.assessment.score,
                level: results.assessment.level,
            })
        })
        .collect()
}

/// Set a scalar parameter by name. Names mirror the `Parameters` fields.
fn set_scalar(params: &mut Parameters, name: &str, value: f64) -> Result<()> {
    match name {
        "model_size_b" => params.model_size_b = value,
        "training_cost_base" => params.training_cost_base = value,
        "training_decay_rate" => params.training_decay_rate = value,
        "training_damping" => params.training_damping = value,
        "training_floor" => params.training_floor = value,
        "fine_tune_cost_base" => params.fine_tune_cost_base = value,
        "fine_tune_decay_rate" => params.fine_tune_decay_rate = value,
        "fine_tune_damping" => params.fine_tune_damping = value,
        "fine_tune_floor" => params.fine_tune_floor = value,
        "dangerous_cap_threshold_b" => params.dangerous_cap_threshold_b = value,
        "steps_to_break" => params.steps_to_break = value.max(0.0).round() as u32,
        "gpu_hour_cost" => params.gpu_hour_cost = value,
        "safeguard_budget_threshold" => params.safeguard_budget_threshold = value,
        "safeguard_strength" => params.safeguard_strength = value,
        "screening_coverage" => params.screening_coverage = value,
        "screening_novel_detect" => params.screening_novel_detect = value,
        "surveillance_eff" => params.surveillance_eff = value,
        "compute_gov_threshold_m" => params.compute_gov_threshold_m = value,
        "break_cost_decay_fraction" => params.break_cost_decay_fraction = value,
        other => return Err(ModelError::UnknownName(other.to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_default_parameters() {
        let results = evaluate(&Parameters::default()).unwrap();
        assert_eq!(results.training_cost.points.len(), HORIZON_YEARS + 1);
        assert_eq!(results.training_rate.len(), HORIZON_YEARS + 1);
        assert_eq!(results.threat.cells.len(), 4);
        assert_eq!(results.affordability.len(), 4);
        assert_eq!(results.interventions.len(), 5);
        assert_eq!(results.break_cost.over_time.len(), HORIZON_YEARS + 1);
        assert!(results.capability.dangerous > 0.0 && results.capability.dangerous < 1.0);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let params = Parameters::default();
        let a = evaluate(&params).unwrap();
        let b = evaluate(&params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_evaluate_rejects_invalid_parameters() {
        let mut params = Parameters::default();
        params.fine_tune_decay_rate = 0.5;
        assert!(evaluate(&params).is_err());
    }

    #[test]
    fn test_state_actor_retains_no_safeguard_protection() {
        let results = evaluate(&Parameters::default()).unwrap();
        let state = results
            .affordability
            .iter()
            .find(|a| a.name == "State actor")
            .unwrap();
        // $5B budget against a $100k calibration threshold.
        assert!(state.safeguard_retention < 1e-10);
        assert!(state.can_train.iter().all(|&v| v));
    }

    #[test]
    fn test_lone_actor_keeps_full_retention() {
        let results = evaluate(&Parameters::default()).unwrap();
        let lone = results
            .affordability
            .iter()
            .find(|a| a.name == "Lone actor")
            .unwrap();
        // $10k budget sits below the $100k calibration threshold.
        assert_eq!(lone.safeguard_retention, 1.0);
        assert!(!lone.can_train[0]);
    }

    #[test]
    fn test_sweep_covers_requested_range() {
        let points =
            sweep_scores(&Parameters::default(), "safeguard_strength", 0.0, 100.0, 5).unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].value, 0.0);
        assert_eq!(points[4].value, 100.0);
        for p in &points {
            assert!((0.0..=100.0).contains(&p.score));
        }
    }

    #[test]
    fn test_sweep_rejects_unknown_parameter() {
        let err = sweep_scores(&Parameters::default(), "nonsense", 0.0, 1.0, 3).unwrap_err();
        assert!(matches!(err, ModelError::UnknownName(_)));
    }

    #[test]
    fn test_sweep_surfaces_domain_violations() {
        // Decay rates below 1 are out of domain; the sweep must not mask that.
        let err = sweep_scores(&Parameters::default(), "training_decay_rate", 0.5, 3.0, 4);
        assert!(err.is_err());
    }

    #[test]
    fn test_results_serialize_to_json() {
        let results = evaluate(&Parameters::default()).unwrap();
        let json = serde_json::to_string(&results).unwrap();
        let back: Results = serde_json::from_str(&json).unwrap();
        // Bit-exact across the trip, including long-mantissa values like the
        // population-weighted blocked share.
        assert_eq!(
            results.assessment.metrics.blocked_pct5,
            back.assessment.metrics.blocked_pct5
        );
        assert_eq!(results, back);
    }
}
