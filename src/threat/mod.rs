//! Threat Stage.
//!
//! Combines cost affordability, capability probabilities, and the active
//! interventions into a residual-threat matrix: for every attacker class and
//! every year of the horizon, the probability of successful misuse that
//! survives every modeled barrier.
//!
//! Each cell is produced by a fixed decision sequence (affordability gate,
//! safeguard derating, novelty blend, screening, compute governance,
//! surveillance). The reduction factors compose multiplicatively *in that
//! order*; the order is part of the model contract and reordering changes
//! results.

use serde::{Deserialize, Serialize};

use crate::capability::{dangerous_capability, effectiveness_under_pressure, novel_capability};
use crate::cost::CostTrajectory;
use crate::params::{AttackerProfile, Parameters, HORIZON_YEARS};

/// Weight of the base threat in the base/novelty blend.
pub const BASE_BLEND: f64 = 0.6;

/// Weight of the novelty contribution in the base/novelty blend.
pub const NOVELTY_BLEND: f64 = 0.4;

/// Novelty contribution for attackers that cannot train from scratch,
/// as a fraction of their base threat.
pub const NOVELTY_FALLBACK: f64 = 0.4;

/// Compute-governance reduction applied to attackers who could train from
/// scratch (their runs are large enough to be visible).
pub const GOV_TRAIN_REDUCTION: f64 = 0.6;

/// Compute-governance reduction applied to fine-tune-only attackers.
pub const GOV_FINE_TUNE_REDUCTION: f64 = 0.2;

/// Fraction of surveillance effectiveness that translates into threat
/// reduction.
pub const SURVEILLANCE_WEIGHT: f64 = 0.5;

/// Floor for the effective threat in the known-fraction division. The
/// discontinuity this introduces near zero is intentional clamping, not an
/// artifact to smooth over.
pub const MIN_EFFECTIVE_THREAT: f64 = 0.01;

/// Residual-threat grid, attacker x year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatMatrix {
    /// Attacker names, in parameter order.
    pub attackers: Vec<String>,
    /// `cells[i][t]` is the residual threat for attacker `i` at year `t`.
    /// Every value is in [0, 1]. Rows span years 0 through the horizon.
    pub cells: Vec<Vec<f64>>,
}

impl ThreatMatrix {
    /// Residual threat for one attacker at one year.
    pub fn cell(&self, attacker: usize, year: usize) -> f64 {
        self.cells[attacker][year]
    }

    /// Row for a named attacker, if present.
    pub fn row(&self, name: &str) -> Option<&[f64]> {
        self.attackers
            .iter()
            .position(|n| n == name)
            .map(|i| self.cells[i].as_slice())
    }

    /// Largest residual threat anywhere in the grid.
    pub fn peak(&self) -> f64 {
        self.cells
            .iter()
            .flat_map(|row| row.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// An intervention with its configured strength and whether it is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionValue {
    /// Display name.
    pub name: String,
    /// Strength in [0, 100].
    pub value: f64,
    /// Whether the intervention contributes any reduction at all.
    pub active: bool,
}

/// Residual threat for one attacker at one year.
///
/// `training_cost` and `fine_tune_cost` are the absolute costs at that year;
/// `p_danger` and `p_novel` come from the Capability Stage. The eight-step
/// sequence is documented at the module level.
pub fn residual_threat(
    params: &Parameters,
    attacker: &AttackerProfile,
    training_cost: f64,
    fine_tune_cost: f64,
    p_danger: f64,
    p_novel: f64,
) -> f64 {
    let can_train = attacker.budget >= training_cost;
    let can_fine_tune = attacker.budget >= fine_tune_cost;

    if !can_train && !can_fine_tune {
        return 0.0;
    }

    // Base threat: full capability for from-scratch trainers; fine-tuners
    // face the safeguard, which erodes once their budget exceeds the
    // fine-tune cost it deters.
    let base = if can_train {
        p_danger
    } else {
        let budget_ratio = attacker.budget / fine_tune_cost;
        let blocked =
            effectiveness_under_pressure(params.safeguard_strength / 100.0, budget_ratio);
        p_danger * (1.0 - blocked)
    };

    // Novelty: from-scratch trainers get the full novel-capability
    // probability; fine-tuners inherit a fixed fraction of their base threat.
    let novelty = if can_train {
        p_novel
    } else {
        base * NOVELTY_FALLBACK
    };
    let effective = BASE_BLEND * base + NOVELTY_BLEND * novelty;

    // Synthesis screening blocks the known share fully and the novel share
    // only at the novel-detection rate.
    let coverage = params.screening_coverage / 100.0;
    let novel_detect = params.screening_novel_detect / 100.0;
    let known_frac = (1.0 - novelty / effective.max(MIN_EFFECTIVE_THREAT)).clamp(0.0, 1.0);
    let screening_blocked = coverage * (known_frac + (1.0 - known_frac) * novel_detect);
    let mut residual = effective * (1.0 - screening_blocked);

    // Compute governance only bites while training runs are expensive enough
    // to be visible.
    if training_cost > params.compute_gov_threshold_abs() {
        let reduction = if can_train {
            GOV_TRAIN_REDUCTION
        } else {
            GOV_FINE_TUNE_REDUCTION
        };
        residual *= 1.0 - reduction;
    }

    residual *= 1.0 - params.surveillance_eff / 100.0 * SURVEILLANCE_WEIGHT;

    residual.clamp(0.0, 1.0)
}

/// Build the full attacker x year residual-threat matrix.
pub fn threat_matrix(
    params: &Parameters,
    training: &CostTrajectory,
    fine_tune: &CostTrajectory,
) -> ThreatMatrix {
    let p_danger = dangerous_capability(params);
    let p_novel = novel_capability(params);

    let cells = params
        .attackers
        .iter()
        .map(|attacker| {
            (0..=HORIZON_YEARS)
                .map(|year| {
                    residual_threat(
                        params,
                        attacker,
                        training.cost_at(year),
                        fine_tune.cost_at(year),
                        p_danger,
                        p_novel,
                    )
                })
                .collect()
        })
        .collect();

    ThreatMatrix {
        attackers: params.attackers.iter().map(|a| a.name.clone()).collect(),
        cells,
    }
}

/// Report each intervention's configured strength and whether it is live.
///
/// The percentage interventions report their configured value directly.
/// Compute governance has no natural percentage, so its value is the share
/// of horizon years during which the training cost exceeds the governance
/// threshold (how long the lever has any bite).
pub fn intervention_values(params: &Parameters, training: &CostTrajectory) -> Vec<InterventionValue> {
    let percentage = |name: &str, value: f64| InterventionValue {
        name: name.to_string(),
        value,
        active: value > 0.0,
    };

    let threshold = params.compute_gov_threshold_abs();
    let years_above = training
        .points
        .iter()
        .filter(|p| p.cost > threshold)
        .count();
    let gov_bite = 100.0 * years_above as f64 / training.points.len() as f64;

    vec![
        percentage("Safeguard strength", params.safeguard_strength),
        percentage("Screening coverage", params.screening_coverage),
        percentage("Novel-agent detection", params.screening_novel_detect),
        percentage("Surveillance", params.surveillance_eff),
        percentage("Compute governance", gov_bite),
    ]
}
