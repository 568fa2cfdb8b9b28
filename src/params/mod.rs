//! Evaluation parameters.
//!
//! One immutable [`Parameters`] value describes everything a single
//! [`evaluate`](crate::engine::evaluate) call needs: model scale, cost-decay
//! curves, the attacker population, safeguard robustness, and intervention
//! strengths. Callers that drive the model from UI controls own mutation and
//! diffing; the engine only ever reads a finished value.
//!
//! All domain checks live in [`Parameters::validate`], which runs before any
//! stage computes. A parameter outside its domain is a caller error and is
//! reported verbatim, never papered over.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Fixed evaluation horizon in years. Trajectories have `HORIZON_YEARS + 1`
/// points (year 0 through year 15 inclusive).
pub const HORIZON_YEARS: usize = 15;

/// Training cost base/floor are expressed in millions of currency units.
pub const TRAINING_COST_SCALE: f64 = 1e6;

/// Fine-tune cost base/floor are expressed in thousands of currency units.
pub const FINE_TUNE_COST_SCALE: f64 = 1e3;

/// A class of adversary with a budget and a population count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackerProfile {
    /// Display name (e.g., "Lone actor").
    pub name: String,
    /// Budget in absolute currency units. Must be positive.
    pub budget: f64,
    /// Estimated population of this class. May be zero.
    pub count: u32,
    /// Presentation hint carried through untouched (chart color).
    pub color_tag: String,
}

impl AttackerProfile {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, budget: f64, count: u32, color_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            budget,
            count,
            color_tag: color_tag.into(),
        }
    }
}

/// Full parameter set for one evaluation.
///
/// `Default` is the canonical baseline scenario: a 40 B-parameter model,
/// training costs starting at $20 M with a $50 k physical floor, and the four
/// canonical attacker classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Model size in billions of parameters. Must be positive.
    pub model_size_b: f64,

    /// Training cost at year 0, in millions of currency units.
    pub training_cost_base: f64,
    /// Initial annual cost-division factor for training. Must exceed 1.
    pub training_decay_rate: f64,
    /// Attenuation of the training decay rate over time. Non-negative.
    pub training_damping: f64,
    /// Irreducible training cost, in millions. At most `training_cost_base`.
    pub training_floor: f64,

    /// Fine-tune cost at year 0, in thousands of currency units.
    pub fine_tune_cost_base: f64,
    /// Initial annual cost-division factor for fine-tuning. Must exceed 1.
    pub fine_tune_decay_rate: f64,
    /// Attenuation of the fine-tune decay rate over time. Non-negative.
    pub fine_tune_damping: f64,
    /// Irreducible fine-tune cost, in thousands. At most `fine_tune_cost_base`.
    pub fine_tune_floor: f64,

    /// Model scale (billions of params) at which dangerous capability
    /// crosses 50% probability.
    pub dangerous_cap_threshold_b: f64,
    /// Whether novel capability is gated on additional scale (logistic with a
    /// 2.5x higher midpoint) or tracks dangerous capability at a flat 0.7.
    pub novelty_requires_scale: bool,

    /// Attacker classes, ordered. Must be non-empty.
    pub attackers: Vec<AttackerProfile>,

    /// Fine-tuning steps needed to strip the safeguard. Must be positive.
    pub steps_to_break: u32,
    /// GPU-hour price in currency units. Must be positive.
    pub gpu_hour_cost: f64,
    /// Budget at which the safeguard was calibrated to hold; effectiveness
    /// decays once an attacker's budget exceeds it. Must be positive.
    pub safeguard_budget_threshold: f64,

    /// Safeguard strength, 0-100.
    pub safeguard_strength: f64,
    /// Synthesis-screening coverage, 0-100.
    pub screening_coverage: f64,
    /// Screening detection rate for novel agents, 0-100.
    pub screening_novel_detect: f64,
    /// Surveillance effectiveness, 0-100.
    pub surveillance_eff: f64,
    /// Compute-governance threshold in millions of currency units; training
    /// runs costing more than this are assumed visible to regulators.
    pub compute_gov_threshold_m: f64,

    /// Fraction of the fine-tune decay rate's excess over 1 that applies to
    /// the break cost over time. A modeling assumption (default 0.5), not a
    /// physical law; kept tunable so sensitivity analysis can probe it.
    pub break_cost_decay_fraction: f64,

    /// Attacker class used for the training-window and break-cost-burden
    /// metrics. When unset, the first profile whose name contains
    /// "small group" is used, falling back to the second-smallest budget.
    pub reference_attacker: Option<String>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            model_size_b: 40.0,

            training_cost_base: 20.0,
            training_decay_rate: 2.5,
            training_damping: 0.15,
            training_floor: 0.05,

            fine_tune_cost_base: 5.0,
            fine_tune_decay_rate: 2.0,
            fine_tune_damping: 0.2,
            fine_tune_floor: 0.5,

            dangerous_cap_threshold_b: 30.0,
            novelty_requires_scale: true,

            attackers: vec![
                AttackerProfile::new("Lone actor", 10_000.0, 10_000, "#e57373"),
                AttackerProfile::new("Small group", 500_000.0, 500, "#ffb74d"),
                AttackerProfile::new("Funded org", 50_000_000.0, 20, "#64b5f6"),
                AttackerProfile::new("State actor", 5_000_000_000.0, 5, "#9575cd"),
            ],

            steps_to_break: 10_000_000,
            gpu_hour_cost: 2.0,
            safeguard_budget_threshold: 100_000.0,

            safeguard_strength: 70.0,
            screening_coverage: 50.0,
            screening_novel_detect: 30.0,
            surveillance_eff: 20.0,
            compute_gov_threshold_m: 10.0,

            break_cost_decay_fraction: 0.5,
            reference_attacker: None,
        }
    }
}

impl Parameters {
    /// Check every parameter against its documented domain.
    ///
    /// Runs before any computation; the first violation found is returned
    /// verbatim. Valid parameters make every downstream formula total, so a
    /// successful validation guarantees a finite, deterministic result.
    pub fn validate(&self) -> Result<()> {
        require_positive("model_size_b", self.model_size_b)?;
        require_positive("training_cost_base", self.training_cost_base)?;
        require_positive("fine_tune_cost_base", self.fine_tune_cost_base)?;

        require_decay_rate("training_decay_rate", self.training_decay_rate)?;
        require_decay_rate("fine_tune_decay_rate", self.fine_tune_decay_rate)?;

        require_non_negative("training_damping", self.training_damping)?;
        require_non_negative("fine_tune_damping", self.fine_tune_damping)?;

        require_floor("training_floor", self.training_floor, self.training_cost_base)?;
        require_floor("fine_tune_floor", self.fine_tune_floor, self.fine_tune_cost_base)?;

        require_positive("dangerous_cap_threshold_b", self.dangerous_cap_threshold_b)?;

        if self.attackers.is_empty() {
            return Err(ModelError::Validation(
                "attackers must contain at least one profile".to_string(),
            ));
        }
        for attacker in &self.attackers {
            if !attacker.budget.is_finite() || attacker.budget <= 0.0 {
                return Err(ModelError::Validation(format!(
                    "attacker '{}' budget must be positive, got {}",
                    attacker.name, attacker.budget
                )));
            }
        }

        if self.steps_to_break == 0 {
            return Err(ModelError::Validation(
                "steps_to_break must be positive".to_string(),
            ));
        }
        require_positive("gpu_hour_cost", self.gpu_hour_cost)?;
        require_positive("safeguard_budget_threshold", self.safeguard_budget_threshold)?;

        require_percentage("safeguard_strength", self.safeguard_strength)?;
        require_percentage("screening_coverage", self.screening_coverage)?;
        require_percentage("screening_novel_detect", self.screening_novel_detect)?;
        require_percentage("surveillance_eff", self.surveillance_eff)?;
        require_non_negative("compute_gov_threshold_m", self.compute_gov_threshold_m)?;

        if !self.break_cost_decay_fraction.is_finite()
            || self.break_cost_decay_fraction < 0.0
            || self.break_cost_decay_fraction > 1.0
        {
            return Err(ModelError::Validation(format!(
                "break_cost_decay_fraction must be in [0, 1], got {}",
                self.break_cost_decay_fraction
            )));
        }

        if let Some(name) = &self.reference_attacker {
            if !self.attackers.iter().any(|a| &a.name == name) {
                return Err(ModelError::Validation(format!(
                    "reference_attacker '{name}' is not in the attacker list"
                )));
            }
        }

        Ok(())
    }

    /// Resolve the attacker class used for window/burden metrics.
    ///
    /// Precedence: the explicit `reference_attacker` name, then the first
    /// profile whose name contains "small group" (case-insensitive), then the
    /// profile with the second-smallest budget, then the smallest. The
    /// attacker list is validated non-empty, so this is total.
    pub fn reference_profile(&self) -> &AttackerProfile {
        if let Some(name) = &self.reference_attacker {
            if let Some(profile) = self.attackers.iter().find(|a| &a.name == name) {
                return profile;
            }
        }
        if let Some(profile) = self
            .attackers
            .iter()
            .find(|a| a.name.to_lowercase().contains("small group"))
        {
            return profile;
        }
        let mut by_budget: Vec<&AttackerProfile> = self.attackers.iter().collect();
        by_budget.sort_by(|a, b| a.budget.total_cmp(&b.budget));
        by_budget.get(1).copied().unwrap_or(by_budget[0])
    }

    /// Training cost base in absolute currency units.
    pub fn training_base_abs(&self) -> f64 {
        self.training_cost_base * TRAINING_COST_SCALE
    }

    /// Training floor in absolute currency units.
    pub fn training_floor_abs(&self) -> f64 {
        self.training_floor * TRAINING_COST_SCALE
    }

    /// Fine-tune cost base in absolute currency units.
    pub fn fine_tune_base_abs(&self) -> f64 {
        self.fine_tune_cost_base * FINE_TUNE_COST_SCALE
    }

    /// Fine-tune floor in absolute currency units.
    pub fn fine_tune_floor_abs(&self) -> f64 {
        self.fine_tune_floor * FINE_TUNE_COST_SCALE
    }

    /// Compute-governance threshold in absolute currency units.
    pub fn compute_gov_threshold_abs(&self) -> f64 {
        self.compute_gov_threshold_m * 1e6
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ModelError::Validation(format!(
            "{name} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::Validation(format!(
            "{name} must be non-negative and finite, got {value}"
        )));
    }
    Ok(())
}

fn require_decay_rate(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 1.0 {
        return Err(ModelError::Validation(format!(
            "{name} must exceed 1 (annual cost-division factor), got {value}"
        )));
    }
    Ok(())
}

fn require_floor(name: &str, floor: f64, base: f64) -> Result<()> {
    require_non_negative(name, floor)?;
    if floor > base {
        return Err(ModelError::Validation(format!(
            "{name} ({floor}) must not exceed its base cost ({base})"
        )));
    }
    Ok(())
}

fn require_percentage(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 || value > 100.0 {
        return Err(ModelError::Validation(format!(
            "{name} must be in [0, 100], got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_validate() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn test_default_has_four_canonical_classes() {
        let params = Parameters::default();
        let names: Vec<&str> = params.attackers.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Lone actor", "Small group", "Funded org", "State actor"]
        );
    }

    #[test]
    fn test_rejects_non_positive_decay_rate() {
        let mut params = Parameters::default();
        params.training_decay_rate = 1.0;
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("training_decay_rate"));

        params.training_decay_rate = -2.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_attacker_list() {
        let mut params = Parameters::default();
        params.attackers.clear();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_budget() {
        let mut params = Parameters::default();
        params.attackers[0].budget = -1.0;
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("budget"));
    }

    #[test]
    fn test_rejects_non_positive_gpu_hour_cost() {
        let mut params = Parameters::default();
        params.gpu_hour_cost = 0.0;
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("gpu_hour_cost"));

        params.gpu_hour_cost = -2.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_floor_above_base() {
        let mut params = Parameters::default();
        params.training_floor = params.training_cost_base * 2.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let mut params = Parameters::default();
        params.model_size_b = f64::NAN;
        assert!(params.validate().is_err());

        let mut params = Parameters::default();
        params.training_damping = f64::INFINITY;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_percentages() {
        let mut params = Parameters::default();
        params.screening_coverage = 101.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_reference_attacker() {
        let mut params = Parameters::default();
        params.reference_attacker = Some("Cartel".to_string());
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_reference_profile_prefers_explicit_name() {
        let mut params = Parameters::default();
        params.reference_attacker = Some("State actor".to_string());
        assert_eq!(params.reference_profile().name, "State actor");
    }

    #[test]
    fn test_reference_profile_finds_small_group_by_name() {
        let params = Parameters::default();
        assert_eq!(params.reference_profile().name, "Small group");
    }

    #[test]
    fn test_reference_profile_falls_back_to_second_smallest_budget() {
        let params = Parameters {
            attackers: vec![
                AttackerProfile::new("Alpha", 1e9, 1, "#fff"),
                AttackerProfile::new("Beta", 1e3, 1, "#fff"),
                AttackerProfile::new("Gamma", 1e6, 1, "#fff"),
            ],
            ..Default::default()
        };
        assert_eq!(params.reference_profile().name, "Gamma");
    }

    #[test]
    fn test_parameters_toml_round_trip() {
        let params = Parameters::default();
        let toml = toml::to_string(&params).unwrap();
        let back: Parameters = toml::from_str(&toml).unwrap();
        assert_eq!(params, back);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let params: Parameters = toml::from_str("model_size_b = 70.0").unwrap();
        assert_eq!(params.model_size_b, 70.0);
        assert_eq!(params.training_decay_rate, Parameters::default().training_decay_rate);
    }
}
