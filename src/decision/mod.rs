//! Decision Stage.
//!
//! Aggregates the threat and cost outputs into three summary metrics, then
//! runs a priority-ordered rule chain over them to produce a categorical
//! verdict on whether continued safeguard investment is justified.
//!
//! The classifier is deliberately an explicit ordered rule list rather than
//! an if/else cascade: precedence is data, auditable and testable on its
//! own. The verdict is a pure function of the three metrics; no other
//! parameter can influence it.

use serde::{Deserialize, Serialize};

use crate::cost::CostTrajectory;
use crate::params::{Parameters, HORIZON_YEARS};

/// Year at which the blocked-attacker share is sampled.
pub const BLOCKED_SAMPLE_YEAR: usize = 5;

/// The three aggregates the relevance verdict is built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionMetrics {
    /// At year 5, among attacker classes that can fine-tune but not train
    /// from scratch, the population share whose budget falls below the
    /// decayed break cost. 0-100.
    pub blocked_pct5: f64,
    /// First year the reference attacker can afford training from scratch;
    /// the full horizon length when that never happens.
    pub window_years: usize,
    /// Break cost as a percentage of the reference attacker's budget.
    pub break_cost_pct: f64,
}

/// Categorical relevance verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceLevel {
    /// Score below 30.
    Low,
    /// Score in [30, 60).
    Marginal,
    /// Score at or above 60.
    High,
}

impl std::fmt::Display for RelevanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RelevanceLevel::Low => "low",
            RelevanceLevel::Marginal => "marginal",
            RelevanceLevel::High => "high",
        };
        f.pad(name)
    }
}

/// The ordered rules of the relevance classifier. First match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelevanceRule {
    /// Safeguards block too few constrained attackers.
    Ineffective,
    /// Training from scratch becomes affordable before safeguards matter.
    ObsoleteBeforeTheyMatter,
    /// Defeating the safeguard costs a trivial share of the budget.
    TrivialBarrier,
    /// All three metrics clear their bars.
    SafeguardsHaveValue,
    /// Catch-all.
    MarginalValue,
}

/// Evaluation order of the classifier. Precedence is part of the contract.
pub const RULE_ORDER: [RelevanceRule; 5] = [
    RelevanceRule::Ineffective,
    RelevanceRule::ObsoleteBeforeTheyMatter,
    RelevanceRule::TrivialBarrier,
    RelevanceRule::SafeguardsHaveValue,
    RelevanceRule::MarginalValue,
];

impl RelevanceRule {
    /// Whether this rule's guard holds for the given metrics.
    pub fn applies(&self, m: &DecisionMetrics) -> bool {
        let window = m.window_years as f64;
        match self {
            RelevanceRule::Ineffective => m.blocked_pct5 < 20.0,
            RelevanceRule::ObsoleteBeforeTheyMatter => window < 3.0,
            RelevanceRule::TrivialBarrier => m.break_cost_pct < 1.0,
            RelevanceRule::SafeguardsHaveValue => {
                m.blocked_pct5 >= 50.0 && window >= 5.0 && m.break_cost_pct >= 10.0
            }
            RelevanceRule::MarginalValue => true,
        }
    }

    /// Score assigned when this rule fires. Always in [0, 100].
    pub fn score(&self, m: &DecisionMetrics) -> f64 {
        let window = m.window_years as f64;
        let score = match self {
            RelevanceRule::Ineffective => m.blocked_pct5,
            RelevanceRule::ObsoleteBeforeTheyMatter => (m.blocked_pct5 * 0.5).min(30.0),
            RelevanceRule::TrivialBarrier => (m.blocked_pct5 * 0.6).min(40.0),
            RelevanceRule::SafeguardsHaveValue => {
                (m.blocked_pct5 + window * 2.0 + m.break_cost_pct * 0.5).min(100.0)
            }
            RelevanceRule::MarginalValue => (m.blocked_pct5 * 0.7 + window * 2.0).min(70.0),
        };
        score.clamp(0.0, 100.0)
    }

    /// Human-readable reason attached to the verdict.
    pub fn reason(&self) -> &'static str {
        match self {
            RelevanceRule::Ineffective => "ineffective",
            RelevanceRule::ObsoleteBeforeTheyMatter => "obsolete before they matter",
            RelevanceRule::TrivialBarrier => "trivial barrier",
            RelevanceRule::SafeguardsHaveValue => "safeguards have value",
            RelevanceRule::MarginalValue => "marginal value",
        }
    }
}

/// The verdict: score, level, which rule fired, and the metrics behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceAssessment {
    /// Relevance score in [0, 100].
    pub score: f64,
    /// Categorical level derived from the score.
    pub level: RelevanceLevel,
    /// The rule that fired.
    pub rule: RelevanceRule,
    /// Reason text for the rule that fired.
    pub reason: String,
    /// The contributing metrics.
    pub metrics: DecisionMetrics,
}

/// Classify metrics into a relevance verdict.
///
/// Pure over `DecisionMetrics`: two calls with equal metrics always return
/// the same score, level, and reason.
pub fn assess(metrics: DecisionMetrics) -> RelevanceAssessment {
    // MarginalValue always applies, so the scan is total.
    let rule = RULE_ORDER
        .iter()
        .copied()
        .find(|rule| rule.applies(&metrics))
        .unwrap_or(RelevanceRule::MarginalValue);
    let score = rule.score(&metrics);
    let level = if score >= 60.0 {
        RelevanceLevel::High
    } else if score >= 30.0 {
        RelevanceLevel::Marginal
    } else {
        RelevanceLevel::Low
    };
    RelevanceAssessment {
        score,
        level,
        rule,
        reason: rule.reason().to_string(),
        metrics,
    }
}

/// Population share blocked at the sample year.
///
/// Eligible classes can fine-tune but not train from scratch at year 5; of
/// those populations, the share whose budget sits below the decayed break
/// cost. Weighted by class counts; when every eligible class has a zero
/// count the classes are weighted equally instead.
pub fn blocked_share_at_year5(
    params: &Parameters,
    training: &CostTrajectory,
    fine_tune: &CostTrajectory,
    break_cost_over_time: &[f64],
) -> f64 {
    let year = BLOCKED_SAMPLE_YEAR;
    let training_cost = training.cost_at(year);
    let fine_tune_cost = fine_tune.cost_at(year);
    let break_cost = break_cost_over_time
        .get(year)
        .copied()
        .unwrap_or_else(|| break_cost_over_time.last().copied().unwrap_or(0.0));

    let eligible: Vec<_> = params
        .attackers
        .iter()
        .filter(|a| a.budget >= fine_tune_cost && a.budget < training_cost)
        .collect();
    if eligible.is_empty() {
        return 0.0;
    }

    let total: f64 = eligible.iter().map(|a| f64::from(a.count)).sum();
    let share = if total > 0.0 {
        let blocked: f64 = eligible
            .iter()
            .filter(|a| a.budget < break_cost)
            .map(|a| f64::from(a.count))
            .sum();
        blocked / total
    } else {
        let blocked = eligible.iter().filter(|a| a.budget < break_cost).count() as f64;
        blocked / eligible.len() as f64
    };
    (share * 100.0).clamp(0.0, 100.0)
}

/// Compute all three decision metrics from stage outputs.
pub fn decision_metrics(
    params: &Parameters,
    training: &CostTrajectory,
    fine_tune: &CostTrajectory,
    break_cost_over_time: &[f64],
) -> DecisionMetrics {
    let reference = params.reference_profile();
    let window_years = training
        .first_year_at_or_below(reference.budget)
        .unwrap_or(HORIZON_YEARS);
    let break_now = break_cost_over_time.first().copied().unwrap_or(0.0);
    DecisionMetrics {
        blocked_pct5: blocked_share_at_year5(params, training, fine_tune, break_cost_over_time),
        window_years,
        break_cost_pct: break_now / reference.budget * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{break_cost_over_time, fine_tune_trajectory, training_trajectory};
    use crate::params::AttackerProfile;

    fn metrics(blocked_pct5: f64, window_years: usize, break_cost_pct: f64) -> DecisionMetrics {
        DecisionMetrics {
            blocked_pct5,
            window_years,
            break_cost_pct,
        }
    }

    #[test]
    fn test_low_blocked_share_is_ineffective_regardless_of_rest() {
        let a = assess(metrics(10.0, 14, 50.0));
        assert_eq!(a.rule, RelevanceRule::Ineffective);
        assert_eq!(a.score, 10.0);
        assert_eq!(a.level, RelevanceLevel::Low);

        // Same blocked share, wildly different other metrics: same verdict.
        let b = assess(metrics(10.0, 0, 0.001));
        assert_eq!(b.score, 10.0);
        assert_eq!(b.level, RelevanceLevel::Low);
    }

    #[test]
    fn test_short_window_caps_score_at_thirty() {
        let a = assess(metrics(90.0, 2, 50.0));
        assert_eq!(a.rule, RelevanceRule::ObsoleteBeforeTheyMatter);
        assert_eq!(a.score, 30.0);
        assert_eq!(a.level, RelevanceLevel::Marginal);
    }

    #[test]
    fn test_trivial_barrier_caps_score_at_forty() {
        let a = assess(metrics(90.0, 10, 0.5));
        assert_eq!(a.rule, RelevanceRule::TrivialBarrier);
        assert_eq!(a.score, 40.0);
    }

    #[test]
    fn test_all_bars_cleared_scores_high() {
        let a = assess(metrics(60.0, 8, 20.0));
        assert_eq!(a.rule, RelevanceRule::SafeguardsHaveValue);
        assert_eq!(a.score, 60.0 + 16.0 + 10.0);
        assert_eq!(a.level, RelevanceLevel::High);
        assert_eq!(a.reason, "safeguards have value");
    }

    #[test]
    fn test_high_rule_score_is_capped_at_hundred() {
        let a = assess(metrics(95.0, 15, 90.0));
        assert_eq!(a.score, 100.0);
    }

    #[test]
    fn test_catch_all_marginal_value() {
        // blocked 30 (>=20), window 4 (>=3), burden 5 (>=1), but misses the
        // high-value bars.
        let a = assess(metrics(30.0, 4, 5.0));
        assert_eq!(a.rule, RelevanceRule::MarginalValue);
        assert_eq!(a.score, 30.0 * 0.7 + 8.0);
        assert_eq!(a.level, RelevanceLevel::Low);
    }

    #[test]
    fn test_precedence_window_beats_trivial_barrier() {
        // Both the short-window and trivial-barrier guards hold; the window
        // rule is earlier in RULE_ORDER and must win.
        let a = assess(metrics(80.0, 1, 0.1));
        assert_eq!(a.rule, RelevanceRule::ObsoleteBeforeTheyMatter);
    }

    #[test]
    fn test_assessment_is_pure_over_metrics() {
        let m = metrics(55.0, 6, 12.0);
        let a = assess(m);
        let b = assess(m);
        assert_eq!(a, b);
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(assess(metrics(60.0, 8, 20.0)).level, RelevanceLevel::High);
        let marginal = assess(metrics(50.0, 4, 5.0));
        assert_eq!(marginal.rule, RelevanceRule::MarginalValue);
        assert_eq!(marginal.score, 43.0);
        assert_eq!(marginal.level, RelevanceLevel::Marginal);
    }

    #[test]
    fn test_window_sentinel_when_training_never_affordable() {
        let mut params = Parameters::default();
        // Reference budget far below even the training floor.
        params.attackers = vec![
            AttackerProfile::new("Lone actor", 100.0, 10, "#fff"),
            AttackerProfile::new("Small group", 1_000.0, 5, "#fff"),
        ];
        let training = training_trajectory(&params);
        let fine_tune = fine_tune_trajectory(&params);
        let over_time = break_cost_over_time(&params);
        let m = decision_metrics(&params, &training, &fine_tune, &over_time);
        assert_eq!(m.window_years, HORIZON_YEARS);
    }

    #[test]
    fn test_blocked_share_counts_populations() {
        let mut params = Parameters::default();
        // Two fine-tune-only classes at year 5; break cost set between their
        // budgets so exactly the larger population is blocked.
        params.attackers = vec![
            AttackerProfile::new("Poor", 60_000.0, 900, "#fff"),
            AttackerProfile::new("Rich", 500_000.0, 100, "#fff"),
        ];
        let training = training_trajectory(&params);
        let fine_tune = fine_tune_trajectory(&params);
        let break_over_time = vec![100_000.0; HORIZON_YEARS + 1];
        let share =
            blocked_share_at_year5(&params, &training, &fine_tune, &break_over_time);
        assert!((share - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_blocked_share_weighs_classes_equally_when_counts_are_zero() {
        let mut params = Parameters::default();
        // Both classes are fine-tune-only at year 5 with zero population
        // counts; the blocked share falls back to equal class weighting.
        params.attackers = vec![
            AttackerProfile::new("Poor", 60_000.0, 0, "#fff"),
            AttackerProfile::new("Rich", 500_000.0, 0, "#fff"),
        ];
        let training = training_trajectory(&params);
        let fine_tune = fine_tune_trajectory(&params);
        let break_over_time = vec![100_000.0; HORIZON_YEARS + 1];
        let share =
            blocked_share_at_year5(&params, &training, &fine_tune, &break_over_time);
        assert!((share - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_blocked_share_zero_without_eligible_classes() {
        let mut params = Parameters::default();
        // Everyone can train from scratch at year 5.
        params.attackers = vec![AttackerProfile::new("State actor", 1e12, 3, "#fff")];
        let training = training_trajectory(&params);
        let fine_tune = fine_tune_trajectory(&params);
        let break_over_time = break_cost_over_time(&params);
        let share = blocked_share_at_year5(&params, &training, &fine_tune, &break_over_time);
        assert_eq!(share, 0.0);
    }
}
