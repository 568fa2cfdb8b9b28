//! # Safeguard Horizon - Attacker-Economics Model Engine
//!
//! An interactive exploratory model for a biosecurity policy question: at
//! what point do AI-model safeguards stop being a meaningful barrier to
//! misuse, given declining compute costs and attacker economics?
//!
//! The crate is the analytical core only: a pure, deterministic
//! [`evaluate`] function that maps a tunable [`Parameters`] value to a
//! structured [`Results`] bundle. Sliders, charts, and layout are a
//! consumer's problem; the engine has no I/O, no state, and no notion of
//! staleness, because every call is closed-form and completes in
//! microseconds.
//!
//! ## Pipeline
//!
//! ```text
//!   Parameters
//!      │
//!      ├────────────────┬──────────────────┐
//!      v                v                  │
//!  [Cost Curve]    [Capability]            │
//!   training cost   P(dangerous)           │
//!   fine-tune cost  P(novel)               │
//!   break cost      safeguard erosion      │
//!      │                │                  │
//!      └───────┬────────┘                  │
//!              v                           │
//!          [Threat]                        │
//!           residual threat                │
//!           (attacker x year)              │
//!              │                           │
//!              └───────┬───────────────────┘
//!                      v
//!                 [Decision]
//!                  blocked share, training window,
//!                  break-cost burden, relevance verdict
//! ```
//!
//! Cost Curve and Capability are independent leaves; Threat consumes both;
//! Decision consumes Threat and Cost Curve outputs.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use horizon::{evaluate, Parameters};
//!
//! let results = evaluate(&Parameters::default())?;
//!
//! println!("relevance: {} ({})", results.assessment.score, results.assessment.level);
//! println!("break cost today: ${:.0}", results.break_cost.cost_now);
//! for point in &results.training_cost.points {
//!     println!("year {}: ${:.0}", point.year, point.cost);
//! }
//! ```
//!
//! ### Sensitivity Sweep
//!
//! ```rust,ignore
//! use horizon::{sweep_scores, Parameters};
//!
//! // How does the verdict move as safeguards get harder to strip?
//! let points = sweep_scores(&Parameters::default(), "steps_to_break", 1e3, 1e6, 50)?;
//! for p in &points {
//!     println!("{:>10.0} steps -> score {:5.1} ({})", p.value, p.score, p.level);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cost`]: damped-decay cost trajectories and the FLOP break-cost model
//! - [`capability`]: logistic capability curves and safeguard erosion
//! - [`threat`]: the residual-threat matrix pipeline
//! - [`decision`]: summary metrics and the relevance rule chain
//! - [`engine`]: `evaluate` orchestration and sensitivity sweeps
//! - [`params`]: the parameter record and its validation
//! - [`config`]: TOML configuration and built-in scenarios
//! - [`error`]: error types and result alias
//!
//! ## Determinism
//!
//! Referential transparency is a correctness requirement, not an
//! optimization: identical parameters must yield identical results, cell for
//! cell. All guards against numeric degeneracy (zero damping, near-zero
//! effective threat) are fixed epsilon substitutions, so results carry no
//! NaN or infinity anywhere.

pub mod capability;
pub mod config;
pub mod cost;
pub mod decision;
pub mod engine;
pub mod error;
pub mod params;
pub mod threat;

// Re-exports for convenience
pub use config::{scenario, Config, SCENARIO_NAMES};
pub use cost::{CostPoint, CostTrajectory};
pub use decision::{DecisionMetrics, RelevanceAssessment, RelevanceLevel, RelevanceRule};
pub use engine::{
    evaluate, sweep_scores, AttackerAffordability, BreakCost, CapabilitySummary, Results,
    SweepPoint,
};
pub use error::{ModelError, Result};
pub use params::{AttackerProfile, Parameters, HORIZON_YEARS};
pub use threat::{InterventionValue, ThreatMatrix};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
