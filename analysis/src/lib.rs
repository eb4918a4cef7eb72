//! Game-theoretic analysis of bilateral negotiation domains.
//!
//! All functions are pure: they depend only on passed utility functions and
//! outcomes. The same code serves offline domain analysis (with both true
//! profiles) and live bidding (with estimated opponent profile).
mod frontier;
mod nash;
mod report;

pub use frontier::{
    dominates, efficiency, pareto_frontier, pareto_frontier_of, social_welfare, utility_points,
    OutcomePoint,
};
pub use nash::{nash_point, nash_point_of, nash_product};
pub use report::{
    analyze, analyze_outcome, classify_steps, sensitivity, ConflictLevel, DomainAnalysis,
    OutcomeAnalysis, Sensitivity, StepClassification, StepKind,
};
