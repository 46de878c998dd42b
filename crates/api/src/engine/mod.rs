//! Database-backed engines.
//!
//! The pure rules live in `pulse_core`; these modules load their inputs
//! from PostgreSQL, apply the rules and persist the outcome.
//!
//! - [`milestone_progress`] recomputes milestone completion from linked tasks.
//! - [`deadline_escalator`] raises and escalates deadline risks and issues.

pub mod deadline_escalator;
pub mod milestone_progress;
