//! ProjectPulse domain logic.
//!
//! Everything in this crate is pure: no database, no I/O. The `db` and `api`
//! crates load rows, hand them to the functions here, and persist whatever
//! comes back.

pub mod deadline_risk;
pub mod error;
pub mod milestone_progress;
pub mod roles;
pub mod status;
pub mod types;
pub mod weekly_update;
