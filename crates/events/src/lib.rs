//! Outbound notification delivery for ProjectPulse.
//!
//! Notifications are always persisted by the API first; this crate only
//! pushes a copy outside the platform.
//!
//! - [`delivery::email`]: plain-text SMTP mail via `lettre`.

pub mod delivery;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError, OutgoingEmail};
