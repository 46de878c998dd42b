//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- requires `admin`.
//! - [`rbac::RequireDirector`] -- requires `director` or above.
//! - [`rbac::RequireManager`] -- requires `manager` or above.

pub mod auth;
pub mod rbac;
