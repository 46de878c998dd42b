//! Shared response envelope types for API handlers.
//!
//! List and action endpoints answer with a `{ "data": ... }` envelope.
//! Single-entity CRUD endpoints return the bare entity.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
