//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Nullable columns that a patch may clear use `Option<Option<T>>` with
//! [`deserialize_some`]: absent keeps the value, `null` clears it.

use serde::{Deserialize, Deserializer};

pub mod change_request;
pub mod department;
pub mod milestone;
pub mod notification;
pub mod project;
pub mod risk_issue;
pub mod task;
pub mod user;
pub mod weekly_update;

/// Wrap any present value, including `null`, in `Some`.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` so a
/// missing key stays `None` while an explicit `null` becomes `Some(None)`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
