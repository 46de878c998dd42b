//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role ranks
//! below the extractor's minimum in [`pulse_core::roles`].
//!
//! ```ignore
//! async fn approve(RequireDirector(user): RequireDirector) -> AppResult<Json<()>> {
//!     // user is a director, main PMO or admin here
//!     Ok(Json(()))
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pulse_core::error::CoreError;
use pulse_core::roles::{ROLE_ADMIN, ROLE_DIRECTOR, ROLE_MANAGER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    minimum: &str,
    message: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !user.has_at_least(minimum) {
        tracing::debug!(user_id = user.user_id, role = %user.role, minimum, "RBAC rejection");
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    Ok(user)
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_ADMIN, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Requires `director`, `main_pmo` or `admin`. Used for approvals.
pub struct RequireDirector(pub AuthUser);

impl FromRequestParts<AppState> for RequireDirector {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_DIRECTOR, "Director role or above required")
            .await
            .map(RequireDirector)
    }
}

/// Requires `manager` or above. Used for project mutations.
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_MANAGER, "Manager role or above required")
            .await
            .map(RequireManager)
    }
}
