//! Handlers for weekly project updates.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pulse_core::types::DbId;
use pulse_core::weekly_update::reporting_week;
use pulse_db::models::weekly_update::{CreateWeeklyUpdate, WeeklyUpdate};
use pulse_db::repositories::WeeklyUpdateRepo;
use validator::Validate;

use super::find_project;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{project_id}/weekly-updates
pub async fn list_by_project(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<WeeklyUpdate>>>> {
    find_project(&state, project_id).await?;
    let updates = WeeklyUpdateRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: updates }))
}

/// POST /api/v1/projects/{project_id}/weekly-updates
///
/// `year` and `week_number` default to the current reporting week under the
/// configured week numbering. A second update for the same week is a 409.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateWeeklyUpdate>,
) -> AppResult<(StatusCode, Json<WeeklyUpdate>)> {
    input.validate()?;
    find_project(&state, project_id).await?;

    let (year, week_number) = match (input.year, input.week_number) {
        (Some(year), Some(week_number)) => (year, week_number),
        (None, None) => {
            let week = reporting_week(Utc::now().date_naive(), state.config.jobs.week_numbering);
            (week.year, week.week_number)
        }
        _ => {
            return Err(AppError::BadRequest(
                "year and week_number must be given together".into(),
            ))
        }
    };

    let update = WeeklyUpdateRepo::create(
        &state.pool,
        project_id,
        Some(user.user_id),
        year,
        week_number,
        &input,
    )
    .await?;
    tracing::info!(project_id, year, week_number, "Weekly update submitted");
    Ok((StatusCode::CREATED, Json(update)))
}
