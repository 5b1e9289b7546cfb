//! Shift master-data read contract and the locked-shift integrity guard.

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::shift::{Shift, UpdateShiftPayload},
    models::user::User,
    repositories::shift as shift_repo,
};

use super::current_employee;
use super::leave::MessageResponse;

async fn require_hr(pool: &PgPool, user: &User) -> Result<(), AppError> {
    let employee = current_employee(pool, user).await?;
    if !employee.is_hr {
        return Err(AppError::Forbidden(
            "Only HR can manage shift master data.".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_shifts(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Shift>>, AppError> {
    require_hr(&pool, &user).await?;
    let shifts = shift_repo::list_all(&pool).await?;
    Ok(Json(shifts))
}

pub async fn update_shift(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(shift_id): Path<String>,
    Json(payload): Json<UpdateShiftPayload>,
) -> Result<Json<Shift>, AppError> {
    require_hr(&pool, &user).await?;

    let current = shift_repo::find_by_id(&pool, &shift_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found.".to_string()))?;

    if shift_repo::is_locked(&pool, &shift_id).await? {
        return Err(AppError::Conflict(
            "Shift is locked: it is referenced by an active schedule or attendance history."
                .to_string(),
        ));
    }

    let updated = shift_repo::update(&pool, &current, &payload).await?;
    Ok(Json(updated))
}

pub async fn delete_shift(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(shift_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    require_hr(&pool, &user).await?;

    if shift_repo::find_by_id(&pool, &shift_id).await?.is_none() {
        return Err(AppError::NotFound("Shift not found.".to_string()));
    }

    if shift_repo::is_locked(&pool, &shift_id).await? {
        return Err(AppError::Conflict(
            "Shift is locked: it is referenced by an active schedule or attendance history."
                .to_string(),
        ));
    }

    shift_repo::delete(&pool, &shift_id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Shift deleted.".to_string(),
    }))
}
