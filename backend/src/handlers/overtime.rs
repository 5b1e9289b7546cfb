use axum::{
    extract::{Extension, Path, State},
    Json,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::leave::RejectPayload,
    models::overtime::{CreateOvertimePayload, OvertimeRequestResponse},
    models::user::User,
    repositories::overtime as overtime_repo,
    services::approval,
};

use super::current_employee;
use super::leave::MessageResponse;

pub async fn list_overtime_requests(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<OvertimeRequestResponse>>, AppError> {
    let employee = current_employee(&pool, &user).await?;
    let requests = overtime_repo::list_requests(&pool, &employee.id).await?;
    Ok(Json(
        requests
            .into_iter()
            .map(OvertimeRequestResponse::from)
            .collect(),
    ))
}

pub async fn create_overtime_request(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateOvertimePayload>,
) -> Result<Json<OvertimeRequestResponse>, AppError> {
    payload.validate()?;
    let employee = current_employee(&pool, &user).await?;
    let request = approval::submit_overtime(&pool, &config, &employee, &payload).await?;
    Ok(Json(OvertimeRequestResponse::from(request)))
}

pub async fn cancel_overtime_request(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let employee = current_employee(&pool, &user).await?;
    approval::cancel_overtime(&pool, &employee, &request_id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Overtime request cancelled.".to_string(),
    }))
}

pub async fn approve_overtime_supervisor(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<OvertimeRequestResponse>, AppError> {
    let actor = current_employee(&pool, &user).await?;
    let request =
        approval::approve_overtime_as_supervisor(&pool, &actor, &user.id, &request_id).await?;
    Ok(Json(OvertimeRequestResponse::from(request)))
}

pub async fn approve_overtime_manager(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<OvertimeRequestResponse>, AppError> {
    let actor = current_employee(&pool, &user).await?;
    let request =
        approval::approve_overtime_as_manager(&pool, &actor, &user.id, &request_id).await?;
    Ok(Json(OvertimeRequestResponse::from(request)))
}

pub async fn approve_overtime_hr(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<OvertimeRequestResponse>, AppError> {
    let actor = current_employee(&pool, &user).await?;
    let request =
        approval::finalize_overtime(&pool, &config, &actor, &user.id, &request_id).await?;
    Ok(Json(OvertimeRequestResponse::from(request)))
}

pub async fn reject_overtime(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
    Json(payload): Json<RejectPayload>,
) -> Result<Json<OvertimeRequestResponse>, AppError> {
    let actor = current_employee(&pool, &user).await?;
    let request = approval::reject_overtime(
        &pool,
        &actor,
        &user.id,
        &request_id,
        &payload.rejection_reason,
    )
    .await?;
    Ok(Json(OvertimeRequestResponse::from(request)))
}
