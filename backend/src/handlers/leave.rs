use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::leave::{
        CreateLeavePayload, LeaveBalanceResponse, LeaveRequestResponse, LeaveType, RejectPayload,
        UpdateLeavePayload,
    },
    models::user::User,
    repositories::leave as leave_repo,
    services::approval,
};

use super::current_employee;

#[derive(Debug, Deserialize)]
pub struct LeaveListQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub async fn list_leave_types(
    State((pool, _config)): State<(PgPool, Config)>,
) -> Result<Json<Vec<LeaveType>>, AppError> {
    let types = leave_repo::list_types(&pool).await?;
    Ok(Json(types))
}

pub async fn list_leave_balances(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<LeaveBalanceResponse>>, AppError> {
    let employee = current_employee(&pool, &user).await?;
    let balances = leave_repo::list_balances(&pool, &employee.id).await?;
    Ok(Json(
        balances.into_iter().map(LeaveBalanceResponse::from).collect(),
    ))
}

pub async fn list_leave_requests(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Query(params): Query<LeaveListQuery>,
) -> Result<Json<Vec<LeaveRequestResponse>>, AppError> {
    let employee = current_employee(&pool, &user).await?;
    let requests =
        leave_repo::list_requests(&pool, &employee.id, params.month, params.year).await?;
    Ok(Json(
        requests.into_iter().map(LeaveRequestResponse::from).collect(),
    ))
}

pub async fn create_leave_request(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateLeavePayload>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    payload.validate()?;
    let employee = current_employee(&pool, &user).await?;
    let request = approval::submit_leave(&pool, &config, &employee, &payload).await?;
    Ok(Json(LeaveRequestResponse::from(request)))
}

pub async fn update_leave_request(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
    Json(payload): Json<UpdateLeavePayload>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    payload.validate()?;
    let employee = current_employee(&pool, &user).await?;
    let request = approval::update_leave(&pool, &employee, &request_id, &payload).await?;
    Ok(Json(LeaveRequestResponse::from(request)))
}

pub async fn cancel_leave_request(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let employee = current_employee(&pool, &user).await?;
    approval::cancel_leave(&pool, &employee, &request_id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Leave request cancelled; booked days were refunded.".to_string(),
    }))
}

pub async fn approve_leave_supervisor(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let actor = current_employee(&pool, &user).await?;
    let request =
        approval::approve_leave_as_supervisor(&pool, &actor, &user.id, &request_id).await?;
    Ok(Json(LeaveRequestResponse::from(request)))
}

pub async fn approve_leave_manager(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let actor = current_employee(&pool, &user).await?;
    let request = approval::approve_leave_as_manager(&pool, &actor, &user.id, &request_id).await?;
    Ok(Json(LeaveRequestResponse::from(request)))
}

pub async fn approve_leave_hr(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let actor = current_employee(&pool, &user).await?;
    let request = approval::finalize_leave(&pool, &actor, &user.id, &request_id).await?;
    Ok(Json(LeaveRequestResponse::from(request)))
}

pub async fn reject_leave(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
    Json(payload): Json<RejectPayload>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let actor = current_employee(&pool, &user).await?;
    let request = approval::reject_leave(
        &pool,
        &actor,
        &user.id,
        &request_id,
        &payload.rejection_reason,
    )
    .await?;
    Ok(Json(LeaveRequestResponse::from(request)))
}
