use axum::{extract::State, Json};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, LoginResponse, UserResponse},
    repositories::user as user_repo,
    utils::{jwt, password},
};

pub async fn login(
    State((pool, config)): State<(PgPool, Config)>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = user_repo::find_by_username(&pool, &payload.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&payload.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let access_token = jwt::create_access_token(
        user.id.clone(),
        user.username.clone(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )?;

    Ok(Json(LoginResponse {
        access_token,
        user: UserResponse::from(user),
    }))
}
