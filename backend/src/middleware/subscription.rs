//! Tenant entitlement gate.
//!
//! Mounted on punch and leave/overtime mutation routes only; read endpoints
//! stay available while a tenant's subscription has lapsed.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    config::Config, error::AppError, models::user::User,
    repositories::employee as employee_repo,
};

pub async fn subscription_gate(
    State((pool, _config)): State<(PgPool, Config)>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentication required.".to_string()))?;

    if let Some(employee) = employee_repo::find_by_user_id(&pool, &user.id).await? {
        let tenant = employee_repo::find_tenant(&pool, &employee.tenant_id).await?;
        let active = tenant.map(|t| t.has_active_subscription).unwrap_or(false);
        if !active {
            return Err(AppError::ForbiddenWithDetails(
                "Your company's subscription has expired. Renew the plan to punch in or \
                 submit requests."
                    .to_string(),
                json!({"error_code": "SUBSCRIPTION_EXPIRED"}),
            ));
        }
    }

    Ok(next.run(request).await)
}
