pub mod admin;
pub mod attendance;
pub mod auth;
pub mod leave;
pub mod overtime;

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::employee::Employee;
use crate::models::user::User;
use crate::repositories::employee as employee_repo;

/// The employee record behind the authenticated user. Accounts without one
/// cannot use any attendance or request endpoint.
pub(crate) async fn current_employee(db: &PgPool, user: &User) -> Result<Employee, AppError> {
    employee_repo::find_by_user_id(db, &user.id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Employee record is not linked to this account.".to_string())
        })
}
