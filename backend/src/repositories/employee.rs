use chrono::Utc;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::employee::Employee;
use crate::models::tenant::Tenant;

const SELECT_COLUMNS: &str = "id, tenant_id, user_id, full_name, employment_status, \
     work_location_id, is_flexible_location, registered_device_id, attendance_required, \
     supervisor_id, manager_id, is_hr, join_date, created_at, updated_at";

pub async fn find_by_id(db: &PgPool, id: &str) -> Result<Option<Employee>, AppError> {
    let query = format!("SELECT {} FROM employees WHERE id = $1", SELECT_COLUMNS);
    let employee = sqlx::query_as::<_, Employee>(&query)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(employee)
}

pub async fn find_by_user_id(db: &PgPool, user_id: &str) -> Result<Option<Employee>, AppError> {
    let query = format!("SELECT {} FROM employees WHERE user_id = $1", SELECT_COLUMNS);
    let employee = sqlx::query_as::<_, Employee>(&query)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(employee)
}

/// First-ever punch binds the device; only HR can clear it afterwards.
pub async fn bind_device(db: &PgPool, employee_id: &str, device_id: &str) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE employees SET registered_device_id = $1, updated_at = $2 \
         WHERE id = $3 AND registered_device_id IS NULL",
    )
    .bind(device_id)
    .bind(Utc::now())
    .bind(employee_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Employees the reconciliation jobs consider: active, required to punch,
/// and holding at least one schedule assignment.
pub async fn list_reconciliation_candidates(db: &PgPool) -> Result<Vec<Employee>, AppError> {
    let query = format!(
        "SELECT {} FROM employees e \
         WHERE e.employment_status NOT IN ('resigned', 'terminated', 'retired') \
           AND e.attendance_required \
           AND EXISTS (SELECT 1 FROM employee_schedule_assignments a WHERE a.employee_id = e.id) \
         ORDER BY e.id",
        SELECT_COLUMNS
    );
    let employees = sqlx::query_as::<_, Employee>(&query).fetch_all(db).await?;
    Ok(employees)
}

pub async fn find_tenant(db: &PgPool, tenant_id: &str) -> Result<Option<Tenant>, AppError> {
    let tenant = sqlx::query_as::<_, Tenant>(
        "SELECT id, name, has_active_subscription, created_at, updated_at \
         FROM tenants WHERE id = $1",
    )
    .bind(tenant_id)
    .fetch_optional(db)
    .await?;
    Ok(tenant)
}
