use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgTransaction;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::approval_status::ApprovalStatus;
use crate::models::overtime::OvertimeRequest;

const REQUEST_COLUMNS: &str = "id, tenant_id, employee_id, date, duration_minutes, reason, \
     status, rejection_reason, approved_by, approved_at, created_at, updated_at";

pub async fn insert_request(db: &PgPool, request: &OvertimeRequest) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO overtime_requests (id, tenant_id, employee_id, date, duration_minutes, \
         reason, status, rejection_reason, approved_by, approved_at, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(&request.id)
    .bind(&request.tenant_id)
    .bind(&request.employee_id)
    .bind(request.date)
    .bind(request.duration_minutes)
    .bind(&request.reason)
    .bind(request.status.as_str())
    .bind(&request.rejection_reason)
    .bind(&request.approved_by)
    .bind(request.approved_at)
    .bind(request.created_at)
    .bind(request.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_request(db: &PgPool, id: &str) -> Result<Option<OvertimeRequest>, AppError> {
    let query = format!("SELECT {} FROM overtime_requests WHERE id = $1", REQUEST_COLUMNS);
    let request = sqlx::query_as::<_, OvertimeRequest>(&query)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(request)
}

pub async fn find_request_for_employee(
    db: &PgPool,
    id: &str,
    employee_id: &str,
) -> Result<Option<OvertimeRequest>, AppError> {
    let query = format!(
        "SELECT {} FROM overtime_requests WHERE id = $1 AND employee_id = $2",
        REQUEST_COLUMNS
    );
    let request = sqlx::query_as::<_, OvertimeRequest>(&query)
        .bind(id)
        .bind(employee_id)
        .fetch_optional(db)
        .await?;
    Ok(request)
}

pub async fn list_requests(
    db: &PgPool,
    employee_id: &str,
) -> Result<Vec<OvertimeRequest>, AppError> {
    let query = format!(
        "SELECT {} FROM overtime_requests WHERE employee_id = $1 ORDER BY created_at DESC",
        REQUEST_COLUMNS
    );
    let requests = sqlx::query_as::<_, OvertimeRequest>(&query)
        .bind(employee_id)
        .fetch_all(db)
        .await?;
    Ok(requests)
}

/// One live overtime request per employee per date.
pub async fn conflict_exists(
    db: &PgPool,
    employee_id: &str,
    date: NaiveDate,
    exclude_id: Option<&str>,
) -> Result<bool, AppError> {
    use sqlx::{Postgres, QueryBuilder};
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT EXISTS (SELECT 1 FROM overtime_requests WHERE employee_id = ",
    );
    builder.push_bind(employee_id);
    builder.push(" AND status NOT IN ('rejected', 'cancelled') AND date = ");
    builder.push_bind(date);
    if let Some(id) = exclude_id {
        builder.push(" AND id != ").push_bind(id);
    }
    builder.push(")");
    let exists: bool = builder.build_query_scalar().fetch_one(db).await?;
    Ok(exists)
}

pub async fn set_status(
    tx: &mut PgTransaction<'_>,
    id: &str,
    status: ApprovalStatus,
    decided_by: Option<&str>,
    decided_at: Option<DateTime<Utc>>,
    rejection_reason: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE overtime_requests SET status = $2, approved_by = $3, approved_at = $4, \
         rejection_reason = $5, updated_at = $6 WHERE id = $1",
    )
    .bind(id)
    .bind(status.as_str())
    .bind(decided_by)
    .bind(decided_at)
    .bind(rejection_reason)
    .bind(Utc::now())
    .execute(tx.as_mut())
    .await?;
    Ok(())
}
