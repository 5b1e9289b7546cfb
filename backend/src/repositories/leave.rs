//! Leave master data, balance ledger, and request persistence.
//!
//! Balance rows are only ever mutated behind `SELECT ... FOR UPDATE` so the
//! check-then-book sequence cannot race.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgTransaction;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::approval_status::ApprovalStatus;
use crate::models::leave::{LeaveBalance, LeaveRequest, LeaveType};

const TYPE_COLUMNS: &str = "id, name, category, deducts_quota, requires_file, \
     min_months_of_service, default_quota, created_at, updated_at";

const BALANCE_COLUMNS: &str =
    "id, employee_id, leave_type_id, year, entitlement, carried_over, taken, created_at, updated_at";

const REQUEST_COLUMNS: &str = "id, tenant_id, employee_id, leave_type_id, start_date, end_date, \
     duration_days, reason, attachment, status, rejection_reason, approved_by, approved_at, \
     created_at, updated_at";

pub async fn list_types(db: &PgPool) -> Result<Vec<LeaveType>, AppError> {
    let query = format!("SELECT {} FROM leave_types ORDER BY name", TYPE_COLUMNS);
    let types = sqlx::query_as::<_, LeaveType>(&query).fetch_all(db).await?;
    Ok(types)
}

pub async fn find_type(db: &PgPool, id: &str) -> Result<Option<LeaveType>, AppError> {
    let query = format!("SELECT {} FROM leave_types WHERE id = $1", TYPE_COLUMNS);
    let leave_type = sqlx::query_as::<_, LeaveType>(&query)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(leave_type)
}

pub async fn list_balances(db: &PgPool, employee_id: &str) -> Result<Vec<LeaveBalance>, AppError> {
    let query = format!(
        "SELECT {} FROM leave_balances WHERE employee_id = $1 ORDER BY year DESC, leave_type_id",
        BALANCE_COLUMNS
    );
    let balances = sqlx::query_as::<_, LeaveBalance>(&query)
        .bind(employee_id)
        .fetch_all(db)
        .await?;
    Ok(balances)
}

pub async fn find_balance(
    db: &PgPool,
    employee_id: &str,
    leave_type_id: &str,
    year: i32,
) -> Result<Option<LeaveBalance>, AppError> {
    let query = format!(
        "SELECT {} FROM leave_balances \
         WHERE employee_id = $1 AND leave_type_id = $2 AND year = $3",
        BALANCE_COLUMNS
    );
    let balance = sqlx::query_as::<_, LeaveBalance>(&query)
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(year)
        .fetch_optional(db)
        .await?;
    Ok(balance)
}

/// Locks the balance row for the remainder of the transaction.
pub async fn find_balance_for_update(
    tx: &mut PgTransaction<'_>,
    employee_id: &str,
    leave_type_id: &str,
    year: i32,
) -> Result<Option<LeaveBalance>, AppError> {
    let query = format!(
        "SELECT {} FROM leave_balances \
         WHERE employee_id = $1 AND leave_type_id = $2 AND year = $3 FOR UPDATE",
        BALANCE_COLUMNS
    );
    let balance = sqlx::query_as::<_, LeaveBalance>(&query)
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(year)
        .fetch_optional(tx.as_mut())
        .await?;
    Ok(balance)
}

/// Books (positive delta) or refunds (negative delta) days against a
/// balance. Caller holds the row lock.
pub async fn add_taken(
    tx: &mut PgTransaction<'_>,
    balance_id: &str,
    delta: i32,
) -> Result<(), AppError> {
    sqlx::query("UPDATE leave_balances SET taken = taken + $2, updated_at = $3 WHERE id = $1")
        .bind(balance_id)
        .bind(delta)
        .bind(Utc::now())
        .execute(tx.as_mut())
        .await?;
    Ok(())
}

pub async fn insert_request(
    tx: &mut PgTransaction<'_>,
    request: &LeaveRequest,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO leave_requests (id, tenant_id, employee_id, leave_type_id, start_date, \
         end_date, duration_days, reason, attachment, status, rejection_reason, approved_by, \
         approved_at, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(&request.id)
    .bind(&request.tenant_id)
    .bind(&request.employee_id)
    .bind(&request.leave_type_id)
    .bind(request.start_date)
    .bind(request.end_date)
    .bind(request.duration_days)
    .bind(&request.reason)
    .bind(&request.attachment)
    .bind(request.status.as_str())
    .bind(&request.rejection_reason)
    .bind(&request.approved_by)
    .bind(request.approved_at)
    .bind(request.created_at)
    .bind(request.updated_at)
    .execute(tx.as_mut())
    .await?;
    Ok(())
}

pub async fn find_request(db: &PgPool, id: &str) -> Result<Option<LeaveRequest>, AppError> {
    let query = format!("SELECT {} FROM leave_requests WHERE id = $1", REQUEST_COLUMNS);
    let request = sqlx::query_as::<_, LeaveRequest>(&query)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(request)
}

pub async fn find_request_for_employee(
    db: &PgPool,
    id: &str,
    employee_id: &str,
) -> Result<Option<LeaveRequest>, AppError> {
    let query = format!(
        "SELECT {} FROM leave_requests WHERE id = $1 AND employee_id = $2",
        REQUEST_COLUMNS
    );
    let request = sqlx::query_as::<_, LeaveRequest>(&query)
        .bind(id)
        .bind(employee_id)
        .fetch_optional(db)
        .await?;
    Ok(request)
}

pub async fn list_requests(
    db: &PgPool,
    employee_id: &str,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<Vec<LeaveRequest>, AppError> {
    use sqlx::{Postgres, QueryBuilder};
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM leave_requests WHERE employee_id = ",
        REQUEST_COLUMNS
    ));
    builder.push_bind(employee_id);
    if let Some(m) = month {
        builder
            .push(" AND EXTRACT(MONTH FROM start_date) = ")
            .push_bind(m as i32);
    }
    if let Some(y) = year {
        builder
            .push(" AND EXTRACT(YEAR FROM start_date) = ")
            .push_bind(y);
    }
    builder.push(" ORDER BY created_at DESC");
    let requests = builder
        .build_query_as::<LeaveRequest>()
        .fetch_all(db)
        .await?;
    Ok(requests)
}

/// Any non-terminal request of this employee touching the window. Rejected
/// and cancelled requests free their dates for resubmission.
pub async fn overlap_exists(
    db: &PgPool,
    employee_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude_id: Option<&str>,
) -> Result<bool, AppError> {
    use sqlx::{Postgres, QueryBuilder};
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT EXISTS (SELECT 1 FROM leave_requests WHERE employee_id = ",
    );
    builder.push_bind(employee_id);
    builder.push(" AND status NOT IN ('rejected', 'cancelled') AND start_date <= ");
    builder.push_bind(end_date);
    builder.push(" AND end_date >= ");
    builder.push_bind(start_date);
    if let Some(id) = exclude_id {
        builder.push(" AND id != ").push_bind(id);
    }
    builder.push(")");
    let exists: bool = builder.build_query_scalar().fetch_one(db).await?;
    Ok(exists)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_request_window(
    tx: &mut PgTransaction<'_>,
    id: &str,
    leave_type_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    duration_days: i32,
    reason: &str,
    attachment: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE leave_requests SET leave_type_id = $2, start_date = $3, end_date = $4, \
         duration_days = $5, reason = $6, attachment = $7, updated_at = $8 WHERE id = $1",
    )
    .bind(id)
    .bind(leave_type_id)
    .bind(start_date)
    .bind(end_date)
    .bind(duration_days)
    .bind(reason)
    .bind(attachment)
    .bind(Utc::now())
    .execute(tx.as_mut())
    .await?;
    Ok(())
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
        "UPDATE leave_requests SET status = $2, approved_by = $3, approved_at = $4, \
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
