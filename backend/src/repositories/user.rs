use sqlx::PgPool;

use crate::error::AppError;
use crate::models::user::User;

const SELECT_COLUMNS: &str = "id, username, password_hash, full_name, created_at, updated_at";

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let query = format!("SELECT {} FROM users WHERE username = $1", SELECT_COLUMNS);
    let user = sqlx::query_as::<_, User>(&query)
        .bind(username)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: &str) -> Result<Option<User>, AppError> {
    let query = format!("SELECT {} FROM users WHERE id = $1", SELECT_COLUMNS);
    let user = sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(user)
}
