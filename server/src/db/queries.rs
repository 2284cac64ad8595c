//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! All query functions include error context logging to aid debugging.

use sqlx::PgPool;
use tracing::error;

use super::models::User;

/// Log and return a database error with context.
///
/// This helper ensures all database errors are logged with relevant context
/// before being propagated, making production debugging easier.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

/// Find user by Zalo ID.
pub async fn find_user_by_zalo_id(pool: &PgPool, zalo_id: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE zalo_id = $1")
        .bind(zalo_id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_zalo_id", zalo_id = %zalo_id))
}

/// Find or create the user row for a Zalo ID.
///
/// The insert relies on the unique constraint on `zalo_id`: two concurrent
/// first logins for the same account race on `ON CONFLICT DO NOTHING`, and
/// the loser re-selects the winner's row. Existing rows are never updated
/// here; a returning user keeps the name captured at first login.
pub async fn find_or_create_zalo_user(
    pool: &PgPool,
    zalo_id: &str,
    name: Option<&str>,
) -> sqlx::Result<User> {
    if let Some(user) = find_user_by_zalo_id(pool, zalo_id).await? {
        return Ok(user);
    }

    let inserted = sqlx::query_as::<_, User>(
        r"
        INSERT INTO users (zalo_id, name)
        VALUES ($1, $2)
        ON CONFLICT (zalo_id) DO NOTHING
        RETURNING *
        ",
    )
    .bind(zalo_id)
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_or_create_zalo_user", zalo_id = %zalo_id))?;

    match inserted {
        Some(user) => Ok(user),
        // Lost the insert race; the row exists now
        None => {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE zalo_id = $1")
                .bind(zalo_id)
                .fetch_one(pool)
                .await
                .map_err(db_error!("find_or_create_zalo_user_reselect", zalo_id = %zalo_id))
        }
    }
}
