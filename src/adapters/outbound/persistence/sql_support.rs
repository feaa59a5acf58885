use sqlx::{postgres::PgRow, Decode, Postgres, Row, Type};

use crate::domain::errors::{StorageError, StorageResult};

/// Map a sqlx error to a domain storage error; unique violations become `AlreadyExists`
pub(crate) fn map_sqlx_error(context: &str, err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::AlreadyExists {
            resource: format!("{} ({})", context, db.message()),
        },
        sqlx::Error::RowNotFound => StorageError::NotFound {
            resource: context.to_string(),
        },
        _ => StorageError::infrastructure(format!("Database error: {}", context), &err),
    }
}

pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> StorageResult<T>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(name).map_err(|e| StorageError::InvalidData {
        message: format!("column '{}': {}", name, e),
    })
}

pub(crate) fn invalid_data(what: &str, err: impl std::fmt::Display) -> StorageError {
    StorageError::InvalidData {
        message: format!("{}: {}", what, err),
    }
}

/// Run schema statements one by one
pub(crate) async fn run_migrations(
    pool: &sqlx::PgPool,
    statements: &[&str],
) -> Result<(), sqlx::Error> {
    for statement in statements {
        sqlx::query(*statement).execute(pool).await?;
    }
    Ok(())
}
