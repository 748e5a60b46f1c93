// src/common/db_utils.rs

use std::collections::BTreeSet;

use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection};

use crate::common::error::{unique_violation_column, AppError, FieldErrors};

pub(crate) const TAKEN_MESSAGE: &str = "Este valor já está em uso.";

/// Verifica se `value` já existe em `table.column`, ignorando a linha `exclude_id`.
/// `id IS NOT NULL` é sempre verdadeiro no SQLite, então `None` não exclui nada.
pub(crate) async fn value_taken<'e, E>(
    executor: E,
    table: &str,
    column: &str,
    value: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE {column} = ? AND id IS NOT ?");
    let count = sqlx::query_scalar::<_, i64>(&sql)
        .bind(value)
        .bind(exclude_id)
        .fetch_one(executor)
        .await?;

    Ok(count > 0)
}

/// Devolve quais dos `ids` existem em `table`.
pub(crate) async fn existing_ids(
    conn: &mut SqliteConnection,
    table: &str,
    ids: &[i64],
) -> Result<BTreeSet<i64>, AppError> {
    if ids.is_empty() {
        return Ok(BTreeSet::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT id FROM {table} WHERE id IN ("));
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let found = qb.build_query_scalar::<i64>().fetch_all(&mut *conn).await?;
    Ok(found.into_iter().collect())
}

/// Converte violação de UNIQUE em erro de campo; o resto segue como erro de banco.
pub(crate) fn map_unique_violation(e: sqlx::Error) -> AppError {
    match unique_violation_column(&e) {
        Some(column) => AppError::Validation(FieldErrors::single(column, TAKEN_MESSAGE)),
        None => e.into(),
    }
}
