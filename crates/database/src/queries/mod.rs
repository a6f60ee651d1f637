use std::fmt::Write as _;

use railway::database::DatabaseError;
use sqlx::{
    postgres::{PgArguments, PgQueryResult, PgRow},
    query::QueryAs,
    Executor, FromRow, Postgres,
};

pub mod crew;
pub mod journey;
pub mod order;
pub mod route;
pub mod seat;
pub mod station;
pub mod ticket;
pub mod train;
pub mod train_type;

pub(crate) fn convert_error(why: sqlx::Error) -> DatabaseError {
    match &why {
        sqlx::Error::RowNotFound => DatabaseError::NotFound,
        sqlx::Error::Database(inner)
            if inner.is_unique_violation() || inner.is_foreign_key_violation() =>
        {
            DatabaseError::Conflict
        }
        _ => DatabaseError::other(why),
    }
}

/// A delete that matched no row means the row never existed.
pub(crate) fn deleted_one(result: PgQueryResult) -> railway::database::Result<()> {
    match result.rows_affected() {
        0 => Err(DatabaseError::NotFound),
        _ => Ok(()),
    }
}

// bulk insert

pub async fn insert_all_returning<'c, E, T, B, O>(
    executor: E,
    table: &str,
    columns: &[&str],
    returning: &[&str],
    values: &[T],
    bind: B,
) -> Result<Vec<O>, sqlx::Error>
where
    E: Executor<'c, Database = Postgres>,
    for<'a> B: Fn(
        QueryAs<'a, Postgres, O, PgArguments>,
        &T,
    ) -> QueryAs<'a, Postgres, O, PgArguments>,
    for<'r> O: FromRow<'r, PgRow> + Send + Unpin,
{
    if values.is_empty() {
        return Ok(vec![]);
    }

    let query_str = bulk_insert_statement(table, columns, returning, values.len());
    let mut query = sqlx::query_as::<Postgres, O>(&query_str);
    for value in values {
        query = bind(query, value);
    }
    query.fetch_all(executor).await
}

fn bulk_insert_statement(
    table: &str,
    columns: &[&str],
    returning: &[&str],
    rows: usize,
) -> String {
    let mut query_str =
        format!("INSERT INTO {} ({}) VALUES ", table, columns.join(", "));
    let mut placeholder_index = 1;
    for i in 0..rows {
        if i > 0 {
            query_str.push_str(", ");
        }
        query_str.push('(');
        for j in 0..columns.len() {
            if j > 0 {
                query_str.push_str(", ");
            }
            // writing into a String can not fail
            let _ = write!(&mut query_str, "${}", placeholder_index);
            placeholder_index += 1;
        }
        query_str.push(')');
    }
    let _ = write!(&mut query_str, " RETURNING {};", returning.join(", "));
    query_str
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_insert_numbers_placeholders_row_by_row() {
        let statement = bulk_insert_statement("seats", &["a", "b"], &["id", "a", "b"], 2);
        assert_eq!(
            statement,
            "INSERT INTO seats (a, b) VALUES ($1, $2), ($3, $4) RETURNING id, a, b;"
        );
    }
}
