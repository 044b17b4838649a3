use std::path::Path;

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use thiserror::Error;
use tracing::info;

use cstreet_core::{Expense, Expenses, Money, Tag};

/// Connection handle, created once in `main` and passed down. There is no
/// process-global instance.
pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("stored date is not parseable: {0}")]
    BadStoredDate(String),
}

pub async fn create_db(path: &Path) -> Result<DbPool, StorageError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            amount_cents INTEGER NOT NULL,
            class TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '',
            classified INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Bulk-inserts the flattened expense list inside one transaction.
pub async fn insert_expenses(pool: &DbPool, expenses: &Expenses) -> Result<(), StorageError> {
    let mut db_tx = pool.begin().await?;

    for (expense, classified) in expenses
        .classified
        .iter()
        .map(|e| (e, true))
        .chain(expenses.unclassified.iter().map(|e| (e, false)))
    {
        let tags = expense
            .tags
            .iter()
            .map(Tag::as_str)
            .collect::<Vec<_>>()
            .join(",");
        sqlx::query(
            "INSERT INTO expenses (date, amount_cents, class, tags, classified) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(expense.date.to_string())
        .bind(expense.amount.to_cents())
        .bind(&expense.class)
        .bind(tags)
        .bind(classified)
        .execute(&mut *db_tx)
        .await?;
    }

    db_tx.commit().await?;
    info!(count = expenses.len(), "expenses written to database");
    Ok(())
}

/// Returns all stored expenses in the same classified/unclassified shape
/// they were written in, date-ordered.
pub async fn fetch_expenses(pool: &DbPool) -> Result<Expenses, StorageError> {
    let rows = sqlx::query_as::<_, (String, i64, String, String, bool)>(
        "SELECT date, amount_cents, class, tags, classified FROM expenses ORDER BY date, id",
    )
    .fetch_all(pool)
    .await?;

    let mut expenses = Expenses::default();
    for (date, cents, class, tags, classified) in rows {
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|_| StorageError::BadStoredDate(date))?;
        let tags = tags
            .split(',')
            .filter(|t| !t.is_empty())
            .map(Tag::new)
            .collect();
        let expense = Expense {
            date,
            amount: Money::from_cents(cents),
            class,
            tags,
        };
        if classified {
            expenses.classified.push(expense);
        } else {
            expenses.unclassified.push(expense);
        }
    }
    Ok(expenses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(date: &str, cents: i64, class: &str, tags: &[&str]) -> Expense {
        Expense {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount: Money::from_cents(cents),
            class: class.to_string(),
            tags: tags.iter().copied().map(Tag::new).collect(),
        }
    }

    async fn test_db() -> (tempfile::TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("test.db")).await.unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn round_trip_preserves_shape() {
        let (_dir, pool) = test_db().await;
        let written = Expenses {
            classified: vec![
                expense("2021-03-18", 500, "Eating outside", &[]),
                expense("2021-04-01", 350_000, "Living", &["Crucial", "Recurring"]),
            ],
            unclassified: vec![expense("2021-03-20", 2000, "shirt", &[])],
        };
        insert_expenses(&pool, &written).await.unwrap();

        let read = fetch_expenses(&pool).await.unwrap();
        assert_eq!(read, written);
    }

    #[tokio::test]
    async fn fetch_from_empty_db() {
        let (_dir, pool) = test_db().await;
        let read = fetch_expenses(&pool).await.unwrap();
        assert!(read.is_empty());
    }

    #[tokio::test]
    async fn empty_tags_read_back_empty() {
        let (_dir, pool) = test_db().await;
        let written = Expenses {
            classified: vec![expense("2021-03-18", 500, "Eating outside", &[])],
            unclassified: vec![],
        };
        insert_expenses(&pool, &written).await.unwrap();
        let read = fetch_expenses(&pool).await.unwrap();
        assert!(read.classified[0].tags.is_empty());
    }
}
