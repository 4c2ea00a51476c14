use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use uuid::Uuid;

use shared::domain::{Koder, KoderId, NewKoder};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredKoder {
    pub koder: Koder,
    pub created_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Inserts a koder under a freshly generated identifier.
    pub async fn insert_koder(&self, new_koder: &NewKoder) -> Result<StoredKoder> {
        let id = KoderId::new(Uuid::new_v4().to_string());
        let created_at = Utc::now();
        sqlx::query(
            "INSERT INTO koders (id, first_name, last_name, email, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(&new_koder.first_name)
        .bind(&new_koder.last_name)
        .bind(&new_koder.email)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .context("failed to insert koder")?;

        Ok(StoredKoder {
            koder: new_koder.clone().with_id(id),
            created_at,
        })
    }

    /// All koders in insertion order.
    pub async fn list_koders(&self) -> Result<Vec<StoredKoder>> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, email, created_at FROM koders ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list koders")?;

        rows.iter().map(stored_koder_from_row).collect()
    }

    /// Removes a koder and returns the removed row, or `None` if the id is unknown.
    pub async fn delete_koder(&self, koder_id: &KoderId) -> Result<Option<StoredKoder>> {
        let row = sqlx::query(
            "DELETE FROM koders WHERE id = ?
             RETURNING id, first_name, last_name, email, created_at",
        )
        .bind(koder_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to delete koder {koder_id}"))?;
        row.as_ref().map(stored_koder_from_row).transpose()
    }
}

fn stored_koder_from_row(row: &SqliteRow) -> Result<StoredKoder> {
    Ok(StoredKoder {
        koder: Koder {
            id: KoderId::new(row.try_get::<String, _>("id")?),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
        },
        created_at: row.try_get("created_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
