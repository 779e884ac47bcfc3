//! SQLite registry of analysis runs.
//!
//! One row per analyzed video, pointing at up to three JSON artifacts
//! under the storage root: the gambling-comment document, the non-gambling
//! comment document, and the keyword dictionary. The registry is the only
//! place artifact paths live; every moderation surface resolves paths
//! through it.

use anyhow::{bail, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

use crate::config::Config;
use crate::models::ArtifactKind;

/// One registered analysis run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Analysis {
    pub id: String,
    pub video_id: String,
    pub video_title: Option<String>,
    pub status: String,
    pub gambling_file_path: Option<String>,
    pub nongambling_file_path: Option<String>,
    pub keyword_file_path: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Analysis {
    /// Resolve one of the three artifact kinds against the storage root.
    /// Fails if the analysis has no artifact of that kind recorded.
    pub fn artifact_path(&self, config: &Config, kind: ArtifactKind) -> Result<PathBuf> {
        let relative = match kind {
            ArtifactKind::Gambling => self.gambling_file_path.as_deref(),
            ArtifactKind::Nongambling => self.nongambling_file_path.as_deref(),
            ArtifactKind::Keywords => self.keyword_file_path.as_deref(),
        };

        match relative {
            Some(relative) => Ok(config.storage.root.join(relative)),
            None => bail!("analysis {} has no {} artifact recorded", self.id, kind),
        }
    }

    /// Compact marker of which artifacts are recorded, e.g. `g-k`.
    pub fn artifact_flags(&self) -> String {
        let mut flags = String::with_capacity(3);
        flags.push(if self.gambling_file_path.is_some() { 'g' } else { '-' });
        flags.push(if self.nongambling_file_path.is_some() { 'n' } else { '-' });
        flags.push(if self.keyword_file_path.is_some() { 'k' } else { '-' });
        flags
    }
}

/// Fields supplied when registering a new analysis run.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub video_id: String,
    pub video_title: Option<String>,
    pub status: String,
    pub gambling_file_path: Option<String>,
    pub nongambling_file_path: Option<String>,
    pub keyword_file_path: Option<String>,
}

pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create the registry schema. Idempotent.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = connect(config).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analyses (
            id TEXT PRIMARY KEY,
            video_id TEXT NOT NULL,
            video_title TEXT,
            status TEXT NOT NULL DEFAULT 'queued',
            gambling_file_path TEXT,
            nongambling_file_path TEXT,
            keyword_file_path TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_analyses_video_id ON analyses(video_id)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_analyses_created_at ON analyses(created_at DESC)")
        .execute(&pool)
        .await?;

    pool.close().await;
    Ok(())
}

pub async fn register_analysis(config: &Config, new: NewAnalysis) -> Result<Analysis> {
    let pool = connect(config).await?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO analyses (id, video_id, video_title, status, gambling_file_path, nongambling_file_path, keyword_file_path, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.video_id)
    .bind(&new.video_title)
    .bind(&new.status)
    .bind(&new.gambling_file_path)
    .bind(&new.nongambling_file_path)
    .bind(&new.keyword_file_path)
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await?;

    pool.close().await;

    Ok(Analysis {
        id,
        video_id: new.video_id,
        video_title: new.video_title,
        status: new.status,
        gambling_file_path: new.gambling_file_path,
        nongambling_file_path: new.nongambling_file_path,
        keyword_file_path: new.keyword_file_path,
        created_at: now,
        updated_at: now,
    })
}

pub async fn get_analysis(config: &Config, id: &str) -> Result<Analysis> {
    let pool = connect(config).await?;

    let row = sqlx::query(
        "SELECT id, video_id, video_title, status, gambling_file_path, nongambling_file_path, keyword_file_path, created_at, updated_at FROM analyses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?;

    pool.close().await;

    match row {
        Some(row) => Ok(row_to_analysis(&row)),
        None => bail!("analysis not found: {}", id),
    }
}

pub async fn list_analyses(config: &Config) -> Result<Vec<Analysis>> {
    let pool = connect(config).await?;

    let rows = sqlx::query(
        "SELECT id, video_id, video_title, status, gambling_file_path, nongambling_file_path, keyword_file_path, created_at, updated_at FROM analyses ORDER BY created_at DESC, id ASC",
    )
    .fetch_all(&pool)
    .await?;

    pool.close().await;

    Ok(rows.iter().map(row_to_analysis).collect())
}

/// Record a pipeline status transition (queued → processing → completed/failed).
pub async fn set_analysis_status(config: &Config, id: &str, status: &str) -> Result<()> {
    let pool = connect(config).await?;

    let result = sqlx::query("UPDATE analyses SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(Utc::now().timestamp())
        .bind(id)
        .execute(&pool)
        .await?;

    pool.close().await;

    if result.rows_affected() == 0 {
        bail!("analysis not found: {}", id);
    }
    Ok(())
}

fn row_to_analysis(row: &SqliteRow) -> Analysis {
    Analysis {
        id: row.get("id"),
        video_id: row.get("video_id"),
        video_title: row.get("video_title"),
        status: row.get("status"),
        gambling_file_path: row.get("gambling_file_path"),
        nongambling_file_path: row.get("nongambling_file_path"),
        keyword_file_path: row.get("keyword_file_path"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============ CLI entry points ============

pub async fn run_register(config: &Config, new: NewAnalysis) -> Result<()> {
    let analysis = register_analysis(config, new).await?;

    println!("registered analysis {}", analysis.id);
    println!("  video:  {}", analysis.video_id);
    if let Some(ref title) = analysis.video_title {
        println!("  title:  {}", title);
    }
    println!("  status: {}", analysis.status);
    println!("  files:  {}", analysis.artifact_flags());

    Ok(())
}

pub async fn run_list(config: &Config) -> Result<()> {
    let analyses = list_analyses(config).await?;

    if analyses.is_empty() {
        println!("No analyses registered.");
        return Ok(());
    }

    println!(
        "{:<38} {:<14} {:<12} {:<6} {}",
        "ID", "VIDEO", "STATUS", "FILES", "REGISTERED"
    );
    for analysis in &analyses {
        println!(
            "{:<38} {:<14} {:<12} {:<6} {}",
            analysis.id,
            analysis.video_id,
            analysis.status,
            analysis.artifact_flags(),
            format_ts_relative(analysis.created_at)
        );
    }

    Ok(())
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
pub fn format_ts_relative(ts: i64) -> String {
    let now = Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
