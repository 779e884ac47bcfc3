//! Artifact summaries.
//!
//! Reads a comment document or keyword dictionary and tallies it for
//! display. Used by the `lawan show` CLI command. Artifacts are read as
//! generic JSON so documents with extra fields still summarize cleanly.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::Config;
use crate::models::ArtifactKind;
use crate::registry;

/// Tally of one chunk of a comment document.
#[derive(Debug, Clone)]
pub struct ChunkSummary {
    pub chunk_id: Option<i64>,
    pub comment_count: usize,
    pub status_counts: BTreeMap<String, usize>,
}

/// Tally of a whole comment document.
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub total_comments: Option<i64>,
    pub total_chunks: Option<i64>,
    pub chunks: Vec<ChunkSummary>,
    pub status_counts: BTreeMap<String, usize>,
}

/// Tally of a keyword dictionary.
#[derive(Debug, Clone)]
pub struct KeywordSummary {
    pub total: usize,
    pub active: usize,
    pub entries: Vec<(String, i64)>,
}

pub fn summarize_comment_document(path: &Path) -> Result<DocumentSummary> {
    let doc = read_artifact(path)?;

    let chunks = doc
        .get("chunks")
        .and_then(Value::as_array)
        .with_context(|| format!("artifact has no `chunks` array: {}", path.display()))?;

    let mut chunk_summaries = Vec::with_capacity(chunks.len());
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();

    for chunk in chunks {
        let comments = chunk
            .get("comments")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let mut chunk_counts: BTreeMap<String, usize> = BTreeMap::new();
        for comment in comments {
            let status = comment
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            *chunk_counts.entry(status.clone()).or_insert(0) += 1;
            *status_counts.entry(status).or_insert(0) += 1;
        }

        chunk_summaries.push(ChunkSummary {
            chunk_id: chunk.get("chunk_id").and_then(Value::as_i64),
            comment_count: comments.len(),
            status_counts: chunk_counts,
        });
    }

    Ok(DocumentSummary {
        total_comments: doc.get("total_comments").and_then(Value::as_i64),
        total_chunks: doc.get("total_chunks").and_then(Value::as_i64),
        chunks: chunk_summaries,
        status_counts,
    })
}

pub fn summarize_keyword_document(path: &Path) -> Result<KeywordSummary> {
    let doc = read_artifact(path)?;

    let entries = doc
        .as_array()
        .with_context(|| format!("keyword artifact is not a JSON array: {}", path.display()))?;

    let mut rows = Vec::with_capacity(entries.len());
    let mut active = 0usize;

    for entry in entries {
        let label = entry.get("label").and_then(Value::as_i64).unwrap_or(0);
        if label == 1 {
            active += 1;
        }
        let display = entry
            .get("keyword")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| entry.get("id").and_then(Value::as_i64).map(|id| id.to_string()))
            .unwrap_or_else(|| "(unnamed)".to_string());
        rows.push((display, label));
    }

    Ok(KeywordSummary {
        total: entries.len(),
        active,
        entries: rows,
    })
}

fn read_artifact(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Artifact is not valid JSON: {}", path.display()))
}

/// CLI entry point — prints an analysis header and the artifact summary.
pub async fn run_show(config: &Config, analysis_id: &str, kind: ArtifactKind) -> Result<()> {
    let analysis = registry::get_analysis(config, analysis_id).await?;
    let path = analysis.artifact_path(config, kind)?;

    println!("--- Analysis ---");
    println!("id:       {}", analysis.id);
    println!("video:    {}", analysis.video_id);
    if let Some(ref title) = analysis.video_title {
        println!("title:    {}", title);
    }
    println!("status:   {}", analysis.status);
    println!("artifact: {} ({})", path.display(), kind);
    println!();

    match kind {
        ArtifactKind::Keywords => {
            let summary = summarize_keyword_document(&path)?;
            println!(
                "--- Keywords ({} total, {} active) ---",
                summary.total, summary.active
            );
            for (keyword, label) in &summary.entries {
                println!(
                    "  {:<24} {}",
                    keyword,
                    if *label == 1 { "active" } else { "inactive" }
                );
            }
        }
        ArtifactKind::Gambling | ArtifactKind::Nongambling => {
            let summary = summarize_comment_document(&path)?;
            println!("--- Chunks ({}) ---", summary.chunks.len());
            for chunk in &summary.chunks {
                let counts = chunk
                    .status_counts
                    .iter()
                    .map(|(status, n)| format!("{}: {}", status, n))
                    .collect::<Vec<_>>()
                    .join("  ");
                println!(
                    "[chunk {}] {} comments  {}",
                    chunk
                        .chunk_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "?".to_string()),
                    chunk.comment_count,
                    counts
                );
            }
            println!();
            println!("--- Status totals ---");
            for (status, n) in &summary.status_counts {
                println!("  {:<16} {}", status, n);
            }
            if let Some(total) = summary.total_comments {
                println!();
                println!("declared total_comments: {}", total);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_comment_document_tally() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gambling.json");
        fs::write(
            &path,
            json!({
                "total_comments": 3,
                "total_chunks": 2,
                "chunks": [
                    { "chunk_id": 0, "comments": [
                        { "comment_id": "c1", "status": "draft" },
                        { "comment_id": "c2", "status": "reject" }
                    ] },
                    { "chunk_id": 1, "comments": [
                        { "comment_id": "c3", "status": "draft" }
                    ] }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let summary = summarize_comment_document(&path).unwrap();
        assert_eq!(summary.total_comments, Some(3));
        assert_eq!(summary.chunks.len(), 2);
        assert_eq!(summary.chunks[0].comment_count, 2);
        assert_eq!(summary.status_counts.get("draft"), Some(&2));
        assert_eq!(summary.status_counts.get("reject"), Some(&1));
    }

    #[test]
    fn test_keyword_document_tally() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keywords.json");
        fs::write(
            &path,
            json!([
                { "id": 1, "keyword": "jackpot", "label": 1 },
                { "id": 2, "keyword": "slot", "label": 0 }
            ])
            .to_string(),
        )
        .unwrap();

        let summary = summarize_keyword_document(&path).unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.entries[0].0, "jackpot");
    }

    #[test]
    fn test_wrong_shape_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keywords.json");
        fs::write(&path, "{}").unwrap();
        assert!(summarize_keyword_document(&path).is_err());
    }
}
