//! Single-record artifact patching.
//!
//! An analysis run leaves two kinds of JSON artifacts on disk: chunked
//! comment documents (`{ total_comments, total_chunks, chunks: [...] }`)
//! and the flat keyword dictionary (`[ { id, keyword, label }, ... ]`).
//! A moderation or labeling action mutates exactly one field of one record
//! and rewrites the whole file.
//!
//! Both operations are single-shot read-modify-write passes over the file.
//! There is no locking: two concurrent writers to the same artifact read
//! the same pre-mutation document and the later write overwrites the
//! earlier one. Callers treat every non-[`PatchOutcome::Updated`] result
//! as "mirror not updated" and carry on — the artifact is a display
//! mirror, not the source of truth for the moderation action.
//!
//! Documents are handled as generic [`serde_json::Value`] trees so that
//! fields this crate knows nothing about survive the rewrite unchanged.
//! Output is pretty-printed UTF-8 with non-ASCII characters left literal.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::models::KeywordKey;

/// Outcome of a single patch attempt.
///
/// Never an `Err`: every expected failure mode is a value the caller can
/// log and move past.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Exactly one record was updated and the file was rewritten.
    Updated,
    /// The path does not point at an existing file.
    FileNotFound,
    /// The file exists but is not a document of the expected shape.
    InvalidDocument(String),
    /// The document is well-formed but holds no matching record.
    NotFound,
    /// The record was patched in memory but the rewrite failed.
    WriteFailed(String),
}

impl PatchOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, PatchOutcome::Updated)
    }

    /// Short description for warnings and API responses.
    pub fn describe(&self) -> String {
        match self {
            PatchOutcome::Updated => "updated".to_string(),
            PatchOutcome::FileNotFound => "artifact file not found".to_string(),
            PatchOutcome::InvalidDocument(reason) => format!("invalid document: {}", reason),
            PatchOutcome::NotFound => "no matching record".to_string(),
            PatchOutcome::WriteFailed(reason) => format!("write failed: {}", reason),
        }
    }
}

/// Set the `status` field of the comment with `comment_id` inside a
/// chunked comment document.
///
/// Chunks are walked in array order, comments within each chunk in array
/// order; the first comment whose `comment_id` equals `comment_id` wins
/// and scanning stops there. `new_status` is written as-is — enum
/// membership is the caller's concern.
pub fn patch_comment_status(path: &Path, comment_id: &str, new_status: &str) -> PatchOutcome {
    let mut doc = match read_document(path) {
        Ok(doc) => doc,
        Err(outcome) => return outcome,
    };

    let Some(chunks) = doc.get_mut("chunks").and_then(Value::as_array_mut) else {
        return PatchOutcome::InvalidDocument("missing or non-array `chunks` key".to_string());
    };

    let mut found = false;
    'chunks: for chunk in chunks.iter_mut() {
        let Some(comments) = chunk.get_mut("comments").and_then(Value::as_array_mut) else {
            continue;
        };
        for comment in comments.iter_mut() {
            if comment.get("comment_id").and_then(Value::as_str) == Some(comment_id) {
                if let Some(fields) = comment.as_object_mut() {
                    fields.insert("status".to_string(), Value::String(new_status.to_string()));
                }
                found = true;
                break 'chunks;
            }
        }
    }

    if !found {
        return PatchOutcome::NotFound;
    }

    write_document(path, &doc)
}

/// Set the `label` field of one keyword dictionary entry.
///
/// The document must be a top-level JSON array. The first entry matching
/// `key` wins: an id key compares as an integer against `id`, a keyword
/// key as a string against `keyword`.
pub fn patch_keyword_label(path: &Path, key: &KeywordKey, new_label: i64) -> PatchOutcome {
    let mut doc = match read_document(path) {
        Ok(doc) => doc,
        Err(outcome) => return outcome,
    };

    let Some(entries) = doc.as_array_mut() else {
        return PatchOutcome::InvalidDocument("expected a top-level JSON array".to_string());
    };

    let mut found = false;
    for entry in entries.iter_mut() {
        if !matches_key(entry, key) {
            continue;
        }
        if let Some(fields) = entry.as_object_mut() {
            fields.insert("label".to_string(), Value::from(new_label));
        }
        found = true;
        break;
    }

    if !found {
        return PatchOutcome::NotFound;
    }

    write_document(path, &doc)
}

fn matches_key(entry: &Value, key: &KeywordKey) -> bool {
    match key {
        KeywordKey::ById(id) => entry.get("id").and_then(Value::as_i64) == Some(*id),
        KeywordKey::ByKeyword(word) => {
            entry.get("keyword").and_then(Value::as_str) == Some(word.as_str())
        }
    }
}

fn read_document(path: &Path) -> Result<Value, PatchOutcome> {
    if !path.is_file() {
        return Err(PatchOutcome::FileNotFound);
    }

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => return Err(PatchOutcome::InvalidDocument(format!("unreadable: {}", e))),
    };

    serde_json::from_str(&raw).map_err(|e| PatchOutcome::InvalidDocument(e.to_string()))
}

/// Rewrite the full document: pretty-printed, via a sibling temp file and
/// rename so a crash mid-write cannot leave a half-written artifact.
fn write_document(path: &Path, doc: &Value) -> PatchOutcome {
    let pretty = match serde_json::to_string_pretty(doc) {
        Ok(pretty) => pretty,
        Err(e) => return PatchOutcome::WriteFailed(e.to_string()),
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new("."))) {
        Ok(tmp) => tmp,
        Err(e) => return PatchOutcome::WriteFailed(e.to_string()),
    };

    if let Err(e) = tmp.write_all(pretty.as_bytes()) {
        return PatchOutcome::WriteFailed(e.to_string());
    }

    match tmp.persist(path) {
        Ok(_) => PatchOutcome::Updated,
        Err(e) => PatchOutcome::WriteFailed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_artifact(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = tmp.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn two_chunk_doc() -> String {
        json!({
            "total_comments": 3,
            "total_chunks": 2,
            "chunks": [
                {
                    "chunk_id": 0,
                    "comments": [
                        {
                            "comment_id": "c1",
                            "status": "draft",
                            "text": "daftar slot gacor di bio",
                            "timestamp": "2025-06-01T10:00:00Z",
                            "user_metadata": {
                                "profile_url": "https://yt.example/u/1",
                                "user_id": "u1",
                                "username": "spam_akun"
                            }
                        },
                        { "comment_id": "c2", "status": "draft", "text": "mantap bang 👍" }
                    ]
                },
                {
                    "chunk_id": 1,
                    "comments": [
                        { "comment_id": "c3", "status": "heldForReview", "text": "pengguna biasa" }
                    ]
                }
            ]
        })
        .to_string()
    }

    fn keyword_doc() -> String {
        json!([
            { "id": 1, "keyword": "jackpot", "label": 1 },
            { "id": 2, "keyword": "slot", "label": 1 }
        ])
        .to_string()
    }

    #[test]
    fn test_updates_target_comment_only() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "gambling.json", &two_chunk_doc());

        assert_eq!(
            patch_comment_status(&path, "c2", "reject"),
            PatchOutcome::Updated
        );

        let doc = read_json(&path);
        assert_eq!(doc["chunks"][0]["comments"][0]["status"], "draft");
        assert_eq!(doc["chunks"][0]["comments"][1]["status"], "reject");
        assert_eq!(doc["chunks"][1]["comments"][0]["status"], "heldForReview");
    }

    #[test]
    fn test_reapplying_same_status_is_stable() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "gambling.json", &two_chunk_doc());

        assert_eq!(
            patch_comment_status(&path, "c2", "reject"),
            PatchOutcome::Updated
        );
        let after_first = read_json(&path);

        assert_eq!(
            patch_comment_status(&path, "c2", "reject"),
            PatchOutcome::Updated
        );
        assert_eq!(read_json(&path), after_first);
    }

    #[test]
    fn test_first_match_wins_on_duplicate_ids() {
        let tmp = TempDir::new().unwrap();
        let doc = json!({
            "chunks": [
                { "chunk_id": 0, "comments": [ { "comment_id": "dup", "status": "draft", "text": "first" } ] },
                { "chunk_id": 1, "comments": [ { "comment_id": "dup", "status": "draft", "text": "second" } ] }
            ]
        })
        .to_string();
        let path = write_artifact(&tmp, "gambling.json", &doc);

        assert_eq!(
            patch_comment_status(&path, "dup", "reject"),
            PatchOutcome::Updated
        );

        let doc = read_json(&path);
        assert_eq!(doc["chunks"][0]["comments"][0]["status"], "reject");
        assert_eq!(doc["chunks"][1]["comments"][0]["status"], "draft");
    }

    #[test]
    fn test_unknown_comment_leaves_bytes_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "gambling.json", &two_chunk_doc());
        let before = fs::read_to_string(&path).unwrap();

        assert_eq!(
            patch_comment_status(&path, "c99", "reject"),
            PatchOutcome::NotFound
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_missing_file_is_not_created() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.json");

        assert_eq!(
            patch_comment_status(&path, "c1", "reject"),
            PatchOutcome::FileNotFound
        );
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_json_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "gambling.json", "not json");

        assert!(matches!(
            patch_comment_status(&path, "c1", "reject"),
            PatchOutcome::InvalidDocument(_)
        ));
    }

    #[test]
    fn test_missing_chunks_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "gambling.json", "{}");

        assert!(matches!(
            patch_comment_status(&path, "c1", "reject"),
            PatchOutcome::InvalidDocument(_)
        ));
    }

    #[test]
    fn test_array_document_rejected_for_comment_patch() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "gambling.json", "[1,2,3]");

        assert!(matches!(
            patch_comment_status(&path, "c1", "reject"),
            PatchOutcome::InvalidDocument(_)
        ));
    }

    #[test]
    fn test_payload_fields_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "gambling.json", &two_chunk_doc());

        assert_eq!(
            patch_comment_status(&path, "c1", "dataset"),
            PatchOutcome::Updated
        );

        let doc = read_json(&path);
        assert_eq!(doc["total_comments"], 3);
        assert_eq!(doc["total_chunks"], 2);
        let c1 = &doc["chunks"][0]["comments"][0];
        assert_eq!(c1["status"], "dataset");
        assert_eq!(c1["text"], "daftar slot gacor di bio");
        assert_eq!(c1["timestamp"], "2025-06-01T10:00:00Z");
        assert_eq!(c1["user_metadata"]["username"], "spam_akun");
        assert_eq!(doc["chunks"][1]["comments"][0]["text"], "pengguna biasa");
    }

    #[test]
    fn test_unicode_stays_literal() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "gambling.json", &two_chunk_doc());

        assert_eq!(
            patch_comment_status(&path, "c2", "reject"),
            PatchOutcome::Updated
        );

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("mantap bang 👍"));
        assert!(!raw.contains("\\u"));
    }

    #[test]
    fn test_status_value_passes_through_unvalidated() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "gambling.json", &two_chunk_doc());

        assert_eq!(
            patch_comment_status(&path, "c3", "archived"),
            PatchOutcome::Updated
        );
        assert_eq!(
            read_json(&path)["chunks"][1]["comments"][0]["status"],
            "archived"
        );
    }

    #[test]
    fn test_keyword_label_by_id() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "keywords.json", &keyword_doc());

        assert_eq!(
            patch_keyword_label(&path, &KeywordKey::ById(2), 0),
            PatchOutcome::Updated
        );

        let doc = read_json(&path);
        assert_eq!(doc[0]["label"], 1);
        assert_eq!(doc[1]["label"], 0);
    }

    #[test]
    fn test_keyword_label_by_word() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "keywords.json", &keyword_doc());

        assert_eq!(
            patch_keyword_label(&path, &KeywordKey::ByKeyword("jackpot".to_string()), 0),
            PatchOutcome::Updated
        );

        let doc = read_json(&path);
        assert_eq!(doc[0]["label"], 0);
        assert_eq!(doc[1]["label"], 1);
    }

    #[test]
    fn test_keyword_numeric_string_key_matches_id() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "keywords.json", &keyword_doc());

        let key = KeywordKey::parse("2");
        assert_eq!(key, KeywordKey::ById(2));
        assert_eq!(patch_keyword_label(&path, &key, 0), PatchOutcome::Updated);
        assert_eq!(read_json(&path)[1]["label"], 0);
    }

    #[test]
    fn test_keyword_first_match_wins() {
        let tmp = TempDir::new().unwrap();
        let doc = json!([
            { "id": 5, "keyword": "slot", "label": 1 },
            { "id": 6, "keyword": "slot", "label": 1 }
        ])
        .to_string();
        let path = write_artifact(&tmp, "keywords.json", &doc);

        assert_eq!(
            patch_keyword_label(&path, &KeywordKey::ByKeyword("slot".to_string()), 0),
            PatchOutcome::Updated
        );

        let doc = read_json(&path);
        assert_eq!(doc[0]["label"], 0);
        assert_eq!(doc[1]["label"], 1);
    }

    #[test]
    fn test_keyword_unknown_key_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "keywords.json", &keyword_doc());
        let before = fs::read_to_string(&path).unwrap();

        assert_eq!(
            patch_keyword_label(&path, &KeywordKey::ById(99), 0),
            PatchOutcome::NotFound
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_keyword_object_document_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(&tmp, "keywords.json", &two_chunk_doc());

        assert!(matches!(
            patch_keyword_label(&path, &KeywordKey::ById(1), 0),
            PatchOutcome::InvalidDocument(_)
        ));
    }

    #[test]
    fn test_keyword_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.json");

        assert_eq!(
            patch_keyword_label(&path, &KeywordKey::ById(1), 0),
            PatchOutcome::FileNotFound
        );
    }
}
