//! Config/storage/database health overview for `lawan status`.

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::models::ArtifactKind;
use crate::registry;

/// Run the status command: probe the storage root, the registry database,
/// and every recorded artifact, then print a report. Problems are reported,
/// not fatal — the command succeeds either way.
pub async fn run_status(config: &Config) -> Result<()> {
    println!("LawanJudol — Status");
    println!("===================");
    println!();

    let mut problems = 0usize;

    let storage_ok = config.storage.root.is_dir();
    if !storage_ok {
        problems += 1;
    }
    println!(
        "  storage root: {}  [{}]",
        config.storage.root.display(),
        if storage_ok { "OK" } else { "MISSING" }
    );

    let analyses = match registry::list_analyses(config).await {
        Ok(analyses) => {
            println!(
                "  database:     {}  [OK, {} analyses]",
                config.db.path.display(),
                analyses.len()
            );
            analyses
        }
        Err(e) => {
            problems += 1;
            println!(
                "  database:     {}  [FAILED: {}]",
                config.db.path.display(),
                e
            );
            Vec::new()
        }
    };

    if !analyses.is_empty() {
        println!();
        println!("  {:<38} {:<12} {}", "ANALYSIS", "ARTIFACT", "STATE");
        for analysis in &analyses {
            for kind in [
                ArtifactKind::Gambling,
                ArtifactKind::Nongambling,
                ArtifactKind::Keywords,
            ] {
                let Ok(path) = analysis.artifact_path(config, kind) else {
                    continue;
                };
                let state = probe_artifact(&path);
                if state != "OK" {
                    problems += 1;
                }
                println!("  {:<38} {:<12} {}", analysis.id, kind.as_str(), state);
            }
        }
    }

    println!();
    if problems == 0 {
        println!("ok");
    } else {
        println!("problems found: {}", problems);
    }

    Ok(())
}

fn probe_artifact(path: &Path) -> &'static str {
    if !path.is_file() {
        return "MISSING";
    }
    match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(_) => "OK",
            Err(_) => "INVALID",
        },
        Err(_) => "UNREADABLE",
    }
}
