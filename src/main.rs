//! # LawanJudol CLI (`lawan`)
//!
//! The `lawan` binary is the operator interface for LawanJudol. It manages
//! the registry of analysis runs, applies moderation and labeling patches
//! to the on-disk JSON artifacts, and serves the moderation HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! lawan --config ./config/lawan.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lawan init` | Create the registry database |
//! | `lawan register <video_id>` | Register an analysis run and its artifacts |
//! | `lawan analyses` | List registered analyses |
//! | `lawan show <id>` | Summarize one artifact of an analysis |
//! | `lawan moderate <id> <comment_id> <status>` | Patch a comment's moderation status |
//! | `lawan label <id> <key> <label>` | Patch a keyword entry's label |
//! | `lawan set-status <id> <status>` | Record a pipeline status transition |
//! | `lawan status` | Config/storage/database health overview |
//! | `lawan serve` | Start the moderation HTTP API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use lawan_judol::config;
use lawan_judol::doctor;
use lawan_judol::inspect;
use lawan_judol::models::{ArtifactKind, KeywordKey, ModerationStatus, PipelineStatus};
use lawan_judol::patch::{self, PatchOutcome};
use lawan_judol::registry::{self, NewAnalysis};
use lawan_judol::server;

/// LawanJudol CLI — local-first moderation of online-gambling spam
/// comments on YouTube videos.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with `[db]`, `[storage]`, and `[server]` sections.
#[derive(Parser)]
#[command(
    name = "lawan",
    about = "LawanJudol — local-first moderation of online-gambling spam comments",
    version,
    long_about = "LawanJudol keeps a SQLite registry of comment-analysis runs and patches the \
    JSON artifacts an inference pipeline leaves on disk: one comment status or one keyword \
    label at a time, from the CLI or a JSON HTTP API."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/lawan.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the registry database.
    ///
    /// Creates the SQLite database file and the analyses table. This
    /// command is idempotent — running it multiple times is safe.
    Init,

    /// Register an analysis run and its artifact paths.
    ///
    /// Artifact paths are stored relative to `storage.root` from the
    /// configuration file.
    Register {
        /// YouTube video id the analysis belongs to.
        video_id: String,

        /// Human-readable video title.
        #[arg(long)]
        title: Option<String>,

        /// Pipeline status of the run.
        #[arg(long, value_enum, default_value_t = PipelineStatus::Completed)]
        status: PipelineStatus,

        /// Relative path of the gambling-comment document.
        #[arg(long)]
        gambling: Option<String>,

        /// Relative path of the non-gambling comment document.
        #[arg(long)]
        nongambling: Option<String>,

        /// Relative path of the keyword dictionary.
        #[arg(long)]
        keywords: Option<String>,
    },

    /// List registered analyses.
    Analyses,

    /// Summarize one artifact of an analysis.
    ///
    /// Prints per-chunk comment counts and moderation-status totals, or
    /// the keyword dictionary with active/inactive labels.
    Show {
        /// Analysis id.
        analysis_id: String,

        /// Which artifact to summarize.
        #[arg(long, value_enum, default_value_t = ArtifactKind::Gambling)]
        file: ArtifactKind,
    },

    /// Set the moderation status of one comment in the local mirror.
    ///
    /// A comment that cannot be patched (missing artifact file, malformed
    /// document, unknown comment id) is reported as a warning and the
    /// command still exits successfully, so a surrounding moderation flow
    /// can proceed. An unknown analysis id is an error.
    Moderate {
        /// Analysis id.
        analysis_id: String,

        /// YouTube comment id to patch.
        comment_id: String,

        /// New moderation status.
        #[arg(value_enum)]
        status: ModerationStatus,

        /// Which comment document to patch.
        #[arg(long, value_enum, default_value_t = ArtifactKind::Gambling)]
        file: ArtifactKind,
    },

    /// Set the label of one keyword dictionary entry.
    ///
    /// The key is the numeric entry id or the keyword itself. Follows the
    /// same warn-and-continue policy as `moderate`.
    Label {
        /// Analysis id.
        analysis_id: String,

        /// Numeric entry id, or the keyword itself.
        key: String,

        /// New label: 1 (active) or 0 (inactive).
        #[arg(value_parser = clap::value_parser!(i64).range(0..=1))]
        label: i64,
    },

    /// Record a pipeline status transition for an analysis.
    SetStatus {
        /// Analysis id.
        analysis_id: String,

        /// New pipeline status.
        #[arg(value_enum)]
        status: PipelineStatus,
    },

    /// Config/storage/database health overview.
    Status,

    /// Start the moderation HTTP API.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            registry::run_migrations(&cfg).await?;
            println!("Registry initialized successfully.");
        }
        Commands::Register {
            video_id,
            title,
            status,
            gambling,
            nongambling,
            keywords,
        } => {
            registry::run_register(
                &cfg,
                NewAnalysis {
                    video_id,
                    video_title: title,
                    status: status.as_str().to_string(),
                    gambling_file_path: gambling,
                    nongambling_file_path: nongambling,
                    keyword_file_path: keywords,
                },
            )
            .await?;
        }
        Commands::Analyses => {
            registry::run_list(&cfg).await?;
        }
        Commands::Show { analysis_id, file } => {
            inspect::run_show(&cfg, &analysis_id, file).await?;
        }
        Commands::Moderate {
            analysis_id,
            comment_id,
            status,
            file,
        } => {
            let analysis = registry::get_analysis(&cfg, &analysis_id).await?;
            let path = analysis.artifact_path(&cfg, file)?;
            let outcome = patch::patch_comment_status(&path, &comment_id, status.as_str());
            report_outcome(&outcome, &format!("comment {}", comment_id));
        }
        Commands::Label {
            analysis_id,
            key,
            label,
        } => {
            let analysis = registry::get_analysis(&cfg, &analysis_id).await?;
            let path = analysis.artifact_path(&cfg, ArtifactKind::Keywords)?;
            let key = KeywordKey::parse(&key);
            let outcome = patch::patch_keyword_label(&path, &key, label);
            report_outcome(&outcome, &key.to_string());
        }
        Commands::SetStatus {
            analysis_id,
            status,
        } => {
            registry::set_analysis_status(&cfg, &analysis_id, status.as_str()).await?;
            println!("analysis {} is now {}", analysis_id, status);
        }
        Commands::Status => {
            doctor::run_status(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

/// Print a patch outcome. A skipped mirror update is a warning, not a
/// failure — the moderation action itself has already happened elsewhere.
fn report_outcome(outcome: &PatchOutcome, subject: &str) {
    if outcome.is_updated() {
        println!("{} updated", subject);
    } else {
        warn!(subject = subject, reason = %outcome.describe(), "mirror not updated");
        println!("{} not updated ({})", subject, outcome.describe());
    }
}
