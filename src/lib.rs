//! # LawanJudol
//!
//! A local-first toolkit for moderating online-gambling ("judi online")
//! spam comments on YouTube videos.
//!
//! An external inference pipeline classifies the comments of a video and
//! leaves JSON artifacts on disk: chunked comment documents (gambling and
//! non-gambling) and a keyword dictionary. LawanJudol keeps a registry of
//! those analysis runs in SQLite and lets moderators mutate the artifacts —
//! one comment status or one keyword label at a time — from a CLI or a JSON
//! HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────────┐   ┌─────────────┐
//! │  Inference  │──▶│ JSON artifacts │◀──│    patch     │
//! │  pipeline   │   │ (storage root) │   │ (one record) │
//! └─────────────┘   └───────┬───────┘   └──────▲──────┘
//!                           │                  │
//!                   ┌───────▼───────┐   ┌──────┴──────┐
//!                   │    SQLite     │──▶│  CLI / HTTP  │
//!                   │   registry    │   │   (lawan)    │
//!                   └───────────────┘   └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! lawan init                                   # create the registry
//! lawan register dQw4w9WgXcQ --gambling gambling.json
//! lawan moderate <analysis-id> <comment-id> reject
//! lawan show <analysis-id>
//! lawan serve                                  # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Shared vocabulary types |
//! | [`patch`] | Single-record artifact patching |
//! | [`registry`] | SQLite registry of analysis runs |
//! | [`inspect`] | Artifact summaries |
//! | [`doctor`] | Config/storage/database health overview |
//! | [`server`] | Moderation HTTP API |

pub mod config;
pub mod doctor;
pub mod inspect;
pub mod models;
pub mod patch;
pub mod registry;
pub mod server;
