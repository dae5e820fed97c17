//! Core library surface for the skill tracker application.
//!
//! The modules layer bottom-up: domain models, the SQLite store, the wire
//! contract shim over it, the async repository, the observable controllers,
//! and finally the terminal UI. The binary target wires them together with
//! plain constructor injection.

pub mod controllers;
pub mod db;
pub mod models;
pub mod prefs;
pub mod provider;
pub mod repository;
pub mod seed;
pub mod sort;
pub mod ui;

/// Persistence entry points used by `main.rs` to bring the store up.
pub use db::{data_dir, default_db_path, Store, StoreError};

/// The primary domain types other layers manipulate.
pub use models::{Progress, ProgressDraft, Skill, SkillDraft, Status};

/// The async seam between screens and storage.
pub use repository::SkillRepository;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
