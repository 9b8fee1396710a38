/// bugdeck: project and bug report tracker
///
/// This library provides the project store (projects with embedded bug reports
/// over SQLite), its JSON HTTP API, and server wiring.

// Core configuration and setup
pub mod config;

// Project persistence layer - types, errors and the project store
pub mod project;

// HTTP API layer - REST endpoints for projects and bug reports
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use project::{
    BugReport, Level, NewBugReport, Project, ProjectFields, ProjectStore, SearchField, StoreError,
};
pub use server::{create_app, start_server};
