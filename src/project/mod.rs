/// Project management module
///
/// Owns the persisted projects and their embedded bug reports. `ProjectStore` is the
/// only access path to that data; everything above it (HTTP handlers, server wiring)
/// goes through its operations.

pub mod error;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use store::ProjectStore;
pub use types::{BugReport, Level, NewBugReport, Project, ProjectFields, SearchField};
