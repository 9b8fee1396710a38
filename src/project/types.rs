/// Project and bug report type definitions
///
/// A project is stored as one document; its bug reports are embedded in it as an
/// ordered JSON array, so they have no existence outside the owning project.

use crate::project::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// A tracked software project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Store-assigned identifier, immutable after creation
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    /// Embedded bug reports in display (insertion) order
    pub bug_reports: Vec<BugReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A defect record embedded in exactly one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugReport {
    /// Assigned on append, unique within the owning project
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub priority: Option<Level>,
    pub severity: Option<Level>,
}

/// Writable project fields for create and update
///
/// Update overwrites all three; a missing field is stored as null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Payload for appending a bug report; the id is assigned by the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBugReport {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub priority: Option<Level>,
    #[serde(default)]
    pub severity: Option<Level>,
}

impl NewBugReport {
    /// Attach a freshly generated id
    pub fn into_report(self) -> BugReport {
        BugReport {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            author: self.author,
            priority: self.priority,
            severity: self.severity,
        }
    }
}

/// Priority and severity scale
///
/// Closed set: anything other than low/medium/high is rejected on
/// deserialization rather than persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Which project field a search term is matched against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// Matches against the project name
    #[default]
    Title,
    Author,
}

impl SearchField {
    /// Column holding the searched value
    pub(crate) fn column(&self) -> &'static str {
        match self {
            Self::Title => "name",
            Self::Author => "author",
        }
    }

    /// The searched value on a loaded project
    pub(crate) fn value_of<'a>(&self, project: &'a Project) -> Option<&'a str> {
        match self {
            Self::Title => project.name.as_deref(),
            Self::Author => project.author.as_deref(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
        }
    }
}

impl FromStr for SearchField {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            other => Err(StoreError::Validation(format!(
                "searchType must be 'title' or 'author' (got '{}')",
                other
            ))),
        }
    }
}

/// Parse an identifier supplied by a caller into the store's id format
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::InvalidId(raw.to_string()))
}
