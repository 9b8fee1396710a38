/// SQLite persistence layer for project documents
///
/// One `projects` table acts as the document collection. Bug reports live in the
/// `bug_reports` JSON column of their owning row, so deleting a project drops its
/// bug reports with it. Appends and removals are single `UPDATE` statements using
/// SQLite's JSON functions, never read-modify-write from Rust.
///
/// No transactions and no version checks: concurrent writers to the same project
/// are last-writer-wins at the row level.

use crate::config::DatabaseConfig;
use crate::project::error::{StoreError, StoreResult};
use crate::project::types::{parse_id, BugReport, NewBugReport, Project, ProjectFields, SearchField};
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    author,
    bug_reports,
    created_at,
    updated_at
FROM projects";

/// Default bound for stores built without a config (tests, tooling)
const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the project document store
///
/// Cheap to clone (wraps a connection pool). Build it once at startup with
/// [`ProjectStore::connect`], share it through application state, and call
/// [`ProjectStore::close`] on shutdown.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    pool: SqlitePool,
    /// Upper bound for every public operation
    op_timeout: Duration,
}

impl ProjectStore {
    /// Open (creating if missing) the database file described by `config`
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(sqlx::Error::Io)?;
        let db_path = config.db_path();

        tracing::info!("🗄️ Opening project store: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(config.op_timeout())
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            op_timeout: config.op_timeout(),
        };
        store.init_schema().await?;

        tracing::info!("✅ Project store ready: {}", db_path.display());
        Ok(store)
    }

    /// Private in-memory store, one pinned connection so the data outlives requests
    pub async fn connect_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            op_timeout: DEFAULT_OP_TIMEOUT,
        };
        store.init_schema().await?;
        Ok(store)
    }

    /// Override the per-operation timeout
    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Close every pooled connection; later operations fail with `Unavailable`
    pub async fn close(&self) {
        tracing::info!("Closing project store");
        self.pool.close().await;
    }

    /// Create the projects table
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    async fn init_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT,
                description TEXT,
                author TEXT,
                bug_reports JSON NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All projects in insertion order
    pub async fn list_all(&self) -> StoreResult<Vec<Project>> {
        self.bounded("list_all", self.select_all()).await
    }

    /// Projects whose name (`Title`) or author (`Author`) contains `term`,
    /// ignoring case (Unicode lowercase fold). Wildcard characters match literally. An empty or absent term returns everything.
    pub async fn search(&self, term: Option<&str>, field: SearchField) -> StoreResult<Vec<Project>> {
        match term.filter(|term| !term.is_empty()) {
            Some(term) => self.bounded("search", self.select_matching(term, field)).await,
            None => self.list_all().await,
        }
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Project> {
        let id = parse_id(id)?;
        self.bounded("get_by_id", self.select_one(id)).await
    }

    /// Persist a new project with a fresh id and no bug reports
    pub async fn create(&self, fields: ProjectFields) -> StoreResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: fields.name,
            description: fields.description,
            author: fields.author,
            bug_reports: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.bounded("create", self.insert_project(&project)).await?;

        tracing::info!("Created project {} ({:?})", project.id, project.name);
        Ok(project)
    }

    /// Overwrite name, description and author; bug reports are left as they are
    pub async fn update_fields(&self, id: &str, fields: ProjectFields) -> StoreResult<()> {
        let id = parse_id(id)?;
        let changed = self.bounded("update_fields", self.update_row(id, &fields)).await?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        tracing::info!("Updated project {}", id);
        Ok(())
    }

    /// Remove a project together with its embedded bug reports
    pub async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let id = parse_id(id)?;
        let changed = self.bounded("delete_by_id", self.delete_row(id)).await?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        tracing::info!("Deleted project {}", id);
        Ok(())
    }

    /// Append a bug report to the end of the project's sequence
    ///
    /// Returns the stored report including its newly assigned id.
    pub async fn append_bug(&self, project_id: &str, bug: NewBugReport) -> StoreResult<BugReport> {
        let project_id = parse_id(project_id)?;
        let report = bug.into_report();
        let changed = self
            .bounded("append_bug", self.push_bug(project_id, &report))
            .await?;
        if changed == 0 {
            return Err(StoreError::NotFound(project_id.to_string()));
        }

        tracing::info!("Appended bug {} to project {}", report.id, project_id);
        Ok(report)
    }

    /// Remove the bug report with `bug_id` from the project
    ///
    /// Succeeds without effect when either the project or the bug does not exist.
    pub async fn remove_bug(&self, project_id: &str, bug_id: &str) -> StoreResult<()> {
        let project_id = parse_id(project_id)?;
        let bug_id = parse_id(bug_id)?;
        let changed = self
            .bounded("remove_bug", self.pull_bug(project_id, bug_id))
            .await?;

        if changed == 0 {
            tracing::debug!("No bug {} on project {}, nothing removed", bug_id, project_id);
        } else {
            tracing::info!("Removed bug {} from project {}", bug_id, project_id);
        }
        Ok(())
    }

    /// Run a store future under the operation timeout
    ///
    /// Expiry drops the future but not the statement already handed to the SQLite
    /// worker: a timed-out write may still commit, so `Timeout` on a write means
    /// "outcome unknown", not "nothing changed".
    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("❌ Store operation '{}' timed out after {:?}", op, self.op_timeout);
                Err(StoreError::Timeout(self.op_timeout))
            }
        }
    }

    async fn select_all(&self) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query(&format!("{PROJECT_SELECT_SQL} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Listed {} projects", rows.len());
        rows.iter().map(project_from_row).collect()
    }

    async fn select_matching(&self, term: &str, field: SearchField) -> StoreResult<Vec<Project>> {
        // SQLite's own case folding is ASCII-only, so the match itself happens here.
        let sql = format!(
            "{PROJECT_SELECT_SQL} WHERE {} IS NOT NULL ORDER BY rowid",
            field.column()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let needle = term.to_lowercase();
        let mut matched = Vec::new();
        for row in &rows {
            let project = project_from_row(row)?;
            if field
                .value_of(&project)
                .is_some_and(|value| value.to_lowercase().contains(&needle))
            {
                matched.push(project);
            }
        }

        tracing::debug!(
            "Search '{}' on {} matched {} of {} projects",
            term,
            field.as_str(),
            matched.len(),
            rows.len()
        );
        Ok(matched)
    }

    async fn select_one(&self, id: Uuid) -> StoreResult<Project> {
        let row = sqlx::query(&format!("{PROJECT_SELECT_SQL} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => project_from_row(&row),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn insert_project(&self, project: &Project) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, author, bug_reports, created_at, updated_at)
            VALUES (?, ?, ?, ?, '[]', ?, ?)
            "#,
        )
        .bind(project.id.to_string())
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.author)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_row(&self, id: Uuid, fields: &ProjectFields) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET name = ?, description = ?, author = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.author)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_row(&self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn push_bug(&self, project_id: Uuid, report: &BugReport) -> StoreResult<u64> {
        let report_json = serde_json::to_string(report)?;
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET bug_reports = json_insert(bug_reports, '$[#]', json(?)),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(report_json)
        .bind(Utc::now())
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn pull_bug(&self, project_id: Uuid, bug_id: Uuid) -> StoreResult<u64> {
        // json_remove on the element's own path keeps the order of the others.
        // The EXISTS guard matters: a NULL path would null out the whole array.
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET bug_reports = json_remove(
                    bug_reports,
                    (SELECT entry.fullkey
                     FROM json_each(projects.bug_reports) AS entry
                     WHERE json_extract(entry.value, '$.id') = ?1
                     LIMIT 1)
                ),
                updated_at = ?2
            WHERE id = ?3
              AND EXISTS (
                  SELECT 1
                  FROM json_each(projects.bug_reports) AS entry
                  WHERE json_extract(entry.value, '$.id') = ?1
              )
            "#,
        )
        .bind(bug_id.to_string())
        .bind(Utc::now())
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn project_from_row(row: &SqliteRow) -> StoreResult<Project> {
    let raw_id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&raw_id)
        .map_err(|e| StoreError::Corrupt(format!("project id '{}': {}", raw_id, e)))?;
    let bug_reports: String = row.try_get("bug_reports")?;

    Ok(Project {
        id,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        author: row.try_get("author")?,
        bug_reports: serde_json::from_str(&bug_reports)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
