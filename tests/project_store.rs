use bugdeck::config::DatabaseConfig;
use bugdeck::{Level, NewBugReport, ProjectFields, ProjectStore, SearchField, StoreError};
use std::collections::HashSet;
use uuid::Uuid;

fn fields(name: &str, description: &str, author: &str) -> ProjectFields {
    ProjectFields {
        name: Some(name.to_string()),
        description: Some(description.to_string()),
        author: Some(author.to_string()),
    }
}

fn bug(title: &str) -> NewBugReport {
    NewBugReport {
        title: Some(title.to_string()),
        description: Some(format!("{title} details")),
        author: Some("qa".to_string()),
        priority: Some(Level::High),
        severity: Some(Level::Low),
    }
}

#[tokio::test]
async fn create_and_get_roundtrip() {
    let store = ProjectStore::connect_in_memory().await.unwrap();

    let created = store
        .create(fields("Atlas", "map renderer", "alice smith"))
        .await
        .unwrap();
    let loaded = store.get_by_id(&created.id.to_string()).await.unwrap();

    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.name.as_deref(), Some("Atlas"));
    assert_eq!(loaded.description.as_deref(), Some("map renderer"));
    assert_eq!(loaded.author.as_deref(), Some("alice smith"));
    assert!(loaded.bug_reports.is_empty());
}

#[tokio::test]
async fn create_keeps_absent_fields_empty() {
    let store = ProjectStore::connect_in_memory().await.unwrap();

    let created = store.create(ProjectFields::default()).await.unwrap();
    let loaded = store.get_by_id(&created.id.to_string()).await.unwrap();

    assert_eq!(loaded.name, None);
    assert_eq!(loaded.description, None);
    assert_eq!(loaded.author, None);
}

#[tokio::test]
async fn get_unknown_id_returns_not_found() {
    let store = ProjectStore::connect_in_memory().await.unwrap();

    let err = store.get_by_id(&Uuid::new_v4().to_string()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn malformed_ids_return_invalid_id() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    let project = store.create(fields("a", "b", "c")).await.unwrap();

    assert!(matches!(
        store.get_by_id("64b7f0c2e4b0a1").await,
        Err(StoreError::InvalidId(_))
    ));
    assert!(matches!(
        store.update_fields("nope", ProjectFields::default()).await,
        Err(StoreError::InvalidId(_))
    ));
    assert!(matches!(
        store.delete_by_id("").await,
        Err(StoreError::InvalidId(_))
    ));
    assert!(matches!(
        store.append_bug("123", bug("x")).await,
        Err(StoreError::InvalidId(_))
    ));
    assert!(matches!(
        store.remove_bug(&project.id.to_string(), "not-a-bug-id").await,
        Err(StoreError::InvalidId(_))
    ));
}

#[tokio::test]
async fn delete_then_get_returns_not_found() {
    let store = ProjectStore::connect_in_memory().await.unwrap();

    let mut ids = Vec::new();
    for name in ["one", "two", "three"] {
        ids.push(store.create(fields(name, "", "bob")).await.unwrap().id.to_string());
    }
    store.append_bug(&ids[1], bug("leak")).await.unwrap();

    for id in &ids {
        store.delete_by_id(id).await.unwrap();
        assert!(matches!(store.get_by_id(id).await, Err(StoreError::NotFound(_))));
    }
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_unknown_id_returns_not_found() {
    let store = ProjectStore::connect_in_memory().await.unwrap();

    let err = store.delete_by_id(&Uuid::new_v4().to_string()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn list_all_returns_every_project_in_insertion_order() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    assert!(store.list_all().await.unwrap().is_empty());

    for name in ["first", "second", "third"] {
        store.create(fields(name, "", "")).await.unwrap();
    }

    let names: Vec<_> = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|project| project.name.unwrap())
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn update_overwrites_fields_and_keeps_bug_reports() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    let project = store.create(fields("Old", "old desc", "carol")).await.unwrap();
    let id = project.id.to_string();
    store.append_bug(&id, bug("first")).await.unwrap();
    store.append_bug(&id, bug("second")).await.unwrap();
    let before = store.get_by_id(&id).await.unwrap();

    store
        .update_fields(
            &id,
            ProjectFields {
                name: Some("X".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = store.get_by_id(&id).await.unwrap();
    assert_eq!(after.name.as_deref(), Some("X"));
    // Fields missing from the update are overwritten too
    assert_eq!(after.description, None);
    assert_eq!(after.author, None);
    assert_eq!(after.bug_reports, before.bug_reports);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn update_unknown_id_returns_not_found() {
    let store = ProjectStore::connect_in_memory().await.unwrap();

    let err = store
        .update_fields(&Uuid::new_v4().to_string(), fields("a", "b", "c"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn append_bug_adds_to_the_end_with_a_fresh_id() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    let id = store.create(fields("p", "", "")).await.unwrap().id.to_string();

    let mut seen = HashSet::new();
    for title in ["a", "b", "c"] {
        let report = store.append_bug(&id, bug(title)).await.unwrap();
        assert!(seen.insert(report.id));

        let project = store.get_by_id(&id).await.unwrap();
        let last = project.bug_reports.last().unwrap();
        assert_eq!(last, &report);
        assert_eq!(last.title.as_deref(), Some(title));
        assert_eq!(last.description.as_deref(), Some(format!("{title} details").as_str()));
        assert_eq!(last.author.as_deref(), Some("qa"));
        assert_eq!(last.priority, Some(Level::High));
        assert_eq!(last.severity, Some(Level::Low));
    }

    let titles: Vec<_> = store
        .get_by_id(&id)
        .await
        .unwrap()
        .bug_reports
        .into_iter()
        .map(|report| report.title.unwrap())
        .collect();
    assert_eq!(titles, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn append_bug_to_unknown_project_returns_not_found() {
    let store = ProjectStore::connect_in_memory().await.unwrap();

    let err = store
        .append_bug(&Uuid::new_v4().to_string(), bug("orphan"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn remove_bug_removes_exactly_one_entry() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    let id = store.create(fields("p", "", "")).await.unwrap().id.to_string();
    let first = store.append_bug(&id, bug("first")).await.unwrap();
    let middle = store.append_bug(&id, bug("middle")).await.unwrap();
    let last = store.append_bug(&id, bug("last")).await.unwrap();

    store.remove_bug(&id, &middle.id.to_string()).await.unwrap();

    let remaining = store.get_by_id(&id).await.unwrap().bug_reports;
    assert_eq!(remaining, vec![first, last]);
}

#[tokio::test]
async fn remove_bug_is_a_noop_for_missing_bug_or_project() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    let id = store.create(fields("p", "", "")).await.unwrap().id.to_string();
    let kept = store.append_bug(&id, bug("kept")).await.unwrap();

    store.remove_bug(&id, &Uuid::new_v4().to_string()).await.unwrap();
    store
        .remove_bug(&Uuid::new_v4().to_string(), &kept.id.to_string())
        .await
        .unwrap();

    let project = store.get_by_id(&id).await.unwrap();
    assert_eq!(project.bug_reports, vec![kept]);
}

#[tokio::test]
async fn remove_last_bug_leaves_an_empty_sequence() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    let id = store.create(fields("p", "", "")).await.unwrap().id.to_string();
    let only = store.append_bug(&id, bug("only")).await.unwrap();

    store.remove_bug(&id, &only.id.to_string()).await.unwrap();
    // Removing it again must not clobber the (now empty) array
    store.remove_bug(&id, &only.id.to_string()).await.unwrap();

    let project = store.get_by_id(&id).await.unwrap();
    assert!(project.bug_reports.is_empty());
}

#[tokio::test]
async fn search_is_case_insensitive_substring() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    store.create(fields("Weather Station", "", "alice smith")).await.unwrap();
    store.create(fields("Billing", "", "Bob Alison")).await.unwrap();
    store.create(fields("Heatmap", "", "carol")).await.unwrap();

    let by_author = store.search(Some("ALICE"), SearchField::Author).await.unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].author.as_deref(), Some("alice smith"));

    let by_title: Vec<_> = store
        .search(Some("eAt"), SearchField::Title)
        .await
        .unwrap()
        .into_iter()
        .map(|project| project.name.unwrap())
        .collect();
    assert_eq!(by_title, vec!["Weather Station", "Heatmap"]);

    // Title search never looks at the author column
    assert!(store.search(Some("carol"), SearchField::Title).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    store.create(fields("Überwachung", "", "émile zola")).await.unwrap();
    store.create(fields("Ostrich", "", "Ødegaard")).await.unwrap();

    let by_author = store.search(Some("ÉMILE"), SearchField::Author).await.unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].name.as_deref(), Some("Überwachung"));

    let by_title = store.search(Some("überWACHUNG"), SearchField::Title).await.unwrap();
    assert_eq!(by_title.len(), 1);

    let by_author = store.search(Some("øDE"), SearchField::Author).await.unwrap();
    assert_eq!(by_author[0].name.as_deref(), Some("Ostrich"));
}

#[tokio::test]
async fn remove_first_bug_keeps_the_rest_in_order() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    let id = store.create(fields("p", "", "")).await.unwrap().id.to_string();
    let first = store.append_bug(&id, bug("first")).await.unwrap();
    let second = store.append_bug(&id, bug("second")).await.unwrap();
    let third = store.append_bug(&id, bug("third")).await.unwrap();

    store.remove_bug(&id, &first.id.to_string()).await.unwrap();
    assert_eq!(store.get_by_id(&id).await.unwrap().bug_reports, vec![second.clone(), third.clone()]);

    store.remove_bug(&id, &third.id.to_string()).await.unwrap();
    assert_eq!(store.get_by_id(&id).await.unwrap().bug_reports, vec![second]);
}

#[tokio::test]
async fn search_with_empty_term_returns_everything() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    store.create(fields("a", "", "x")).await.unwrap();
    store.create(ProjectFields::default()).await.unwrap();

    assert_eq!(store.search(None, SearchField::Title).await.unwrap().len(), 2);
    assert_eq!(store.search(Some(""), SearchField::Author).await.unwrap().len(), 2);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let store = ProjectStore::connect_in_memory().await.unwrap();
    store.create(fields("100% coverage", "", "")).await.unwrap();
    store.create(fields("1000 users", "", "")).await.unwrap();
    store.create(fields("snake_case", "", "")).await.unwrap();
    store.create(fields("snakescase", "", "")).await.unwrap();

    let percent = store.search(Some("0%"), SearchField::Title).await.unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].name.as_deref(), Some("100% coverage"));

    let underscore = store.search(Some("e_c"), SearchField::Title).await.unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].name.as_deref(), Some("snake_case"));

    assert!(store.search(Some(r"\"), SearchField::Title).await.unwrap().is_empty());
}

#[tokio::test]
async fn file_store_persists_across_reconnects() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        data_dir: dir.path().join("nested").to_string_lossy().into_owned(),
        db_file: "projects.db".to_string(),
        max_connections: 2,
        op_timeout_ms: 2000,
    };

    let store = ProjectStore::connect(&config).await.unwrap();
    let project = store.create(fields("durable", "", "dan")).await.unwrap();
    let report = store
        .append_bug(&project.id.to_string(), bug("persisted"))
        .await
        .unwrap();
    store.close().await;

    assert!(matches!(
        store.list_all().await,
        Err(StoreError::Unavailable(_))
    ));

    let reopened = ProjectStore::connect(&config).await.unwrap();
    let loaded = reopened.get_by_id(&project.id.to_string()).await.unwrap();
    assert_eq!(loaded.name.as_deref(), Some("durable"));
    assert_eq!(loaded.bug_reports, vec![report]);
    reopened.close().await;
}
