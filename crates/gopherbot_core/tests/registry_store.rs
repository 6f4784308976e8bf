use gopherbot_core::db::open_db_in_memory;
use gopherbot_core::{
    EntityKind, RegistryError, RegistryRepository, RegistryService, RepoError,
    SqliteRegistryRepository, ValidationError,
};

fn registry() -> RegistryService<SqliteRegistryRepository> {
    let conn = open_db_in_memory().unwrap();
    RegistryService::new(SqliteRegistryRepository::try_new(conn).unwrap())
}

fn resource_rows(registry: &RegistryService<SqliteRegistryRepository>) -> i64 {
    registry
        .repo()
        .connection()
        .query_row("SELECT COUNT(*) FROM resource;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_resource_twice_leaves_one_row() {
    let mut registry = registry();
    registry.create_resource("status", "http://x").unwrap();
    registry.create_resource("status", "http://x").unwrap();

    assert_eq!(resource_rows(&registry), 1);
    let resource = registry.get_resource("status").unwrap();
    assert_eq!(resource.url, "http://x");
}

#[test]
fn same_name_with_different_url_coexists() {
    let mut registry = registry();
    registry.create_resource("status", "http://x").unwrap();
    registry.create_resource("status", "http://y").unwrap();

    assert_eq!(resource_rows(&registry), 2);
    assert_eq!(registry.get_resource("status").unwrap().url, "http://x");
}

#[test]
fn repository_reports_whether_rows_were_written() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRegistryRepository::try_new(conn).unwrap();

    assert!(repo.create_resource("status", "http://x").unwrap());
    assert!(!repo.create_resource("status", "http://x").unwrap());
    assert!(repo.create_team("ops").unwrap());
    assert!(!repo.create_team("ops").unwrap());
    assert!(repo.register_resource("status", "ops").unwrap());
    assert!(!repo.register_resource("status", "ops").unwrap());
    assert!(repo.deregister_resource("status", "ops").unwrap());
    assert!(!repo.deregister_resource("status", "ops").unwrap());
    assert_eq!(repo.delete_resource("status").unwrap(), 1);
    assert_eq!(repo.delete_resource("status").unwrap(), 0);
}

#[test]
fn create_team_is_idempotent() {
    let mut registry = registry();
    registry.create_team("sponsorship").unwrap();
    registry.create_team("sponsorship").unwrap();

    let teams = registry.list_teams().unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].name, "sponsorship");
    assert_eq!(registry.get_team("sponsorship").unwrap().id, teams[0].id);
}

#[test]
fn register_resource_is_idempotent() {
    let mut registry = registry();
    registry.create_resource("status", "http://x").unwrap();
    registry.create_team("ops").unwrap();

    registry.register_resource("status", "ops").unwrap();
    registry.register_resource("status", "ops").unwrap();

    assert_eq!(registry.list_links().unwrap().len(), 1);
}

#[test]
fn delete_resource_cascades_to_links() {
    let mut registry = registry();
    registry.create_resource("status", "http://x").unwrap();
    registry.create_resource("wiki", "http://w").unwrap();
    registry.create_team("ops").unwrap();
    registry.register_resource("status", "ops").unwrap();
    registry.register_resource("wiki", "ops").unwrap();

    registry.delete_resource("status").unwrap();

    assert!(matches!(
        registry.get_resource("status").unwrap_err(),
        RegistryError::NotFound {
            kind: EntityKind::Resource,
            ..
        }
    ));
    let links = registry.list_links().unwrap();
    assert_eq!(links.len(), 1);
    let remaining = registry.query_resources_by_team("ops").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "wiki");
    assert_eq!(links[0].resource_id, remaining[0].id);
}

#[test]
fn delete_resource_removes_every_row_with_that_name() {
    let mut registry = registry();
    registry.create_resource("status", "http://x").unwrap();
    registry.create_resource("status", "http://y").unwrap();

    registry.delete_resource("status").unwrap();
    assert_eq!(resource_rows(&registry), 0);

    registry.delete_resource("status").unwrap();
}

#[test]
fn register_then_deregister_restores_link_set() {
    let mut registry = registry();
    registry.create_resource("status", "http://x").unwrap();
    registry.create_team("ops").unwrap();

    registry.register_resource("status", "ops").unwrap();
    registry.deregister_resource("status", "ops").unwrap();

    assert!(registry.list_links().unwrap().is_empty());
    assert!(registry.query_resources_by_team("ops").unwrap().is_empty());
    registry.deregister_resource("status", "ops").unwrap();
}

#[test]
fn get_missing_resource_is_not_found() {
    let registry = registry();
    let err = registry.get_resource("missing").unwrap_err();
    assert!(!err.is_fatal());
    assert_eq!(err.to_string(), "resource not found: missing");
    assert!(matches!(
        registry.get_team("missing").unwrap_err(),
        RegistryError::NotFound {
            kind: EntityKind::Team,
            ..
        }
    ));
}

#[test]
fn register_reports_missing_resource_before_missing_team() {
    let mut registry = registry();
    let err = registry.register_resource("missing", "team").unwrap_err();
    match err {
        RegistryError::NotFound { kind, name } => {
            assert_eq!(kind, EntityKind::Resource);
            assert_eq!(name, "missing");
        }
        other => panic!("unexpected error: {other}"),
    }

    registry.create_resource("status", "http://x").unwrap();
    let err = registry.deregister_resource("status", "team").unwrap_err();
    assert!(matches!(
        err,
        RegistryError::NotFound {
            kind: EntityKind::Team,
            ..
        }
    ));
    assert!(registry.list_links().unwrap().is_empty());
}

#[test]
fn query_by_unknown_team_is_empty_not_an_error() {
    let mut registry = registry();
    registry.create_resource("status", "http://x").unwrap();
    registry.create_team("untagged").unwrap();

    assert!(registry.query_resources_by_team("nobody").unwrap().is_empty());
    assert!(registry.query_resources_by_team("untagged").unwrap().is_empty());
}

#[test]
fn query_by_team_returns_only_tagged_resources() {
    let mut registry = registry();
    registry.create_resource("status", "http://x").unwrap();
    registry.create_resource("wiki", "http://w").unwrap();
    registry.create_team("ops").unwrap();
    registry.create_team("docs").unwrap();
    registry.register_resource("status", "ops").unwrap();
    registry.register_resource("wiki", "docs").unwrap();
    registry.register_resource("status", "docs").unwrap();

    let ops: Vec<String> = registry
        .query_resources_by_team("ops")
        .unwrap()
        .into_iter()
        .map(|resource| resource.name)
        .collect();
    assert_eq!(ops, vec!["status".to_string()]);

    let mut docs: Vec<String> = registry
        .query_resources_by_team("docs")
        .unwrap()
        .into_iter()
        .map(|resource| resource.name)
        .collect();
    docs.sort();
    assert_eq!(docs, vec!["status".to_string(), "wiki".to_string()]);
}

#[test]
fn invalid_names_are_rejected_before_writing() {
    let mut registry = registry();
    let err = registry.create_resource("two words", "http://x").unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Validation(ValidationError::ContainsWhitespace { .. })
    ));
    assert!(matches!(
        registry.create_team("  ").unwrap_err(),
        RegistryError::Validation(ValidationError::Empty { .. })
    ));
    assert_eq!(resource_rows(&registry), 0);
    assert!(registry.list_teams().unwrap().is_empty());
}

#[test]
fn close_releases_the_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("close.db");

    let conn = gopherbot_core::db::open_db(&path).unwrap();
    let mut registry = RegistryService::new(SqliteRegistryRepository::try_new(conn).unwrap());
    registry.create_team("ops").unwrap();
    registry.into_repo().close().unwrap();

    let reopened = gopherbot_core::db::open_db(&path).unwrap();
    let registry = RegistryService::new(SqliteRegistryRepository::try_new(reopened).unwrap());
    assert_eq!(registry.get_team("ops").unwrap().name, "ops");
}

#[test]
fn repo_errors_distinguish_recoverable_outcomes() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRegistryRepository::try_new(conn).unwrap();
    let err = repo.register_resource("missing", "team").unwrap_err();
    assert!(matches!(err, RepoError::ResourceNotFound(ref name) if name == "missing"));
    assert!(err.is_recoverable());
}

#[test]
fn concurrent_writers_on_separate_connections_never_duplicate_keys() {
    const RESOURCE_KEYS: usize = 20;
    const TEAM_KEYS: usize = 5;
    const ROUNDS: usize = 200;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    let first = SqliteRegistryRepository::try_new(gopherbot_core::db::open_db(&path).unwrap())
        .unwrap();
    let second = SqliteRegistryRepository::try_new(gopherbot_core::db::open_db(&path).unwrap())
        .unwrap();

    fn hammer(mut repo: SqliteRegistryRepository, offset: usize) -> SqliteRegistryRepository {
        for round in 0..ROUNDS {
            let key = (round + offset) % RESOURCE_KEYS;
            let name = format!("res{key}");
            let url = format!("http://host/{key}");
            let team = format!("team{}", key % TEAM_KEYS);
            repo.create_resource(&name, &url).unwrap();
            repo.create_team(&team).unwrap();
            repo.register_resource(&name, &team).unwrap();
        }
        repo
    }

    let worker = std::thread::spawn(move || hammer(second, 0));
    let first = hammer(first, 7);
    let second = worker.join().expect("writer thread should not panic");
    drop(second);

    assert_eq!(first.list_resources().unwrap().len(), RESOURCE_KEYS);
    assert_eq!(first.list_teams().unwrap().len(), TEAM_KEYS);
    assert_eq!(first.list_links().unwrap().len(), RESOURCE_KEYS);

    let conn = first.connection();
    let duplicated_pairs: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM (
                SELECT 1 FROM resource_to_team
                GROUP BY resource_id, team_id
                HAVING COUNT(*) > 1
            );",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(duplicated_pairs, 0);
}
