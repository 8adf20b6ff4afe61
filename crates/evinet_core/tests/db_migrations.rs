use evinet_core::db::migrations::{apply_migrations, latest_version};
use evinet_core::db::{inspect_schema, open_db, open_db_in_memory, DbError, SchemaStatus};
use evinet_core::{RepoError, SqliteGraphRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "nodes");
    assert_table_exists(&conn, "edges");
    assert_table_exists(&conn, "networks");
}

#[test]
fn foreign_keys_are_enforced_on_opened_connections() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let orphan = conn.execute(
        "INSERT INTO edges (id, source, target, weight) VALUES ('e', 'missing-a', 'missing-b', 1.0);",
        [],
    );
    assert!(orphan.is_err());
}

#[test]
fn reopening_a_database_file_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("evinet.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO nodes (id, description, prior_probability) VALUES ('n1', 'Rain', 0.5);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM nodes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteGraphRepository::try_new(conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection must be rejected"),
    }
}

#[test]
fn opened_connection_reports_current_schema_with_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let status = inspect_schema(&conn).unwrap();
    assert_eq!(
        status,
        SchemaStatus {
            version: latest_version(),
            foreign_keys: true,
        }
    );
    assert!(status.is_current());
}

#[test]
fn repository_rejects_connection_without_foreign_keys() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    assert!(!inspect_schema(&conn).unwrap().foreign_keys);

    match SqliteGraphRepository::try_new(conn) {
        Err(RepoError::ForeignKeysDisabled) => {}
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("connection without foreign keys must be rejected"),
    }
}

#[test]
fn opening_file_with_dangling_edges_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dangling.db");

    let mut conn = Connection::open(&path).unwrap();
    apply_migrations(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO nodes (id, description, prior_probability) VALUES ('n1', 'Rain', 0.5);",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO edges (id, source, target, weight) VALUES ('e1', 'n1', 'gone', 1.0);",
        [],
    )
    .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::DanglingEdges { count } => assert_eq!(count, 1),
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
