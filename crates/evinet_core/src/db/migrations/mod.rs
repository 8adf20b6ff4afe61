//! Graph schema migrations.
//!
//! # Invariants
//! - Steps run in ascending `version` order inside one transaction.
//! - `PRAGMA user_version` equals the last applied step.
//! - After migrating, no stored edge may point at a missing node.

use crate::db::{inspect_schema, DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

/// One schema step.
struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        name: "graph",
        sql: include_str!("0001_graph.sql"),
    },
    Step {
        version: 2,
        name: "networks",
        sql: include_str!("0002_networks.sql"),
    },
];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to [`latest_version`] and checks edge integrity.
///
/// # Errors
/// - `UnsupportedSchemaVersion` for files written by a newer build.
/// - `DanglingEdges` when a file written without foreign keys holds edges
///   whose endpoints are gone.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = inspect_schema(conn)?.version;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    if from < latest {
        let tx = conn.transaction()?;
        for step in STEPS.iter().filter(|step| step.version > from) {
            tx.execute_batch(step.sql)?;
            tx.pragma_update(None, "user_version", step.version)?;
            info!(
                "event=db_migrate module=db status=ok version={} step={}",
                step.version, step.name
            );
        }
        tx.commit()?;
    }

    check_edge_endpoints(conn)
}

fn check_edge_endpoints(conn: &Connection) -> DbResult<()> {
    let count: u64 = conn.query_row(
        "SELECT COUNT(*) FROM edges
         WHERE source NOT IN (SELECT id FROM nodes)
            OR target NOT IN (SELECT id FROM nodes);",
        [],
        |row| row.get(0),
    )?;
    if count > 0 {
        warn!("event=db_migrate module=db status=error error_code=dangling_edges count={count}");
        return Err(DbError::DanglingEdges { count });
    }
    Ok(())
}
