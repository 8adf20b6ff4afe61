//! SQLite-backed graph repository.
//!
//! # Responsibility
//! - Persist nodes, edges and networks beyond process lifetime.
//! - Keep SQL details inside the repository boundary.
//!
//! # Invariants
//! - Node delete and edge cascade commit in one transaction.
//! - Endpoint checks and edge writes share one transaction.
//! - Listing order is insertion order (`seq ASC`).
//! - Network payloads are stored as JSON documents and never re-validated.

use crate::db::migrations::latest_version;
use crate::db::inspect_schema;
use crate::model::{
    Edge, EdgeId, EdgePatch, Network, NetworkId, NetworkSummary, Node, NodeId, NodePatch,
    RecordRef,
};
use crate::repo::graph_repo::{GraphRepository, NodeRemoval, RepoError, RepoResult};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use uuid::Uuid;

const NODE_SELECT_SQL: &str = "SELECT id, description, prior_probability FROM nodes";
const EDGE_SELECT_SQL: &str = "SELECT id, source, target, weight FROM edges";

/// SQLite repository owning one migrated connection.
pub struct SqliteGraphRepository {
    conn: Mutex<Connection>,
}

impl SqliteGraphRepository {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `ForeignKeysDisabled` when the connection would not cascade edges.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_graph_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl GraphRepository for SqliteGraphRepository {
    fn list_nodes(&self) -> RepoResult<Vec<Node>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{NODE_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut nodes = Vec::new();
        while let Some(row) = rows.next()? {
            nodes.push(parse_node_row(row)?);
        }
        Ok(nodes)
    }

    fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>> {
        let conn = self.conn.lock();
        load_node(&conn, id)
    }

    fn insert_node(&self, node: &Node) -> RepoResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO nodes (id, description, prior_probability) VALUES (?1, ?2, ?3);",
            params![
                node.id.to_string(),
                node.description.as_str(),
                node.prior_probability
            ],
        )?;
        Ok(())
    }

    fn update_node(&self, id: NodeId, patch: &NodePatch) -> RepoResult<Node> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut node = load_node(&tx, id)?.ok_or(RepoError::NotFound(RecordRef::node(id)))?;
        node.apply(patch);
        tx.execute(
            "UPDATE nodes SET description = ?1, prior_probability = ?2 WHERE id = ?3;",
            params![
                node.description.as_str(),
                node.prior_probability,
                id.to_string()
            ],
        )?;
        tx.commit()?;
        Ok(node)
    }

    fn delete_node(&self, id: NodeId) -> RepoResult<NodeRemoval> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let id_text = id.to_string();

        let cascaded_edges = {
            let mut stmt = tx.prepare(
                "SELECT id FROM edges
                 WHERE source = ?1 OR target = ?1
                 ORDER BY seq ASC;",
            )?;
            let mut rows = stmt.query([id_text.as_str()])?;
            let mut ids = Vec::new();
            while let Some(row) = rows.next()? {
                let text: String = row.get(0)?;
                ids.push(parse_uuid(&text, "edges.id")?);
            }
            ids
        };

        tx.execute(
            "DELETE FROM edges WHERE source = ?1 OR target = ?1;",
            [id_text.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM nodes WHERE id = ?1;", [id_text.as_str()])?;
        tx.commit()?;

        Ok(NodeRemoval {
            removed: changed > 0,
            cascaded_edges,
        })
    }

    fn list_edges(&self) -> RepoResult<Vec<Edge>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{EDGE_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut edges = Vec::new();
        while let Some(row) = rows.next()? {
            edges.push(parse_edge_row(row)?);
        }
        Ok(edges)
    }

    fn get_edge(&self, id: EdgeId) -> RepoResult<Option<Edge>> {
        let conn = self.conn.lock();
        load_edge(&conn, id)
    }

    fn insert_edge(&self, edge: &Edge) -> RepoResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        ensure_endpoints(&tx, [edge.source, edge.target])?;
        tx.execute(
            "INSERT INTO edges (id, source, target, weight) VALUES (?1, ?2, ?3, ?4);",
            params![
                edge.id.to_string(),
                edge.source.to_string(),
                edge.target.to_string(),
                edge.weight
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn update_edge(&self, id: EdgeId, patch: &EdgePatch) -> RepoResult<Edge> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut edge = load_edge(&tx, id)?.ok_or(RepoError::NotFound(RecordRef::edge(id)))?;
        ensure_endpoints(&tx, patch.endpoints())?;
        edge.apply(patch);
        tx.execute(
            "UPDATE edges SET source = ?1, target = ?2, weight = ?3 WHERE id = ?4;",
            params![
                edge.source.to_string(),
                edge.target.to_string(),
                edge.weight,
                id.to_string()
            ],
        )?;
        tx.commit()?;
        Ok(edge)
    }

    fn delete_edge(&self, id: EdgeId) -> RepoResult<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM edges WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn insert_network(&self, network: &Network) -> RepoResult<()> {
        let (nodes_json, edges_json) = encode_payload(network)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO networks (id, name, nodes_json, edges_json) VALUES (?1, ?2, ?3, ?4);",
            params![
                network.id.to_string(),
                network.name.as_str(),
                nodes_json,
                edges_json
            ],
        )?;
        Ok(())
    }

    fn list_networks(&self) -> RepoResult<Vec<NetworkSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, nodes_json, edges_json FROM networks ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(parse_network_row(row)?.summary());
        }
        Ok(summaries)
    }

    fn get_network(&self, id: NetworkId) -> RepoResult<Option<Network>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, nodes_json, edges_json FROM networks WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_network_row(row)?));
        }
        Ok(None)
    }

    fn replace_network(&self, network: &Network) -> RepoResult<()> {
        let (nodes_json, edges_json) = encode_payload(network)?;
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE networks
             SET name = ?1, nodes_json = ?2, edges_json = ?3
             WHERE id = ?4;",
            params![
                network.name.as_str(),
                nodes_json,
                edges_json,
                network.id.to_string()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::network(network.id)));
        }
        Ok(())
    }
}

fn ensure_graph_connection_ready(conn: &Connection) -> RepoResult<()> {
    let status = inspect_schema(conn)?;
    if !status.is_current() {
        return Err(RepoError::UninitializedConnection {
            expected_version: latest_version(),
            actual_version: status.version,
        });
    }
    if !status.foreign_keys {
        return Err(RepoError::ForeignKeysDisabled);
    }
    Ok(())
}

fn ensure_endpoints(
    tx: &Transaction<'_>,
    endpoints: impl IntoIterator<Item = NodeId>,
) -> RepoResult<()> {
    for endpoint in endpoints {
        let exists = tx
            .query_row(
                "SELECT 1 FROM nodes WHERE id = ?1;",
                [endpoint.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        if exists.is_none() {
            return Err(RepoError::MissingEndpoint(endpoint));
        }
    }
    Ok(())
}

fn load_node(conn: &Connection, id: NodeId) -> RepoResult<Option<Node>> {
    let mut stmt = conn.prepare(&format!("{NODE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_node_row(row)?));
    }
    Ok(None)
}

fn load_edge(conn: &Connection, id: EdgeId) -> RepoResult<Option<Edge>> {
    let mut stmt = conn.prepare(&format!("{EDGE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_edge_row(row)?));
    }
    Ok(None)
}

fn parse_node_row(row: &Row<'_>) -> RepoResult<Node> {
    let id_text: String = row.get("id")?;
    Ok(Node {
        id: parse_uuid(&id_text, "nodes.id")?,
        description: row.get("description")?,
        prior_probability: row.get("prior_probability")?,
    })
}

fn parse_edge_row(row: &Row<'_>) -> RepoResult<Edge> {
    let id_text: String = row.get("id")?;
    let source_text: String = row.get("source")?;
    let target_text: String = row.get("target")?;
    Ok(Edge {
        id: parse_uuid(&id_text, "edges.id")?,
        source: parse_uuid(&source_text, "edges.source")?,
        target: parse_uuid(&target_text, "edges.target")?,
        weight: row.get("weight")?,
    })
}

fn parse_network_row(row: &Row<'_>) -> RepoResult<Network> {
    let id_text: String = row.get("id")?;
    let nodes_json: String = row.get("nodes_json")?;
    let edges_json: String = row.get("edges_json")?;
    let nodes = serde_json::from_str(&nodes_json).map_err(|err| {
        RepoError::InvalidData(format!("invalid networks.nodes_json for {id_text}: {err}"))
    })?;
    let edges = serde_json::from_str(&edges_json).map_err(|err| {
        RepoError::InvalidData(format!("invalid networks.edges_json for {id_text}: {err}"))
    })?;
    Ok(Network {
        id: parse_uuid(&id_text, "networks.id")?,
        name: row.get("name")?,
        nodes,
        edges,
    })
}

fn encode_payload(network: &Network) -> RepoResult<(String, String)> {
    let nodes_json = serde_json::to_string(&network.nodes)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode network nodes: {err}")))?;
    let edges_json = serde_json::to_string(&network.edges)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode network edges: {err}")))?;
    Ok((nodes_json, edges_json))
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
