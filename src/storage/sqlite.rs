//! SQLite storage backend for the taxonomy graph

use super::traits::{
    ChainWriter, GraphStats, OpenStore, StorageError, StorageResult, TaxonStore,
};
use crate::graph::{MembershipEdge, NodeUpsert, Rank, TaxonId, TaxonNode, UnknownRank};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// How long a connection waits on another writer before reporting busy
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Check that `name` can name the graph view.
///
/// Must be a plain SQL identifier and must not shadow a rank collection or
/// an edge set.
pub fn is_valid_graph_name(name: &str) -> bool {
    let mut chars = name.chars();
    let well_formed = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    well_formed
        && !Rank::ALL.into_iter().any(|rank| {
            rank.collection().eq_ignore_ascii_case(name)
                || rank
                    .members_collection()
                    .is_some_and(|members| members.eq_ignore_ascii_case(name))
        })
}

/// SQLite-backed taxonomy store
///
/// One table per rank (`kingdom`, `phylum`, ...), one edge table per parent
/// rank (`kingdomMembers`, ...), and a view named after the graph that
/// unions every edge table for traversal.
///
/// Uniqueness is enforced by the schema: `UNIQUE(name)` on node tables and
/// `UNIQUE(from_id, to_id)` on edge tables. Get-or-create is an
/// `INSERT .. ON CONFLICT DO NOTHING RETURNING id` followed by a lookup on
/// conflict, so concurrent writers (threads sharing this store, or other
/// processes on the same file) never duplicate a node or an edge.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    graph_name: String,
}

impl SqliteStore {
    fn new(conn: Connection, graph_name: &str) -> StorageResult<Self> {
        if !is_valid_graph_name(graph_name) {
            return Err(StorageError::InvalidGraphName(graph_name.to_string()));
        }
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::init_schema(&conn, graph_name)?;
        Ok(Self {
            conn: Mutex::new(conn),
            graph_name: graph_name.to_string(),
        })
    }

    /// Initialize the database schema
    ///
    /// Idempotent: every statement is `IF NOT EXISTS`, so reopening an
    /// existing database (or binding a second graph name to it) is safe.
    fn init_schema(conn: &Connection, graph_name: &str) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            "#,
        )?;

        let mut ddl = String::new();
        for rank in Rank::ALL {
            ddl.push_str(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS "{table}" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    url TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );
                "#,
                table = rank.collection(),
            ));
        }

        let mut view_parts = Vec::new();
        for rank in Rank::ALL {
            let (Some(members), Some(child)) = (rank.members_collection(), rank.child()) else {
                continue;
            };
            ddl.push_str(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS "{members}" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    from_id INTEGER NOT NULL REFERENCES "{child}"(id),
                    to_id INTEGER NOT NULL REFERENCES "{parent}"(id),
                    created_at TEXT NOT NULL,
                    UNIQUE (from_id, to_id)
                );
                CREATE INDEX IF NOT EXISTS "idx_{members}_to" ON "{members}"(to_id);
                "#,
                child = child.collection(),
                parent = rank.collection(),
            ));
            view_parts.push(format!(
                r#"SELECT '{child}' AS from_rank, from_id, '{parent}' AS to_rank, to_id FROM "{members}""#,
                child = child.collection(),
                parent = rank.collection(),
            ));
        }

        ddl.push_str(&format!(
            r#"CREATE VIEW IF NOT EXISTS "{graph_name}" AS {};"#,
            view_parts.join(" UNION ALL ")
        ));

        conn.execute_batch(&ddl)?;
        Ok(())
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Deserialize a node from database columns
    fn row_to_node(
        rank: Rank,
        id: i64,
        name: String,
        url: String,
        created_at: String,
    ) -> StorageResult<TaxonNode> {
        Ok(TaxonNode {
            id: TaxonId::new(id),
            rank,
            name,
            url,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| StorageError::DateParse(e.to_string()))?
                .with_timezone(&Utc),
        })
    }

    fn query_node(
        conn: &Connection,
        rank: Rank,
        column: &str,
        value: &dyn rusqlite::ToSql,
    ) -> StorageResult<Option<TaxonNode>> {
        let sql = format!(
            r#"SELECT id, name, url, created_at FROM "{}" WHERE {} = ?1"#,
            rank.collection(),
            column
        );
        let row: Option<(i64, String, String, String)> = conn
            .query_row(&sql, &[value][..], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .optional()?;

        match row {
            Some((id, name, url, created_at)) => {
                Ok(Some(Self::row_to_node(rank, id, name, url, created_at)?))
            }
            None => Ok(None),
        }
    }

    fn edge_table(edge: &MembershipEdge) -> StorageResult<String> {
        edge.parent_rank
            .members_collection()
            .ok_or_else(|| StorageError::Schema(format!("no edge set below {}", edge.parent_rank)))
    }
}

/// Insert `(rank, name)` unless present; return its id either way
fn insert_node(conn: &Connection, rank: Rank, name: &str, url: &str) -> StorageResult<NodeUpsert> {
    let inserted: Option<i64> = conn
        .query_row(
            &format!(
                r#"
                INSERT INTO "{}" (name, url, created_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(name) DO NOTHING
                RETURNING id
                "#,
                rank.collection()
            ),
            params![name, url, Utc::now().to_rfc3339()],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = inserted {
        return Ok(NodeUpsert {
            id: TaxonId::new(id),
            created: true,
        });
    }

    let id: i64 = conn.query_row(
        &format!(r#"SELECT id FROM "{}" WHERE name = ?1"#, rank.collection()),
        params![name],
        |row| row.get(0),
    )?;
    Ok(NodeUpsert {
        id: TaxonId::new(id),
        created: false,
    })
}

fn insert_edge(conn: &Connection, edge: &MembershipEdge) -> StorageResult<bool> {
    let table = SqliteStore::edge_table(edge)?;
    let rows = conn.execute(
        &format!(
            r#"
            INSERT INTO "{table}" (from_id, to_id, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(from_id, to_id) DO NOTHING
            "#
        ),
        params![edge.from.get(), edge.to.get(), Utc::now().to_rfc3339()],
    )?;
    Ok(rows > 0)
}

/// `ChainWriter` over an open transaction
struct TxWriter<'a>(&'a Transaction<'a>);

impl ChainWriter for TxWriter<'_> {
    fn get_or_create_node(&self, rank: Rank, name: &str, url: &str) -> StorageResult<NodeUpsert> {
        insert_node(self.0, rank, name, url)
    }

    fn get_or_create_edge(&self, edge: &MembershipEdge) -> StorageResult<bool> {
        insert_edge(self.0, edge)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>, graph_name: &str) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::new(conn, graph_name)
    }

    fn open_in_memory(graph_name: &str) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::new(conn, graph_name)
    }
}

impl TaxonStore for SqliteStore {
    fn graph_name(&self) -> &str {
        &self.graph_name
    }

    // === Node Operations ===

    fn get_or_create_node(&self, rank: Rank, name: &str, url: &str) -> StorageResult<NodeUpsert> {
        let conn = self.conn()?;
        insert_node(&conn, rank, name, url)
    }

    fn load_node(&self, rank: Rank, id: TaxonId) -> StorageResult<Option<TaxonNode>> {
        let conn = self.conn()?;
        Self::query_node(&conn, rank, "id", &id.get())
    }

    fn find_node(&self, rank: Rank, name: &str) -> StorageResult<Option<TaxonNode>> {
        let conn = self.conn()?;
        Self::query_node(&conn, rank, "name", &name)
    }

    // === Edge Operations ===

    fn get_or_create_edge(&self, edge: &MembershipEdge) -> StorageResult<bool> {
        let conn = self.conn()?;
        insert_edge(&conn, edge)
    }

    fn has_edge(&self, edge: &MembershipEdge) -> StorageResult<bool> {
        let table = Self::edge_table(edge)?;
        let conn = self.conn()?;

        let found: bool = conn.query_row(
            &format!(r#"SELECT COUNT(*) > 0 FROM "{table}" WHERE from_id = ?1 AND to_id = ?2"#),
            params![edge.from.get(), edge.to.get()],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    fn write_chain(
        &self,
        write: &mut dyn FnMut(&dyn ChainWriter) -> StorageResult<()>,
    ) -> StorageResult<()> {
        let mut conn = self.conn()?;
        // Take the write lock up front so a second file handle waits on busy_timeout
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        write(&TxWriter(&tx))?;
        tx.commit()?;
        Ok(())
    }

    // === Graph Operations ===

    fn inbound_neighbors(&self, rank: Rank, id: TaxonId) -> StorageResult<Vec<TaxonNode>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            r#"SELECT from_rank, from_id FROM "{}" WHERE to_rank = ?1 AND to_id = ?2"#,
            self.graph_name
        ))?;
        let sources = stmt
            .query_map(params![rank.collection(), id.get()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut nodes = Vec::with_capacity(sources.len());
        for (from_rank, from_id) in sources {
            let from_rank: Rank = from_rank
                .parse()
                .map_err(|e: UnknownRank| StorageError::Schema(e.to_string()))?;
            if let Some(node) = Self::query_node(&conn, from_rank, "id", &from_id)? {
                nodes.push(node);
            }
        }

        Ok(nodes)
    }

    fn stats(&self) -> StorageResult<GraphStats> {
        let conn = self.conn()?;

        let mut nodes_by_rank = Vec::with_capacity(Rank::ALL.len());
        for rank in Rank::ALL {
            let count: i64 = conn.query_row(
                &format!(r#"SELECT COUNT(*) FROM "{}""#, rank.collection()),
                [],
                |row| row.get(0),
            )?;
            nodes_by_rank.push((rank, count as u64));
        }

        let edges: i64 = conn.query_row(
            &format!(r#"SELECT COUNT(*) FROM "{}""#, self.graph_name),
            [],
            |row| row.get(0),
        )?;

        Ok(GraphStats {
            nodes_by_rank,
            edges: edges as u64,
        })
    }
}
