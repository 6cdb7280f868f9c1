//! SQLite-backed durable store of referral edges.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::repository::{GraphStore, ReferralRepository};
use crate::schema::SCHEMA_SQL;
use referral_core::{Error, ReferralEdge, Result};

/// Durable referral edge store. The authoritative copy of the forest.
pub struct SqliteGraphStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

/// Raw column values before timestamp decoding.
type EdgeRow = (String, Option<String>, String);

impl SqliteGraphStore {
    /// Open or create the store at `db_path`, creating parent directories.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
        }

        let conn = Connection::open(&db_path).map_err(db_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_err)?;

        let store = Self::with_connection(conn, db_path)?;
        info!(
            "SqliteGraphStore initialized: {} edges, {} roots, path={}",
            store.count_edges()?,
            store.count_roots()?,
            store.db_path.display()
        );
        Ok(store)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::with_connection(conn, PathBuf::from(":memory:"))
    }

    fn with_connection(conn: Connection, db_path: PathBuf) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Storage(format!("Schema init failed: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Insert an edge. Fails if the customer already has one.
    pub fn save(&self, edge: &ReferralEdge) -> Result<()> {
        let referred_at = edge.referred_at.to_rfc3339_opts(SecondsFormat::Nanos, true);
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO referrals (customer_id, referrer_id, referred_at) VALUES (?1, ?2, ?3)",
        )
        .map_err(db_err)?
        .execute(params![edge.customer_id, edge.referrer_id, referred_at])
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                Error::Storage(format!(
                    "customer {} already has a referral edge",
                    edge.customer_id
                ))
            } else {
                db_err(e)
            }
        })?;
        debug!(
            "Saved referral edge {} <- {:?}",
            edge.customer_id, edge.referrer_id
        );
        Ok(())
    }

    /// Edges referred by `referrer_id`, in insertion order.
    pub fn find_by_referrer(&self, referrer_id: &str) -> Result<Vec<ReferralEdge>> {
        let rows: Vec<EdgeRow> = {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare_cached(
                    "SELECT customer_id, referrer_id, referred_at FROM referrals
                     WHERE referrer_id = ?1 ORDER BY id",
                )
                .map_err(db_err)?;
            let rows = stmt
                .query_map(params![referrer_id], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })
                .map_err(db_err)?;
            rows.collect::<rusqlite::Result<Vec<EdgeRow>>>()
                .map_err(db_err)?
        };
        rows.into_iter().map(row_to_edge).collect()
    }

    /// Customer ids of edges without a referrer, in insertion order.
    pub fn find_roots(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT customer_id FROM referrals WHERE referrer_id IS NULL ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(db_err)?;
        let roots = rows.collect::<rusqlite::Result<Vec<String>>>().map_err(db_err)?;
        Ok(roots)
    }

    pub fn count_edges(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM referrals", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(count)
    }

    pub fn count_roots(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM referrals WHERE referrer_id IS NULL",
                [],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(count)
    }
}

impl GraphStore for SqliteGraphStore {
    fn save(&self, edge: &ReferralEdge) -> Result<()> {
        SqliteGraphStore::save(self, edge)
    }

    fn find_by_referrer(&self, referrer_id: &str) -> Result<Vec<ReferralEdge>> {
        SqliteGraphStore::find_by_referrer(self, referrer_id)
    }

    fn find_roots(&self) -> Result<Vec<String>> {
        SqliteGraphStore::find_roots(self)
    }
}

impl ReferralRepository for SqliteGraphStore {
    fn add_referral(&self, edge: ReferralEdge) -> Result<ReferralEdge> {
        SqliteGraphStore::save(self, &edge)?;
        Ok(edge)
    }

    fn find_by_referrer(&self, referrer_id: &str) -> Result<Vec<ReferralEdge>> {
        SqliteGraphStore::find_by_referrer(self, referrer_id)
    }

    fn find_roots(&self) -> Result<Vec<String>> {
        SqliteGraphStore::find_roots(self)
    }
}

fn row_to_edge((customer_id, referrer_id, referred_at): EdgeRow) -> Result<ReferralEdge> {
    let referred_at = DateTime::parse_from_rfc3339(&referred_at)
        .map_err(|e| {
            Error::Storage(format!(
                "malformed referred_at {:?} for customer {}: {}",
                referred_at, customer_id, e
            ))
        })?
        .with_timezone(&Utc);
    Ok(ReferralEdge {
        customer_id,
        referrer_id,
        referred_at,
    })
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::Storage(e.to_string())
}
