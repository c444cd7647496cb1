//! Sales rep reference data

use std::sync::Arc;

use async_trait::async_trait;
use quotesync_core::RepSource;
use quotesync_domain::{Rep, Result as DomainResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};

pub struct SqliteRepRepository {
    db: Arc<DbManager>,
}

impl SqliteRepRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a rep by id.
    pub async fn upsert_rep(&self, rep: &Rep) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let rep = rep.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_rep(&conn, &rep).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl RepSource for SqliteRepRepository {
    async fn load_reps(&self) -> DomainResult<Vec<Rep>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Rep>> {
            let conn = db.get_connection()?;
            query_reps(&conn).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn upsert_rep(conn: &Connection, rep: &Rep) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO reps (id, name, office, active) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             office = excluded.office,
             active = excluded.active",
        params![rep.id, rep.name, rep.office.as_str(), rep.active],
    )?;
    Ok(())
}

fn query_reps(conn: &Connection) -> rusqlite::Result<Vec<Rep>> {
    let mut stmt = conn.prepare("SELECT id, name, office, active FROM reps ORDER BY name")?;
    let rows = stmt.query_map([], map_rep_row)?;
    rows.collect()
}

fn map_rep_row(row: &Row<'_>) -> rusqlite::Result<Rep> {
    let office: String = row.get(2)?;
    Ok(Rep {
        id: row.get(0)?,
        name: row.get(1)?,
        office: office
            .parse()
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(err)))?,
        active: row.get(3)?,
    })
}
