//! Sales ledger and audit log repository
//!
//! Implements the core write/read ports over SQLite. Each batch runs in a
//! single transaction so a failed statement leaves the ledger untouched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use quotesync_core::{AuditLogReader, BatchWriter};
use quotesync_domain::{Result as DomainResult, SaleRecord, SyncLogEntry};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::debug;

use super::manager::{map_join_error, map_sql_error, DbManager};

const UPSERT_SALE_SQL: &str = "INSERT INTO sales (
        external_id, sale_date, client_name, amount, quote_number, rep_id,
        department, raw_department_label, office, status, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    ON CONFLICT(external_id) DO UPDATE SET
        sale_date = excluded.sale_date,
        client_name = excluded.client_name,
        amount = excluded.amount,
        quote_number = excluded.quote_number,
        rep_id = excluded.rep_id,
        department = excluded.department,
        raw_department_label = excluded.raw_department_label,
        office = excluded.office,
        status = excluded.status,
        updated_at = excluded.updated_at";

const SALE_COLUMNS: &str = "external_id, sale_date, client_name, amount, quote_number, rep_id, \
                            department, raw_department_label, office, status";

const LOG_COLUMNS: &str =
    "id, received_at, action, status_code, external_id, error_message, payload";

/// SQLite-backed sales ledger and sync log.
pub struct SqliteSalesRepository {
    db: Arc<DbManager>,
}

impl SqliteSalesRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Fetch one sale by provider id.
    pub async fn find_sale(&self, external_id: &str) -> DomainResult<Option<SaleRecord>> {
        let db = Arc::clone(&self.db);
        let external_id = external_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<SaleRecord>> {
            let conn = db.get_connection()?;
            query_sale(&conn, &external_id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    /// Number of rows currently in the ledger.
    pub async fn count_sales(&self) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<usize> {
            let conn = db.get_connection()?;
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM sales", [], |row| row.get(0))
                .map_err(map_sql_error)?;
            Ok(usize::try_from(count).unwrap_or_default())
        })
        .await
        .map_err(map_join_error)?
    }

    /// Most recent audit rows, newest first.
    pub async fn recent_log(&self, limit: usize) -> DomainResult<Vec<SyncLogEntry>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<SyncLogEntry>> {
            let conn = db.get_connection()?;
            query_recent_log(&conn, limit).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl BatchWriter for SqliteSalesRepository {
    async fn upsert_many(&self, records: &[SaleRecord]) -> DomainResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let db = Arc::clone(&self.db);
        let records = records.to_vec();

        task::spawn_blocking(move || -> DomainResult<usize> {
            let mut conn = db.get_connection()?;
            let written = upsert_sales(&mut conn, &records).map_err(map_sql_error)?;
            debug!(written, "sales upserted");
            Ok(written)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_many(&self, external_ids: &[String]) -> DomainResult<usize> {
        if external_ids.is_empty() {
            return Ok(0);
        }

        let db = Arc::clone(&self.db);
        let external_ids = external_ids.to_vec();

        task::spawn_blocking(move || -> DomainResult<usize> {
            let mut conn = db.get_connection()?;
            let removed = delete_sales(&mut conn, &external_ids).map_err(map_sql_error)?;
            debug!(requested = external_ids.len(), removed, "sales deleted");
            Ok(external_ids.len())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn append_log(&self, entry: &SyncLogEntry) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let entry = entry.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            insert_log_entry(&conn, &entry).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl AuditLogReader for SqliteSalesRepository {
    async fn last_sync_at(&self) -> DomainResult<Option<DateTime<Utc>>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<DateTime<Utc>>> {
            let conn = db.get_connection()?;
            query_last_sync_at(&conn).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn upsert_sales(conn: &mut Connection, records: &[SaleRecord]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let now = Utc::now().timestamp();
    {
        let mut stmt = tx.prepare_cached(UPSERT_SALE_SQL)?;
        for record in records {
            stmt.execute(params![
                record.external_id,
                record.sale_date.to_string(),
                record.client_name,
                record.amount,
                record.quote_number,
                record.rep_id,
                record.department,
                record.raw_department_label,
                record.office.as_str(),
                record.status.as_str(),
                now,
            ])?;
        }
    }
    tx.commit()?;
    Ok(records.len())
}

fn delete_sales(conn: &mut Connection, external_ids: &[String]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut removed = 0;
    {
        let mut stmt = tx.prepare_cached("DELETE FROM sales WHERE external_id = ?1")?;
        for external_id in external_ids {
            removed += stmt.execute(params![external_id])?;
        }
    }
    tx.commit()?;
    Ok(removed)
}

fn insert_log_entry(conn: &Connection, entry: &SyncLogEntry) -> rusqlite::Result<()> {
    let payload = entry.payload.as_ref().map(|value| value.to_string());
    conn.execute(
        &format!("INSERT INTO sync_log ({LOG_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        params![
            entry.id,
            format_timestamp(&entry.received_at),
            entry.action.as_str(),
            entry.status_code,
            entry.external_id,
            entry.error_message,
            payload,
        ],
    )?;
    Ok(())
}

fn query_sale(conn: &Connection, external_id: &str) -> rusqlite::Result<Option<SaleRecord>> {
    conn.query_row(
        &format!("SELECT {SALE_COLUMNS} FROM sales WHERE external_id = ?1"),
        params![external_id],
        map_sale_row,
    )
    .optional()
}

fn query_recent_log(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<SyncLogEntry>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOG_COLUMNS} FROM sync_log ORDER BY received_at DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], map_log_row)?;
    rows.collect()
}

fn query_last_sync_at(conn: &Connection) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT received_at FROM sync_log
             WHERE action IN ('sync_manual', 'sync_auto')
             ORDER BY received_at DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    raw.map(|value| parse_timestamp(0, &value)).transpose()
}

fn map_sale_row(row: &Row<'_>) -> rusqlite::Result<SaleRecord> {
    let sale_date: String = row.get(1)?;
    let office: String = row.get(8)?;
    let status: String = row.get(9)?;

    Ok(SaleRecord {
        external_id: row.get(0)?,
        sale_date: NaiveDate::parse_from_str(&sale_date, "%Y-%m-%d")
            .map_err(|err| conversion_error(1, err))?,
        client_name: row.get(2)?,
        amount: row.get(3)?,
        quote_number: row.get(4)?,
        rep_id: row.get(5)?,
        department: row.get(6)?,
        raw_department_label: row.get(7)?,
        office: office.parse().map_err(|err| conversion_error(8, err))?,
        status: status.parse().map_err(|err| conversion_error(9, err))?,
    })
}

fn map_log_row(row: &Row<'_>) -> rusqlite::Result<SyncLogEntry> {
    let received_at: String = row.get(1)?;
    let action: String = row.get(2)?;
    let payload: Option<String> = row.get(6)?;

    Ok(SyncLogEntry {
        id: row.get(0)?,
        received_at: parse_timestamp(1, &received_at)?,
        action: action.parse().map_err(|err| conversion_error(2, err))?,
        status_code: row.get(3)?,
        external_id: row.get(4)?,
        error_message: row.get(5)?,
        payload: payload
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|err| conversion_error(6, err))?,
    })
}

/// Fixed-width UTC so that lexical order in SQL is chronological order.
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|err| conversion_error(idx, err))
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use quotesync_domain::{Office, Rep, SaleStatus, SyncAction};
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::database::SqliteRepRepository;

    async fn setup_repository() -> (SqliteSalesRepository, Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("sales.db");
        let manager = Arc::new(DbManager::new(&db_path, 2).expect("manager created"));
        manager.run_migrations().expect("migrations run");

        let reps = SqliteRepRepository::new(manager.clone());
        reps.upsert_rep(&Rep {
            id: "rep-julie".into(),
            name: "Julie Tremblay".into(),
            office: Office::Qc,
            active: true,
        })
        .await
        .expect("rep seeded");

        (SqliteSalesRepository::new(manager.clone()), manager, temp_dir)
    }

    fn sale(external_id: &str, amount: f64) -> SaleRecord {
        SaleRecord {
            external_id: external_id.into(),
            sale_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            client_name: "Quincaillerie Roy".into(),
            amount,
            quote_number: "QT-000201".into(),
            rep_id: "rep-julie".into(),
            department: "NUMERIQUE".into(),
            raw_department_label: "AGENCE PUB".into(),
            office: Office::Qc,
            status: SaleStatus::Invoiced,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upsert_inserts_then_replaces() {
        let (repo, _db, _dir) = setup_repository().await;

        repo.upsert_many(&[sale("E1", 100.0), sale("E2", 50.0)]).await.expect("first batch");
        let written = repo.upsert_many(&[sale("E1", 275.5)]).await.expect("second batch");

        assert_eq!(written, 1);
        assert_eq!(repo.count_sales().await.unwrap(), 2);
        let stored = repo.find_sale("E1").await.unwrap().expect("row present");
        assert_eq!(stored, sale("E1", 275.5));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_counts_submitted_ids() {
        let (repo, _db, _dir) = setup_repository().await;
        repo.upsert_many(&[sale("E1", 100.0)]).await.unwrap();

        let deleted = repo.delete_many(&["E1".into(), "missing".into()]).await.unwrap();

        assert_eq!(deleted, 2);
        assert!(repo.find_sale("E1").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_batch_rolls_back() {
        let (repo, _db, _dir) = setup_repository().await;
        let mut orphan = sale("E2", 10.0);
        orphan.rep_id = "rep-unknown".into();

        let result = repo.upsert_many(&[sale("E1", 100.0), orphan]).await;

        assert!(result.is_err());
        assert_eq!(repo.count_sales().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn log_entries_round_trip_with_payload() {
        let (repo, _db, _dir) = setup_repository().await;
        let entry = SyncLogEntry::new(SyncAction::Error, 400)
            .with_external_id(Some("E9".into()))
            .with_error("Missing required fields: date")
            .with_payload(Some(json!({"estimate_id": "E9"})));

        repo.append_log(&entry).await.unwrap();

        let log = repo.recent_log(10).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].id, entry.id);
        assert_eq!(log[0].action, SyncAction::Error);
        assert_eq!(log[0].status_code, 400);
        assert_eq!(log[0].payload, Some(json!({"estimate_id": "E9"})));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn last_sync_at_ignores_webhook_rows() {
        let (repo, _db, _dir) = setup_repository().await;
        assert_eq!(repo.last_sync_at().await.unwrap(), None);

        let sweep_time = Utc.with_ymd_and_hms(2026, 10, 16, 6, 0, 0).unwrap();
        let mut sweep = SyncLogEntry::new(SyncAction::SyncAuto, 200);
        sweep.received_at = sweep_time;
        let mut webhook = SyncLogEntry::new(SyncAction::Upserted, 200);
        webhook.received_at = sweep_time + Duration::hours(1);

        repo.append_log(&sweep).await.unwrap();
        repo.append_log(&webhook).await.unwrap();

        assert_eq!(repo.last_sync_at().await.unwrap(), Some(sweep_time));
    }

    #[test]
    fn timestamps_sort_lexically() {
        let early = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let late = early + Duration::milliseconds(1);
        assert!(format_timestamp(&early) < format_timestamp(&late));
    }
}
