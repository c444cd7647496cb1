//! Shared harness for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use quotesync_domain::{Office, Rep};
use quotesync_infra::database::{DbManager, SqliteRepRepository, SqliteSalesRepository};
use tempfile::TempDir;

/// Temporary database with migrations applied. Keeps the directory alive for
/// the duration of a test.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager = DbManager::new(temp_dir.path().join("quotesync.db"), 4)
            .expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn sales(&self) -> SqliteSalesRepository {
        SqliteSalesRepository::new(self.manager.clone())
    }

    pub fn reps(&self) -> SqliteRepRepository {
        SqliteRepRepository::new(self.manager.clone())
    }

    /// Seed the two reps the fixtures refer to.
    pub async fn with_known_reps(self) -> Self {
        let reps = self.reps();
        for rep in [
            Rep { id: "rep-julie".into(), name: "Julie Tremblay".into(), office: Office::Qc, active: true },
            Rep { id: "rep-marc".into(), name: "Marc Gagnon".into(), office: Office::Mtl, active: true },
        ] {
            reps.upsert_rep(&rep).await.expect("rep seeded");
        }
        self
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Route test logs through the libtest capture.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("debug").try_init();
}
