//! SQLite persistence.
//!
//! `Db` is a cheap, clonable handle holding the database location. Every
//! request opens one connection, runs its work inside one transaction and
//! commits on success; returning an error drops the transaction, which rolls
//! it back. The work runs on tokio's blocking pool so the actix workers
//! never wait on disk.
//!
//! The entity modules are plain functions over a `&Connection`, so the same
//! code serves handlers, the seeder and the tests.

mod schema;
pub mod admins;
pub mod announcements;
pub mod batches;
pub mod faculty;
pub mod gallery;
pub mod messages;
pub mod notes;
pub mod results;
pub mod seed;
pub mod settings;
pub mod students;
pub mod subjects;
pub mod testimonials;

pub use schema::SCHEMA;

use crate::error::AppError;
use chrono::{NaiveDateTime, Utc};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Db {
    path: Arc<PathBuf>,
}

impl Db {
    /// Opens (creating if needed) the database file and applies the schema.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Db {
            path: Arc::new(path),
        };
        db.initialize()?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn initialize(&self) -> Result<(), AppError> {
        let conn = self.connect()?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.execute_batch(SCHEMA)?;
        info!("database ready at {}", self.path.display());
        Ok(())
    }

    pub fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(self.path.as_ref())?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    /// Runs `work` inside a transaction on the calling thread.
    ///
    /// The write lock is taken up front (`BEGIN IMMEDIATE`), so a unit of
    /// work that reads before it writes waits on the busy timeout instead of
    /// failing when another writer got there first.
    pub fn transact<T, F>(&self, work: F) -> Result<T, AppError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, AppError>,
    {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = work(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Runs `work` inside a transaction on the blocking pool.
    pub async fn run<T, F>(&self, work: F) -> Result<T, AppError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.transact(work)).await?
    }
}

/// Timestamp written into `created_at` style columns.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// One page of a listing plus what a pager needs to draw itself.
/// Pages past the end come back empty rather than failing.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: i64) -> Self {
        let pages = if total <= 0 {
            0
        } else {
            ((total as u64 + per_page as u64 - 1) / per_page as u64) as u32
        };
        Paginated {
            items,
            page,
            per_page,
            total,
            pages,
        }
    }
}

/// Normalises a requested page number and returns `(page, offset)`.
pub fn page_window(page: Option<u32>, per_page: u32) -> (u32, i64) {
    let page = page.unwrap_or(1).max(1);
    (page, (page as i64 - 1) * per_page as i64)
}

/// Escapes `LIKE` wildcards for use with `ESCAPE '\'`.
pub fn escape_like(fragment: &str) -> String {
    fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Substring pattern for a user supplied search fragment.
pub fn like_pattern(fragment: &str) -> String {
    format!("%{}%", escape_like(fragment))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// A fresh database in its own temporary directory.
    pub fn temp_db() -> (TempDir, Db) {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::open(dir.path().join("portal.db")).unwrap();
        (dir, db)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::temp_db;
    use super::*;

    #[test]
    fn failed_work_rolls_back() {
        let (_dir, db) = temp_db();
        let result: Result<(), AppError> = db.transact(|tx| {
            tx.execute(
                "INSERT INTO site_settings (key, value) VALUES ('site_name', 'x')",
                [],
            )?;
            Err(AppError::BadRequest("abort".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = db
            .connect()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM site_settings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn concurrent_read_then_write_units_all_commit() {
        let (_dir, db) = temp_db();
        let barrier = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = db.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    db.transact(|tx| {
                        let seen: i64 =
                            tx.query_row("SELECT COUNT(*) FROM site_settings", [], |r| r.get(0))?;
                        std::thread::sleep(Duration::from_millis(10));
                        tx.execute(
                            "INSERT INTO site_settings (key, value) VALUES (?1, ?2)",
                            rusqlite::params![format!("key_{}", i), seen.to_string()],
                        )?;
                        Ok(())
                    })
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        let count: i64 = db
            .connect()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM site_settings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 8);
    }

    #[test]
    fn pagination_counts_pages() {
        let page: Paginated<u8> = Paginated::new(vec![], 1, 15, 31);
        assert_eq!(page.pages, 3);
        assert_eq!(Paginated::<u8>::new(vec![], 1, 15, 0).pages, 0);
        assert_eq!(page_window(Some(0), 15), (1, 0));
        assert_eq!(page_window(Some(3), 20), (3, 40));
    }

    #[test]
    fn like_patterns_escape_wildcards() {
        assert_eq!(like_pattern("50%_a"), "%50\\%\\_a%");
    }
}
