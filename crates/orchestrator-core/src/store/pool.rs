use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;
use tokio::sync::Semaphore;

use crate::error::{CoreError, CoreResult};

/// A small fixed-size pool of SQLite connections, each opened in WAL mode so
/// readers never block the writer. Borrowing a connection is bounded by a
/// semaphore sized to the pool, mirroring a DB-pool acquire-with-timeout.
pub struct SqlitePool {
    conns: Vec<Mutex<Connection>>,
    semaphore: Arc<Semaphore>,
    next: AtomicUsize,
    acquire_timeout: Duration,
}

impl SqlitePool {
    pub fn open(database_url: &str, pool_size: usize, acquire_timeout: Duration) -> CoreResult<Self> {
        let pool_size = pool_size.max(1);
        let mut conns = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let conn = Connection::open(database_url)?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            conns.push(Mutex::new(conn));
        }
        Ok(SqlitePool {
            conns,
            semaphore: Arc::new(Semaphore::new(pool_size)),
            next: AtomicUsize::new(0),
            acquire_timeout,
        })
    }

    pub async fn with_conn<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&Connection) -> CoreResult<T>,
    {
        let permit = tokio::time::timeout(self.acquire_timeout, self.semaphore.acquire())
            .await
            .map_err(|_| CoreError::Storage("timed out acquiring a db connection".into()))?
            .map_err(|_| CoreError::Storage("db pool closed".into()))?;

        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        let conn = self.conns[idx].lock().expect("db connection mutex poisoned");
        let result = f(&conn);
        drop(permit);
        result
    }
}
