//! Shared HTTP state: one connection behind a mutex.
//!
//! The store is small and every operation is a short transaction, so a
//! single serialized connection is enough; concurrent sessions queue on
//! the lock and the conditional updates in the domain modules still
//! guard against stale reads.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use super::ApiError;

pub struct AppState {
    db: Mutex<Connection>,
}

impl AppState {
    pub fn new(conn: Connection) -> Arc<Self> {
        Arc::new(Self { db: Mutex::new(conn) })
    }

    /// Borrow the connection. A poisoned lock means a handler panicked
    /// mid-write; surface it as an internal error instead of unwinding.
    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}
