//! Writer actor that serializes all database writes on one thread.
//!
//! Every job runs inside an immediate transaction, so a multi-statement
//! write either lands whole or not at all.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use trellis_core::errors::{DatabaseError, Error, Result};

use crate::errors::StorageError;

const WRITE_QUEUE_DEPTH: usize = 64;

type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

enum TxError {
    App(Error),
    Db(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Db(value)
    }
}

/// Handle to the writer actor. Cloneable; all clones feed one queue.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<WriteJob>,
}

/// Spawn the writer thread and return a handle to it.
pub fn spawn_writer(pool: Pool<ConnectionManager<SqliteConnection>>) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<WriteJob>(WRITE_QUEUE_DEPTH);

    std::thread::spawn(move || {
        while let Some(job) = rx.blocking_recv() {
            match pool.get() {
                Ok(mut conn) => job(&mut conn),
                Err(e) => {
                    // Dropping the job drops its reply channel, so the
                    // caller observes the failure.
                    log::error!("Writer actor failed to get a connection: {}", e);
                }
            }
        }
    });

    WriteHandle { tx }
}

impl WriteHandle {
    /// Run a write job on the writer thread, wrapped in an immediate
    /// transaction.
    pub async fn exec<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let wrapped: WriteJob = Box::new(move |conn| {
            let outcome = conn
                .immediate_transaction::<T, TxError, _>(|tx| job(tx).map_err(TxError::App))
                .map_err(|e| match e {
                    TxError::App(err) => err,
                    TxError::Db(err) => Error::from(StorageError::from(err)),
                });
            let _ = reply_tx.send(outcome);
        });

        self.tx.send(wrapped).await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer actor is not running".to_string(),
            ))
        })?;

        reply_rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer actor dropped the reply channel".to_string(),
            ))
        })?
    }
}
