use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use log::error;
use promptdeck_core::errors::{DatabaseError, Error, Result};
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

// A write job runs against the actor's connection and returns a core Result.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type ErasedReply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    // Each job is a boxed closure; the oneshot sender carries its type-erased result.
    tx: mpsc::Sender<(ErasedJob, ErasedReply)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an immediate transaction: any error it returns
    /// rolls back every statement it issued.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_stopped())?;

        let boxed = ret_rx.await.map_err(|_| writer_stopped())??;
        boxed.downcast::<T>().map(|v| *v).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Failed to downcast writer actor result".to_string(),
            ))
        })
    }
}

fn writer_stopped() -> Error {
    Error::Database(DatabaseError::Internal(
        "Writer actor is not running".to_string(),
    ))
}

/// Spawns a background Tokio task that acts as a single writer to the database.
/// This actor owns one database connection from the pool and processes write jobs serially.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, ErasedReply)>(1024);

    tokio::spawn(async move {
        // Held for the lifetime of the actor.
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                // Dropping `rx` makes every later `exec` fail with `writer_stopped`.
                error!("Writer actor could not acquire a connection: {}", e);
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| e.into());

            // The requester may have gone away; nothing to do then.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_db;
    use crate::schema::conversations;
    use diesel::prelude::*;

    #[tokio::test]
    async fn test_failed_job_rolls_back() {
        let (_dir, pool, writer) = setup_db();

        let result: Result<()> = writer
            .exec(|conn| {
                diesel::insert_into(conversations::table)
                    .values((
                        conversations::id.eq("c1"),
                        conversations::title.eq("t"),
                        conversations::model.eq("gpt-5"),
                        conversations::created_at.eq("2024-01-01T00:00:00.000000Z"),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Err(Error::Unexpected("abort".to_string()))
            })
            .await;
        assert!(matches!(result, Err(Error::Unexpected(_))));

        let mut conn = crate::db::get_connection(&pool).unwrap();
        let count: i64 = conversations::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_exec_returns_job_value() {
        let (_dir, _pool, writer) = setup_db();
        let value = writer.exec(|_conn| Ok(42usize)).await.unwrap();
        assert_eq!(value, 42);
    }
}
