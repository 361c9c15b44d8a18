//! Pool construction for the embedded SQLite database.

use castwatch_error::{DatabaseError, DatabaseErrorKind};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;

/// Sets the pragmas spec §5 requires on every pooled connection: WAL mode,
/// `synchronous=NORMAL`, and a 5 s busy timeout to absorb the read path
/// from a second process sharing the same file.
#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA busy_timeout = 5000; \
             PRAGMA foreign_keys = ON;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds a connection pool over the embedded database file.
///
/// SQLite is single-writer; the pool is sized to 1 connection in the
/// Worker process. The singleton-Worker PID lock (see `castwatch_worker`)
/// plus this pragma set is what spec §5 calls "single writer via a
/// process-wide mutex" in practice.
pub fn build_pool(
    database_path: &str,
    max_size: u32,
) -> Result<Pool<ConnectionManager<SqliteConnection>>, DatabaseError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_path);
    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))
}
