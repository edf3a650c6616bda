//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use storesync_core::errors::StoreSyncResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// The single write connection plus an optional read pool.
///
/// In-memory databases are private to their connection, so the in-memory pool
/// has no readers and all reads go through the writer.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open the writer first so WAL mode and the schema exist before readers attach.
    pub fn open(path: &Path, read_pool_size: usize) -> StoreSyncResult<Self> {
        let writer = WriteConnection::open(path)?;
        Ok(Self {
            writer,
            readers: None,
            db_path: Some(path.to_path_buf()),
        }
        .with_readers(read_pool_size)?)
    }

    pub fn open_in_memory() -> StoreSyncResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory()?,
            readers: None,
            db_path: None,
        })
    }

    fn with_readers(mut self, read_pool_size: usize) -> StoreSyncResult<Self> {
        if let Some(path) = &self.db_path {
            self.readers = Some(ReadPool::open(path, read_pool_size)?);
        }
        Ok(self)
    }
}
