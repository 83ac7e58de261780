use crate::libs::data_storage::DataStorage;
use crate::libs::error::AppResult;
use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "livelife.db";

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the database in the application data directory.
    pub fn new() -> AppResult<Db> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        Self::open(db_file_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> AppResult<Db> {
        let conn = Connection::open(path)?;
        Ok(Db { conn })
    }

    pub fn open_in_memory() -> AppResult<Db> {
        let conn = Connection::open_in_memory()?;
        Ok(Db { conn })
    }
}
