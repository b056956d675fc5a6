use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cell_counts_core::{
    dashboard::LoadOutcome,
    model::{NewSampleRecord, SampleRecord, SampleTable, demo_records},
};
use cell_counts_schema::{CREATE_TABLE, DROP_TABLE, TABLE_NAME, cell_counts};
use diesel::{dsl::sql, prelude::*, sql_types::Bool};

pub mod cache;
pub mod error;

/// SQLite caps the number of bound parameters per statement, so bulk inserts
/// are split into statements of at most this many rows.
const INSERT_CHUNK_SIZE: usize = 1000;

pub trait Write {
    type Returns;

    /// # Errors
    fn write(self, db_conn: &mut SqliteConnection) -> error::Result<Self::Returns>;
}

pub trait FetchAll: Sized {
    /// # Errors
    fn fetch_all(db_conn: &mut SqliteConnection) -> error::Result<Self>;
}

/// Inserts every record inside one transaction, in order. Returns the number
/// of rows inserted.
impl Write for &[NewSampleRecord] {
    type Returns = usize;

    fn write(self, db_conn: &mut SqliteConnection) -> error::Result<Self::Returns> {
        let inserted = db_conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let mut inserted = 0;
            for chunk in self.chunks(INSERT_CHUNK_SIZE) {
                inserted += diesel::insert_into(cell_counts::table)
                    .values(chunk)
                    .execute(conn)?;
            }

            Ok(inserted)
        })?;

        Ok(inserted)
    }
}

impl FetchAll for SampleTable {
    fn fetch_all(db_conn: &mut SqliteConnection) -> error::Result<Self> {
        let records: Vec<SampleRecord> = cell_counts::table
            .select(SampleRecord::as_select())
            .order_by(cell_counts::id)
            .load(db_conn)?;

        Ok(records.into())
    }
}

/// Drops the `cell_counts` table if present and creates it empty.
///
/// # Errors
pub fn initialize_schema(db_conn: &mut SqliteConnection) -> error::Result<()> {
    db_conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::sql_query(DROP_TABLE).execute(conn)?;
        diesel::sql_query(CREATE_TABLE).execute(conn)?;

        Ok(())
    })?;

    tracing::debug!("recreated table {TABLE_NAME}");

    Ok(())
}

/// # Errors
pub fn table_exists(db_conn: &mut SqliteConnection) -> error::Result<bool> {
    let query = format!(
        "EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '{TABLE_NAME}')"
    );

    Ok(diesel::select(sql::<Bool>(&query)).get_result::<bool>(db_conn)?)
}

/// A single-file SQLite store. Every operation opens its own connection, which
/// is closed when the operation returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    path: Utf8PathBuf,
}

impl Store {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Opens a connection, creating the file if it does not exist.
    ///
    /// # Errors
    pub fn connect(&self) -> error::Result<SqliteConnection> {
        SqliteConnection::establish(self.path.as_str()).map_err(|err| error::Error::Connection {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }

    /// Reads the whole table. Never creates the store and never fails: every
    /// problem is reported as a `LoadOutcome` variant.
    #[must_use]
    pub fn load_all(&self) -> LoadOutcome {
        if !self.exists() {
            tracing::debug!(path = %self.path, "store does not exist");
            return LoadOutcome::Absent;
        }

        match self.try_load() {
            Ok(Some(table)) => {
                tracing::debug!(path = %self.path, n_rows = table.len(), "loaded {TABLE_NAME}");
                LoadOutcome::Loaded(Arc::new(table))
            }
            Ok(None) => {
                tracing::warn!(path = %self.path, "store has no {TABLE_NAME} table");
                LoadOutcome::SchemaMissing
            }
            Err(err) => {
                tracing::error!(path = %self.path, error = %err, "failed to read store");
                LoadOutcome::AccessError(err.to_string())
            }
        }
    }

    fn try_load(&self) -> error::Result<Option<SampleTable>> {
        let mut db_conn = self.connect()?;

        if !table_exists(&mut db_conn)? {
            return Ok(None);
        }

        SampleTable::fetch_all(&mut db_conn).map(Some)
    }

    /// Recreates the table and fills it with `records`.
    ///
    /// # Errors
    pub fn replace_with(&self, records: &[NewSampleRecord]) -> error::Result<usize> {
        let mut db_conn = self.connect()?;

        initialize_schema(&mut db_conn)?;
        records.write(&mut db_conn)
    }

    /// Writes the demo dataset. Returns the number of rows written.
    ///
    /// # Errors
    pub fn create_demo(&self) -> error::Result<usize> {
        let inserted = self.replace_with(&demo_records())?;
        tracing::info!(path = %self.path, n_rows = inserted, "created demo store");

        Ok(inserted)
    }
}
