use std::{
    collections::{HashMap, HashSet},
    fs::{self, File, OpenOptions},
    io::{self, BufReader, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    executor::{
        insert::Inserter,
        scan::Scanner,
        sequential_scan::SequentialScanner,
    },
    storage::{
        config::DatabaseConfig,
        record::{
            DecodedRecord, RecordRead, RecordSink, append_record, encode_record, read_record,
            replace_record, tombstone_record,
        },
        schema::TableSchema,
    },
    types::{FileOffset, RowId, error::DatabaseError, row::Row},
};

/// In-memory state rebuilt from the file on every open.
#[derive(Debug, Default)]
struct TableState {
    /// id -> offset of the live record's tombstone flag.
    primary_index: HashMap<RowId, FileOffset>,
    /// column name -> stringified values held by live rows.
    unique_sets: HashMap<String, HashSet<String>>,
    dropped: bool,
}

/// Read-write handle on a table file. Only used under the table write lock.
struct TableFile {
    file: File,
    sync_writes: bool,
}

impl TableFile {
    fn sync(&self) -> io::Result<()> {
        if self.sync_writes {
            self.file.sync_data()
        } else {
            Ok(())
        }
    }
}

impl RecordSink for TableFile {
    fn end_offset(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(bytes)?;
        self.file.flush()?;
        self.sync()
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        self.file.flush()?;
        self.sync()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.file.set_len(len)?;
        self.sync()
    }
}

/// One table backed by an append-only file.
///
/// Reads take the table lock in shared mode, every mutation takes it
/// exclusively for the full duration of its file I/O.
#[derive(Debug)]
pub struct Table {
    database_name: String,
    schema: TableSchema,
    path: PathBuf,
    sync_writes: bool,
    state: RwLock<TableState>,
}

impl Table {
    /// Open (or create) the backing file and rebuild the indexes from it.
    pub fn open(
        config: &DatabaseConfig,
        database_name: &str,
        schema: TableSchema,
    ) -> Result<Self, DatabaseError> {
        fs::create_dir_all(config.data_dir())?;
        let path = config.table_path(database_name, &schema.table_name);

        if !path.exists() {
            info!("Creating table file at path: {}", path.display());
            File::create(&path)?;
        } else {
            info!("Opening existing table file at path: {}", path.display());
        }

        let table = Self {
            database_name: database_name.to_string(),
            schema,
            path,
            sync_writes: config.sync_writes,
            state: RwLock::new(TableState::default()),
        };

        {
            let mut state = table.state.write();
            table.rebuild_locked(&mut state)?;
        }

        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.schema.table_name
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of live rows.
    pub fn row_count(&self) -> usize {
        self.state.read().primary_index.len()
    }

    /// Whether `value` is currently recorded in the uniqueness set of `column`.
    pub fn has_unique_value(&self, column: &str, value: &str) -> bool {
        self.state
            .read()
            .unique_sets
            .get(column)
            .is_some_and(|set| set.contains(value))
    }

    /// Tombstone the live record for `id`.
    pub fn delete(&self, id: RowId) -> Result<Row, DatabaseError> {
        let mut state = self.state.write();
        self.ensure_live(&state)?;
        let row = self.delete_locked(&mut state, id)?;
        debug!("Deleted row {} from table '{}'", id, self.name());
        Ok(row)
    }

    /// Replace the live version of `row.id` with `row`.
    ///
    /// Runs as a single critical section: the new version is appended before
    /// the old one is tombstoned, so no reader ever sees the id missing.
    pub fn update(&self, row: Row) -> Result<(), DatabaseError> {
        let mut state = self.state.write();
        self.ensure_live(&state)?;
        let (old_offset, old_row) = self.load_live(&state, row.id)?;
        self.update_locked(&mut state, row, old_offset, &old_row)
    }

    /// Read-modify-write of one row under a single write lock.
    pub fn modify<F>(&self, id: RowId, apply: F) -> Result<Row, DatabaseError>
    where
        F: FnOnce(&mut Row) -> Result<(), DatabaseError>,
    {
        let mut state = self.state.write();
        self.ensure_live(&state)?;
        let (old_offset, old_row) = self.load_live(&state, id)?;

        let mut row = old_row.clone();
        apply(&mut row)?;
        if row.id != id {
            return Err(DatabaseError::syntax(format!(
                "primary key of row {} cannot be changed",
                id
            )));
        }

        self.update_locked(&mut state, row.clone(), old_offset, &old_row)?;
        Ok(row)
    }

    /// Point lookup through the primary key index.
    pub fn select_by_id(&self, id: RowId) -> Result<Option<Row>, DatabaseError> {
        let state = self.state.read();
        self.ensure_live(&state)?;

        let Some(&offset) = state.primary_index.get(&id) else {
            return Ok(None);
        };
        let record = self.read_at(offset)?;
        if record.deleted {
            return Ok(None);
        }
        Ok(Some(record.row))
    }

    /// Every live row, in file order.
    pub fn select_all(&self) -> Result<Vec<Row>, DatabaseError> {
        let state = self.state.read();
        self.ensure_live(&state)?;

        let mut scanner = SequentialScanner::new(&self.path, &self.schema)?;
        let mut rows = Vec::with_capacity(state.primary_index.len());
        while let Some(row) = scanner.scan()? {
            rows.push(row);
        }
        if let Some(offset) = scanner.truncated_at() {
            warn!(
                "Table '{}' ends in an incomplete record at offset {}",
                self.name(),
                offset
            );
        }
        Ok(rows)
    }

    /// Throw away the in-memory indexes and derive them again from the file.
    pub fn rebuild_index(&self) -> Result<(), DatabaseError> {
        let mut state = self.state.write();
        self.ensure_live(&state)?;
        self.rebuild_locked(&mut state)
    }

    /// Delete the backing file. The handle is unusable afterwards.
    pub fn drop_table(&self) -> Result<(), DatabaseError> {
        let mut state = self.state.write();
        self.ensure_live(&state)?;

        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        state.primary_index.clear();
        state.unique_sets.clear();
        state.dropped = true;

        info!("Dropped table '{}' ({})", self.name(), self.path.display());
        Ok(())
    }

    fn ensure_live(&self, state: &TableState) -> Result<(), DatabaseError> {
        if state.dropped {
            return Err(DatabaseError::TableNotFound {
                name: self.name().to_string(),
            });
        }
        Ok(())
    }

    fn row_not_found(&self, id: RowId) -> DatabaseError {
        DatabaseError::RowNotFound {
            table: self.name().to_string(),
            id,
        }
    }

    fn check_constraints(&self, state: &TableState, row: &Row) -> Result<(), DatabaseError> {
        self.schema.validate_row(row)?;

        if state.primary_index.contains_key(&row.id) {
            return Err(DatabaseError::DuplicateKey {
                table: self.name().to_string(),
                id: row.id,
            });
        }

        for (position, column) in self.schema.unique_columns() {
            let value = row.values[position].to_string();
            if state
                .unique_sets
                .get(&column.name)
                .is_some_and(|set| set.contains(&value))
            {
                return Err(DatabaseError::UniqueViolation {
                    column: column.name.clone(),
                    value,
                });
            }
        }

        Ok(())
    }

    fn load_live(&self, state: &TableState, id: RowId) -> Result<(FileOffset, Row), DatabaseError> {
        let offset = *state
            .primary_index
            .get(&id)
            .ok_or_else(|| self.row_not_found(id))?;
        Ok((offset, self.read_at(offset)?.row))
    }

    fn update_locked(
        &self,
        state: &mut TableState,
        row: Row,
        old_offset: FileOffset,
        old_row: &Row,
    ) -> Result<(), DatabaseError> {
        self.schema.validate_row(&row)?;

        for (position, column) in self.schema.unique_columns() {
            let old_value = old_row.values[position].to_string();
            let new_value = row.values[position].to_string();
            if old_value != new_value
                && state
                    .unique_sets
                    .get(&column.name)
                    .is_some_and(|set| set.contains(&new_value))
            {
                return Err(DatabaseError::UniqueViolation {
                    column: column.name.clone(),
                    value: new_value,
                });
            }
        }

        let bytes = encode_record(&row, &self.schema)?;
        let new_offset = replace_record(&mut self.open_file()?, old_offset, &bytes)?;

        state.primary_index.insert(row.id, new_offset);
        for (position, column) in self.schema.unique_columns() {
            if let Some(set) = state.unique_sets.get_mut(&column.name) {
                set.remove(&old_row.values[position].to_string());
                set.insert(row.values[position].to_string());
            }
        }

        debug!(
            "Updated row {} in table '{}' ({} -> {})",
            row.id,
            self.name(),
            old_offset,
            new_offset
        );
        Ok(())
    }

    fn insert_locked(&self, state: &mut TableState, row: &Row) -> Result<FileOffset, DatabaseError> {
        self.check_constraints(state, row)?;

        let bytes = encode_record(row, &self.schema)?;
        let offset = append_record(&mut self.open_file()?, &bytes)?;
        self.index_row(state, row, offset);
        Ok(offset)
    }

    fn delete_locked(&self, state: &mut TableState, id: RowId) -> Result<Row, DatabaseError> {
        // The old values are needed to release their uniqueness entries.
        let (offset, row) = self.load_live(state, id)?;
        tombstone_record(&mut self.open_file()?, offset)?;

        state.primary_index.remove(&id);
        for (position, column) in self.schema.unique_columns() {
            if let Some(set) = state.unique_sets.get_mut(&column.name) {
                set.remove(&row.values[position].to_string());
            }
        }

        Ok(row)
    }

    fn index_row(&self, state: &mut TableState, row: &Row, offset: FileOffset) {
        state.primary_index.insert(row.id, offset);
        for (position, column) in self.schema.unique_columns() {
            state
                .unique_sets
                .entry(column.name.clone())
                .or_default()
                .insert(row.values[position].to_string());
        }
    }

    fn rebuild_locked(&self, state: &mut TableState) -> Result<(), DatabaseError> {
        state.primary_index.clear();
        state.unique_sets = self
            .schema
            .unique_columns()
            .map(|(_, column)| (column.name.clone(), HashSet::new()))
            .collect();

        let mut live_rows: HashMap<RowId, Row> = HashMap::new();
        let mut superseded = Vec::new();
        let mut total_records = 0usize;

        let mut scanner = SequentialScanner::new(&self.path, &self.schema)?;
        while let Some(scanned) = scanner.next_record()? {
            total_records += 1;
            if scanned.record.deleted {
                continue;
            }

            let row = scanned.record.row;
            if let Some(previous_offset) = state.primary_index.insert(row.id, scanned.offset) {
                // An update died between its append and its tombstone write.
                // The later version wins.
                superseded.push(previous_offset);
                if let Some(previous) = live_rows.remove(&row.id) {
                    for (position, column) in self.schema.unique_columns() {
                        if let Some(set) = state.unique_sets.get_mut(&column.name) {
                            set.remove(&previous.values[position].to_string());
                        }
                    }
                }
            }
            for (position, column) in self.schema.unique_columns() {
                if let Some(set) = state.unique_sets.get_mut(&column.name) {
                    set.insert(row.values[position].to_string());
                }
            }
            live_rows.insert(row.id, row);
        }
        let truncated_at = scanner.truncated_at();
        drop(scanner);

        if let Some(offset) = truncated_at {
            warn!(
                "Table '{}' has an incomplete trailing record at offset {}, truncating",
                self.name(),
                offset
            );
            self.open_file()?.truncate(offset)?;
        }

        if !superseded.is_empty() {
            let mut file = self.open_file()?;
            for offset in superseded {
                warn!(
                    "Table '{}' has a superseded live record at offset {}, tombstoning it",
                    self.name(),
                    offset
                );
                tombstone_record(&mut file, offset)?;
            }
        }

        info!(
            "Rebuilt index for table '{}': {} live rows out of {} records",
            self.name(),
            state.primary_index.len(),
            total_records
        );
        Ok(())
    }

    fn open_file(&self) -> Result<TableFile, DatabaseError> {
        let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        Ok(TableFile {
            file,
            sync_writes: self.sync_writes,
        })
    }

    fn read_at(&self, offset: FileOffset) -> Result<DecodedRecord, DatabaseError> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(file);

        let corrupted = |reason: String| DatabaseError::CorruptedRecord {
            path: self.path.display().to_string(),
            offset,
            reason,
        };

        match read_record(&mut reader, &self.schema) {
            Ok(RecordRead::Record(record)) => Ok(record),
            Ok(RecordRead::End) | Ok(RecordRead::Truncated) => {
                Err(corrupted("indexed record is missing or incomplete".to_string()))
            }
            Err(DatabaseError::SerializationError { details }) => Err(corrupted(details)),
            Err(e) => Err(e),
        }
    }
}

impl Inserter for Table {
    fn insert(&self, row: Row) -> Result<(), DatabaseError> {
        let mut state = self.state.write();
        self.ensure_live(&state)?;
        let offset = self.insert_locked(&mut state, &row)?;
        debug!(
            "Inserted row {} into table '{}' at offset {}",
            row.id,
            self.name(),
            offset
        );
        Ok(())
    }

    fn insert_batch(&self, rows: Vec<Row>) -> Result<(), DatabaseError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write();
        self.ensure_live(&state)?;

        // Validate all rows before writing anything, including collisions
        // inside the batch itself.
        let mut batch_ids = HashSet::new();
        let mut batch_unique: HashMap<&str, HashSet<String>> = HashMap::new();
        for row in &rows {
            self.check_constraints(&state, row)?;
            if !batch_ids.insert(row.id) {
                return Err(DatabaseError::DuplicateKey {
                    table: self.name().to_string(),
                    id: row.id,
                });
            }
            for (position, column) in self.schema.unique_columns() {
                let value = row.values[position].to_string();
                if !batch_unique
                    .entry(column.name.as_str())
                    .or_default()
                    .insert(value.clone())
                {
                    return Err(DatabaseError::UniqueViolation {
                        column: column.name.clone(),
                        value,
                    });
                }
            }
        }

        let mut buffer = Vec::new();
        let mut relative_offsets = Vec::with_capacity(rows.len());
        for row in &rows {
            relative_offsets.push(buffer.len() as FileOffset);
            buffer.extend_from_slice(&encode_record(row, &self.schema)?);
        }

        let base = append_record(&mut self.open_file()?, &buffer)?;
        for (row, relative) in rows.iter().zip(relative_offsets) {
            self.index_row(&mut state, row, base + relative);
        }

        debug!("Inserted {} rows into table '{}'", rows.len(), self.name());
        Ok(())
    }

    fn table_name(&self) -> &str {
        self.name()
    }
}
