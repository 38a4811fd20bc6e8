use std::{
    fs::File,
    io::{BufReader, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use crate::{
    executor::scan::Scanner,
    storage::{
        record::{DecodedRecord, RecordRead, read_record},
        schema::TableSchema,
    },
    types::{FileOffset, error::DatabaseError, row::Row},
};

/// A record together with the offset of its tombstone flag.
#[derive(Debug, Clone)]
pub struct ScannedRecord {
    pub offset: FileOffset,
    pub record: DecodedRecord,
}

/// Reads a table file front to back, one record at a time.
pub struct SequentialScanner<'a> {
    reader: BufReader<File>,
    schema: &'a TableSchema,
    path: PathBuf,
    offset: FileOffset,
    truncated_at: Option<FileOffset>,
    is_exhausted: bool,
}

impl<'a> SequentialScanner<'a> {
    pub fn new(path: &Path, schema: &'a TableSchema) -> Result<Self, DatabaseError> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            schema,
            path: path.to_path_buf(),
            offset: 0,
            truncated_at: None,
            is_exhausted: false,
        })
    }

    /// Next record in file order, tombstoned ones included.
    pub fn next_record(&mut self) -> Result<Option<ScannedRecord>, DatabaseError> {
        if self.is_exhausted {
            return Ok(None);
        }

        let offset = self.offset;
        let read = read_record(&mut self.reader, self.schema).map_err(|e| match e {
            DatabaseError::SerializationError { details } => DatabaseError::CorruptedRecord {
                path: self.path.display().to_string(),
                offset,
                reason: details,
            },
            other => other,
        })?;

        match read {
            RecordRead::Record(record) => {
                self.offset += record.length;
                Ok(Some(ScannedRecord { offset, record }))
            }
            RecordRead::End => {
                self.is_exhausted = true;
                Ok(None)
            }
            RecordRead::Truncated => {
                self.is_exhausted = true;
                self.truncated_at = Some(offset);
                Ok(None)
            }
        }
    }

    /// Offset of an incomplete trailing record, if the scan ran into one.
    pub fn truncated_at(&self) -> Option<FileOffset> {
        self.truncated_at
    }

    pub fn offset(&self) -> FileOffset {
        self.offset
    }
}

impl Scanner for SequentialScanner<'_> {
    fn scan(&mut self) -> Result<Option<Row>, DatabaseError> {
        while let Some(scanned) = self.next_record()? {
            if !scanned.record.deleted {
                return Ok(Some(scanned.record.row));
            }
        }
        Ok(None)
    }

    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Row>, DatabaseError> {
        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match self.scan()? {
                Some(row) => batch.push(row),
                None => break,
            }
        }
        Ok(batch)
    }

    fn reset(&mut self) -> Result<(), DatabaseError> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.offset = 0;
        self.truncated_at = None;
        self.is_exhausted = false;
        Ok(())
    }
}
