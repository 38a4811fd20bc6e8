//! Binary record layout of a table file.
//!
//! Every record is, little-endian and without padding:
//! a 1-byte tombstone flag (0 = live), the 4-byte signed row id, then each
//! non-id column in schema order: 4 bytes for an int, or a 4-byte signed
//! length followed by that many UTF-8 bytes for text.
//!
//! Records carry no type tags, so decoding needs the schema the file was
//! written under.

use std::io::{self, Cursor, Read};

use tracing::warn;

use crate::{
    storage::schema::TableSchema,
    types::{
        FileOffset, RECORD_HEADER_SIZE, RowId, TOMBSTONE_DELETED, TOMBSTONE_LIVE,
        error::DatabaseError,
        row::Row,
        value::{DataType, Value},
    },
};

/// A record as found in the file, tombstoned or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub deleted: bool,
    pub row: Row,
    /// Encoded length in bytes, header included.
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRead {
    Record(DecodedRecord),
    /// Clean end of file at a record boundary.
    End,
    /// The file ends in the middle of a record (torn append).
    Truncated,
}

/// Encoded size of a live record for `row`.
pub fn encoded_size(row: &Row, schema: &TableSchema) -> usize {
    RECORD_HEADER_SIZE
        + row
            .non_key_values(schema)
            .map(Value::serialized_size)
            .sum::<usize>()
}

/// Encode `row` as a live record.
pub fn encode_record(row: &Row, schema: &TableSchema) -> Result<Vec<u8>, DatabaseError> {
    schema.validate_row(row)?;

    let mut buffer = Vec::with_capacity(encoded_size(row, schema));
    buffer.push(TOMBSTONE_LIVE);
    buffer.extend_from_slice(&row.id.to_le_bytes());

    for value in row.non_key_values(schema) {
        match value {
            Value::Integer(i) => buffer.extend_from_slice(&i.to_le_bytes()),
            Value::Text(s) => {
                let length = i32::try_from(s.len()).map_err(|_| DatabaseError::SerializationError {
                    details: format!("text value of {} bytes is too long", s.len()),
                })?;
                buffer.extend_from_slice(&length.to_le_bytes());
                buffer.extend_from_slice(s.as_bytes());
            }
        }
    }

    Ok(buffer)
}

/// Decode a single record from the start of `bytes`.
pub fn decode_record(bytes: &[u8], schema: &TableSchema) -> Result<DecodedRecord, DatabaseError> {
    match read_record(&mut Cursor::new(bytes), schema)? {
        RecordRead::Record(record) => Ok(record),
        RecordRead::End => Err(DatabaseError::SerializationError {
            details: "Empty bytes".to_string(),
        }),
        RecordRead::Truncated => Err(DatabaseError::SerializationError {
            details: "Incomplete record".to_string(),
        }),
    }
}

/// Read the next record from `reader`.
pub fn read_record<R: Read>(reader: &mut R, schema: &TableSchema) -> Result<RecordRead, DatabaseError> {
    let mut flag = [0u8; 1];
    if !read_first_byte(reader, &mut flag)? {
        return Ok(RecordRead::End);
    }

    let mut length = 1u64;
    let mut id_bytes = [0u8; 4];
    if !fill(reader, &mut id_bytes)? {
        return Ok(RecordRead::Truncated);
    }
    length += 4;
    let id = RowId::from_le_bytes(id_bytes);

    let id_position = schema.id_position();
    let mut values = Vec::with_capacity(schema.columns.len());
    for (i, column) in schema.columns.iter().enumerate() {
        if i == id_position {
            values.push(Value::Integer(id));
            continue;
        }

        let mut word = [0u8; 4];
        if !fill(reader, &mut word)? {
            return Ok(RecordRead::Truncated);
        }
        length += 4;

        match column.data_type {
            DataType::Integer => values.push(Value::Integer(i32::from_le_bytes(word))),
            DataType::Text => {
                let text_length = i32::from_le_bytes(word);
                if text_length < 0 {
                    return Err(DatabaseError::SerializationError {
                        details: format!(
                            "negative text length {} for column '{}'",
                            text_length, column.name
                        ),
                    });
                }

                let mut text = Vec::new();
                reader
                    .by_ref()
                    .take(text_length as u64)
                    .read_to_end(&mut text)?;
                if text.len() != text_length as usize {
                    return Ok(RecordRead::Truncated);
                }
                length += text_length as u64;

                let text = String::from_utf8(text).map_err(|e| DatabaseError::SerializationError {
                    details: format!("invalid UTF-8 in column '{}': {}", column.name, e),
                })?;
                values.push(Value::Text(text));
            }
        }
    }

    Ok(RecordRead::Record(DecodedRecord {
        deleted: flag[0] != TOMBSTONE_LIVE,
        row: Row::new(id, values),
        length,
    }))
}

/// The single byte written over a record's flag to tombstone it.
pub fn tombstone_flag() -> [u8; 1] {
    [TOMBSTONE_DELETED]
}

/// Byte-level access to a table file for the write path.
///
/// `append` may leave a prefix of `bytes` behind when it fails; callers go
/// through [`append_record`] which cuts it off again.
pub trait RecordSink {
    /// Current length, i.e. where the next append lands.
    fn end_offset(&mut self) -> io::Result<u64>;
    fn append(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

/// Append encoded records at the end of the sink and return where they start.
/// On failure the sink is truncated back to its previous length.
pub fn append_record<S: RecordSink>(sink: &mut S, bytes: &[u8]) -> Result<FileOffset, DatabaseError> {
    let offset = sink.end_offset()?;
    if let Err(e) = sink.append(bytes) {
        rollback(sink, offset);
        return Err(e.into());
    }
    Ok(offset)
}

/// Overwrite the flag byte of the record at `offset`.
pub fn tombstone_record<S: RecordSink>(sink: &mut S, offset: FileOffset) -> Result<(), DatabaseError> {
    sink.write_at(offset, &tombstone_flag())?;
    Ok(())
}

/// Append the new version of a record and tombstone the old one.
///
/// If the tombstone cannot be written the new version is cut off again, so
/// the sink never ends up with both versions live.
pub fn replace_record<S: RecordSink>(
    sink: &mut S,
    old_offset: FileOffset,
    bytes: &[u8],
) -> Result<FileOffset, DatabaseError> {
    let new_offset = append_record(sink, bytes)?;
    if let Err(e) = tombstone_record(sink, old_offset) {
        rollback(sink, new_offset);
        return Err(e);
    }
    Ok(new_offset)
}

fn rollback<S: RecordSink>(sink: &mut S, len: u64) {
    if let Err(e) = sink.truncate(len) {
        warn!("Failed to truncate table file back to {} bytes: {}", len, e);
    }
}

fn read_first_byte<R: Read>(reader: &mut R, buf: &mut [u8; 1]) -> Result<bool, DatabaseError> {
    loop {
        match reader.read(buf) {
            Ok(0) => return Ok(false),
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// `read_exact` that reports a short read as `false` instead of an error.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool, DatabaseError> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}
