pub mod error;
pub mod row;
pub mod value;

// Common type aliases
pub type RowId = i32;
pub type FileOffset = u64;

// On-disk record layout
pub const TOMBSTONE_LIVE: u8 = 0;
pub const TOMBSTONE_DELETED: u8 = 1;
pub const TOMBSTONE_SIZE: usize = 1;
pub const ROW_ID_SIZE: usize = 4;
pub const RECORD_HEADER_SIZE: usize = TOMBSTONE_SIZE + ROW_ID_SIZE;
pub const INTEGER_SIZE: usize = 4;
pub const TEXT_LENGTH_PREFIX_SIZE: usize = 4;

/// Name of the mandatory primary key column.
pub const PRIMARY_KEY_COLUMN: &str = "id";
