use std::path::{Path, PathBuf};

/// Where table files live and how hard writes are pushed to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub data_dir: PathBuf,
    /// `fsync` file data after every append and tombstone write.
    pub sync_writes: bool,
}

impl DatabaseConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            sync_writes: false,
        }
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Deterministic file path for a table: `<data_dir>/<db>_<table>.db`.
    pub fn table_path(&self, database_name: &str, table_name: &str) -> PathBuf {
        self.data_dir.join(format!(
            "{}_{}.db",
            sanitize_name(database_name),
            sanitize_name(table_name)
        ))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Strip parent-directory sequences and path separators so a name can never
/// escape the data directory.
pub fn sanitize_name(name: &str) -> String {
    name.replace("..", "").replace(['/', '\\'], "")
}
