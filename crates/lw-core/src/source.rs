//! Log source abstraction: read raw lines from files or memory.

use async_trait::async_trait;

use crate::error::{MergeError, MergeResult};

/// Abstraction for reading the raw lines of a named source.
///
/// The merge pipeline only ever asks for whole sources; backends decide how
/// a name maps to data (a path on disk, a label in memory).
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Read all lines of the named source, without line terminators.
    async fn read_lines(&self, name: &str) -> MergeResult<Vec<String>>;

    /// Check if a source exists and can be read. Checked for every source
    /// before any is read.
    async fn exists(&self, name: &str) -> bool;
}

/// Reads logs from the local filesystem.
///
/// Invalid UTF-8 is replaced rather than rejected so one bad byte does not
/// hide a whole file.
pub struct FileLogSource;

#[async_trait]
impl LogSource for FileLogSource {
    async fn read_lines(&self, name: &str) -> MergeResult<Vec<String>> {
        let bytes = tokio::fs::read(name).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MergeError::NotFound(name.to_string())
            } else {
                MergeError::Io(format!("{name}: {e}"))
            }
        })?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(content.lines().map(String::from).collect())
    }

    async fn exists(&self, name: &str) -> bool {
        tokio::fs::metadata(name)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}
