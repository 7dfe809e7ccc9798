//! # File Store
//!
//! List, read and write files inside the sandbox. Paths are confined by
//! [`Sandbox::resolve_path`] before any I/O happens.
//! Concurrent writers to one file race at the filesystem; last writer wins.

use std::sync::Arc;

use crate::domain::error::ToolError;
use crate::infrastructure::sandbox::Sandbox;

#[derive(Debug, Clone)]
pub struct FileStore {
    sandbox: Arc<Sandbox>,
}

impl FileStore {
    pub fn new(sandbox: Arc<Sandbox>) -> Self {
        Self { sandbox }
    }

    /// Names of regular files directly inside the sandbox root, sorted.
    pub async fn list(&self) -> Result<Vec<String>, ToolError> {
        let mut entries = tokio::fs::read_dir(self.sandbox.root()).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let is_file = tokio::fs::metadata(entry.path())
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if is_file {
                files.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        files.sort();
        Ok(files)
    }

    pub async fn read(&self, filename: &str) -> Result<String, ToolError> {
        let path = self.sandbox.resolve_path(filename)?;
        tracing::info!("Reading file: {}", path.display());

        if !tokio::fs::try_exists(&path).await? {
            return Err(ToolError::NotFound(filename.to_string()));
        }

        let bytes = tokio::fs::read(&path).await?;
        String::from_utf8(bytes).map_err(|_| ToolError::NotText(filename.to_string()))
    }

    /// Writes `content`, creating parent directories. Returns the byte count.
    pub async fn write(&self, filename: &str, content: &str) -> Result<usize, ToolError> {
        let path = self.sandbox.resolve_path(filename)?;
        tracing::info!("Writing to file: {}", path.display());

        if let Some(parent) = path.parent()
            && !tokio::fs::try_exists(parent).await?
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, content).await?;
        Ok(content.len())
    }
}
