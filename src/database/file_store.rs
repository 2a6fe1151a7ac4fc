use std::path::{Component, Path, PathBuf};

use crate::document::UploadedFile;
use crate::error::{RagError, Result};

/// Writes uploads verbatim under a single root directory, keyed by filename.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Saves `file` to `<root>/<name>`, overwriting any previous file of the
    /// same name, and returns the written path.
    pub async fn save(&self, file: &UploadedFile) -> Result<PathBuf> {
        validate_file_name(&file.name)?;
        if file.bytes.is_empty() {
            return Err(RagError::InvalidUpload(format!("{} is empty", file.name)));
        }

        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(&file.name);
        tokio::fs::write(&path, &file.bytes).await?;

        log::info!("Saved {} ({} bytes) to {}", file.name, file.bytes.len(), path.display());
        Ok(path)
    }
}

/// Accepts only a bare file name: no separators, no `.`/`..`.
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RagError::InvalidUpload("file name is empty".to_string()));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(RagError::InvalidUpload(format!("invalid file name: {}", name)));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(RagError::InvalidUpload(format!("invalid file name: {}", name))),
    }
}
