//! # tb-storage-local
//!
//! Local filesystem implementation of `MediaStore`. Uploads land in a
//! single directory under a generated `uuid.ext` filename; the
//! directory is created on first use.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tb_core::error::{AppError, Result};
use tb_core::traits::MediaStore;
use tokio::fs;
use uuid::Uuid;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// A stored name must be a bare filename; anything that could step
    /// outside the upload directory is treated as absent.
    fn resolve(&self, savefile: &str) -> Result<PathBuf> {
        let is_bare = Path::new(savefile)
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)))
            && !savefile.contains('/')
            && !savefile.contains('\\');
        if savefile.is_empty() || !is_bare {
            return Err(AppError::NotFound("Attachment".to_string()));
        }
        Ok(self.root.join(savefile))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save(&self, data: Vec<u8>, original_name: &str) -> Result<String> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");
        let savefile = format!("{}.{}", Uuid::new_v4(), extension);

        fs::write(self.root.join(&savefile), &data)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(savefile)
    }

    async fn load(&self, savefile: &str) -> Result<Vec<u8>> {
        let path = self.resolve(savefile)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("Attachment".to_string()))
            }
            Err(e) => Err(AppError::Internal(e.to_string())),
        }
    }

    async fn remove(&self, savefile: &str) -> Result<()> {
        let path = self.resolve(savefile)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone is the desired end state.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(e.to_string())),
        }
    }
}
