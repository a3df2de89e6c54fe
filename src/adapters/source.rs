use crate::domain::ports::InputSource;
use crate::utils::error::{ProcessError, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 伺服器本機上的 CSV 檔案
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 在執行開始前確認檔案存在
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            Ok(())
        } else {
            Err(ProcessError::InputNotFound {
                path: self.path.display().to_string(),
            })
        }
    }
}

impl InputSource for LocalFileSource {
    type Reader = File;

    fn open(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ProcessError::InputNotFound {
                path: self.path.display().to_string(),
            },
            _ => ProcessError::IoError(e),
        })
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// 上傳後落地的暫存檔；執行結束時刪除
#[derive(Debug)]
pub struct UploadedFileSource {
    file: NamedTempFile,
    original_name: Option<String>,
}

impl UploadedFileSource {
    pub fn new(file: NamedTempFile, original_name: Option<String>) -> Self {
        Self {
            file,
            original_name,
        }
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    /// 刪除暫存檔並回報刪除失敗
    pub fn close(self) -> io::Result<()> {
        self.file.close()
    }
}

impl InputSource for UploadedFileSource {
    type Reader = File;

    fn open(&self) -> Result<File> {
        self.file.reopen().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ProcessError::InputNotFound {
                path: self.file.path().display().to_string(),
            },
            _ => ProcessError::IoError(e),
        })
    }

    fn describe(&self) -> String {
        format!(
            "upload {} ({})",
            self.original_name.as_deref().unwrap_or("<unnamed>"),
            self.file.path().display()
        )
    }

    fn release(self) {
        let path = self.file.path().to_path_buf();
        match self.close() {
            Ok(()) => tracing::debug!("🧹 Removed upload {}", path.display()),
            Err(e) => tracing::warn!("⚠️ Failed to clean up upload {}: {}", path.display(), e),
        }
    }
}
