use crate::utils::error::Result;
use std::path::{Path, PathBuf};

pub const JSON_GLOB: &str = "**/*.json";

/// 遞迴列出根目錄下的 `*.json` 檔案（相對路徑，依 glob 順序）
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    root: PathBuf,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scan(&self) -> Result<Vec<String>> {
        let escaped_root = glob::Pattern::escape(&self.root.to_string_lossy());
        let pattern = format!("{}/{}", escaped_root.trim_end_matches('/'), JSON_GLOB);
        tracing::debug!("Scanning with pattern {}", pattern);

        // 與 shell glob 相同：`*`/`**` 不匹配以 `.` 開頭的檔案或目錄
        let options = glob::MatchOptions {
            require_literal_leading_dot: true,
            ..Default::default()
        };

        let mut files = Vec::new();
        for entry in glob::glob_with(&pattern, options)? {
            match entry {
                Ok(path) if path.is_file() => {
                    let relative = path.strip_prefix(&self.root).unwrap_or(&path);
                    files.push(relative.to_string_lossy().into_owned());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("⚠️ Skipping unreadable path {}: {}", e.path().display(), e),
            }
        }

        Ok(files)
    }
}
