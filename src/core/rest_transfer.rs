use crate::adapters::webhdfs::WebHdfsClient;
use crate::domain::model::{RemoteFileInfo, TransferTarget};
use crate::utils::error::{EtlError, Result};
use std::path::Path;

/// WebHDFS 版本的上傳：建立目錄（失敗只警告）→ 上傳 → 查詢檔案大小
pub struct WebHdfsUploader {
    client: WebHdfsClient,
    overwrite: bool,
}

impl WebHdfsUploader {
    pub fn new(client: WebHdfsClient, overwrite: bool) -> Self {
        Self { client, overwrite }
    }

    pub async fn upload(&self, target: &TransferTarget) -> Result<RemoteFileInfo> {
        let local = Path::new(&target.local_path);
        if !local.is_file() {
            return Err(EtlError::LocalFileNotFound {
                path: target.local_path.clone(),
            });
        }

        let remote_dir = target.remote_parent();
        match self.client.make_dirs(remote_dir).await {
            Ok(true) => tracing::info!("✓ Created/verified directory: {}", remote_dir),
            Ok(false) => tracing::warn!("Warning: MKDIRS {} returned false", remote_dir),
            Err(e) => tracing::warn!("Warning: {}", e),
        }

        tracing::info!("Uploading {} to {}...", target.local_path, target.remote_path);
        self.client
            .upload(&target.remote_path, local, self.overwrite)
            .await?;
        tracing::info!("✓ Successfully uploaded to {}", target.remote_path);

        let status = self.client.status(&target.remote_path).await?;
        Ok(RemoteFileInfo {
            path: target.remote_path.clone(),
            length: status.length,
        })
    }
}
