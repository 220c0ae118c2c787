use crate::domain::model::{StepOutcome, TransferReport, TransferStep, TransferTarget};
use crate::domain::ports::{CommandOutput, CommandRunner};
use crate::utils::error::{EtlError, Result};
use chrono::Utc;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONTAINER: &str = "namenode";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// 透過 `docker exec <container> ...` 操作容器內的 HDFS CLI
pub struct DockerHdfs<R: CommandRunner> {
    runner: R,
    docker: String,
    container: String,
}

impl<R: CommandRunner> DockerHdfs<R> {
    pub fn new(runner: R, docker: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            runner,
            docker: docker.into(),
            container: container.into(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    fn command_line(&self, args: &[String]) -> String {
        format!("{} {}", self.docker, args.join(" "))
    }

    fn exec_args(&self, cmd: &[&str]) -> Vec<String> {
        let mut args = vec!["exec".to_string(), self.container.clone()];
        args.extend(cmd.iter().map(|s| s.to_string()));
        args
    }

    fn hdfs_args(&self, cmd: &[&str]) -> Vec<String> {
        let mut full = vec!["hdfs", "dfs"];
        full.extend_from_slice(cmd);
        self.exec_args(&full)
    }

    async fn run(&self, args: &[String]) -> Result<CommandOutput> {
        self.runner.run(&self.docker, args).await
    }

    /// 非零結束碼時回傳 `CommandFailed`，帶上擷取到的 stderr
    async fn run_checked(&self, step: &str, args: &[String]) -> Result<CommandOutput> {
        let output = self.run(args).await?;
        if output.success {
            Ok(output)
        } else {
            Err(EtlError::CommandFailed {
                step: step.to_string(),
                command: self.command_line(args),
                code: output.code,
                stderr: output.stderr,
            })
        }
    }

    pub async fn container_running(&self) -> Result<bool> {
        let args = vec![
            "ps".to_string(),
            "--filter".to_string(),
            format!("name={}", self.container),
            "--format".to_string(),
            "{{.Names}}".to_string(),
        ];

        let output = self.run(&args).await?;
        Ok(output.success
            && output
                .stdout
                .lines()
                .any(|name| name.trim() == self.container))
    }

    pub async fn file_exists_in_container(&self, path: &str) -> Result<bool> {
        let output = self.run(&self.exec_args(&["test", "-f", path])).await?;
        Ok(output.success)
    }

    pub async fn hdfs_path_exists(&self, path: &str) -> Result<bool> {
        let output = self.run(&self.hdfs_args(&["-test", "-e", path])).await?;
        Ok(output.success)
    }

    pub async fn list(&self, path: &str) -> Result<CommandOutput> {
        self.run(&self.hdfs_args(&["-ls", path])).await
    }

    pub async fn copy_into_container(&self, local_path: &str, container_path: &str) -> Result<()> {
        let args = vec![
            "cp".to_string(),
            local_path.to_string(),
            format!("{}:{}", self.container, container_path),
        ];
        self.run_checked("Error copying file", &args).await?;
        Ok(())
    }

    /// `mkdir -p`；目錄已存在的錯誤會被容忍並回傳 `Ok(Some(stderr))`
    pub async fn make_dirs(&self, path: &str) -> Result<Option<String>> {
        let args = self.hdfs_args(&["-mkdir", "-p", path]);
        let output = self.run(&args).await?;
        if output.success {
            return Ok(None);
        }

        if output.stderr.contains("File exists") || output.stderr.contains("already exists") {
            return Ok(Some(output.stderr));
        }

        Err(EtlError::CommandFailed {
            step: "Failed to create HDFS directory".to_string(),
            command: self.command_line(&args),
            code: output.code,
            stderr: output.stderr,
        })
    }

    pub async fn put(&self, container_path: &str, hdfs_path: &str) -> Result<()> {
        let args = self.hdfs_args(&["-put", container_path, hdfs_path]);
        self.run_checked("Error uploading to HDFS", &args).await?;
        Ok(())
    }

    pub async fn remove_in_container(&self, path: &str) -> Result<CommandOutput> {
        self.run(&self.exec_args(&["rm", "-f", path])).await
    }
}

/// 傳輸前的兩項檢查：容器在跑、HDFS 根目錄可列出
pub struct ConnectionChecker<'a, R: CommandRunner> {
    hdfs: &'a DockerHdfs<R>,
    probe_timeout: Duration,
}

impl<'a, R: CommandRunner> ConnectionChecker<'a, R> {
    pub fn new(hdfs: &'a DockerHdfs<R>, probe_timeout: Duration) -> Self {
        Self {
            hdfs,
            probe_timeout,
        }
    }

    pub async fn check(&self) -> Result<()> {
        tracing::info!("Checking HDFS connection...");

        if !self.hdfs.container_running().await? {
            tracing::error!(
                "❌ {} container not running. Start with: docker-compose up -d",
                self.hdfs.container()
            );
            return Err(EtlError::ContainerNotRunning {
                container: self.hdfs.container().to_string(),
            });
        }
        tracing::info!("✓ {} container is running", self.hdfs.container());

        let probe = tokio::time::timeout(self.probe_timeout, self.hdfs.list("/"))
            .await
            .map_err(|_| EtlError::ProbeTimeout {
                seconds: self.probe_timeout.as_secs(),
            })??;

        if !probe.success {
            tracing::error!("❌ HDFS not accessible: {}", probe.stderr);
            return Err(EtlError::HdfsUnreachable {
                message: probe.stderr,
            });
        }

        tracing::info!("✓ HDFS is accessible");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub staging_dir: String,
    pub cleanup_staged: bool,
    pub dry_run: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            staging_dir: "/tmp".to_string(),
            cleanup_staged: false,
            dry_run: false,
        }
    }
}

/// 固定順序的上傳步驟；每一步先檢查目標是否已存在
pub struct HdfsCliUploader<R: CommandRunner> {
    hdfs: DockerHdfs<R>,
    options: UploadOptions,
}

impl<R: CommandRunner> HdfsCliUploader<R> {
    pub fn new(hdfs: DockerHdfs<R>, options: UploadOptions) -> Self {
        Self { hdfs, options }
    }

    pub fn hdfs(&self) -> &DockerHdfs<R> {
        &self.hdfs
    }

    pub fn connection_checker(&self, probe_timeout: Duration) -> ConnectionChecker<'_, R> {
        ConnectionChecker::new(&self.hdfs, probe_timeout)
    }

    fn staged_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.options.staging_dir.trim_end_matches('/'), file_name)
    }

    pub async fn upload(&self, target: &TransferTarget) -> Result<TransferReport> {
        let local = Path::new(&target.local_path);
        if !local.is_file() {
            return Err(EtlError::LocalFileNotFound {
                path: target.local_path.clone(),
            });
        }

        let file_name = target.file_name().ok_or_else(|| EtlError::ProcessingError {
            message: format!("Local path has no file name: {}", target.local_path),
        })?;
        let staged = self.staged_path(file_name);
        let dry_run = self.options.dry_run;

        let started_at = Utc::now();
        let mut steps = Vec::new();
        let mut listing = None;

        tracing::info!(
            "=== Uploading {} → HDFS:{} ===",
            target.local_path,
            target.remote_path
        );

        // Step 1：複製到容器暫存區
        tracing::info!("Step 1: Checking file inside {} container…", self.hdfs.container());
        let outcome = if self.hdfs.file_exists_in_container(&staged).await? {
            tracing::info!("✓ File already exists in container: {} (skipping copy)", staged);
            StepOutcome::Skipped
        } else if dry_run {
            tracing::info!("→ Would copy {} into container:{}", target.local_path, staged);
            StepOutcome::Planned
        } else {
            tracing::info!("→ File not found in container, copying (this may take time)…");
            let absolute = std::fs::canonicalize(local)?;
            self.hdfs
                .copy_into_container(&absolute.to_string_lossy(), &staged)
                .await?;
            tracing::info!("✓ File copied into container");
            StepOutcome::Performed
        };
        steps.push((TransferStep::Stage, outcome));

        // Step 2：建立 HDFS 目錄
        let remote_dir = target.remote_parent();
        tracing::info!("Step 2: Ensuring HDFS directory exists {}…", remote_dir);
        let outcome = if self.hdfs.hdfs_path_exists(remote_dir).await? {
            tracing::info!("✓ HDFS directory already exists (skipping mkdir)");
            StepOutcome::Skipped
        } else if dry_run {
            tracing::info!("→ Would create HDFS directory {}", remote_dir);
            StepOutcome::Planned
        } else {
            tracing::info!("→ Creating HDFS directory {}", remote_dir);
            match self.hdfs.make_dirs(remote_dir).await? {
                None => {
                    tracing::info!("✓ HDFS directory created");
                    StepOutcome::Performed
                }
                Some(stderr) => {
                    tracing::warn!("⚠️ HDFS directory already exists: {}", stderr);
                    StepOutcome::Warned(stderr)
                }
            }
        };
        steps.push((TransferStep::EnsureRemoteDir, outcome));

        // Step 3：上傳
        tracing::info!("Step 3: Uploading to HDFS…");
        let outcome = if self.hdfs.hdfs_path_exists(&target.remote_path).await? {
            tracing::info!(
                "✓ HDFS file already exists: {} (skipping upload)",
                target.remote_path
            );
            StepOutcome::Skipped
        } else if dry_run {
            tracing::info!("→ Would upload {} to {}", staged, target.remote_path);
            StepOutcome::Planned
        } else {
            tracing::info!("→ Uploading file to HDFS (this may take 10–40 seconds)…");
            self.hdfs.put(&staged, &target.remote_path).await?;
            tracing::info!("✓ File uploaded to HDFS");
            StepOutcome::Performed
        };
        steps.push((TransferStep::Upload, outcome));

        // Step 4：驗證（失敗只警告）
        let outcome = if dry_run {
            StepOutcome::Planned
        } else {
            tracing::info!("Step 4: Verifying HDFS file…");
            let output = self.hdfs.list(&target.remote_path).await?;
            if output.success {
                tracing::info!("✓ File verified in HDFS:\n{}", output.stdout);
                listing = Some(output.stdout);
                StepOutcome::Performed
            } else {
                tracing::warn!("⚠️ Could not verify file in HDFS: {}", output.stderr);
                StepOutcome::Warned(output.stderr)
            }
        };
        steps.push((TransferStep::Verify, outcome));

        // Step 5：清除暫存檔（可選，失敗忽略）
        if self.options.cleanup_staged {
            let outcome = if dry_run {
                StepOutcome::Planned
            } else {
                tracing::info!("Step 5: Removing staged file {}…", staged);
                match self.hdfs.remove_in_container(&staged).await {
                    Ok(output) if output.success => StepOutcome::Performed,
                    Ok(output) => {
                        tracing::debug!("cleanup failed: {}", output.stderr);
                        StepOutcome::Ignored(output.stderr)
                    }
                    Err(e) => {
                        tracing::debug!("cleanup failed: {}", e);
                        StepOutcome::Ignored(e.to_string())
                    }
                }
            };
            steps.push((TransferStep::Cleanup, outcome));
        }

        Ok(TransferReport {
            target: target.clone(),
            started_at,
            finished_at: Utc::now(),
            steps,
            listing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedRunner(CommandOutput);

    #[async_trait]
    impl CommandRunner for FixedRunner {
        async fn run(&self, _program: &str, _args: &[String]) -> Result<CommandOutput> {
            Ok(self.0.clone())
        }
    }

    fn failing(stderr: &str) -> FixedRunner {
        FixedRunner(CommandOutput {
            success: false,
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.to_string(),
        })
    }

    #[tokio::test]
    async fn test_make_dirs_tolerates_existing_directory() {
        let hdfs = DockerHdfs::new(failing("mkdir: `/data': File exists"), "docker", "namenode");
        let tolerated = hdfs.make_dirs("/data").await.unwrap();
        assert_eq!(tolerated.as_deref(), Some("mkdir: `/data': File exists"));
    }

    #[tokio::test]
    async fn test_make_dirs_other_failure_is_error() {
        let hdfs = DockerHdfs::new(failing("mkdir: Permission denied"), "docker", "namenode");
        let err = hdfs.make_dirs("/data").await.unwrap_err();
        match err {
            EtlError::CommandFailed { command, stderr, .. } => {
                assert_eq!(command, "docker exec namenode hdfs dfs -mkdir -p /data");
                assert_eq!(stderr, "mkdir: Permission denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_container_running_requires_exact_name() {
        let hdfs = DockerHdfs::new(
            FixedRunner(CommandOutput {
                success: true,
                code: Some(0),
                stdout: "namenode-backup".to_string(),
                stderr: String::new(),
            }),
            "docker",
            "namenode",
        );
        assert!(!hdfs.container_running().await.unwrap());
    }
}
