use crate::domain::ports::{CommandOutput, CommandRunner};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::process::Command;

/// 以子程序執行外部指令並擷取 stdout / stderr
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        tracing::debug!("$ {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await?;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };

        if !result.success {
            tracing::debug!("exit {:?}: {}", result.code, result.stderr);
        }

        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_trimmed_stdout() {
        let runner = SystemCommandRunner::new();
        let out = runner
            .run("echo", &["namenode".to_string()])
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.code, Some(0));
        assert_eq!(out.stdout, "namenode");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_an_error() {
        let runner = SystemCommandRunner::new();
        let out = runner
            .run("sh", &["-c".to_string(), "echo oops >&2; exit 3".to_string()])
            .await
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stderr, "oops");
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let runner = SystemCommandRunner::new();
        assert!(runner
            .run("definitely-not-a-real-binary-42", &[])
            .await
            .is_err());
    }
}
