//! Package manager collaborator used by the install hook

use async_trait::async_trait;
use thiserror::Error;

use super::command::{CommandError, CommandExecutor};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InstallError {
    #[error("package index update failed with code {code}")]
    UpdateFailed { code: i32, stderr: String },
    #[error("installing {package} failed with code {code}")]
    InstallFailed {
        package: String,
        code: i32,
        stderr: String,
    },
    #[error(transparent)]
    Command(#[from] CommandError),
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    async fn install(&self, package: &str) -> Result<(), InstallError>;
}

/// apt-get based installer: refresh the package index, then install
pub struct AptInstaller<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> AptInstaller<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl<E: CommandExecutor> PackageInstaller for AptInstaller<E> {
    async fn install(&self, package: &str) -> Result<(), InstallError> {
        let update = self.executor.execute("apt-get", &["update", "-q"]).await?;
        if !update.success() {
            return Err(InstallError::UpdateFailed {
                code: update.status_code,
                stderr: update.stderr,
            });
        }

        let install = self
            .executor
            .execute("apt-get", &["install", "-y", "-q", package])
            .await?;
        if !install.success() {
            return Err(InstallError::InstallFailed {
                package: package.to_string(),
                code: install.status_code,
                stderr: install.stderr,
            });
        }

        tracing::info!(package = %package, "Package installed");
        Ok(())
    }
}
