//! Package installation.

use std::path::PathBuf;
use std::process::Stdio;

use crate::error::{Error, Result};
use crate::package::PackageId;

use super::shell_command;

/// Fetches and discards packages.
pub trait Installer {
    fn install(&self, id: &PackageId) -> Result<()>;
    fn uninstall(&self, id: &PackageId) -> Result<()>;
}

/// Runs `<program> install <id>` / `<program> uninstall <id>` in the project
/// root.
///
/// Stdout and stderr are inherited so installer progress stays visible. A
/// non-zero exit code returns [`Error::InstallFailed`].
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    program: String,
    working_dir: PathBuf,
}

impl CommandInstaller {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
        }
    }

    fn run(&self, verb: &str, id: &PackageId) -> Result<()> {
        let command = format!("{} {} {}", self.program, verb, id);
        tracing::info!(command = %command, "running installer");

        let failed = |exit_code| Error::InstallFailed {
            id: id.to_string(),
            command: command.clone(),
            exit_code,
        };

        let status = shell_command(&command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|_| failed(None))?;

        if !status.success() {
            return Err(failed(status.code()));
        }
        Ok(())
    }
}

impl Installer for CommandInstaller {
    fn install(&self, id: &PackageId) -> Result<()> {
        self.run("install", id)
    }

    fn uninstall(&self, id: &PackageId) -> Result<()> {
        self.run("uninstall", id)
    }
}

/// An installer that does nothing, for packages already on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInstaller;

impl Installer for NoopInstaller {
    fn install(&self, id: &PackageId) -> Result<()> {
        tracing::debug!(package = %id, "skipping install");
        Ok(())
    }

    fn uninstall(&self, id: &PackageId) -> Result<()> {
        tracing::debug!(package = %id, "skipping uninstall");
        Ok(())
    }
}
