//! External collaborators the engine drives.
//!
//! Each concern sits behind a trait so the engine can run against a real
//! package installer, bundler and filesystem walker, or against test doubles.

pub mod bundler;
pub mod installer;
pub mod scanner;

pub use bundler::{Bundler, CommandBundler};
pub use installer::{CommandInstaller, Installer, NoopInstaller};
pub use scanner::{EntryPoint, NativeContent, PackageFile, PackageScanner, ScannedPackage, ThemeScanner};

use std::process::Command;

/// Build a shell [`Command`] that executes `cmd_str` via the system shell.
///
/// - Unix: `sh -c "{cmd_str}"`
/// - Windows: `cmd /C "{cmd_str}"`
pub(crate) fn shell_command(cmd_str: &str) -> Command {
    #[cfg(windows)]
    {
        let mut c = Command::new("cmd");
        c.args(["/C", cmd_str]);
        c
    }
    #[cfg(not(windows))]
    {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_str);
        c
    }
}
