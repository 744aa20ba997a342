//! External tool abstractions
//!
//! Trait-based wrappers for everything outside the process: the generic
//! command runner, the `usg` hardening engine and the package manager. The
//! lifecycle code depends only on the traits, so tests inject mocks.

pub mod command;
pub mod package;
pub mod usg;

pub use command::{CommandError, CommandExecutor, CommandOutput, ProcessCommandExecutor};
pub use package::{AptInstaller, InstallError, PackageInstaller};
pub use usg::{HardeningTool, ToolError, ToolOutput, UsgTool};
