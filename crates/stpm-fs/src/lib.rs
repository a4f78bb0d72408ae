//! Filesystem access for stpm
//!
//! Every path the engine touches is project-relative. This crate resolves
//! those paths against a [`ProjectRoot`], refuses anything that would land
//! outside of it, and provides the atomic text I/O the engine relies on.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::ProjectPath;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, ProjectRoot};
