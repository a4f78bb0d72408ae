//! Shared test utilities for the stpm workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`] builder for theme projects with packages
//!   already "installed" under `node_modules/`

pub mod project;

pub use project::TestProject;
