//! Fixed project-relative paths the engine reads and writes.

use std::path::Path;

/// Well-known files inside a theme project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectPath {
    /// The contribution manifest (default location)
    Manifest,
    /// The project configuration file
    Config,
    /// Storefront translation table
    FrontendLocales,
    /// Theme-editor translation table
    SchemaLocales,
    /// Settings schema (a JSON array of setting blocks)
    SettingsSchema,
    /// The project's own npm manifest
    PackageJson,
}

impl ProjectPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manifest => ".stpm-packages.json",
            Self::Config => "stpm.toml",
            Self::FrontendLocales => "locales/en.default.json",
            Self::SchemaLocales => "locales/en.default.schema.json",
            Self::SettingsSchema => "config/settings_schema.json",
            Self::PackageJson => "package.json",
        }
    }
}

impl AsRef<Path> for ProjectPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for ProjectPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
