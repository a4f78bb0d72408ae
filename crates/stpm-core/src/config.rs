//! Project configuration parsed from `stpm.toml`
//!
//! Every field is optional. A project without a config file uses the
//! defaults, which match a plain npm-based theme project.

use serde::{Deserialize, Serialize};
use stpm_fs::{ConfigStore, ProjectPath, ProjectRoot};
use stpm_merge::MatchMode;

use crate::Result;
use crate::manifest::AssetKind;

/// Config file names, in lookup order
const CONFIG_FILES: &[&str] = &["stpm.toml", "stpm.json", "stpm.yaml", "stpm.yml"];

fn default_manifest() -> String {
    ProjectPath::Manifest.as_str().to_string()
}

fn default_packages_dir() -> String {
    "node_modules".to_string()
}

fn default_program() -> String {
    "npm".to_string()
}

fn default_style_output() -> String {
    "assets/theme.css".to_string()
}

fn default_script_output() -> String {
    "assets/theme.js".to_string()
}

/// Package installer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerSection {
    /// Invoked as `<program> install <id>` and `<program> uninstall <id>`
    #[serde(default = "default_program")]
    pub program: String,
}

impl Default for InstallerSection {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

/// Bundler command templates
///
/// A template is run through the shell with `{entry}` replaced by the
/// absolute entry path; its stdout is the compiled text. Without a template
/// the entry file is used verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlerSection {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
}

impl BundlerSection {
    pub fn template(&self, kind: AssetKind) -> Option<&str> {
        match kind {
            AssetKind::Style => self.style.as_deref(),
            AssetKind::Script => self.script.as_deref(),
        }
    }
}

/// Shared assets receiving bundled regions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_style_output")]
    pub style: String,
    #[serde(default = "default_script_output")]
    pub script: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            style: default_style_output(),
            script: default_script_output(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSection {
    /// How recorded schema blocks are matched on removal
    #[serde(default)]
    pub block_matching: MatchMode,
}

/// Project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project-relative manifest path
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Project-relative directory the installer places packages in
    #[serde(default = "default_packages_dir")]
    pub packages_dir: String,

    #[serde(default)]
    pub installer: InstallerSection,

    #[serde(default)]
    pub bundler: BundlerSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub schema: SchemaSection,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            packages_dir: default_packages_dir(),
            installer: InstallerSection::default(),
            bundler: BundlerSection::default(),
            output: OutputSection::default(),
            schema: SchemaSection::default(),
        }
    }
}

impl ProjectConfig {
    /// Load the first config file found in the project root, or the
    /// defaults when there is none.
    pub fn load(root: &ProjectRoot) -> Result<Self> {
        let store = ConfigStore::new();
        for name in CONFIG_FILES {
            let path = root.resolve(name)?;
            if path.is_file() {
                tracing::debug!(path = %path, "loading project config");
                return Ok(store.load(&path)?);
            }
        }
        Ok(Self::default())
    }

    /// The shared asset a bundled entry of `kind` is injected into.
    pub fn output_for(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Style => &self.output.style,
            AssetKind::Script => &self.output.script,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::load(&ProjectRoot::new(dir.path())).unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.manifest, ".stpm-packages.json");
        assert_eq!(config.output_for(AssetKind::Style), "assets/theme.css");
        assert_eq!(config.schema.block_matching, MatchMode::Permissive);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("stpm.toml"),
            "[output]\nscript = \"assets/vendor.js\"\n\n[schema]\nblock_matching = \"strict\"\n",
        )
        .unwrap();

        let config = ProjectConfig::load(&ProjectRoot::new(dir.path())).unwrap();
        assert_eq!(config.output.script, "assets/vendor.js");
        assert_eq!(config.output.style, "assets/theme.css");
        assert_eq!(config.schema.block_matching, MatchMode::Strict);
        assert_eq!(config.installer.program, "npm");
    }

    #[test]
    fn yaml_config_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stpm.yaml"), "packages_dir: vendor\n").unwrap();

        let config = ProjectConfig::load(&ProjectRoot::new(dir.path())).unwrap();
        assert_eq!(config.packages_dir, "vendor");
    }
}
