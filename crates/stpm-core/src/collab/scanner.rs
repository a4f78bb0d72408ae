//! Package classification and tree walking.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use stpm_fs::path::clean_relative;
use stpm_fs::{NormalizedPath, ProjectPath, ProjectRoot, io};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::manifest::AssetKind;
use crate::package::{PackageId, PackageKind};

/// Folders a native package's files are copied from
const COPY_DIRS: &[&str] = &[
    "sections",
    "snippets",
    "assets",
    "locales",
    "config",
    "templates",
    "layout",
];

/// Folders whose presence makes a package look like a theme
const THEME_DIRS: &[&str] = &["sections", "snippets", "templates", "locales", "config"];

/// Files never copied out of a package
const IGNORED_FILES: &[&str] = &["package.json", "README.md", "LICENSE", ".gitignore", ".npmignore"];

/// Settings schema location accepted at the package root
const ROOT_SETTINGS_SCHEMA: &str = "settings_schema.json";

/// A file copied verbatim from a native package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    /// Absolute source path inside the package
    pub source: PathBuf,
    /// Destination path, relative to the project root
    pub relative: String,
}

/// Everything a native package contributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeContent {
    pub files: Vec<PackageFile>,
    pub frontend_locales: Option<Map<String, Value>>,
    pub schema_locales: Option<Map<String, Value>>,
    pub schema_blocks: Vec<Value>,
}

/// A style or script entry point of a bundled package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub kind: AssetKind,
    /// Entry path, relative to the project root
    pub relative: String,
}

/// A classified package.
#[derive(Debug, Clone, PartialEq)]
pub enum ScannedPackage {
    Native(NativeContent),
    Bundled(Vec<EntryPoint>),
}

impl ScannedPackage {
    pub fn kind(&self) -> PackageKind {
        match self {
            Self::Native(_) => PackageKind::Native,
            Self::Bundled(_) => PackageKind::Bundled,
        }
    }
}

/// Classifies an installed package and collects what it contributes.
pub trait PackageScanner {
    fn scan(&self, id: &PackageId) -> Result<ScannedPackage>;
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    main: Option<String>,
    style: Option<String>,
    exports: Option<Value>,
    stpm: Option<StpmSection>,
}

#[derive(Debug, Default, Deserialize)]
struct StpmSection {
    #[serde(rename = "type")]
    package_type: Option<String>,
}

/// Scans packages installed under `<root>/<packages_dir>/<id>`.
///
/// A package is native when its `package.json` declares
/// `"stpm": {"type": "native"}` and it actually carries a theme layout;
/// everything else is bundled from its style and script entry points.
#[derive(Debug, Clone)]
pub struct ThemeScanner {
    root: ProjectRoot,
    packages_dir: String,
}

impl ThemeScanner {
    pub fn new(root: ProjectRoot, packages_dir: impl Into<String>) -> Self {
        Self {
            root,
            packages_dir: packages_dir.into(),
        }
    }

    /// Project-relative directory of an installed package.
    pub fn package_relative(&self, id: &PackageId) -> String {
        format!("{}/{}", self.packages_dir.trim_end_matches('/'), id)
    }

    fn read_package_json(&self, dir: &NormalizedPath, relative: &str) -> Result<PackageJson> {
        let path = dir.join("package.json");
        match io::read_text_opt(&path)? {
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| Error::malformed(format!("{relative}/package.json"), e)),
            None => Ok(PackageJson::default()),
        }
    }

    fn scan_native(&self, id: &PackageId, dir: &Path) -> Result<NativeContent> {
        let mut content = NativeContent::default();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e));

        for entry in walker {
            let entry = entry.map_err(|e| Error::ScanFailed {
                id: id.to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(stripped) = entry.path().strip_prefix(dir) else {
                continue;
            };
            let relative = NormalizedPath::new(stripped).as_str().to_string();

            if relative == ProjectPath::FrontendLocales.as_str() {
                content.frontend_locales = Some(read_object(entry.path(), &relative)?);
            } else if relative == ProjectPath::SchemaLocales.as_str() {
                content.schema_locales = Some(read_object(entry.path(), &relative)?);
            } else if relative == ProjectPath::SettingsSchema.as_str()
                || relative == ROOT_SETTINGS_SCHEMA
            {
                content.schema_blocks.extend(read_array(entry.path(), &relative)?);
            } else if IGNORED_FILES.contains(&relative.as_str()) {
                continue;
            } else if is_copied(&relative) {
                content.files.push(PackageFile {
                    source: entry.path().to_path_buf(),
                    relative,
                });
            } else {
                tracing::debug!(package = %id, file = %relative, "not a theme file, skipping");
            }
        }

        Ok(content)
    }

    fn scan_entries(
        &self,
        id: &PackageId,
        dir: &Path,
        package_relative: &str,
        manifest: &PackageJson,
    ) -> Result<Vec<EntryPoint>> {
        let root_files: Vec<String> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        let first_with = |extension: &str| {
            root_files
                .iter()
                .find(|name| name.ends_with(extension))
                .cloned()
        };

        let style = manifest.style.clone().or_else(|| first_with(".css"));
        let script = manifest
            .main
            .clone()
            .or_else(|| manifest.exports.as_ref().and_then(Value::as_str).map(String::from))
            .or_else(|| first_with(".js"));

        let mut entries = Vec::new();
        for (kind, entry) in [(AssetKind::Style, style), (AssetKind::Script, script)] {
            let Some(entry) = entry else { continue };
            let cleaned = clean_relative(&entry)?;
            entries.push(EntryPoint {
                kind,
                relative: format!("{package_relative}/{cleaned}"),
            });
        }

        if entries.is_empty() {
            return Err(Error::NoEntryPoints { id: id.to_string() });
        }
        Ok(entries)
    }
}

impl PackageScanner for ThemeScanner {
    fn scan(&self, id: &PackageId) -> Result<ScannedPackage> {
        let relative = self.package_relative(id);
        let dir = self.root.resolve(&relative)?;
        if !dir.to_native().is_dir() {
            return Err(Error::ScanFailed {
                id: id.to_string(),
                message: format!("{relative} does not exist, is the package installed?"),
            });
        }
        let native_dir = dir.to_native();
        let manifest = self.read_package_json(&dir, &relative)?;
        let declared_native = manifest
            .stpm
            .as_ref()
            .and_then(|s| s.package_type.as_deref())
            == Some("native");
        let theme_like = has_theme_layout(&native_dir);

        if declared_native {
            if theme_like {
                tracing::info!(package = %id, "detected native package");
                return Ok(ScannedPackage::Native(self.scan_native(id, &native_dir)?));
            }
            tracing::warn!(
                package = %id,
                "declared native but has no theme folders or settings_schema.json, importing as bundled"
            );
        } else if theme_like {
            tracing::warn!(
                package = %id,
                "contains theme-like files but is not marked native; add \"stpm\": {{\"type\": \"native\"}} to its package.json"
            );
        }

        tracing::info!(package = %id, "detected bundled package");
        let entries = self.scan_entries(id, &native_dir, &relative, &manifest)?;
        Ok(ScannedPackage::Bundled(entries))
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "node_modules"
}

fn is_copied(relative: &str) -> bool {
    relative
        .split_once('/')
        .is_some_and(|(first, _)| COPY_DIRS.contains(&first))
}

fn has_theme_layout(dir: &Path) -> bool {
    THEME_DIRS.iter().any(|d| dir.join(d).is_dir()) || dir.join(ROOT_SETTINGS_SCHEMA).is_file()
}

fn read_json(path: &Path, relative: &str) -> Result<Value> {
    let content = io::read_text(&NormalizedPath::new(path))?;
    serde_json::from_str(&content).map_err(|e| Error::malformed(relative, e))
}

fn read_object(path: &Path, relative: &str) -> Result<Map<String, Value>> {
    match read_json(path, relative)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::malformed(relative, "expected an object")),
    }
}

fn read_array(path: &Path, relative: &str) -> Result<Vec<Value>> {
    match read_json(path, relative)? {
        Value::Array(items) => Ok(items),
        _ => Err(Error::malformed(relative, "expected an array")),
    }
}
