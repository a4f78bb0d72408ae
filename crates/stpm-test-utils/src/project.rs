//! [`TestProject`] builder for stpm test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// A temporary theme project with helper methods for test setup and
/// assertion.
///
/// # Example
///
/// ```rust,no_run
/// use stpm_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.bundled_package("acme", &[("acme.css", ".acme {}")]);
/// project.assert_file_exists("node_modules/acme/acme.css");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary project directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
    }

    pub fn write_json(&self, relative: &str, value: &Value) {
        let mut content = serde_json::to_string_pretty(value).unwrap();
        content.push('\n');
        self.write(relative, &content);
    }

    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    pub fn read_json(&self, relative: &str) -> Value {
        serde_json::from_str(&self.read(relative)).unwrap()
    }

    /// The manifest document, or `{}` when it does not exist.
    pub fn manifest(&self) -> Value {
        if self.path(".stpm-packages.json").exists() {
            self.read_json(".stpm-packages.json")
        } else {
            json!({})
        }
    }

    /// Lay out an installed bundled package under `node_modules/<id>`.
    ///
    /// `files` are `(package-relative path, content)` pairs.
    pub fn bundled_package(&self, id: &str, files: &[(&str, &str)]) {
        for (relative, content) in files {
            self.write(&format!("node_modules/{id}/{relative}"), content);
        }
    }

    /// Lay out an installed native package under `node_modules/<id>`, with a
    /// `package.json` declaring it native.
    pub fn native_package(&self, id: &str, files: &[(&str, &str)]) {
        self.write_json(
            &format!("node_modules/{id}/package.json"),
            &json!({"name": id, "stpm": {"type": "native"}}),
        );
        self.bundled_package(id, files);
    }

    /// Assert that `path` (relative to the project root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the project root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }

    /// Assert how many times `marker` opens a region in the asset at `path`.
    pub fn assert_region_count(&self, path: &str, marker: &str, expected: usize) {
        let token = format!("/* STPM: START {marker} */");
        let actual = self.read(path).lines().filter(|l| *l == token).count();
        assert_eq!(
            actual, expected,
            "Expected {expected} region(s) for '{marker}' in {path}, found {actual}"
        );
    }
}
