//! Entry point compilation.

use std::path::PathBuf;
use std::process::Stdio;

use stpm_fs::{NormalizedPath, io};

use crate::config::BundlerSection;
use crate::error::{Error, Result};
use crate::manifest::AssetKind;

use super::shell_command;

/// Turns an entry point into the text injected into a shared asset.
pub trait Bundler {
    fn bundle(&self, kind: AssetKind, entry: &NormalizedPath) -> Result<String>;
}

/// Runs the configured command template for the asset kind, or reads the
/// entry verbatim when there is none.
///
/// Trailing newlines are trimmed from the output; the region delimiters
/// supply their own.
#[derive(Debug, Clone)]
pub struct CommandBundler {
    templates: BundlerSection,
    working_dir: PathBuf,
}

impl CommandBundler {
    pub fn new(templates: BundlerSection, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates,
            working_dir: working_dir.into(),
        }
    }

    fn run(&self, template: &str, entry: &NormalizedPath) -> Result<String> {
        let command = template.replace("{entry}", &entry.to_native().to_string_lossy());
        tracing::debug!(command = %command, "running bundler");

        let failed = |message: String| Error::BundleFailed {
            entry: entry.to_string(),
            message,
        };

        let output = shell_command(&command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!("`{command}` failed: {}", stderr.trim())));
        }
        String::from_utf8(output.stdout).map_err(|_| failed("output is not valid UTF-8".into()))
    }
}

impl Bundler for CommandBundler {
    fn bundle(&self, kind: AssetKind, entry: &NormalizedPath) -> Result<String> {
        let text = match self.templates.template(kind) {
            Some(template) => self.run(template, entry)?,
            None => io::read_text(entry)?,
        };
        Ok(text.trim_end_matches(['\n', '\r']).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbatim_without_template() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("a.css");
        std::fs::write(&entry, ".a { color: red; }\n\n").unwrap();

        let bundler = CommandBundler::new(BundlerSection::default(), dir.path());
        let text = bundler
            .bundle(AssetKind::Style, &NormalizedPath::new(&entry))
            .unwrap();
        assert_eq!(text, ".a { color: red; }");
    }

    #[test]
    fn missing_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let bundler = CommandBundler::new(BundlerSection::default(), dir.path());
        let entry = NormalizedPath::new(dir.path().join("missing.js"));
        assert!(bundler.bundle(AssetKind::Script, &entry).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn template_output_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("a.js");
        std::fs::write(&entry, "let a = 1;\n").unwrap();

        let templates = BundlerSection {
            style: None,
            script: Some("echo '/* bundled */' && cat {entry}".into()),
        };
        let bundler = CommandBundler::new(templates, dir.path());
        let text = bundler
            .bundle(AssetKind::Script, &NormalizedPath::new(&entry))
            .unwrap();
        assert_eq!(text, "/* bundled */\nlet a = 1;");
    }

    #[cfg(unix)]
    #[test]
    fn failing_template_is_bundle_failed() {
        let dir = tempfile::tempdir().unwrap();
        let templates = BundlerSection {
            style: Some("exit 3".into()),
            script: None,
        };
        let bundler = CommandBundler::new(templates, dir.path());
        let entry = NormalizedPath::new(dir.path().join("a.css"));
        assert!(matches!(
            bundler.bundle(AssetKind::Style, &entry),
            Err(Error::BundleFailed { .. })
        ));
    }
}
