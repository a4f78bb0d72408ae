//! End-to-end package lifecycle tests
//!
//! These tests drive a whole theme project through add, update, clean and
//! remove with several packages at once and check that the project ends up
//! where it started.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use stpm_blocks::find_all_markers;
use stpm_core::{
    AssetKind, Bundler, Engine, ImportOptions, Installer, NoopInstaller, PackageId, RemoveOptions,
    Result,
};
use stpm_fs::{NormalizedPath, io};
use stpm_test_utils::TestProject;

const BASE_CSS: &str = "body { margin: 0; }\n";

/// A theme with some content of its own and three installed packages.
fn theme_project() -> TestProject {
    let project = TestProject::new();
    project.write("assets/theme.css", BASE_CSS);
    project.write_json(
        "locales/en.default.json",
        &json!({"general": {"title": "Shop", "cart": "Cart"}}),
    );
    project.write_json(
        "config/settings_schema.json",
        &json!([{"name": "theme_info", "theme_name": "Dawn"}]),
    );

    project.bundled_package(
        "acme",
        &[
            (
                "package.json",
                r#"{"name": "acme", "main": "index.js", "style": "acme.css"}"#,
            ),
            ("acme.css", ".acme { color: red; }\n"),
            ("index.js", "console.log('acme');\n"),
        ],
    );
    project.bundled_package(
        "@scope/badge",
        &[
            (
                "package.json",
                r#"{"name": "@scope/badge", "style": "badge.css"}"#,
            ),
            ("badge.css", ".badge { display: inline; }\n"),
        ],
    );
    project.native_package(
        "slider",
        &[
            ("sections/slider.liquid", "<div class=\"slider\"></div>\n"),
            ("snippets/slide.liquid", "<li>{{ slide }}</li>\n"),
            (
                "locales/en.default.json",
                r#"{"general": {"next": "Next"}, "slider": {"label": "Slider"}}"#,
            ),
            (
                "config/settings_schema.json",
                r#"[{"name": "slider", "settings": [{"id": "speed", "type": "range"}]}]"#,
            ),
        ],
    );
    project
}

fn engine(project: &TestProject) -> Engine {
    Engine::open(project.root())
        .unwrap()
        .with_installer(NoopInstaller)
}

fn import(engine: &Engine, id: &str) {
    engine.import(id, ImportOptions::default()).unwrap();
}

fn remove(engine: &Engine, id: &str) {
    engine
        .remove(id, RemoveOptions::default())
        .unwrap()
        .unwrap_or_else(|| panic!("{id} was not imported"));
}

/// Records every install and uninstall call.
#[derive(Clone, Default)]
struct RecordingInstaller {
    calls: Rc<RefCell<Vec<String>>>,
}

impl Installer for RecordingInstaller {
    fn install(&self, id: &PackageId) -> Result<()> {
        self.calls.borrow_mut().push(format!("install {id}"));
        Ok(())
    }

    fn uninstall(&self, id: &PackageId) -> Result<()> {
        self.calls.borrow_mut().push(format!("uninstall {id}"));
        Ok(())
    }
}

/// Tags each bundle with the asset kind it was compiled for.
struct TaggingBundler;

impl Bundler for TaggingBundler {
    fn bundle(&self, kind: AssetKind, entry: &NormalizedPath) -> Result<String> {
        let source = io::read_text(entry)?;
        let tag = match kind {
            AssetKind::Style => "css",
            AssetKind::Script => "js",
        };
        Ok(format!("/* {tag} */ {}", source.trim_end()))
    }
}

#[test]
fn test_full_lifecycle_restores_theme() {
    let project = theme_project();
    let locales_before = project.read_json("locales/en.default.json");
    let schema_before = project.read_json("config/settings_schema.json");
    let engine = engine(&project);

    import(&engine, "acme");
    import(&engine, "slider");
    import(&engine, "@scope/badge");

    let manifest = engine.list().unwrap();
    assert_eq!(manifest.len(), 3);
    let markers = find_all_markers(&project.read("assets/theme.css"));
    assert_eq!(
        markers.keys().cloned().collect::<Vec<_>>(),
        vec!["@scope/badge", "acme"]
    );
    project.assert_file_exists("snippets/slide.liquid");
    assert_eq!(
        project.read_json("locales/en.default.json")["general"],
        json!({"title": "Shop", "cart": "Cart", "next": "Next"})
    );

    // Removal order differs from import order on purpose
    remove(&engine, "slider");
    remove(&engine, "acme");
    remove(&engine, "@scope/badge");

    assert_eq!(project.read("assets/theme.css"), BASE_CSS);
    assert_eq!(project.read("assets/theme.js"), "");
    assert_eq!(project.read_json("locales/en.default.json"), locales_before);
    assert_eq!(project.read_json("config/settings_schema.json"), schema_before);
    project.assert_file_not_exists("sections/slider.liquid");
    project.assert_file_not_exists("snippets/slide.liquid");
    assert_eq!(project.manifest(), json!({}));
}

#[test]
fn test_foreign_edits_survive_update() {
    let project = theme_project();
    let engine = engine(&project);
    import(&engine, "acme");

    let mut css = project.read("assets/theme.css");
    css.push_str("\n.footer { padding: 1rem; }\n");
    project.write("assets/theme.css", &css);
    project.write("node_modules/acme/acme.css", ".acme { color: blue; }\n");

    engine.update("acme").unwrap();

    let css = project.read("assets/theme.css");
    assert!(css.starts_with(BASE_CSS));
    assert!(css.contains(".footer { padding: 1rem; }"));
    assert!(css.contains(".acme { color: blue; }"));
    assert!(!css.contains("color: red"));
    project.assert_region_count("assets/theme.css", "acme", 1);

    remove(&engine, "acme");
    let css = project.read("assets/theme.css");
    assert!(css.contains(".footer { padding: 1rem; }"));
    project.assert_region_count("assets/theme.css", "acme", 0);
}

#[test]
fn test_interrupted_injection_is_repaired_then_removed() {
    let project = theme_project();
    let engine = engine(&project);
    import(&engine, "acme");
    import(&engine, "@scope/badge");

    // Leftovers from a run that died between removing and re-adding
    let mut css = project.read("assets/theme.css");
    css.push_str("/* STPM: START acme */\n.acme { stale }\n/* STPM: END acme */\n");
    css.push_str("/* STPM: START acme */\n.acme { staler }\n/* STPM: END acme */\n");
    project.write("assets/theme.css", &css);

    let report = engine.repair().unwrap();
    assert_eq!(report.total_removed(), 2);
    project.assert_region_count("assets/theme.css", "acme", 1);
    project.assert_region_count("assets/theme.css", "@scope/badge", 1);
    project.assert_file_contains("assets/theme.css", ".acme { color: red; }");
    assert!(!project.read("assets/theme.css").contains("stale"));

    let repaired = project.read("assets/theme.css");
    assert_eq!(engine.repair().unwrap().total_removed(), 0);
    assert_eq!(project.read("assets/theme.css"), repaired);

    remove(&engine, "acme");
    remove(&engine, "@scope/badge");
    assert_eq!(project.read("assets/theme.css"), BASE_CSS);
}

#[test]
fn test_removal_clears_duplicates_without_repair() {
    let project = theme_project();
    let engine = engine(&project);
    import(&engine, "acme");

    let mut css = project.read("assets/theme.css");
    css.push_str("\n/* STPM: START acme */\nagain\n/* STPM: END acme */\n");
    project.write("assets/theme.css", &css);

    remove(&engine, "acme");
    assert_eq!(project.read("assets/theme.css"), BASE_CSS);
}

#[test]
fn test_installer_calls_follow_options() {
    let project = theme_project();
    let installer = RecordingInstaller::default();
    let engine = Engine::open(project.root())
        .unwrap()
        .with_installer(installer.clone());

    import(&engine, "acme");
    engine
        .import(
            "@scope/badge",
            ImportOptions {
                skip_install: true,
                ..ImportOptions::default()
            },
        )
        .unwrap();
    engine.update("acme").unwrap();
    remove(&engine, "acme");
    engine
        .remove(
            "@scope/badge",
            RemoveOptions {
                keep_installed: true,
            },
        )
        .unwrap();

    assert_eq!(
        *installer.calls.borrow(),
        vec!["install acme", "install acme", "uninstall acme"]
    );
}

#[test]
fn test_custom_bundler_output_is_injected() {
    let project = theme_project();
    let engine = engine(&project).with_bundler(TaggingBundler);

    import(&engine, "acme");
    assert_eq!(
        project.read("assets/theme.js"),
        "\n/* STPM: START acme */\n/* js */ console.log('acme');\n/* STPM: END acme */\n"
    );
    project.assert_file_contains("assets/theme.css", "/* css */ .acme { color: red; }");

    project.write("node_modules/acme/index.js", "console.log('v2');\n");
    let report = engine.rebuild().unwrap();
    assert!(report.is_success());
    project.assert_file_contains("assets/theme.js", "/* js */ console.log('v2');");
    project.assert_region_count("assets/theme.js", "acme", 1);
}

#[test]
fn test_shared_output_joins_bundles_into_one_region() {
    let project = TestProject::new();
    project.write(
        "stpm.toml",
        "[output]\nstyle = \"assets/bundle.txt\"\nscript = \"assets/bundle.txt\"\n",
    );
    project.bundled_package(
        "acme",
        &[
            (
                "package.json",
                r#"{"name": "acme", "main": "index.js", "style": "acme.css"}"#,
            ),
            ("acme.css", ".acme {}\n"),
            ("index.js", "acme();\n"),
        ],
    );
    let engine = engine(&project);

    let report = engine.import("acme", ImportOptions::default()).unwrap();
    assert_eq!(report.record.bundled_assets.len(), 2);
    assert_eq!(report.injections.len(), 1);
    project.assert_region_count("assets/bundle.txt", "acme", 1);

    remove(&engine, "acme");
    assert_eq!(project.read("assets/bundle.txt"), "");
}

#[test]
fn test_manifest_records_survive_reopen() {
    let project = theme_project();
    import(&engine(&project), "slider");

    let reopened = engine(&project);
    let manifest = reopened.list().unwrap();
    let record = manifest
        .get(&PackageId::new("slider").unwrap())
        .expect("slider record");
    assert_eq!(
        record.files,
        vec!["sections/slider.liquid", "snippets/slide.liquid"]
    );

    let raw: Value = project.manifest();
    assert_eq!(raw["slider"]["packageId"], json!("slider"));
    assert_eq!(raw["slider"]["kind"], json!("native"));

    remove(&reopened, "slider");
    project.assert_file_not_exists("sections/slider.liquid");
}

#[test]
fn test_prune_follows_dependency_list() {
    let project = theme_project();
    let locales_before = project.read_json("locales/en.default.json");
    let engine = engine(&project);
    import(&engine, "acme");
    import(&engine, "slider");
    import(&engine, "@scope/badge");

    project.write_json(
        "package.json",
        &json!({"dependencies": {"@scope/badge": "^2.0.0"}}),
    );
    let report = engine.prune().unwrap();

    assert!(report.is_success());
    let mut pruned: Vec<_> = report.succeeded.iter().map(|(id, _)| id.as_str()).collect();
    pruned.sort_unstable();
    assert_eq!(pruned, vec!["acme", "slider"]);

    assert_eq!(project.read_json("locales/en.default.json"), locales_before);
    project.assert_file_not_exists("sections/slider.liquid");
    project.assert_region_count("assets/theme.css", "acme", 0);
    project.assert_region_count("assets/theme.css", "@scope/badge", 1);
    assert_eq!(engine.list().unwrap().len(), 1);
}
