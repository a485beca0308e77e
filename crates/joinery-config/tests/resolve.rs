//! End-to-end resolution tests.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use std::sync::Arc;

use joinery_config::{
    load_and_resolve, ConfigBuilder, ConfigError, Map, PathStyle, ResolveOptions, ResolvedConfig,
    Value,
};
use serde_json::json;
use tempfile::TempDir;

fn tree(value: serde_json::Value) -> Map {
    match Value::from(value) {
        Value::Map(map) => map,
        other => panic!("fixture must be a map, got {other:?}"),
    }
}

fn minimal() -> Map {
    tree(json!({
        "files": {
            "javascripts": { "joinTo": { "app.js": "^app/", "vendor.js": "^(vendor|bower_components)/" } },
            "stylesheets": { "joinTo": "app.css" }
        }
    }))
}

fn build(config: Map, options: ResolveOptions) -> Arc<ResolvedConfig> {
    ConfigBuilder::new(config)
        .options(options.path_style(PathStyle::Posix))
        .without_packages()
        .build()
        .expect("resolve config")
}

#[test]
fn defaults_are_filled() {
    let config = build(minimal(), ResolveOptions::new());

    let paths = config.paths();
    assert_eq!(paths.root, ".");
    assert_eq!(paths.public, "public");
    assert_eq!(paths.watched, ["app", "test", "vendor"]);
    assert_eq!(paths.config, "config");
    assert_eq!(paths.package_config, "package.json");

    assert_eq!(config.server().port, 3333);
    assert!(!config.server().run);
    assert!(config.source_maps());
    assert!(!config.optimize());
    assert!(config.notifications());
    assert!(!config.npm_enabled());

    let conventions = config.conventions();
    assert!(conventions.is_asset("app/assets/index.html"));
    assert!(conventions.is_vendor("vendor/jquery.js"));
    assert!(conventions.is_vendor("bower_components/x/x.js"));
    assert!(conventions.is_ignored("app/styles/_mixins.scss"));
    assert!(!conventions.is_ignored("app/styles/main.scss"));
}

#[test]
fn production_defaults_apply_when_env_requested() {
    let config = build(minimal(), ResolveOptions::new().env(["production"]));
    assert!(config.optimize());
    assert!(!config.source_maps());
    assert_eq!(config.env(), ["production"]);
    assert_eq!(
        config
            .get(&["plugins", "autoReload", "enabled"])
            .and_then(Value::as_bool),
        Some(false)
    );
}

#[test]
fn default_snapshot_is_recorded() {
    let config = build(minimal(), ResolveOptions::new().env(["production"]));
    let snapshot = config.overrides().and_then(|o| o.get("_default")).unwrap();
    assert_eq!(
        snapshot.pointer(&["server", "port"]).and_then(Value::as_u64),
        Some(3333)
    );
    assert!(snapshot.get("overrides").is_none());
}

#[test]
fn process_env_is_applied_before_explicit_envs() {
    let mut config = minimal();
    config.insert(
        "overrides".into(),
        Value::from(json!({
            "ci": { "server": { "port": 1 }, "optimize": true },
            "local": { "server": { "port": 2 } }
        })),
    );
    let resolved = build(
        config,
        ResolveOptions::new().env(["local"]).process_env(Some("ci")),
    );
    assert_eq!(resolved.env(), ["ci", "local"]);
    assert_eq!(resolved.server().port, 2);
    assert!(resolved.optimize());
}

#[test]
fn runtime_options_win_over_overrides() {
    let options = ResolveOptions::new()
        .env(["production"])
        .set(["optimize"], false)
        .set(["server", "port"], 9000u16);
    let config = build(minimal(), options);
    assert!(!config.optimize());
    assert_eq!(config.server().port, 9000);
}

#[test]
fn runtime_options_extend_join_specs_key_by_key() {
    let options =
        ResolveOptions::new().set(["files", "javascripts", "joinTo", "tests.js"], "^test/");
    let config = build(minimal(), options);
    let join = config.join();
    assert_eq!(join.destinations_for("javascripts", "app/main.js"), ["app.js"]);
    assert_eq!(join.destinations_for("javascripts", "test/spec.js"), ["tests.js"]);
}

#[test]
fn join_config_is_compiled_from_final_tree() {
    let config = build(minimal(), ResolveOptions::new());
    let join = config.join();
    assert_eq!(join.destinations_for("javascripts", "app/main.js"), ["app.js"]);
    assert_eq!(join.destinations_for("javascripts", "vendor/jquery.js"), ["vendor.js"]);
    assert_eq!(join.destinations_for("stylesheets", "app/main.css"), ["app.css"]);
    assert_eq!(join.get("javascripts").unwrap().plugin_helpers(), ["vendor.js"]);
}

#[test]
fn windows_style_rewrites_destinations() {
    let config = ConfigBuilder::new(minimal())
        .options(ResolveOptions::new().path_style(PathStyle::Windows))
        .without_packages()
        .build()
        .unwrap();
    let css = config.join().get("stylesheets").unwrap();
    assert_eq!(css.plugin_helpers(), ["app.css"]);

    let mut nested = minimal();
    nested.insert(
        "files".into(),
        Value::from(json!({ "javascripts": { "joinTo": "js/app.js" } })),
    );
    let config = ConfigBuilder::new(nested)
        .options(ResolveOptions::new().path_style(PathStyle::Windows))
        .without_packages()
        .build()
        .unwrap();
    assert_eq!(
        config.join().destinations_for("javascripts", "app\\a.js"),
        ["js\\app.js"]
    );
}

#[test]
fn modules_are_compiled() {
    let config = build(minimal(), ResolveOptions::new());
    let modules = config.modules();
    let wrapped = modules.wrapper.wrap("app/main.js", "x", false);
    assert!(wrapped.render("x").starts_with("require.register(\"main\""));
    assert!(modules
        .definition
        .definition("public/app.js", "")
        .contains("require.register"));
}

#[test]
fn amd_wrapper_has_empty_definition() {
    let mut config = minimal();
    config.insert(
        "modules".into(),
        Value::from(json!({ "wrapper": "amd", "definition": "amd" })),
    );
    let resolved = build(config, ResolveOptions::new());
    assert_eq!(resolved.modules().definition.definition("app.js", ""), "");
}

#[test]
fn invalid_wrapper_aborts_resolution() {
    let mut config = minimal();
    config.insert("modules".into(), Value::from(json!({ "wrapper": "umd" })));
    let err = ConfigBuilder::new(config)
        .without_packages()
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidWrapper { .. }));
}

#[test]
fn deprecations_go_to_the_sink() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let seen = Rc::clone(&seen);
        move |message: &str| seen.borrow_mut().push(message.to_string())
    };
    let mut config = minimal();
    config.insert("buildPath".into(), Value::from("out"));

    ConfigBuilder::new(config)
        .warnings(sink)
        .without_packages()
        .build()
        .unwrap();
    assert_eq!(
        seen.borrow().as_slice(),
        ["config.buildPath moved to config.paths.public"]
    );
}

#[test]
fn plugin_strings_are_normalized() {
    let mut config = minimal();
    config.insert("plugins".into(), Value::from(json!({ "only": "sass" })));
    let resolved = build(config, ResolveOptions::new());
    assert_eq!(resolved.plugins().only, ["sass"]);
    assert!(resolved.plugins().on.is_empty());
}

#[test]
fn config_file_lists_follow_config_path() {
    let config = ConfigBuilder::new(minimal())
        .config_path("joinery-config")
        .options(ResolveOptions::new().path_style(PathStyle::Posix))
        .without_packages()
        .build()
        .unwrap();
    let normalized = config.normalized();
    assert_eq!(
        normalized.possible_config_files,
        ["joinery-config.toml", "joinery-config.json"]
    );
    assert_eq!(
        normalized.all_config_files,
        ["package.json", "bower.json", "joinery-config.toml", "joinery-config.json"]
    );
}

#[test]
fn resolved_config_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResolvedConfig>();

    let config = build(minimal(), ResolveOptions::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let config = Arc::clone(&config);
            std::thread::spawn(move || {
                config
                    .join()
                    .destinations_for("javascripts", &format!("app/{i}.js"))
                    .len()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}

#[test]
fn json_view_renders_matchers_and_functions() {
    let config = build(minimal(), ResolveOptions::new());
    let json = config.to_json();
    assert_eq!(json["conventions"]["assets"], json!("/assets[\\\\/]/"));
    assert_eq!(json["_normalized"]["join"]["javascripts"]["app.js"], json!("/^app//"));
    assert_eq!(
        json["_normalized"]["join"]["javascripts"]["pluginHelpers"],
        json!(["vendor.js"])
    );
    assert_eq!(json["env"], json!([]));
}

#[test]
fn load_and_resolve_reads_toml_and_finds_server() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("joinery-config.toml"),
        r#"
[paths]
public = "dist"

[files.javascripts.joinTo]
"js/app.js" = "^app/"
"js/vendor.js" = "^vendor/"

[overrides.production]
optimize = true
"#,
    )
    .expect("write config");
    fs::write(dir.path().join("joinery-server.js"), "module.exports = {};").unwrap();

    let config = load_and_resolve(
        dir.path(),
        None,
        ResolveOptions::new()
            .env(["production"])
            .path_style(PathStyle::Posix),
    )
    .expect("load and resolve");

    assert_eq!(config.paths().public, "dist");
    assert_eq!(config.paths().config, "joinery-config");
    assert_eq!(config.server().path.as_deref(), Some("joinery-server.js"));
    assert!(config.optimize());
    assert_eq!(
        config.join().destinations_for("javascripts", "vendor/a.js"),
        ["js/vendor.js"]
    );
    // No manifests in the project: package info is empty, not an error.
    assert!(config.package_info().bower.components.is_empty());
}
