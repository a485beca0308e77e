//! `joinery join`

use std::io::{self, Write};

use joinery_config::{ResolvedConfig, TypeJoin};

use crate::cli::JoinArgs;
use crate::commands::utils::load_project;
use crate::error::{CliError, Result};

/// Execute the join command.
pub fn execute(args: JoinArgs) -> Result<()> {
    let config = load_project(&args.project)?;
    let join = find_type(&config, &args.file_type)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for path in &args.paths {
        writeln!(out, "{}", describe(&config, join, path))?;
    }
    Ok(())
}

fn find_type<'a>(config: &'a ResolvedConfig, file_type: &str) -> Result<&'a TypeJoin> {
    config.join().get(file_type).ok_or_else(|| CliError::UnknownFileType {
        file_type: file_type.to_string(),
        known: config
            .join()
            .types()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// One output line: the path, then every destination it joins.
fn describe(config: &ResolvedConfig, join: &TypeJoin, path: &str) -> String {
    let conventions = config.conventions();
    if conventions.is_ignored(path) {
        return format!("{path}: ignored");
    }
    let destinations = join.destinations_for(path);
    let mut line = if destinations.is_empty() {
        format!("{path}: -")
    } else {
        format!("{path}: {}", destinations.join(", "))
    };
    if conventions.is_vendor(path) {
        line.push_str(" (vendor)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinery_config::{ConfigBuilder, PathStyle, ResolveOptions, Value};
    use serde_json::json;
    use std::sync::Arc;

    fn config() -> Arc<ResolvedConfig> {
        let tree = Value::from(json!({
            "files": {
                "javascripts": { "joinTo": { "app.js": "^app/", "all.js": "\\.js$" } },
                "stylesheets": { "joinTo": "app.css" }
            }
        }));
        ConfigBuilder::new(tree.as_map().cloned().unwrap())
            .options(ResolveOptions::new().path_style(PathStyle::Posix))
            .without_packages()
            .build()
            .unwrap()
    }

    #[test]
    fn paths_list_every_destination() {
        let config = config();
        let join = find_type(&config, "javascripts").unwrap();
        assert_eq!(describe(&config, join, "app/a.js"), "app/a.js: app.js, all.js");
        assert_eq!(
            describe(&config, join, "vendor/b.js"),
            "vendor/b.js: all.js (vendor)"
        );
        assert_eq!(describe(&config, join, "app/a.coffee"), "app/a.coffee: app.js");
        assert_eq!(describe(&config, join, "lib/x.txt"), "lib/x.txt: -");
        assert_eq!(describe(&config, join, "app/_partial.js"), "app/_partial.js: ignored");
    }

    #[test]
    fn unknown_type_names_the_known_ones() {
        let config = config();
        let err = find_type(&config, "templates").unwrap_err();
        assert!(err.to_string().contains("javascripts, stylesheets"));
    }
}
