//! Config rendering into the build context.
//!
//! Substitution is delegated to minijinja. File templates resolve includes
//! against their containing directory, so a template may pull in siblings.
//! Referencing an undefined variable is an error rather than silently empty
//! output.

use std::fs;
use std::path::Path;

use minijinja::{path_loader, Environment, UndefinedBehavior};
use serde_json::{Map, Value};

use crate::assets;
use crate::config::AssetSource;
use crate::error::{Error, Result};

/// Renders `source` with `variables` and writes the result to `output`.
///
/// Rendering has no side effects beyond the single output file, and is
/// idempotent: identical template and variables produce byte-identical
/// output.
pub fn render(source: &AssetSource, output: &Path, variables: &Map<String, Value>) -> Result<()> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    let name = source.file_name();
    match source {
        AssetSource::File(path) => {
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            env.set_loader(path_loader(dir));
        }
        AssetSource::Packaged(asset) => {
            env.add_template(asset, assets::packaged(asset))
                .map_err(|source| Error::Template {
                    name: name.clone(),
                    source,
                })?;
        }
    }

    let rendered = env
        .get_template(&name)
        .and_then(|template| template.render(variables))
        .map_err(|source| Error::Template {
            name: name.clone(),
            source,
        })?;

    fs::write(output, rendered)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::config::{Location, Settings};

    fn scenario_variables() -> Map<String, Value> {
        Settings {
            locations: vec![Location {
                path: "/api".to_string(),
                backend: "http://127.0.0.1:4000".to_string(),
            }],
            ..Settings::default()
        }
        .template_variables()
    }

    #[test]
    fn renders_a_rule_per_location() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nginx.default.conf.j2");
        let source = AssetSource::Packaged(assets::DEFAULT_TEMPLATE);

        render(&source, &output, &scenario_variables()).unwrap();

        let rendered = fs::read_to_string(&output).unwrap();
        assert!(rendered.contains("server_name localhost;"));
        assert!(rendered.contains("location /api {"));
        assert!(rendered.contains("proxy_pass http://127.0.0.1:4000;"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.conf");
        let second = dir.path().join("second.conf");
        let source = AssetSource::Packaged(assets::DEFAULT_TEMPLATE);
        let variables = scenario_variables();

        render(&source, &first, &variables).unwrap();
        render(&source, &second, &variables).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn file_templates_can_include_siblings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("main.conf.j2"),
            "upstream: {{ server_name }}\n{% include 'cors.conf.j2' %}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("cors.conf.j2"),
            "add_header Access-Control-Allow-Origin *;",
        )
        .unwrap();

        let output = dir.path().join("out.conf");
        let source = AssetSource::File(dir.path().join("main.conf.j2"));
        render(&source, &output, &scenario_variables()).unwrap();

        let rendered = fs::read_to_string(&output).unwrap();
        assert!(rendered.contains("upstream: localhost"));
        assert!(rendered.contains("Access-Control-Allow-Origin"));
    }

    #[test]
    fn undefined_variable_is_a_template_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.conf.j2"), "{{ no_such_variable }}").unwrap();

        let output = dir.path().join("out.conf");
        let source = AssetSource::File(dir.path().join("bad.conf.j2"));
        let err = render(&source, &output, &scenario_variables()).unwrap_err();

        assert!(matches!(err, Error::Template { ref name, .. } if name == "bad.conf.j2"));
        assert!(!output.exists());
    }

    #[test]
    fn unreadable_template_is_a_template_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.conf");
        let source = AssetSource::File(dir.path().join("missing.conf.j2"));

        let err = render(&source, &output, &scenario_variables()).unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }

    #[test]
    fn extras_reach_the_template() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("named.conf.j2"), "server_name {{ server_name }};").unwrap();

        let mut variables = scenario_variables();
        variables.insert("server_name".to_string(), json!("proxy.local"));

        let output = dir.path().join("out.conf");
        let source = AssetSource::File(dir.path().join("named.conf.j2"));
        render(&source, &output, &variables).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "server_name proxy.local;"
        );
    }
}
