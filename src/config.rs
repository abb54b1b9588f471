//! Run configuration: proxy locations, asset sources, and the merged
//! template variables handed to the renderer.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::assets;
use crate::error::{Error, Result};

/// Default listening port for the reverse proxy.
pub const DEFAULT_PORT: u16 = 5000;

/// Default docker tag for the reverse proxy container.
pub const DEFAULT_TAG: &str = "dev/cors-reverse-proxy";

/// A single proxy rule, parsed from a `path@backend` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Request path prefix served by this rule
    pub path: String,
    /// Upstream the rule proxies to
    pub backend: String,
}

impl Location {
    /// Parses a `path@backend` token, splitting on the first `@`.
    ///
    /// Both halves must be non-empty; anything else is a hard input error,
    /// never a partial result.
    pub fn parse(token: &str) -> Result<Self> {
        match token.split_once('@') {
            Some((path, backend)) if !path.is_empty() && !backend.is_empty() => Ok(Self {
                path: path.to_string(),
                backend: backend.to_string(),
            }),
            _ => Err(Error::InvalidLocation {
                token: token.to_string(),
            }),
        }
    }
}

/// Where a template or container-definition file comes from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// A user-supplied path on disk.
    File(PathBuf),
    /// A default packaged into the binary, by asset name.
    Packaged(&'static str),
}

impl AssetSource {
    /// The file name under which this asset appears in the build context.
    pub fn file_name(&self) -> String {
        match self {
            AssetSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            AssetSource::Packaged(name) => (*name).to_string(),
        }
    }

    /// Copies the asset verbatim to `dest`.
    pub fn copy_to(&self, dest: &Path) -> Result<()> {
        match self {
            AssetSource::File(path) => {
                fs::copy(path, dest)?;
            }
            AssetSource::Packaged(name) => fs::write(dest, assets::packaged(name))?,
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if let AssetSource::File(path) = self {
            if !path.is_file() {
                return Err(Error::MissingFile { path: path.clone() });
            }
        }
        Ok(())
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSource::File(path) => write!(f, "{}", path.display()),
            AssetSource::Packaged(name) => write!(f, "packaged {name}"),
        }
    }
}

/// Validated run parameters for one bootstrap lifecycle.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Proxy rules, in the order given on the command line
    pub locations: Vec<Location>,
    /// Host port the container's port 80 is mapped to
    pub port: u16,
    /// Surface collaborator output and debug logging
    pub verbose: bool,
    /// Run the container synchronously instead of supervised
    pub sync: bool,
    /// Image tag to build and run
    pub tag: String,
    /// Proxy config template to render
    pub template: AssetSource,
    /// Container definition copied verbatim into the build context
    pub dockerfile: AssetSource,
    /// Extra `--key value` pairs forwarded to the templating engine
    pub extra_vars: Vec<(String, String)>,
}

impl Settings {
    /// Checks that every file named on the command line actually exists.
    ///
    /// Runs before any template, build, or run work begins.
    pub fn validate(&self) -> Result<()> {
        self.template.validate()?;
        self.dockerfile.validate()?;
        Ok(())
    }

    /// Merges the fixed defaults, every run parameter, and the user-supplied
    /// extras into the variable map handed to the templating engine.
    ///
    /// Later keys override earlier ones, so an extra `--server_name` beats
    /// the built-in `localhost` and templates can reference any configured
    /// option plus the location list.
    pub fn template_variables(&self) -> Map<String, Value> {
        let mut variables = Map::new();
        variables.insert("server_name".to_string(), json!("localhost"));
        variables.insert("locations".to_string(), json!([]));

        variables.insert("port".to_string(), json!(self.port));
        variables.insert("verbose".to_string(), json!(self.verbose));
        variables.insert("sync".to_string(), json!(self.sync));
        variables.insert("tag".to_string(), json!(self.tag));
        variables.insert("config".to_string(), json!(self.template.to_string()));
        variables.insert("dockerfile".to_string(), json!(self.dockerfile.to_string()));
        variables.insert("locations".to_string(), json!(self.locations));

        for (key, value) in &self.extra_vars {
            variables.insert(key.clone(), json!(value));
        }
        variables
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            port: DEFAULT_PORT,
            verbose: false,
            sync: false,
            tag: DEFAULT_TAG.to_string(),
            template: AssetSource::Packaged(assets::DEFAULT_TEMPLATE),
            dockerfile: AssetSource::Packaged(assets::DEFAULT_DOCKERFILE),
            extra_vars: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_location() {
        let location = Location::parse("/api@http://127.0.0.1:4000").unwrap();
        assert_eq!(location.path, "/api");
        assert_eq!(location.backend, "http://127.0.0.1:4000");
    }

    #[test]
    fn splits_on_first_separator_only() {
        // Backends may legitimately contain '@' (credentials in the URL)
        let location = Location::parse("/api@http://user@host:4000").unwrap();
        assert_eq!(location.path, "/api");
        assert_eq!(location.backend, "http://user@host:4000");
    }

    #[test]
    fn rejects_token_without_separator() {
        let err = Location::parse("apihttp").unwrap_err();
        assert!(matches!(err, Error::InvalidLocation { ref token } if token == "apihttp"));
    }

    #[test]
    fn rejects_empty_path_or_backend() {
        assert!(Location::parse("@http://127.0.0.1:4000").is_err());
        assert!(Location::parse("/api@").is_err());
        assert!(Location::parse("@").is_err());
    }

    #[test]
    fn template_variables_include_defaults_and_run_parameters() {
        let settings = Settings {
            locations: vec![Location {
                path: "/api".to_string(),
                backend: "http://127.0.0.1:4000".to_string(),
            }],
            ..Settings::default()
        };
        let variables = settings.template_variables();

        assert_eq!(variables["server_name"], json!("localhost"));
        assert_eq!(variables["port"], json!(5000));
        assert_eq!(variables["sync"], json!(false));
        assert_eq!(variables["tag"], json!("dev/cors-reverse-proxy"));
        assert_eq!(
            variables["locations"],
            json!([{"path": "/api", "backend": "http://127.0.0.1:4000"}])
        );
    }

    #[test]
    fn extras_override_defaults() {
        let settings = Settings {
            extra_vars: vec![("server_name".to_string(), "proxy.local".to_string())],
            ..Settings::default()
        };
        let variables = settings.template_variables();
        assert_eq!(variables["server_name"], json!("proxy.local"));
    }

    #[test]
    fn validate_rejects_missing_files() {
        let settings = Settings {
            template: AssetSource::File(PathBuf::from("/nonexistent/nginx.conf.j2")),
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, Error::MissingFile { .. }));
        assert!(err.to_string().contains("/nonexistent/nginx.conf.j2"));
    }

    #[test]
    fn packaged_sources_need_no_files_on_disk() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn asset_file_name_is_preserved_from_the_source() {
        let source = AssetSource::File(PathBuf::from("/tmp/templates/mine.conf.j2"));
        assert_eq!(source.file_name(), "mine.conf.j2");

        let packaged = AssetSource::Packaged(assets::DEFAULT_TEMPLATE);
        assert_eq!(packaged.file_name(), "nginx.default.conf.j2");
    }
}
