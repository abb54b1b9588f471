//! Packaged default assets.
//!
//! The default nginx template and Dockerfile ship inside the binary so that
//! `proxyboot /api@http://127.0.0.1:4000` works with no files on disk.

use include_dir::{include_dir, Dir};

static ASSETS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// File name of the packaged reverse proxy template.
pub const DEFAULT_TEMPLATE: &str = "nginx.default.conf.j2";

/// File name of the packaged container definition.
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// Returns the content of a packaged asset.
///
/// Panics if `name` is not one of the files embedded at compile time; the
/// two constants above are the only names callers should pass.
pub fn packaged(name: &str) -> &'static str {
    ASSETS
        .get_file(name)
        .and_then(|f| f.contents_utf8())
        .unwrap_or_else(|| panic!("asset {name} not embedded"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_is_embedded() {
        let template = packaged(DEFAULT_TEMPLATE);
        assert!(template.contains("{{ server_name }}"));
        assert!(template.contains("{% for location in locations %}"));
    }

    #[test]
    fn default_dockerfile_is_embedded() {
        let dockerfile = packaged(DEFAULT_DOCKERFILE);
        assert!(dockerfile.contains("ARG nginx_config"));
    }
}
