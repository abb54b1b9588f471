//! Command line surface.
//!
//! clap handles the known flags; [`split_extra_args`] runs first and pulls
//! any unrecognized `--key value` pair out of the argv so it can be forwarded
//! to the templating engine. Templates can therefore reference options this
//! binary has never heard of.

use std::path::PathBuf;

use clap::Parser;

use crate::assets;
use crate::config::{self, AssetSource, Location, Settings};
use crate::error::{Error, Result};

/// Reverse proxy wrapper to handle CORS protection measures.
#[derive(Parser, Debug)]
#[command(name = "proxyboot", version, about)]
pub struct Options {
    /// Service locations to proxy, formatted like path@backend
    /// (e.g. /api@http://127.0.0.1:4000)
    #[arg(required = true, value_name = "LOCATION")]
    pub locations: Vec<String>,

    /// Listening port for the reverse proxy
    #[arg(long, default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Force synchronous communication with the proxy
    #[arg(long)]
    pub sync: bool,

    /// Docker tag for the reverse proxy container
    #[arg(long, default_value = config::DEFAULT_TAG)]
    pub tag: String,

    /// Dockerfile for building the container (defaults to the packaged one)
    #[arg(long, value_name = "PATH")]
    pub dockerfile: Option<PathBuf>,

    /// Proxy server config template to substitute (defaults to the packaged one)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Flags consumed by [`Options`]; everything else `--`-prefixed is a
/// template variable.
const KNOWN_FLAGS: &[&str] = &[
    "--port",
    "--verbose",
    "--sync",
    "--tag",
    "--dockerfile",
    "--config",
    "--help",
    "--version",
];

/// Splits an argv into the arguments clap should see and the extra
/// `--key value` pairs destined for the template variables.
///
/// `--key=value` is accepted too. Keys are normalized the way argparse
/// normalizes option names (`-` becomes `_`) so they stay valid template
/// identifiers. An unknown flag with no value following it is an input
/// error.
pub fn split_extra_args<I>(argv: I) -> Result<(Vec<String>, Vec<(String, String)>)>
where
    I: IntoIterator<Item = String>,
{
    let mut known = Vec::new();
    let mut extras = Vec::new();
    let mut iter = argv.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            known.push(arg);
            continue;
        }
        let flag = arg.split_once('=').map(|(f, _)| f).unwrap_or(arg.as_str());
        if flag.starts_with("--") && !KNOWN_FLAGS.contains(&flag) {
            let key = normalize_key(&flag[2..]);
            if let Some((_, value)) = arg.split_once('=') {
                extras.push((key, value.to_string()));
            } else {
                match iter.next() {
                    Some(value) => extras.push((key, value)),
                    None => {
                        return Err(Error::MissingValue {
                            flag: flag.to_string(),
                        })
                    }
                }
            }
            continue;
        }
        known.push(arg);
    }

    Ok((known, extras))
}

fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
}

impl Options {
    /// Parses location tokens and resolves asset sources into validated
    /// [`Settings`], checking referenced files exist before any lifecycle
    /// work begins.
    pub fn into_settings(self, extra_vars: Vec<(String, String)>) -> Result<Settings> {
        let locations = self
            .locations
            .iter()
            .map(|token| Location::parse(token))
            .collect::<Result<Vec<_>>>()?;

        let template = match self.config {
            Some(path) => AssetSource::File(path),
            None => AssetSource::Packaged(assets::DEFAULT_TEMPLATE),
        };
        let dockerfile = match self.dockerfile {
            Some(path) => AssetSource::File(path),
            None => AssetSource::Packaged(assets::DEFAULT_DOCKERFILE),
        };

        let settings = Settings {
            locations,
            port: self.port,
            verbose: self.verbose,
            sync: self.sync,
            tag: self.tag,
            template,
            dockerfile,
            extra_vars,
        };
        settings.validate()?;
        Ok(settings)
    }
}
