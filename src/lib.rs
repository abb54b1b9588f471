//! proxyboot - bootstraps a CORS-friendly reverse proxy container
//!
//! This library drives a three-stage lifecycle:
//! - Renders a proxy configuration template with the configured
//!   path→backend locations into a temporary build context
//! - Builds a container image embedding the rendered configuration
//! - Runs the image, either supervised with streamed output and graceful
//!   interactive shutdown, or synchronously
//!
//! Container build and run are delegated to the docker command line tool;
//! template substitution is delegated to minijinja.

pub mod assets;
pub mod cli;
pub mod config;
pub mod docker;
pub mod error;
pub mod exit_codes;
pub mod proxy;
pub mod template;
