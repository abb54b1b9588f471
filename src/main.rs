use std::process;

use clap::Parser;
use tracing::{debug, error, info};

use proxyboot::cli::{self, Options};
use proxyboot::proxy::Proxy;

#[tokio::main]
async fn main() {
    let (known_args, extra_vars) = match cli::split_extra_args(std::env::args()) {
        Ok(parts) => parts,
        Err(err) => {
            // Logging is not up yet; mirror clap's own error output
            eprintln!("error: {err}");
            process::exit(err.exit_code());
        }
    };
    let options = Options::parse_from(known_args);

    init_tracing(options.verbose);

    let settings = match options.into_settings(extra_vars) {
        Ok(settings) => settings,
        Err(err) => {
            error!(error = %err, "Invalid invocation");
            process::exit(err.exit_code());
        }
    };

    info!(template = %settings.template, "Using reverse proxy template");
    debug!(?settings, "Effective settings");

    let mut proxy = Proxy::new(settings);
    if let Err(err) = proxy.start().await {
        error!(error = %err, "Aborting");
        process::exit(err.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let directive = if verbose {
        "proxyboot=debug"
    } else {
        "proxyboot=info"
    };
    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(directive.parse().expect("valid log directive"));
    if verbose {
        // Streamed collaborator output is logged under the "docker" target
        filter = filter.add_directive("docker=info".parse().expect("valid log directive"));
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
