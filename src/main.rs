use clap::{App, Arg};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wintersun::build::{build_site, BuildContext};
use wintersun::config::{Config, Overrides};

fn main() {
    let matches = App::new("wintersun")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("MANIFEST")
                .help("The site manifest (YAML)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("delete")
                .short("d")
                .long("delete")
                .help("Removes the target directory before building"),
        )
        .arg(
            Arg::with_name("target")
                .short("t")
                .long("target")
                .value_name("DIR")
                .takes_value(true)
                .help("Overrides the manifest's target directory"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Logs every file read and written"),
        )
        .get_matches();

    // --verbose enables INFO, otherwise use RUST_LOG or default to WARN
    let filter = if matches.is_present("verbose") {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let manifest = Path::new(matches.value_of("MANIFEST").unwrap_or_default());
    let overrides = Overrides {
        target_dir: matches.value_of("target").map(PathBuf::from),
        delete_target_dir: matches.is_present("delete"),
    };

    let config = match Config::from_project_file(manifest, overrides) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = build_site(&mut BuildContext::new(config)) {
        tracing::error!("{}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            tracing::error!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}
