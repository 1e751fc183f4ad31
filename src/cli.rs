use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{CacertDate, ClientConfig, ResolutionOptions, DEFAULT_BUNDLE_BASE_URL};
use crate::error::ChainError;
use crate::utils::read_certificate_file;
use crate::ChainResolver;

#[derive(Parser, Debug)]
#[command(name = "mkchain")]
#[command(
    version,
    about = "Build the intermediate chain for a leaf certificate",
    long_about = None
)]
pub struct Cli {
    #[arg(help = "Leaf certificate, PEM or DER")]
    pub cert: Option<PathBuf>,

    #[arg(short = 'l', long, help = "Include the leaf certificate")]
    pub include_leaf: bool,

    #[arg(short = 'r', long, help = "Include the root certificate")]
    pub include_root: bool,

    #[arg(
        short = 'c',
        long,
        value_name = "DATE",
        env = "MKCHAIN_CACERT_DATE",
        help = "Build chain against a specific CA bundle revision (YYYY-MM-DD) for better legacy \
                client compatibility. See https://curl.se/docs/caextract.html"
    )]
    pub cacert_date: Option<CacertDate>,

    #[arg(
        long,
        value_name = "URL",
        default_value = DEFAULT_BUNDLE_BASE_URL,
        help = "Where CA bundle revisions are served from"
    )]
    pub cacert_base_url: String,

    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = crate::config::DEFAULT_TIMEOUT_SECS,
        help = "Timeout for each HTTP request"
    )]
    pub timeout: u64,

    #[arg(short, long, help = "Write the chain to a file instead of standard output")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn options(&self) -> ResolutionOptions {
        ResolutionOptions {
            include_leaf: self.include_leaf,
            include_root: self.include_root,
            cacert_date: self.cacert_date,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            bundle_base_url: self.cacert_base_url.clone(),
            timeout: Duration::from_secs(self.timeout),
            ..ClientConfig::default()
        }
    }
}

pub fn run_cli() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let path = cli.cert.as_ref().ok_or_else(|| {
        ChainError::InvalidInput("No certificate file specified.".to_string())
    })?;
    let leaf = read_certificate_file(path)?;

    let resolver = ChainResolver::with_config(cli.options(), cli.client_config());
    let mut pem = resolver.chain(&leaf)?;
    if !pem.ends_with('\n') {
        pem.push('\n');
    }

    match &cli.output {
        Some(output) => std::fs::write(output, &pem)
            .with_context(|| format!("failed to write chain to {}", output.display()))?,
        None => std::io::stdout().lock().write_all(pem.as_bytes())?,
    }
    Ok(())
}

/// One-line report: known failures are errors, anything else is unexpected.
pub fn error_line(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ChainError>() {
        Some(e) if e.is_user_error() => format!("Error: {e}"),
        _ => format!("Unexpected error: {err:#}"),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
