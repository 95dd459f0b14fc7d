use lather::{
    http::{CgiPeer, Request},
    ServiceConfig, SoapService,
};
use std::{io, path::PathBuf};
use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
#[error("Division by zero.")]
pub struct DivisionByZero;

pub struct Calculator;

/// Simple calculator service.
#[lather::service(name = "demo.Calculator")]
impl Calculator {
    /// Add two numbers.
    /// @param float $a
    /// @param float $b
    /// @return float
    pub fn add(&self, a: f64, b: f64) -> f64 {
        a + b
    }

    /// Subtract two numbers.
    /// @param float $a
    /// @param float $b
    /// @return float
    pub fn subtract(&self, a: f64, b: f64) -> f64 {
        a - b
    }

    /// Multiply two numbers.
    /// @param float $a
    /// @param float $b
    /// @return float
    pub fn multiply(&self, a: f64, b: f64) -> f64 {
        a * b
    }

    /// Divide two numbers.
    /// @param float $a
    /// @param float $b
    /// @return float
    pub fn divide(&self, a: f64, b: f64) -> Result<f64, DivisionByZero> {
        if b == 0.0 {
            return Err(DivisionByZero);
        }

        Ok(a / b)
    }
}

/// Serves the calculator as a CGI program.
#[derive(StructOpt)]
struct Args {
    /// TOML service configuration.
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Endpoint URL; inferred from the CGI environment by default.
    #[structopt(short, long)]
    location: Option<String>,

    /// Directory where the WSDL document is cached.
    #[structopt(short, long, parse(from_os_str))]
    schema_dir: Option<PathBuf>,
}

#[paw::main]
fn main(args: Args) -> Result<(), lather::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    if args.location.is_some() {
        config.location = args.location;
    }
    if args.schema_dir.is_some() {
        config.schema_dir = args.schema_dir;
    }

    let service = SoapService::from_config(Calculator, &config)?;
    let request = Request::from_cgi(io::stdin())?;

    debug!(
        location = service.description().location(),
        query = %request.query,
        "serving calculator request"
    );

    service.process(&request, &mut CgiPeer::new(io::stdout()))
}
