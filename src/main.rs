use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use php_annotation::config;

/// Parse the annotations in a PHP docblock and print them as JSON.
#[derive(Debug, Parser)]
#[command(name = "php-annotation", version, about)]
struct Cli {
    /// File containing the docblock text; reads stdin when omitted.
    file: Option<PathBuf>,

    /// Registry file (TOML). Defaults to
    /// `<config dir>/php-annotation/registry.toml`.
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Location tag of the construct the docblock belongs to.
    #[arg(short, long, default_value = "class")]
    location: String,

    /// Namespace alias, as `ALIAS=Fully\Qualified\Namespace`. Repeatable;
    /// overrides aliases from the registry file.
    #[arg(short, long = "namespace", value_name = "ALIAS=NAMESPACE", value_parser = parse_alias)]
    namespaces: Vec<(String, String)>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn parse_alias(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((alias, namespace)) if !alias.trim().is_empty() => {
            Ok((alias.trim().to_string(), namespace.trim().to_string()))
        }
        _ => Err(format!("expected ALIAS=NAMESPACE, got `{raw}`")),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("php-annotation: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let registry_path = match cli.registry {
        Some(path) => path,
        None => config::default_registry_path().map_err(|e| e.to_string())?,
    };
    tracing::debug!(path = %registry_path.display(), "loading registry");
    let config = config::load_file(&registry_path).map_err(|e| e.to_string())?;
    let (parser, mut namespaces) = config.into_parser();
    namespaces.extend(cli.namespaces);

    let docblock = match &cli.file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            buf
        }
    };

    let result = parser
        .parse(&docblock, &cli.location, &namespaces)
        .map_err(|e| e.to_string())?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
