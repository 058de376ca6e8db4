use std::path::{Path, PathBuf};
use std::process;
use clap::Parser;
use futures::future;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;
use gqlbatch::config::{self, ConfigError, Overrides, DEFAULT_CONFIG_PATH};
use gqlbatch::{CallOptions, Client};

#[derive(Parser)]
#[command(version, about = "Sends query documents to a GraphQL endpoint and prints the responses")]
struct Cli {
    #[arg(short, long, help = "Path to config file from working directory, default: gqlbatch.json")]
    config: Option<PathBuf>,
    #[arg(short, long, help = "Profile used from config file, default: default")]
    profile: Option<String>,
    #[arg(short, long, help = "Endpoint url, override config file")]
    url: Option<String>,
    #[arg(short = 'H', long = "header", value_parser = config::parse_header, help = "Extra header as key:value, override config file")]
    headers: Vec<(String, String)>,
    #[arg(short, long, help = "Request timeout in seconds, override config file")]
    timeout: Option<u64>,
    #[arg(help = "Files holding query documents, sent concurrently; reads stdin when none are given")]
    files: Vec<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unable to read {name}: {source}")]
    Read { name: String, source: std::io::Error },
    #[error("{failed} of {total} requests failed")]
    Requests { failed: usize, total: usize },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = execute(Cli::parse()).await {
        eprintln!("{}", error);
        process::exit(1)
    }
}

async fn execute(args: Cli) -> Result<(), CliError> {
    let json_config = match &args.config {
        Some(path) => config::read_config(path, true)?,
        None => config::read_config(Path::new(DEFAULT_CONFIG_PATH), false)?,
    };
    let overrides = Overrides {
        profile: args.profile,
        url: args.url,
        headers: args.headers,
        timeout_secs: args.timeout,
    };
    let settings = config::resolve(json_config.as_ref(), overrides)?;

    let client = settings.headers
        .into_iter()
        .fold(Client::builder(&settings.url), |builder, (key, value)| builder.header(key, value))
        .build();
    let options = CallOptions { timeout: settings.timeout };

    let documents = read_documents(&args.files).await?;
    info!(url = %settings.url, documents = documents.len(), "sending documents");

    let requests = documents.iter().map(|(name, text)| {
        let client = &client;
        let options = &options;
        async move { (name, client.raw_request(text, options).await) }
    });

    let total = documents.len();
    let mut failed = 0;
    for (name, result) in future::join_all(requests).await {
        match result {
            Ok(body) => println!("{}", String::from_utf8_lossy(&body)),
            Err(error) => {
                failed += 1;
                eprintln!("{} - {}", name, error);
            }
        }
    }

    if failed > 0 {
        Err(CliError::Requests { failed, total })
    } else {
        Ok(())
    }
}

async fn read_documents(files: &[PathBuf]) -> Result<Vec<(String, String)>, CliError> {
    if files.is_empty() {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .map_err(|source| CliError::Read { name: "stdin".to_string(), source })?;
        return Ok(vec![("stdin".to_string(), content)]);
    }

    let reads = files.iter().map(|path| async move {
        let name = path.display().to_string();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok((name, content)),
            Err(source) => Err(CliError::Read { name, source }),
        }
    });
    future::try_join_all(reads).await
}
