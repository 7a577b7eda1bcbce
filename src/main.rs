use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nylas_workflow::{yaml, Credentials, NylasClient, NylasNode, Value};
use tracing_subscriber::EnvFilter;

#[derive(Subcommand)]
enum Command {
    /// Run a node definition over a JSON array of input items
    Run {
        /// YAML node definition
        #[arg(long)]
        node: PathBuf,

        /// JSON file holding an array of items (a single empty item if omitted)
        #[arg(long)]
        items: Option<PathBuf>,

        /// Capture item failures as error records instead of aborting
        #[arg(long, action, default_value = "false")]
        continue_on_fail: bool,
    },
    /// Check that the credentials are accepted by the Nylas API
    Check {
        /// Take credentials from this node definition instead of the environment
        #[arg(long)]
        node: Option<PathBuf>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    match args.command {
        Command::Run {
            node,
            items,
            continue_on_fail,
        } => {
            let mut node = yaml::load_file(&node)?;
            node.continue_on_fail |= continue_on_fail;

            let items = match items {
                Some(path) => read_items(&path)?,
                None => vec![Value::Object(Default::default())],
            };

            let client = NylasClient::new(credentials_for(Some(&node))?);
            let result = node.run(items, &client).await?;

            println!("{}", serde_json::to_string_pretty(&result.records)?);
        }
        Command::Check { node } => {
            let node = node.map(yaml::load_file).transpose()?;
            let client = NylasClient::new(credentials_for(node.as_ref())?);

            client
                .verify_credentials()
                .await
                .context("Nylas rejected the credentials")?;

            println!("Credentials OK ({})", client.credentials().base_uri());
        }
    }

    Ok(())
}

fn credentials_for(node: Option<&NylasNode>) -> Result<Credentials> {
    match node.and_then(|n| n.credentials.clone()) {
        Some(credentials) => Ok(credentials),
        None => Ok(Credentials::from_env()?),
    }
}

fn read_items(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read items file: {}", path.display()))?;

    match serde_json::from_str::<Value>(&content)
        .with_context(|| format!("Items file is not valid JSON: {}", path.display()))?
    {
        Value::Array(items) => Ok(items),
        _ => anyhow::bail!("Items file must hold a JSON array: {}", path.display()),
    }
}
