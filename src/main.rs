use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use certificate_requestor::{
    AwsServiceClients, CallbackReporter, HttpCallbackTransport, InvocationContext,
    RequestHandler, RequestorConfig, ResourceEvent,
};
use clap::Parser;
use log::info;

/// Handles one CloudFormation custom resource request for a DNS-validated ACM certificate.
#[derive(Parser)]
#[command(name = "certificate-requestor", version, long_about = None)]
struct Cli {
    /// Path to the request event JSON. Reads stdin when omitted.
    #[arg(short, long, value_name = "PATH")]
    event: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let raw = match &cli.event {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read event from {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read event from stdin")?;
            buffer
        }
    };
    let event: ResourceEvent =
        serde_json::from_str(&raw).context("Event is not a valid custom resource request")?;

    let config = RequestorConfig::from_env();
    let transport = HttpCallbackTransport::new(config.callback_timeout);
    let handler = RequestHandler::new(
        Arc::new(AwsServiceClients::new()),
        CallbackReporter::new(Box::new(transport)),
        config,
        InvocationContext::from_env(),
    );

    let response = handler.handle(&event);
    info!(
        "[main] Request {} finished with {}",
        response.request_id, response.status
    );
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
