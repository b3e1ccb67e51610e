use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use classroom_client::auth::{AuthSession, SessionEvent, StaticTokenProvider};
use classroom_client::client::{ApiClient, ApiRequest};
use classroom_client::observability::metrics::gather_text;
use classroom_client::utils::config_loader;
use classroom_client::utils::logging;
use classroom_client::utils::logging::LogLevel;
use http::Method;
use serde_json::Value;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Bearer token handed out whenever the client needs one
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Print Prometheus metrics after the call
    #[arg(long)]
    metrics: bool,
    /// GET, POST, PUT or DELETE
    method: String,
    /// Path relative to the API base URL
    path: String,
    /// JSON body for POST/PUT
    body: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load config, init logging
    // -------------------------------

    let args = Args::parse();
    let client_config = config_loader::run(args.config.as_deref()).await?;
    logging::run(&client_config, args.log_level.to_owned())?;

    // -------------------------------
    // 2. Auth session and session-expired listener
    // -------------------------------

    let session = AuthSession::new(client_config.api.token_ttl_seconds);
    if let Some(token) = args.token.to_owned() {
        session.set_access_token_provider(Some(Arc::new(StaticTokenProvider::new(Some(token)))));
    }
    let mut events = session.subscribe();
    let listener = tokio::spawn(async move {
        while let Ok(SessionEvent::Expired { method, url }) = events.recv().await {
            warn!("session expired on {} {}, login required", method, url);
        }
    });

    // -------------------------------
    // 3. Issue the request
    // -------------------------------

    let client = ApiClient::new(&client_config.api, session)?;
    let method: Method = args.method.to_uppercase().parse()
        .map_err(|e| anyhow!("invalid method '{}': {}", args.method, e))?;
    let body = args.body.as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(|e| anyhow!("body is not valid JSON: {}", e))?;

    info!("{} {}", method, args.path);
    let result = client.execute::<Value>(ApiRequest::new(method, args.path.to_owned(), body)).await;
    // closes the event channel so the listener drains and exits
    drop(client);
    let _ = listener.await;

    if args.metrics {
        println!("{}", gather_text()?);
    }

    match result {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response.data)?);
            Ok(())
        }
        Err(err) => {
            let normalized = err.normalized();
            eprintln!("{}", serde_json::to_string_pretty(&normalized)?);
            Err(anyhow!(err))
        }
    }
}
