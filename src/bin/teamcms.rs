//! # teamcms
//!
//! Fetch one team member by slug and print the detail view.
//!
//! ## Usage
//!
//! ```bash
//! # Against NEXT_PUBLIC_API_URL, or http://localhost:1337 when unset
//! teamcms jane-doe
//!
//! # Explicit origin, raw record as JSON
//! teamcms jane-doe --origin https://cms.example.com --json
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use teamcms::{CmsBuilder, ContentConfig, DetailView, LoadState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "teamcms")]
#[command(about = "Load a team member from the content API")]
#[command(version)]
struct Args {
    /// Slug of the team member
    slug: String,

    /// Content API origin
    #[arg(long, env = "NEXT_PUBLIC_API_URL")]
    origin: Option<String>,

    /// API token
    #[arg(long, env = "CMS_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Print the bound record as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ContentConfig::default()
        .with_timeout(std::time::Duration::from_secs(args.timeout));
    if let Some(origin) = &args.origin {
        config = config.with_origin(origin);
    }
    if let Some(token) = args.token.as_ref().filter(|t| !t.trim().is_empty()) {
        config = config.with_token(token);
    }

    let loader = CmsBuilder::from_config(config.clone())
        .build()
        .context("failed to build content client")?;

    let state = loader.load(args.slug.as_str()).await;

    if args.json {
        match state.member() {
            Some(member) => println!("{}", serde_json::to_string_pretty(member)?),
            None => println!("null"),
        }
    } else {
        print!("{}", DetailView::from_state(&state, &config));
        if state.member().is_none() {
            println!();
        }
    }

    if let LoadState::Failed(failure) = &state {
        bail!("load failed ({:?}): {}", failure.kind(), failure);
    }
    Ok(())
}
