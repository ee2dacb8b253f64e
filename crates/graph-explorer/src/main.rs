use clap::Parser;
use tracing_subscriber::EnvFilter;

use skygraph_core::cli::{Cli, RunOptions};
use skygraph_core::{analyze, export, fetch_social_graph, BskyClient, Result};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Startup validation: a bad export format or credential pair fails
    // here, before any network activity.
    let RunOptions {
        actor,
        credentials,
        export: format,
        output,
        include_raw,
    } = cli.into_options()?;

    let mut client = BskyClient::new()?;
    if let Some(creds) = credentials {
        client.login(&creds.identifier, &creds.password).await?;
    }

    let graph = fetch_social_graph(&client, &actor).await?;
    let rels = analyze(&graph.followers, &graph.follows);

    match format {
        Some(format) => export::write_report(&graph, &rels, format, output.as_deref(), include_raw)?,
        None => export::print_summary(&graph, &rels),
    }
    Ok(())
}
