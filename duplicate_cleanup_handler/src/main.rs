use anyhow::Context;
use duplicate_cleanup_handler::{cleanup, config::Config};
use search_index_client::SearchIndexClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_line_number(true)
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .with_current_span(true) // Include current span in formatted events
        .with_span_list(false) // Disable nesting all spans
        .flatten_event(true) // Flattens event fields
        .init();

    tracing::info!("initiating duplicate cleanup");

    let config = Config::from_env().context("all necessary env vars should be available")?;

    tracing::trace!("initialized config");

    let client = SearchIndexClient::new(
        config.opensearch_url.clone(),
        config.opensearch_username.clone(),
        config.opensearch_password.clone(),
    )
    .context("could not build opensearch client")?;

    client
        .health()
        .await
        .context("opensearch is not reachable")?;

    let summary = match cleanup::cleanup_indices(&client, &config).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = ?e, "cleanup aborted");
            return Err(e);
        }
    };

    tracing::info!(
        groups_processed = summary.groups_processed,
        documents_deleted = summary.documents_deleted,
        failed_deletes = summary.failed_deletes.len(),
        "cleanup complete"
    );

    Ok(())
}
