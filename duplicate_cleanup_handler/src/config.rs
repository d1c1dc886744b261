use anyhow::Context;

/// The indices cleaned when `CLEANUP_INDICES` is not set.
static DEFAULT_INDICES: &str = "documents,chats,emails,channels,projects";

/// The configuration parameters for the cleanup job.
///
/// Everything is pulled from environment variables (with `.env` support for
/// local runs), the same way the rest of our batch jobs are configured.
#[derive(Debug, Clone)]
pub struct Config {
    /// The URL of the opensearch cluster to clean.
    pub opensearch_url: String,

    pub opensearch_username: String,

    pub opensearch_password: String,

    /// The indices to scan for duplicates, processed in order.
    pub indices: Vec<String>,

    /// How many composite aggregation buckets to request per page.
    pub aggregation_page_size: i64,

    /// Upper bound on how many documents of one duplicate group are fetched.
    pub max_group_size: i64,
}

pub(crate) fn parse_indices(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let opensearch_url =
            std::env::var("OPENSEARCH_URL").context("OPENSEARCH_URL must be provided")?;
        let opensearch_username =
            std::env::var("OPENSEARCH_USERNAME").context("OPENSEARCH_USERNAME must be provided")?;
        let opensearch_password =
            std::env::var("OPENSEARCH_PASSWORD").context("OPENSEARCH_PASSWORD must be provided")?;

        let indices = std::env::var("CLEANUP_INDICES").unwrap_or(DEFAULT_INDICES.to_string());
        let indices = parse_indices(&indices);
        if indices.is_empty() {
            anyhow::bail!("CLEANUP_INDICES must name at least one index");
        }

        let aggregation_page_size = std::env::var("AGGREGATION_PAGE_SIZE")
            .unwrap_or("1000".to_string())
            .parse::<i64>()
            .context("AGGREGATION_PAGE_SIZE must be a valid number")?;

        let max_group_size = std::env::var("MAX_GROUP_SIZE")
            .unwrap_or("1000".to_string())
            .parse::<i64>()
            .context("MAX_GROUP_SIZE must be a valid number")?;

        Ok(Config {
            opensearch_url,
            opensearch_username,
            opensearch_password,
            indices,
            aggregation_page_size,
            max_group_size,
        })
    }
}
