pub mod bulk_delete;
pub mod duplicates;
pub mod error;
pub mod fetch;

pub use bulk_delete::{BulkDeleteOutcome, FailedDelete};
pub use duplicates::DuplicateKey;
pub use fetch::DocumentRef;

pub type Result<T> = std::result::Result<T, error::SearchIndexClientError>;

/// The business identifier used to detect duplicate documents. This is
/// distinct from the document's own `_id` within the index.
pub static DATABASE_ID_FIELD: &str = "databaseId";

use opensearch::{
    OpenSearch,
    auth::Credentials,
    cert::CertificateValidation,
    http::{
        Url,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
};

#[derive(Clone, Debug)]
pub struct SearchIndexClient {
    /// The opensearch client used to interact with the opensearch api
    inner: opensearch::OpenSearch,
}

impl SearchIndexClient {
    pub fn new(
        opensearch_url: String,
        opensearch_username: String,
        opensearch_password: String,
    ) -> anyhow::Result<Self> {
        let url = Url::parse(&opensearch_url)?;
        let credentials = Credentials::Basic(opensearch_username, opensearch_password);
        let conn_pool = SingleNodeConnectionPool::new(url);

        let cert_validation = if opensearch_url.contains("https://localhost") {
            CertificateValidation::None
        } else {
            CertificateValidation::Default
        };
        let transport = TransportBuilder::new(conn_pool)
            .auth(credentials)
            .disable_proxy()
            .cert_validation(cert_validation)
            .build()?;
        let client = OpenSearch::new(transport);
        Ok(Self { inner: client })
    }

    pub async fn health(&self) -> anyhow::Result<()> {
        let response = self.inner.cat().health().send().await?;
        let status = response.status_code();

        if status != 200 {
            return Err(anyhow::anyhow!(
                "Health check failed with status code {status}"
            ));
        }

        Ok(())
    }

    /// Enumerates every `databaseId` value occurring in 2 or more documents
    /// in the given index.
    pub async fn duplicate_database_ids(
        &self,
        index: &str,
        page_size: i64,
    ) -> Result<Vec<DuplicateKey>> {
        duplicates::duplicate_database_ids(&self.inner, index, page_size).await
    }

    /// Returns a reference to every document in the index whose `databaseId`
    /// equals the given key.
    pub async fn documents_by_database_id(
        &self,
        index: &str,
        database_id: &serde_json::Value,
        max_group_size: i64,
    ) -> Result<Vec<DocumentRef>> {
        fetch::documents_by_database_id(&self.inner, index, database_id, max_group_size).await
    }

    /// Deletes the referenced documents in a single bulk request.
    pub async fn bulk_delete(&self, refs: &[DocumentRef]) -> Result<BulkDeleteOutcome> {
        bulk_delete::bulk_delete(&self.inner, refs).await
    }
}
