use serde_json::Value;

use crate::{
    DATABASE_ID_FIELD, Result,
    error::{ResponseExt, SearchIndexClientError},
};

/// Enough identity to delete one document: the index it lives in plus its
/// storage `_id`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DocumentRef {
    pub index: String,
    pub id: String,
}

/// Builds the term query matching every document with the given `databaseId`.
/// `_source` is disabled since only `_index` and `_id` are needed.
pub(crate) fn documents_by_database_id_query(database_id: &Value, max_group_size: i64) -> Value {
    serde_json::json!({
        "query": {
            "term": {
                DATABASE_ID_FIELD: database_id
            }
        },
        "size": max_group_size,
        "_source": false,
    })
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RefHit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RefHits {
    pub hits: Vec<RefHit>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RefSearchResponse {
    pub hits: RefHits,
}

impl From<RefHit> for DocumentRef {
    fn from(hit: RefHit) -> Self {
        Self {
            index: hit.index,
            id: hit.id,
        }
    }
}

/// Returns a reference to every document in the index whose `databaseId`
/// equals the given value. Hits come back in backend order; callers that
/// care about ordering must sort themselves.
#[tracing::instrument(skip(client))]
pub async fn documents_by_database_id(
    client: &opensearch::OpenSearch,
    index: &str,
    database_id: &Value,
    max_group_size: i64,
) -> Result<Vec<DocumentRef>> {
    let query = documents_by_database_id_query(database_id, max_group_size);

    let response = client
        .search(opensearch::SearchParts::Index(&[index]))
        .body(query)
        .send()
        .await
        .map_client_error()
        .await?;

    let result = response.json::<RefSearchResponse>().await.map_err(|e| {
        SearchIndexClientError::DeserializationFailed {
            details: e.to_string(),
            method: Some("documents_by_database_id".to_string()),
        }
    })?;

    Ok(result
        .hits
        .hits
        .into_iter()
        .map(DocumentRef::from)
        .collect())
}
