use serde_json::Value;

use crate::{
    DATABASE_ID_FIELD, Result,
    error::{ResponseExt, SearchIndexClientError},
};

/// The aggregation source name the composite buckets are keyed under.
static AGGREGATION_NAME: &str = "database_ids";

/// A `databaseId` value that occurs in more than one document.
///
/// The key is kept as a raw json value since `databaseId` can be a string or
/// a number; it is echoed back verbatim into the follow-up term query.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateKey {
    pub key: Value,
    pub doc_count: i64,
}

/// Builds one page of the composite aggregation over `databaseId`.
///
/// Composite aggregations have no server-side `min_doc_count`, so every
/// distinct value comes back and callers filter on `doc_count` themselves.
pub(crate) fn duplicate_keys_query(page_size: i64, after: Option<&Value>) -> Value {
    let mut composite = serde_json::json!({
        "size": page_size,
        "sources": [
            {
                AGGREGATION_NAME: {
                    "terms": {
                        "field": DATABASE_ID_FIELD
                    }
                }
            }
        ]
    });

    if let Some(after) = after {
        composite["after"] = serde_json::json!({ AGGREGATION_NAME: after });
    }

    serde_json::json!({
        "size": 0,
        "aggs": {
            AGGREGATION_NAME: {
                "composite": composite
            }
        }
    })
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct BucketKey {
    pub database_ids: Value,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct Bucket {
    pub key: BucketKey,
    pub doc_count: i64,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct CompositeAggregation {
    pub after_key: Option<BucketKey>,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct Aggregations {
    pub database_ids: CompositeAggregation,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct AggregationResponse {
    pub aggregations: Aggregations,
}

/// Keeps only the buckets that actually contain duplicates.
pub(crate) fn collect_duplicates(buckets: Vec<Bucket>, out: &mut Vec<DuplicateKey>) {
    out.extend(
        buckets
            .into_iter()
            .filter(|b| b.doc_count >= 2)
            .map(|b| DuplicateKey {
                key: b.key.database_ids,
                doc_count: b.doc_count,
            }),
    );
}

/// Enumerates every `databaseId` value occurring in 2 or more documents in
/// the index, paging through the composite aggregation with its `after_key`
/// cursor so no backend terms-size limit caps the result.
#[tracing::instrument(skip(client))]
pub async fn duplicate_database_ids(
    client: &opensearch::OpenSearch,
    index: &str,
    page_size: i64,
) -> Result<Vec<DuplicateKey>> {
    let mut duplicates = Vec::new();
    let mut after: Option<Value> = None;

    loop {
        let query = duplicate_keys_query(page_size, after.as_ref());

        let response = client
            .search(opensearch::SearchParts::Index(&[index]))
            .body(query)
            .send()
            .await
            .map_client_error()
            .await?;

        let result = response
            .json::<AggregationResponse>()
            .await
            .map_err(|e| SearchIndexClientError::DeserializationFailed {
                details: e.to_string(),
                method: Some("duplicate_database_ids".to_string()),
            })?;

        let page = result.aggregations.database_ids;
        let page_len = page.buckets.len() as i64;
        collect_duplicates(page.buckets, &mut duplicates);

        tracing::trace!(page_len, duplicates = duplicates.len(), "aggregation page");

        match page.after_key {
            Some(key) if page_len == page_size => after = Some(key.database_ids),
            _ => break,
        }
    }

    Ok(duplicates)
}
