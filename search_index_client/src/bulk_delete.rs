use opensearch::http::request::JsonBody;
use serde_json::Value;

use crate::{
    Result,
    error::{ResponseExt, SearchIndexClientError},
    fetch::DocumentRef,
};

/// One delete the bulk request accepted but could not apply.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FailedDelete {
    pub index: String,
    pub id: String,
    pub status: u16,
    pub reason: Option<String>,
}

/// Aggregate result of one bulk delete request. Item-level failures are
/// reported here instead of being folded into a single error log line, so
/// the caller knows exactly which (index, id) pairs still exist.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    pub deleted: usize,
    pub failed: Vec<FailedDelete>,
}

/// Builds the bulk action line for each document reference.
pub(crate) fn bulk_delete_actions(refs: &[DocumentRef]) -> Vec<Value> {
    refs.iter()
        .map(|r| {
            serde_json::json!({
                "delete": {
                    "_index": r.index,
                    "_id": r.id
                }
            })
        })
        .collect()
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct BulkItemError {
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct BulkDeleteItem {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    pub status: u16,
    pub error: Option<BulkItemError>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct BulkItem {
    pub delete: BulkDeleteItem,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct BulkResponse {
    pub errors: bool,
    pub items: Vec<BulkItem>,
}

/// Splits the bulk response into applied and failed deletes.
///
/// A 404 with no error object means the document was already gone, which is
/// the outcome we wanted, so it counts as deleted.
pub(crate) fn partition_bulk_response(response: BulkResponse) -> BulkDeleteOutcome {
    let mut outcome = BulkDeleteOutcome::default();

    for item in response.items {
        let item = item.delete;
        match item.error {
            Some(error) => outcome.failed.push(FailedDelete {
                index: item.index,
                id: item.id,
                status: item.status,
                reason: Some(format!(
                    "{}: {}",
                    error.kind,
                    error.reason.unwrap_or_default()
                )),
            }),
            None => outcome.deleted += 1,
        }
    }

    outcome
}

/// Deletes the referenced documents in a single bulk request.
///
/// An empty slice is a no-op: no request is sent. A rejected request (or a
/// non-success status) is an error; item-level failures are not. They are
/// logged per item and returned in the outcome so the caller can decide
/// whether to retry them.
#[tracing::instrument(skip(client, refs), fields(count = refs.len()))]
pub async fn bulk_delete(
    client: &opensearch::OpenSearch,
    refs: &[DocumentRef],
) -> Result<BulkDeleteOutcome> {
    if refs.is_empty() {
        return Ok(BulkDeleteOutcome::default());
    }

    let body: Vec<JsonBody<Value>> = bulk_delete_actions(refs)
        .into_iter()
        .map(JsonBody::from)
        .collect();

    let response = client
        .bulk(opensearch::BulkParts::None)
        .body(body)
        .send()
        .await
        .map_client_error()
        .await?;

    let result = response.json::<BulkResponse>().await.map_err(|e| {
        SearchIndexClientError::DeserializationFailed {
            details: e.to_string(),
            method: Some("bulk_delete".to_string()),
        }
    })?;

    let had_errors = result.errors;
    let outcome = partition_bulk_response(result);

    if had_errors {
        for failed in &outcome.failed {
            tracing::error!(
                index = %failed.index,
                id = %failed.id,
                status = failed.status,
                reason = ?failed.reason,
                "bulk delete item failed"
            );
        }
    }

    Ok(outcome)
}
