use search_index_client::{DocumentRef, FailedDelete, SearchIndexClient};

use crate::config::Config;

/// What one run accomplished, reported to the entrypoint and logged.
#[derive(Debug, Default)]
pub struct CleanupSummary {
    /// Duplicate groups that still had more than one document at fetch time.
    pub groups_processed: usize,
    pub documents_deleted: usize,
    /// Every delete the backend accepted but could not apply. These documents
    /// still exist; the next run will pick them up again.
    pub failed_deletes: Vec<FailedDelete>,
}

/// Decides which document of a duplicate group survives.
///
/// The survivor is the document with the lexicographically smallest id, so
/// reruns against the same data always keep the same document regardless of
/// backend result order. Groups of fewer than two documents produce no plan.
pub(crate) fn plan_deletions(
    mut group: Vec<DocumentRef>,
) -> Option<(DocumentRef, Vec<DocumentRef>)> {
    if group.len() < 2 {
        return None;
    }

    group.sort_by(|a, b| a.id.cmp(&b.id));

    let mut group = group.into_iter();
    let kept = group.next()?;
    Some((kept, group.collect()))
}

#[tracing::instrument(skip(client, config, summary))]
pub async fn cleanup_index(
    client: &SearchIndexClient,
    index: &str,
    config: &Config,
    summary: &mut CleanupSummary,
) -> anyhow::Result<()> {
    let duplicates = client
        .duplicate_database_ids(index, config.aggregation_page_size)
        .await?;

    tracing::info!(duplicates = duplicates.len(), "duplicate keys found");

    for duplicate in duplicates {
        let group = client
            .documents_by_database_id(index, &duplicate.key, config.max_group_size)
            .await?;

        // The aggregation snapshot can be stale by fetch time. Only act if
        // the group still holds more than one document.
        let Some((kept, to_delete)) = plan_deletions(group) else {
            continue;
        };

        let outcome = client.bulk_delete(&to_delete).await?;

        tracing::info!(
            database_id = %duplicate.key,
            kept = %kept.id,
            deleted = outcome.deleted,
            failed = outcome.failed.len(),
            "duplicate group resolved"
        );

        summary.groups_processed += 1;
        summary.documents_deleted += outcome.deleted;
        summary.failed_deletes.extend(outcome.failed);
    }

    Ok(())
}

/// Cleans each configured index in turn, fully resolving every duplicate
/// group in one index before moving to the next. Any query or transport
/// failure aborts the remaining work.
pub async fn cleanup_indices(
    client: &SearchIndexClient,
    config: &Config,
) -> anyhow::Result<CleanupSummary> {
    let mut summary = CleanupSummary::default();

    for index in &config.indices {
        cleanup_index(client, index, config, &mut summary).await?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_ref(id: &str) -> DocumentRef {
        DocumentRef {
            index: "documents".to_string(),
            id: id.to_string(),
        }
    }

    #[test]
    fn test_keeps_smallest_id() {
        let group = vec![doc_ref("d2"), doc_ref("d3"), doc_ref("d1")];

        let (kept, to_delete) = plan_deletions(group).unwrap();

        assert_eq!(kept, doc_ref("d1"));
        assert_eq!(to_delete, vec![doc_ref("d2"), doc_ref("d3")]);
    }

    #[test]
    fn test_single_document_is_not_planned() {
        assert_eq!(plan_deletions(vec![doc_ref("d1")]), None);
    }

    #[test]
    fn test_empty_group_is_not_planned() {
        assert_eq!(plan_deletions(Vec::new()), None);
    }

    #[test]
    fn test_pair_deletes_exactly_one() {
        let group = vec![doc_ref("b"), doc_ref("a")];

        let (kept, to_delete) = plan_deletions(group).unwrap();

        assert_eq!(kept, doc_ref("a"));
        assert_eq!(to_delete, vec![doc_ref("b")]);
    }
}
