/*!
 * Publication workflow: draft, review, publish.
 */

use log::info;

use super::record::{ContentStatus, ContentUpdate};
use crate::errors::WorkflowError;
use crate::store::ContentStore;

/// Move a record to `next` if the workflow allows it from its current status.
pub async fn transition<S>(store: &S, id: &str, next: ContentStatus) -> Result<ContentStatus, WorkflowError>
where
    S: ContentStore + ?Sized,
{
    let record = store.get(id).await?;
    let current = record.status;

    if !current.can_transition_to(next) {
        return Err(WorkflowError::InvalidTransition {
            from: current.to_string(),
            to: next.to_string(),
        });
    }

    store
        .update(id, ContentUpdate::new().with_status(next))
        .await?;
    info!("Content {} moved from {} to {}", id, current, next);
    Ok(next)
}

/// Submit a draft for review
pub async fn submit<S: ContentStore + ?Sized>(store: &S, id: &str) -> Result<ContentStatus, WorkflowError> {
    transition(store, id, ContentStatus::PendingApproval).await
}

/// Approve or reject a submission
pub async fn review<S: ContentStore + ?Sized>(
    store: &S,
    id: &str,
    approve: bool,
) -> Result<ContentStatus, WorkflowError> {
    let next = if approve {
        ContentStatus::Approved
    } else {
        ContentStatus::Rejected
    };
    transition(store, id, next).await
}

/// Make approved content visible to readers
pub async fn publish<S: ContentStore + ?Sized>(store: &S, id: &str) -> Result<ContentStatus, WorkflowError> {
    transition(store, id, ContentStatus::Published).await
}
