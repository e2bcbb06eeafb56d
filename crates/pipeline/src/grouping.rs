//! Event grouping: turn a deployment's capture timestamps into monitoring
//! sessions.
//!
//! The whole pass is idempotent: rerunning it over unchanged captures
//! reuses the existing event rows (matched on their `group_by` key) and
//! leaves the assignment untouched.

use ambi_core::grouping::{self, default_max_time_gap};
use ambi_core::types::DbId;
use chrono::Duration;
use tracing::{info, warn};

use ambi_db::repositories::{CaptureRepo, DeploymentRepo, EventRepo};
use ambi_db::DbPool;

use crate::error::PipelineError;

/// Summary of one grouping pass over a deployment.
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupingOutcome {
    pub events: usize,
    pub captures_assigned: u64,
    pub events_deleted: u64,
}

/// Group a deployment's captures into events by timestamp gaps.
///
/// Each maximal run of timestamps separated by less than `max_gap`
/// (default two hours) becomes one event, keyed by the date of its first
/// timestamp. Captures move to their event by timestamp, event boundaries
/// are recomputed from actual members, and events left with no captures
/// and no occurrences are pruned.
pub async fn regroup_deployment_captures(
    pool: &DbPool,
    deployment_id: DbId,
    max_gap: Option<Duration>,
) -> Result<GroupingOutcome, PipelineError> {
    let max_gap = max_gap.unwrap_or_else(default_max_time_gap);

    let timestamps = CaptureRepo::distinct_timestamps(pool, deployment_id).await?;
    let duplicates = CaptureRepo::duplicate_timestamps(pool, deployment_id).await?;
    if !duplicates.is_empty() {
        // Duplicates are grouped together regardless, but usually indicate
        // misconfigured filename parsing on the deployment.
        warn!(
            deployment_id,
            count = duplicates.len(),
            "deployment has captures sharing a timestamp"
        );
    }

    let groups = grouping::group_timestamps_by_gap(&timestamps, max_gap);
    let mut outcome = GroupingOutcome {
        events: groups.len(),
        ..Default::default()
    };

    for group in &groups {
        let (Some(&first), Some(&last)) = (group.first(), group.last()) else {
            continue;
        };
        let group_by = first.date_naive().to_string();
        let event = EventRepo::get_or_create(pool, deployment_id, &group_by, first, last).await?;
        outcome.captures_assigned +=
            CaptureRepo::assign_event(pool, deployment_id, group, event.id).await?;
        EventRepo::refresh_boundaries(pool, event.id).await?;
    }

    outcome.events_deleted = EventRepo::delete_empty(pool, Some(deployment_id)).await?;

    // Calculated fields only; a failure here must not fail the pass.
    if let Err(err) = DeploymentRepo::refresh_capture_totals(pool, deployment_id).await {
        warn!(deployment_id, error = %err, "failed to refresh deployment capture totals");
    }

    info!(
        deployment_id,
        events = outcome.events,
        captures_assigned = outcome.captures_assigned,
        events_deleted = outcome.events_deleted,
        "regrouped deployment captures"
    );
    Ok(outcome)
}
