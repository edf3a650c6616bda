//! Time-driven campaign transitions and audit retention.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use storesync_core::errors::StoreSyncResult;
use storesync_core::models::{Actor, TransitionAction};
use storesync_core::traits::ICampaignStorage;
use storesync_observability::sweep_span;
use storesync_observability::tracing_setup::events;
use storesync_workflow::WorkflowService;

/// Outcome of one sweep over due campaigns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub processed: usize,
    pub failed: usize,
    /// Campaigns that were transitioned.
    pub campaign_ids: Vec<String>,
}

pub struct Sweeper {
    workflow: Arc<WorkflowService>,
    campaigns: Arc<dyn ICampaignStorage>,
    retention_days: i64,
}

impl Sweeper {
    pub fn new(
        workflow: Arc<WorkflowService>,
        campaigns: Arc<dyn ICampaignStorage>,
        retention_days: i64,
    ) -> Self {
        Self {
            workflow,
            campaigns,
            retention_days,
        }
    }

    /// Activate scheduled campaigns whose start has passed.
    pub fn activate_due(&self, now: DateTime<Utc>) -> StoreSyncResult<SweepReport> {
        let due = self.campaigns.due_for_activation(now)?;
        Ok(self.sweep("activate", &due, TransitionAction::Activate))
    }

    /// Complete active campaigns whose end has passed.
    pub fn complete_expired(&self, now: DateTime<Utc>) -> StoreSyncResult<SweepReport> {
        let due = self.campaigns.due_for_completion(now)?;
        Ok(self.sweep("complete", &due, TransitionAction::Complete))
    }

    /// Delete audit rows older than the retention window. Returns rows removed.
    pub fn purge_old_approvals(&self, now: DateTime<Utc>) -> StoreSyncResult<usize> {
        let _span = sweep_span!("retention").entered();
        let cutoff = now - Duration::days(self.retention_days);
        let purged = self.campaigns.purge_approval_steps(cutoff)?;
        info!(purged, cutoff = %cutoff, "approval history purged");
        Ok(purged)
    }

    fn sweep(&self, name: &str, due: &[String], action: TransitionAction) -> SweepReport {
        let _span = sweep_span!(name).entered();
        // Sweeps act as the system identity, which is authorized everywhere.
        let actor = Actor::system();
        let mut report = SweepReport::default();
        for campaign_id in due {
            match self.workflow.transition(&actor, campaign_id, action, None) {
                Ok(_) => {
                    report.processed += 1;
                    report.campaign_ids.push(campaign_id.clone());
                }
                Err(e) => {
                    report.failed += 1;
                    events::sweep_item_failed(name, campaign_id, &e.to_string());
                }
            }
        }
        events::sweep_completed(name, report.processed, report.failed);
        report
    }
}
