//! WorkflowService: campaign CRUD and authorized, audited transitions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use storesync_core::errors::{StoreSyncError, StoreSyncResult};
use storesync_core::models::{
    Actor, ApprovalStep, CampaignBundle, CampaignStatus, CampaignUpdate, ContextMap, Decision,
    LocationCampaign, NewApprovalStep, TransitionAction,
};
use storesync_core::traits::{ICampaignStorage, IMasterDataReader};
use storesync_observability::transition_span;

use crate::authorization::{authorize_transition, ensure_can_mutate, has_access};
use crate::state_machine::{self, TransitionInput};

/// Statuses in which the schedule window may still be edited.
const SCHEDULE_EDITABLE: [CampaignStatus; 3] = [
    CampaignStatus::Draft,
    CampaignStatus::PendingReview,
    CampaignStatus::Approved,
];

pub struct WorkflowService {
    campaigns: Arc<dyn ICampaignStorage>,
    master: Arc<dyn IMasterDataReader>,
}

impl WorkflowService {
    pub fn new(campaigns: Arc<dyn ICampaignStorage>, master: Arc<dyn IMasterDataReader>) -> Self {
        Self { campaigns, master }
    }

    /// Create a draft campaign for `location_id` from `template_id`. The
    /// template must belong to the location's brand.
    pub fn create_campaign(
        &self,
        actor: &Actor,
        location_id: &str,
        template_id: &str,
        customizations: ContextMap,
    ) -> StoreSyncResult<LocationCampaign> {
        let location = self
            .master
            .get_location(location_id)?
            .ok_or_else(|| StoreSyncError::not_found("location", location_id))?;
        let template = self
            .master
            .get_template(template_id)?
            .ok_or_else(|| StoreSyncError::not_found("template", template_id))?;
        ensure_can_mutate(actor, &location.brand_id, location_id)?;
        if template.brand_id != location.brand_id {
            return Err(StoreSyncError::validation(
                "template_id",
                format!(
                    "template {template_id} belongs to brand {}, location {location_id} to brand {}",
                    template.brand_id, location.brand_id
                ),
            ));
        }

        let mut campaign = LocationCampaign::new(location_id, template_id, Some(&actor.id));
        campaign.customizations = customizations;
        self.campaigns.insert_campaign(&campaign)?;
        info!(
            campaign_id = %campaign.id,
            location_id,
            template_id,
            actor = %actor.id,
            "campaign created"
        );
        Ok(campaign)
    }

    pub fn get_campaign(&self, id: &str) -> StoreSyncResult<LocationCampaign> {
        self.campaigns
            .get_campaign(id)?
            .ok_or_else(|| StoreSyncError::not_found("campaign", id))
    }

    /// Apply field edits. Template, customizations, and content only change
    /// in draft; the schedule window changes until the campaign is scheduled.
    pub fn update_campaign(
        &self,
        actor: &Actor,
        id: &str,
        update: CampaignUpdate,
    ) -> StoreSyncResult<LocationCampaign> {
        let bundle = self.bundle(id)?;
        ensure_can_mutate(actor, &bundle.brand.id, &bundle.location.id)?;
        let mut campaign = bundle.campaign;

        if update.touches_draft_only_fields() && campaign.status != CampaignStatus::Draft {
            return Err(StoreSyncError::precondition(format!(
                "campaign {id} is {}; content can only be edited in draft",
                campaign.status
            )));
        }
        if update.touches_schedule() && !SCHEDULE_EDITABLE.contains(&campaign.status) {
            return Err(StoreSyncError::precondition(format!(
                "campaign {id} is {}; the schedule can no longer be edited",
                campaign.status
            )));
        }

        if let Some(template_id) = update.template_id {
            let template = self
                .master
                .get_template(&template_id)?
                .ok_or_else(|| StoreSyncError::not_found("template", &template_id))?;
            if template.brand_id != bundle.brand.id {
                return Err(StoreSyncError::validation(
                    "template_id",
                    format!("template {template_id} does not belong to brand {}", bundle.brand.id),
                ));
            }
            campaign.template_id = template_id;
        }
        if let Some(customizations) = update.customizations {
            campaign.customizations = customizations;
        }
        if let Some(content) = update.generated_content {
            campaign.generated_content = content;
        }
        if let Some(start) = update.scheduled_start {
            campaign.scheduled_start = Some(start);
        }
        if let Some(end) = update.scheduled_end {
            campaign.scheduled_end = Some(end);
        }
        check_window_order(campaign.scheduled_start, campaign.scheduled_end)?;

        campaign.updated_at = Utc::now();
        self.campaigns.update_campaign(&campaign)?;
        info!(campaign_id = id, actor = %actor.id, "campaign updated");
        Ok(campaign)
    }

    /// Delete a campaign together with its audit trail and recipients.
    pub fn delete_campaign(&self, actor: &Actor, id: &str) -> StoreSyncResult<()> {
        let bundle = self.bundle(id)?;
        ensure_can_mutate(actor, &bundle.brand.id, &bundle.location.id)?;
        if !self.campaigns.delete_campaign(id)? {
            return Err(StoreSyncError::not_found("campaign", id));
        }
        info!(campaign_id = id, actor = %actor.id, "campaign deleted");
        Ok(())
    }

    /// Run `action` on campaign `id`. The status change and its audit row are
    /// written together; on any error neither is.
    pub fn transition(
        &self,
        actor: &Actor,
        id: &str,
        action: TransitionAction,
        comments: Option<&str>,
    ) -> StoreSyncResult<LocationCampaign> {
        let bundle = self.bundle(id)?;
        self.apply(actor, bundle, action, comments.unwrap_or_default())
    }

    /// Set the window and schedule in one call. The window, the status change
    /// and the audit row are written together or not at all.
    pub fn schedule_campaign(
        &self,
        actor: &Actor,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        comments: Option<&str>,
    ) -> StoreSyncResult<LocationCampaign> {
        let bundle = self.bundle(id)?;
        self.apply_with_window(
            actor,
            bundle,
            TransitionAction::Schedule,
            comments.unwrap_or_default(),
            Some((start, end)),
        )
    }

    fn apply(
        &self,
        actor: &Actor,
        bundle: CampaignBundle,
        action: TransitionAction,
        comments: &str,
    ) -> StoreSyncResult<LocationCampaign> {
        self.apply_with_window(actor, bundle, action, comments, None)
    }

    fn apply_with_window(
        &self,
        actor: &Actor,
        bundle: CampaignBundle,
        action: TransitionAction,
        comments: &str,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> StoreSyncResult<LocationCampaign> {
        let mut campaign = bundle.campaign;
        let _span = transition_span!(campaign.id, action).entered();
        if let Err(e) = authorize_transition(actor, action, &bundle.brand.id, &bundle.location.id) {
            warn!(campaign_id = %campaign.id, actor = %actor.id, %action, "transition denied");
            return Err(e);
        }

        let (scheduled_start, scheduled_end) = match window {
            Some((start, end)) => (Some(start), Some(end)),
            None => (campaign.scheduled_start, campaign.scheduled_end),
        };
        let input = TransitionInput {
            comments,
            scheduled_start,
            scheduled_end,
        };
        let from = campaign.status;
        let to = match state_machine::transition(from, action, &input) {
            Ok(to) => to,
            Err(e) => {
                warn!(campaign_id = %campaign.id, %from, %action, error = %e, "transition rejected");
                return Err(e.into());
            }
        };

        let now = Utc::now();
        let step = NewApprovalStep {
            campaign_id: campaign.id.clone(),
            actor: actor.id.clone(),
            decision: Decision::from(action),
            comments: comments.to_string(),
            previous_status: from,
            new_status: to,
            created_at: now,
        };
        match window {
            Some((start, end)) => {
                self.campaigns
                    .commit_schedule(&campaign.id, from, start, end, &step)?;
                campaign.scheduled_start = Some(start);
                campaign.scheduled_end = Some(end);
            }
            None => {
                self.campaigns.commit_transition(&campaign.id, from, &step)?;
            }
        }
        info!(
            campaign_id = %campaign.id,
            actor = %actor.id,
            %from,
            %to,
            decision = %step.decision,
            "campaign transitioned"
        );

        campaign.status = to;
        campaign.updated_at = now;
        Ok(campaign)
    }

    /// Audit trail, newest first.
    pub fn history(&self, id: &str) -> StoreSyncResult<Vec<ApprovalStep>> {
        self.get_campaign(id)?;
        self.campaigns.approval_history(id)
    }

    pub fn list_by_status(&self, status: CampaignStatus) -> StoreSyncResult<Vec<LocationCampaign>> {
        self.campaigns.list_by_status(status)
    }

    pub fn list_by_location(&self, location_id: &str) -> StoreSyncResult<Vec<LocationCampaign>> {
        self.campaigns.list_by_location(location_id)
    }

    /// The review queue, filtered to what `actor` can see.
    pub fn pending_review(&self, actor: &Actor) -> StoreSyncResult<Vec<LocationCampaign>> {
        let pending = self.campaigns.list_by_status(CampaignStatus::PendingReview)?;
        let mut visible = Vec::with_capacity(pending.len());
        for campaign in pending {
            let Some(location) = self.master.get_location(&campaign.location_id)? else {
                continue;
            };
            if has_access(actor, &location.brand_id, &location.id) {
                visible.push(campaign);
            }
        }
        Ok(visible)
    }

    fn bundle(&self, id: &str) -> StoreSyncResult<CampaignBundle> {
        self.campaigns
            .load_bundle(id)?
            .ok_or_else(|| StoreSyncError::not_found("campaign", id))
    }
}

fn check_window_order(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> StoreSyncResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if start >= end => Err(StoreSyncError::validation(
            "scheduled_end",
            format!("{} is not after {}", end.to_rfc3339(), start.to_rfc3339()),
        )),
        _ => Ok(()),
    }
}
