//! Who may do what to a campaign.
//!
//! - Admins (and the sweep identity) may do everything.
//! - Brand managers act on campaigns of their brands.
//! - Location managers act on campaigns of their locations but cannot
//!   approve or reject.
//! - Viewers never mutate.

use storesync_core::errors::{StoreSyncError, StoreSyncResult};
use storesync_core::models::{Actor, Role, TransitionAction};

/// Whether `actor` can see or work with campaigns at this location.
pub fn has_access(actor: &Actor, brand_id: &str, location_id: &str) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::BrandManager | Role::Viewer => actor.brand_ids.iter().any(|b| b == brand_id),
        Role::LocationManager => actor.location_ids.iter().any(|l| l == location_id),
    }
}

/// Create, edit, delete, and every action except approve/reject.
pub fn ensure_can_mutate(actor: &Actor, brand_id: &str, location_id: &str) -> StoreSyncResult<()> {
    if actor.role == Role::Viewer {
        return Err(denied(actor, "viewers cannot modify campaigns"));
    }
    if !has_access(actor, brand_id, location_id) {
        return Err(denied(
            actor,
            format!("no access to location {location_id} of brand {brand_id}"),
        ));
    }
    Ok(())
}

/// Approve and reject need an elevated role on the campaign's brand.
pub fn ensure_can_review(actor: &Actor, brand_id: &str) -> StoreSyncResult<()> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::BrandManager if actor.brand_ids.iter().any(|b| b == brand_id) => Ok(()),
        Role::BrandManager => Err(denied(actor, format!("not a manager of brand {brand_id}"))),
        Role::LocationManager | Role::Viewer => {
            Err(denied(actor, "approval requires an admin or brand manager"))
        }
    }
}

/// Gate for a workflow action.
pub fn authorize_transition(
    actor: &Actor,
    action: TransitionAction,
    brand_id: &str,
    location_id: &str,
) -> StoreSyncResult<()> {
    match action {
        TransitionAction::Approve | TransitionAction::Reject => ensure_can_review(actor, brand_id),
        _ => ensure_can_mutate(actor, brand_id, location_id),
    }
}

fn denied(actor: &Actor, reason: impl Into<String>) -> StoreSyncError {
    StoreSyncError::PermissionDenied {
        actor: actor.id.clone(),
        reason: reason.into(),
    }
}
