//! # storesync-workflow
//!
//! The campaign approval state machine and the service that applies it:
//! authorization, campaign CRUD, and atomic status + audit writes.

pub mod authorization;
pub mod service;
pub mod state_machine;

pub use authorization::{authorize_transition, has_access};
pub use service::WorkflowService;
pub use state_machine::{allowed_actions, transition, TransitionInput};
