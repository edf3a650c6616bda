mod actor;
mod approval;
mod brand;
mod campaign;
mod context;
mod email;
mod generation;
mod recipient;
mod similarity;
mod template;

pub use actor::{Actor, Role};
pub use approval::{ApprovalStep, Decision, NewApprovalStep};
pub use brand::{Brand, Location};
pub use campaign::{CampaignBundle, CampaignStatus, CampaignUpdate, LocationCampaign, TransitionAction};
pub use context::{ContextMap, ContextValue};
pub use email::{BatchReport, DeliveryFailure, RecipientImport, RecipientStats};
pub use generation::{
    FallbackReason, GeneratedContent, GeneratedEmail, GeneratedWithEmbedding, TemplateValidation,
};
pub use recipient::{EmailRecipient, NewRecipient, RecipientStatus};
pub use similarity::{EmbeddingSummary, RagExample, SimilarCampaign, SimilarityQuery, VectorMatch};
pub use template::CampaignTemplate;
