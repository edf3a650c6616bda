//! # storesync-generation
//!
//! Campaign content generation.
//!
//! - `template`: placeholder language with strict and lenient rendering
//! - `context`: render-context assembly from brand, location and campaign
//! - `prompts`: system and user prompts for copy, HTML email and subject lines
//! - `generator`: AI generation with the template fallback ladder
//! - `pipeline`: load, generate and persist by campaign id

pub mod context;
pub mod email_content;
pub mod generator;
pub mod pipeline;
pub mod prompts;
pub mod template;

pub use context::{build_context, sample_context};
pub use generator::ContentGenerator;
pub use pipeline::ContentPipeline;
pub use template::{RenderMode, Template};
