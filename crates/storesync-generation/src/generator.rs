//! ContentGenerator: AI generation with a template-rendering fallback ladder,
//! plus the secondary email transforms.

use std::sync::Arc;

use tracing::{debug, info, warn};

use storesync_core::config::GenerationConfig;
use storesync_core::errors::{GenerationError, StoreSyncError, StoreSyncResult, TemplateError};
use storesync_core::models::{
    CampaignBundle, ContextMap, FallbackReason, GeneratedContent, GeneratedEmail,
    GeneratedWithEmbedding, TemplateValidation,
};
use storesync_core::traits::{IExampleRetriever, ITextCompleter, ITextEmbedder};

use crate::context::{build_context, sample_context};
use crate::email_content::{clean_subject, preview_text, strip_code_fences};
use crate::prompts;
use crate::template::{self, RenderMode, Template};

/// Produces campaign copy and email artifacts.
pub struct ContentGenerator {
    completer: Arc<dyn ITextCompleter>,
    email_completer: Arc<dyn ITextCompleter>,
    embedder: Arc<dyn ITextEmbedder>,
    retriever: Option<Arc<dyn IExampleRetriever>>,
    config: GenerationConfig,
}

impl ContentGenerator {
    pub fn new(
        completer: Arc<dyn ITextCompleter>,
        embedder: Arc<dyn ITextEmbedder>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            email_completer: Arc::clone(&completer),
            completer,
            embedder,
            retriever: None,
            config,
        }
    }

    /// Use a separate completer (typically with a larger token budget) for HTML.
    pub fn with_email_completer(mut self, completer: Arc<dyn ITextCompleter>) -> Self {
        self.email_completer = completer;
        self
    }

    /// Source of few-shot examples for AI prompts.
    pub fn with_retriever(mut self, retriever: Arc<dyn IExampleRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn ai_configured(&self) -> bool {
        self.completer.is_configured()
    }

    pub fn embedder(&self) -> &Arc<dyn ITextEmbedder> {
        &self.embedder
    }

    /// Generate marketing copy for `bundle`.
    ///
    /// With `use_ai` and a configured completer the model writes the copy;
    /// otherwise, or if the model call fails, the template is rendered
    /// (strict first, lenient if a variable is unresolved). Only template
    /// syntax errors are returned as errors.
    pub fn generate(
        &self,
        bundle: &CampaignBundle,
        use_ai: bool,
        extra_instructions: Option<&str>,
    ) -> StoreSyncResult<GeneratedContent> {
        let campaign_id = bundle.campaign.id.as_str();

        let fallback_reason = if !use_ai {
            None
        } else if !self.ai_configured() {
            Some(FallbackReason::AiNotConfigured)
        } else {
            match self.generate_with_ai(bundle, extra_instructions) {
                Ok((content, rag_examples_used)) => {
                    info!(
                        campaign_id,
                        provider = self.completer.name(),
                        rag_examples_used,
                        "content generated with AI"
                    );
                    return Ok(GeneratedContent {
                        content,
                        used_ai: true,
                        fallback_reason: None,
                        rag_examples_used,
                    });
                }
                Err(e) => {
                    warn!(campaign_id, error = %e, "AI generation failed, rendering template");
                    Some(FallbackReason::AiGenerationFailed)
                }
            }
        };

        let content = self.render_template(bundle)?;
        debug!(
            campaign_id,
            fallback_reason = fallback_reason.map(|r| r.as_str()),
            "content rendered from template"
        );
        Ok(GeneratedContent {
            content,
            used_ai: false,
            fallback_reason,
            rag_examples_used: 0,
        })
    }

    fn generate_with_ai(
        &self,
        bundle: &CampaignBundle,
        extra_instructions: Option<&str>,
    ) -> StoreSyncResult<(String, usize)> {
        let examples = match (&self.retriever, self.config.rag_enabled) {
            (Some(retriever), true) => retriever.rag_context(
                bundle,
                self.config.rag_max_examples,
                self.config.rag_threshold,
            ),
            _ => Vec::new(),
        };
        let prompt = prompts::content_prompt(bundle, &examples, extra_instructions);
        let content = self
            .completer
            .complete(prompts::CONTENT_SYSTEM_PROMPT, &prompt)?;
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(GenerationError::EmptyCompletion {
                provider: self.completer.name().to_string(),
            }
            .into());
        }
        Ok((content, examples.len()))
    }

    /// Strict render, falling back to lenient on an unresolved variable.
    pub fn render_template(&self, bundle: &CampaignBundle) -> Result<String, TemplateError> {
        let parsed = Template::parse(&bundle.template.content)?;
        let context = build_context(bundle);
        match parsed.render(&context, RenderMode::Strict) {
            Ok(content) => Ok(content),
            Err(TemplateError::UndefinedVariable { name }) => {
                debug!(
                    campaign_id = %bundle.campaign.id,
                    variable = %name,
                    "strict render failed, rendering leniently"
                );
                parsed.render(&context, RenderMode::Lenient)
            }
            Err(e) => Err(e),
        }
    }

    /// Generate copy, then embed it when an embedder is configured. Embedding
    /// failures are logged and yield `embedding: None`.
    pub fn generate_and_embed(
        &self,
        bundle: &CampaignBundle,
        use_ai: bool,
        extra_instructions: Option<&str>,
    ) -> StoreSyncResult<GeneratedWithEmbedding> {
        let generated = self.generate(bundle, use_ai, extra_instructions)?;
        let embedding = if self.embedder.is_configured() {
            match self.embed(&generated.content) {
                Ok(vector) => Some(vector),
                Err(e) => {
                    warn!(
                        campaign_id = %bundle.campaign.id,
                        error = %e,
                        "embedding failed, saving content without it"
                    );
                    None
                }
            }
        } else {
            None
        };
        Ok(GeneratedWithEmbedding {
            generated,
            embedding,
        })
    }

    /// Embed text. Fails with `NotConfigured` when no embedder is available.
    pub fn embed(&self, text: &str) -> StoreSyncResult<Vec<f32>> {
        self.embedder.embed(text)
    }

    pub fn validate_template(&self, source: &str) -> TemplateValidation {
        template::validate(source)
    }

    /// Lenient render against the sample context, overridden by `sample`.
    pub fn preview_content(
        &self,
        source: &str,
        sample: Option<&ContextMap>,
    ) -> Result<String, TemplateError> {
        let mut context = sample_context();
        if let Some(sample) = sample {
            context.extend(sample.clone());
        }
        template::render(source, &context, RenderMode::Lenient)
    }

    fn require_ai(&self, completer: &Arc<dyn ITextCompleter>) -> StoreSyncResult<()> {
        if completer.is_configured() {
            Ok(())
        } else {
            Err(StoreSyncError::not_configured("text completion"))
        }
    }

    /// HTML email body from `content`, or from the campaign's stored content.
    pub fn generate_html_email(
        &self,
        bundle: &CampaignBundle,
        content: Option<&str>,
    ) -> StoreSyncResult<String> {
        self.require_ai(&self.email_completer)?;
        let content = source_content(bundle, content)?;
        let raw = self.email_completer.complete(
            prompts::EMAIL_SYSTEM_PROMPT,
            &prompts::html_email_prompt(bundle, content),
        )?;
        let html = strip_code_fences(&raw);
        if html.is_empty() {
            return Err(GenerationError::EmptyCompletion {
                provider: self.email_completer.name().to_string(),
            }
            .into());
        }
        Ok(html)
    }

    /// Subject line from `content`, or from the campaign's stored content.
    pub fn generate_email_subject(
        &self,
        bundle: &CampaignBundle,
        content: Option<&str>,
    ) -> StoreSyncResult<String> {
        self.require_ai(&self.completer)?;
        let content = source_content(bundle, content)?;
        let raw = self.completer.complete(
            prompts::SUBJECT_SYSTEM_PROMPT,
            &prompts::subject_prompt(bundle, content),
        )?;
        let subject = clean_subject(&raw);
        if subject.is_empty() {
            return Err(GenerationError::EmptyCompletion {
                provider: self.completer.name().to_string(),
            }
            .into());
        }
        Ok(subject)
    }

    pub fn generate_preview_text(&self, content: &str) -> String {
        preview_text(content)
    }

    /// HTML, subject and preview text for the campaign's stored content.
    pub fn generate_full_email(&self, bundle: &CampaignBundle) -> StoreSyncResult<GeneratedEmail> {
        self.require_ai(&self.email_completer)?;
        let content = source_content(bundle, None)?;
        let html = self.generate_html_email(bundle, Some(content))?;
        let subject = self.generate_email_subject(bundle, Some(content))?;
        let preview_text = preview_text(content);
        info!(
            campaign_id = %bundle.campaign.id,
            html_len = html.len(),
            "email content generated"
        );
        Ok(GeneratedEmail {
            html,
            subject,
            preview_text,
        })
    }
}

fn source_content<'a>(
    bundle: &'a CampaignBundle,
    content: Option<&'a str>,
) -> StoreSyncResult<&'a str> {
    let content = content
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| bundle.campaign.generated_content.trim());
    if content.is_empty() {
        return Err(GenerationError::MissingContent {
            campaign_id: bundle.campaign.id.clone(),
        }
        .into());
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storesync_core::context_map;
    use storesync_core::models::{LocationCampaign, RagExample};
    use test_fixtures::seed::{brand, location, template};
    use test_fixtures::{DeterministicEmbedder, FailingCompleter, ScriptedCompleter};

    struct StaticRetriever(Vec<RagExample>);

    impl IExampleRetriever for StaticRetriever {
        fn rag_context(&self, _: &CampaignBundle, max: usize, _: f64) -> Vec<RagExample> {
            self.0.iter().take(max).cloned().collect()
        }
    }

    fn bundle(content: &str) -> CampaignBundle {
        CampaignBundle {
            campaign: LocationCampaign::new("l1", "t1", None),
            location: location("l1", "b1", "Downtown"),
            brand: brand("b1", "Acme Fuel"),
            template: template("t1", "b1", content),
        }
    }

    fn generator(completer: Arc<dyn ITextCompleter>) -> ContentGenerator {
        ContentGenerator::new(
            completer,
            Arc::new(DeterministicEmbedder::new(8)),
            GenerationConfig::default(),
        )
    }

    #[test]
    fn strict_failure_falls_back_to_lenient() {
        let gen = generator(Arc::new(ScriptedCompleter::new("unused")));
        let out = gen.render_template(&bundle("Hi {{ location_name }} {{ missing }}!"));
        assert_eq!(out.unwrap(), "Hi Downtown !");
    }

    #[test]
    fn rag_examples_are_passed_to_the_prompt() {
        let completer = Arc::new(ScriptedCompleter::new("AI copy"));
        let example = RagExample {
            campaign_id: "past".into(),
            brand_name: "Acme Fuel".into(),
            location_name: "Uptown".into(),
            content: "Past winner".into(),
            similarity: 0.8,
        };
        let gen = generator(completer.clone())
            .with_retriever(Arc::new(StaticRetriever(vec![example.clone(), example])));
        let out = gen.generate(&bundle("x"), true, None).unwrap();
        assert_eq!(out.rag_examples_used, 2);
        assert!(completer.last_user_prompt().unwrap().contains("Past winner"));
    }

    #[test]
    fn rag_disabled_skips_retriever() {
        let completer = Arc::new(ScriptedCompleter::new("AI copy"));
        let config = GenerationConfig {
            rag_enabled: false,
            ..GenerationConfig::default()
        };
        let example = RagExample {
            campaign_id: "past".into(),
            brand_name: "Acme Fuel".into(),
            location_name: "Uptown".into(),
            content: "Past winner".into(),
            similarity: 0.8,
        };
        let gen = ContentGenerator::new(
            completer.clone(),
            Arc::new(DeterministicEmbedder::new(8)),
            config,
        )
        .with_retriever(Arc::new(StaticRetriever(vec![example])));
        let out = gen.generate(&bundle("x"), true, None).unwrap();
        assert_eq!(out.rag_examples_used, 0);
        assert!(!completer.last_user_prompt().unwrap().contains("Past winner"));
    }

    #[test]
    fn failing_ai_reports_generation_failed() {
        let gen = generator(Arc::new(FailingCompleter::new()));
        let out = gen.generate(&bundle("Visit {{ location_name }}"), true, None).unwrap();
        assert!(!out.used_ai);
        assert_eq!(out.fallback_reason, Some(FallbackReason::AiGenerationFailed));
        assert_eq!(out.content, "Visit Downtown");
    }

    #[test]
    fn empty_completion_counts_as_failure() {
        let gen = generator(Arc::new(ScriptedCompleter::new("   ")));
        let out = gen.generate(&bundle("Plain"), true, None).unwrap();
        assert_eq!(out.fallback_reason, Some(FallbackReason::AiGenerationFailed));
        assert_eq!(out.content, "Plain");
    }

    #[test]
    fn preview_overrides_sample_values() {
        let gen = generator(Arc::new(ScriptedCompleter::new("unused")));
        let sample = context_map! { "brand_name" => "Custom" };
        let out = gen
            .preview_content("{{ brand_name }} at {{ location_name }}", Some(&sample))
            .unwrap();
        assert_eq!(out, "Custom at Downtown Store");
        let out = gen.preview_content("{{ brand_name }} {{ nope }}", None).unwrap();
        assert_eq!(out, "Sample Brand");
    }

    #[test]
    fn explicit_content_wins_over_stored_content() {
        let completer = Arc::new(ScriptedCompleter::new("Subject"));
        let gen = generator(completer.clone());
        let mut b = bundle("x");
        b.campaign.generated_content = "stored copy".into();
        gen.generate_email_subject(&b, Some("explicit copy")).unwrap();
        let prompt = completer.last_user_prompt().unwrap();
        assert!(prompt.contains("explicit copy"));
        assert!(!prompt.contains("stored copy"));
    }
}
