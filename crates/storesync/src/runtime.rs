//! StoreSync: owns every service, wired from one `StoreSyncConfig`.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::info;

use storesync_core::config::StoreSyncConfig;
use storesync_core::errors::{StoreSyncError, StoreSyncResult};
use storesync_core::models::{
    Actor, ApprovalStep, BatchReport, CampaignStatus, CampaignUpdate, ContextMap,
    EmbeddingSummary, GeneratedEmail, GeneratedWithEmbedding, LocationCampaign, NewRecipient,
    RecipientImport, RecipientStats, SimilarCampaign, SimilarityQuery, TemplateValidation,
    TransitionAction,
};
use storesync_core::traits::{IMailTransport, ITextCompleter, ITextEmbedder};
use storesync_email::EmailSender;
use storesync_generation::{ContentGenerator, ContentPipeline};
use storesync_observability::MetricsCollector;
use storesync_retrieval::SimilarityIndex;
use storesync_scheduler::{
    run_sweeps, PeriodicScheduler, SchedulerHandle, SweepRun, Sweeper, Task, TaskContext,
    TaskRecord, TaskRunner,
};
use storesync_storage::StorageEngine;
use storesync_workflow::WorkflowService;

/// External capabilities the runtime calls out to.
pub struct Capabilities {
    pub completer: Arc<dyn ITextCompleter>,
    /// Completer with the larger HTML budget.
    pub email_completer: Arc<dyn ITextCompleter>,
    pub embedder: Arc<dyn ITextEmbedder>,
    pub transport: Arc<dyn IMailTransport>,
}

impl Capabilities {
    /// API-backed providers when a key is configured, sentinels otherwise.
    /// Mail goes through the transport selected by `email.transport`.
    pub fn from_config(config: &StoreSyncConfig) -> StoreSyncResult<Self> {
        Ok(Self {
            completer: storesync_ai::create_completer(&config.ai),
            email_completer: storesync_ai::create_email_completer(&config.ai),
            embedder: storesync_ai::create_embedder(&config.ai),
            transport: storesync_email::create_transport(&config.email)?,
        })
    }
}

/// What to find neighbours of.
#[derive(Debug, Clone, Copy)]
pub enum SimilarTo<'a> {
    Campaign {
        id: &'a str,
        same_brand_only: bool,
    },
    Text(&'a str),
}

pub struct StoreSync {
    pub storage: Arc<StorageEngine>,
    pub workflow: Arc<WorkflowService>,
    pub generator: Arc<ContentGenerator>,
    pub pipeline: Arc<ContentPipeline>,
    pub index: Arc<SimilarityIndex>,
    pub email: Arc<EmailSender>,
    pub metrics: Arc<Mutex<MetricsCollector>>,
    pub config: StoreSyncConfig,
    sweeper: Arc<Sweeper>,
}

impl StoreSync {
    /// Open storage and build providers from `config`.
    pub fn open(config: StoreSyncConfig) -> StoreSyncResult<Self> {
        let storage = Arc::new(StorageEngine::from_config(&config.storage)?);
        let capabilities = Capabilities::from_config(&config)?;
        Ok(Self::with_parts(config, storage, capabilities))
    }

    pub fn with_parts(
        config: StoreSyncConfig,
        storage: Arc<StorageEngine>,
        capabilities: Capabilities,
    ) -> Self {
        // Similarity
        let index = Arc::new(SimilarityIndex::new(
            storage.clone(),
            capabilities.embedder.clone(),
            config.similarity.clone(),
        ));

        // Generation
        let mut generator = ContentGenerator::new(
            capabilities.completer,
            capabilities.embedder,
            config.generation.clone(),
        )
        .with_email_completer(capabilities.email_completer);
        if config.generation.rag_enabled {
            generator = generator.with_retriever(index.clone());
        }
        let generator = Arc::new(generator);
        let pipeline = Arc::new(ContentPipeline::new(storage.clone(), generator.clone()));

        // Workflow
        let workflow = Arc::new(WorkflowService::new(storage.clone(), storage.clone()));
        let sweeper = Arc::new(Sweeper::new(
            workflow.clone(),
            storage.clone(),
            config.scheduler.approval_retention_days,
        ));

        // Email
        let email = Arc::new(EmailSender::new(
            storage.clone(),
            storage.clone(),
            capabilities.transport,
            config.email.clone(),
        ));

        info!(
            ai_configured = generator.ai_configured(),
            rag_enabled = config.generation.rag_enabled,
            "storesync runtime ready"
        );
        Self {
            storage,
            workflow,
            generator,
            pipeline,
            index,
            email,
            metrics: Arc::new(Mutex::new(MetricsCollector::new())),
            config,
            sweeper,
        }
    }

    /// Start the task runner and the periodic sweeps. Must be called inside
    /// a tokio runtime.
    pub fn start(&self) -> Background {
        let ctx = Arc::new(TaskContext::new(
            self.pipeline.clone(),
            self.index.clone(),
            self.email.clone(),
        ));
        let runner = TaskRunner::spawn(ctx, &self.config.scheduler, self.metrics.clone());
        let scheduler = PeriodicScheduler::spawn(
            self.sweeper.clone(),
            runner.registry().clone(),
            self.metrics.clone(),
            &self.config.scheduler,
        );
        Background { runner, scheduler }
    }

    /// Serializable copy of the current counters.
    pub fn metrics(&self) -> MetricsCollector {
        self.metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    fn record(&self, f: impl FnOnce(&mut MetricsCollector)) {
        if let Ok(mut metrics) = self.metrics.lock() {
            f(&mut metrics);
        }
    }

    // Campaigns

    pub fn create_campaign(
        &self,
        actor: &Actor,
        location_id: &str,
        template_id: &str,
        customizations: ContextMap,
    ) -> StoreSyncResult<LocationCampaign> {
        self.workflow
            .create_campaign(actor, location_id, template_id, customizations)
    }

    pub fn get_campaign(&self, id: &str) -> StoreSyncResult<LocationCampaign> {
        self.workflow.get_campaign(id)
    }

    pub fn update_campaign(
        &self,
        actor: &Actor,
        id: &str,
        update: CampaignUpdate,
    ) -> StoreSyncResult<LocationCampaign> {
        self.workflow.update_campaign(actor, id, update)
    }

    pub fn delete_campaign(&self, actor: &Actor, id: &str) -> StoreSyncResult<()> {
        self.workflow.delete_campaign(actor, id)
    }

    pub fn transition(
        &self,
        actor: &Actor,
        id: &str,
        action: TransitionAction,
        comments: Option<&str>,
    ) -> StoreSyncResult<LocationCampaign> {
        self.workflow.transition(actor, id, action, comments)
    }

    pub fn schedule_campaign(
        &self,
        actor: &Actor,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        comments: Option<&str>,
    ) -> StoreSyncResult<LocationCampaign> {
        self.workflow
            .schedule_campaign(actor, id, start, end, comments)
    }

    pub fn history(&self, id: &str) -> StoreSyncResult<Vec<ApprovalStep>> {
        self.workflow.history(id)
    }

    pub fn list_by_status(&self, status: CampaignStatus) -> StoreSyncResult<Vec<LocationCampaign>> {
        self.workflow.list_by_status(status)
    }

    pub fn pending_review(&self, actor: &Actor) -> StoreSyncResult<Vec<LocationCampaign>> {
        self.workflow.pending_review(actor)
    }

    // Content

    pub fn generate_content(
        &self,
        campaign_id: &str,
        use_ai: bool,
        extra_instructions: Option<&str>,
    ) -> StoreSyncResult<GeneratedWithEmbedding> {
        let result = self
            .pipeline
            .generate_for_campaign(campaign_id, use_ai, extra_instructions)?;
        self.record(|m| {
            m.generation
                .record(&result.generated, result.embedding.is_some())
        });
        Ok(result)
    }

    pub fn generate_html_email(&self, campaign_id: &str) -> StoreSyncResult<GeneratedEmail> {
        self.pipeline.generate_email_for_campaign(campaign_id)
    }

    pub fn validate_template(&self, source: &str) -> TemplateValidation {
        self.generator.validate_template(source)
    }

    pub fn preview_content(
        &self,
        source: &str,
        sample: Option<&ContextMap>,
    ) -> StoreSyncResult<String> {
        Ok(self.generator.preview_content(source, sample)?)
    }

    // Similarity

    /// Neighbours by campaign or free text. For a campaign, only the query's
    /// limit and threshold apply.
    pub fn find_similar(
        &self,
        target: SimilarTo<'_>,
        query: &SimilarityQuery,
    ) -> StoreSyncResult<Vec<SimilarCampaign>> {
        match target {
            SimilarTo::Campaign {
                id,
                same_brand_only,
            } => self.index.find_similar_to_campaign(
                id,
                query.limit,
                query.threshold,
                same_brand_only,
            ),
            SimilarTo::Text(text) => self.index.find_similar_by_text(text, query),
        }
    }

    pub fn compute_embedding(&self, campaign_id: &str) -> StoreSyncResult<bool> {
        let computed = self.index.compute_embedding_for_campaign(campaign_id)?;
        if computed {
            self.record(|m| m.generation.embeddings_computed += 1);
        }
        Ok(computed)
    }

    pub fn bulk_compute_embeddings(
        &self,
        ids: Option<&[String]>,
        recompute: bool,
    ) -> StoreSyncResult<EmbeddingSummary> {
        let summary = self.index.bulk_compute_embeddings(ids, recompute)?;
        self.record(|m| m.generation.embeddings_computed += summary.success as u64);
        Ok(summary)
    }

    // Email

    pub fn add_recipients(
        &self,
        campaign_id: &str,
        recipients: &[NewRecipient],
    ) -> StoreSyncResult<RecipientImport> {
        self.email.add_recipients(campaign_id, recipients)
    }

    pub fn clear_recipients(&self, campaign_id: &str) -> StoreSyncResult<usize> {
        self.email.clear_recipients(campaign_id)
    }

    pub fn send_batch(
        &self,
        campaign_id: &str,
        recipient_ids: Option<&[String]>,
    ) -> StoreSyncResult<BatchReport> {
        let report = self.email.send_batch(campaign_id, recipient_ids)?;
        self.record(|m| m.email.record_batch(&report));
        Ok(report)
    }

    pub fn send_test_email(&self, campaign_id: &str, email: &str, name: &str) -> StoreSyncResult<()> {
        self.email.send_test_email(campaign_id, email, name)?;
        self.record(|m| m.email.record_test_send());
        Ok(())
    }

    pub fn email_stats(&self, campaign_id: &str) -> StoreSyncResult<RecipientStats> {
        self.email.email_stats(campaign_id)
    }

    // Sweeps

    /// One activation and completion pass at `now`, outside the timers.
    pub fn run_sweeps(&self, now: DateTime<Utc>) -> SweepRun {
        run_sweeps(&self.sweeper, now, &self.metrics)
    }

    pub fn purge_old_approvals(&self, now: DateTime<Utc>) -> StoreSyncResult<usize> {
        let purged = self.sweeper.purge_old_approvals(now)?;
        self.record(|m| m.sweeps.record_retention(purged));
        Ok(purged)
    }
}

/// Running task workers and periodic loops.
pub struct Background {
    runner: TaskRunner,
    scheduler: SchedulerHandle,
}

impl Background {
    pub async fn submit(&self, task: Task) -> StoreSyncResult<String> {
        self.runner.submit(task).await
    }

    pub fn task_status(&self, task_id: &str) -> StoreSyncResult<TaskRecord> {
        self.runner
            .task_status(task_id)
            .ok_or_else(|| StoreSyncError::not_found("task", task_id))
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    /// Stop the timers, then drain the queue.
    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
        self.runner.shutdown().await;
    }
}
