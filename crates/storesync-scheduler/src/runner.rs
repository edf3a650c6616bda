//! TaskRunner: bounded queue drained by a fixed worker pool.
//!
//! Each task reloads its campaign by id when it runs and persists its own
//! result. Work executes on the blocking pool; the async side only owns
//! queueing, retries, and the per-attempt time budget.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, Instrument};

use storesync_core::cancel::CancelToken;
use storesync_core::config::SchedulerConfig;
use storesync_core::constants::MAX_BULK_BATCH_SIZE;
use storesync_core::errors::{StoreSyncError, StoreSyncResult, TaskError};
use storesync_core::models::{BatchReport, GeneratedEmail, GeneratedWithEmbedding};
use storesync_email::EmailSender;
use storesync_generation::ContentPipeline;
use storesync_observability::task_span;
use storesync_observability::tracing_setup::events;
use storesync_observability::MetricsCollector;
use storesync_retrieval::SimilarityIndex;

use crate::registry::TaskRegistry;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::task::{Task, TaskRecord};

/// Services a task can call into.
pub struct TaskContext {
    pipeline: Arc<ContentPipeline>,
    index: Arc<SimilarityIndex>,
    email: Arc<EmailSender>,
}

/// What a finished task produced.
#[derive(Debug)]
pub enum TaskOutput {
    Generated(GeneratedWithEmbedding),
    Embedded(bool),
    Email(GeneratedEmail),
    Batch(BatchReport),
    TestSent,
}

impl TaskOutput {
    /// Compact JSON stored on the task record.
    pub fn summary(&self) -> serde_json::Value {
        match self {
            Self::Generated(g) => json!({
                "used_ai": g.generated.used_ai,
                "fallback_reason": g.generated.fallback_reason,
                "rag_examples_used": g.generated.rag_examples_used,
                "embedded": g.embedding.is_some(),
                "content_chars": g.generated.content.chars().count(),
            }),
            Self::Embedded(computed) => json!({ "computed": computed }),
            Self::Email(e) => json!({ "subject": e.subject, "preview_text": e.preview_text }),
            Self::Batch(report) => json!({
                "total": report.total,
                "sent": report.sent,
                "failed": report.failed,
                "errors": report.errors,
            }),
            Self::TestSent => json!({ "sent": true }),
        }
    }

    fn record(&self, metrics: &mut MetricsCollector) {
        match self {
            Self::Generated(g) => metrics
                .generation
                .record(&g.generated, g.embedding.is_some()),
            Self::Embedded(true) => metrics.generation.embeddings_computed += 1,
            Self::Batch(report) => metrics.email.record_batch(report),
            Self::TestSent => metrics.email.record_test_send(),
            Self::Embedded(false) | Self::Email(_) => {}
        }
    }
}

impl TaskContext {
    pub fn new(
        pipeline: Arc<ContentPipeline>,
        index: Arc<SimilarityIndex>,
        email: Arc<EmailSender>,
    ) -> Self {
        Self {
            pipeline,
            index,
            email,
        }
    }

    /// Run one task to completion on the calling thread.
    pub fn execute(&self, task: &Task) -> StoreSyncResult<TaskOutput> {
        self.execute_until(task, &CancelToken::new())
    }

    /// Run one task, skipping its final write once `cancel` fires.
    pub fn execute_until(&self, task: &Task, cancel: &CancelToken) -> StoreSyncResult<TaskOutput> {
        match task {
            Task::GenerateContent {
                campaign_id,
                use_ai,
                extra_instructions,
            } => self
                .pipeline
                .generate_for_campaign_until(
                    campaign_id,
                    *use_ai,
                    extra_instructions.as_deref(),
                    cancel,
                )
                .map(TaskOutput::Generated),
            Task::ComputeEmbedding { campaign_id } => self
                .index
                .compute_embedding_until(campaign_id, cancel)
                .map(TaskOutput::Embedded),
            Task::GenerateEmail { campaign_id } => self
                .pipeline
                .generate_email_for_campaign_until(campaign_id, cancel)
                .map(TaskOutput::Email),
            Task::SendBatch {
                campaign_id,
                recipient_ids,
            } => self
                .email
                .send_batch(campaign_id, recipient_ids.as_deref())
                .map(TaskOutput::Batch),
            Task::SendTestEmail {
                campaign_id,
                email,
                name,
            } => self
                .email
                .send_test_email(campaign_id, email, name)
                .map(|()| TaskOutput::TestSent),
            Task::BulkGenerate { .. } => Err(StoreSyncError::precondition(
                "bulk generation is expanded at submission",
            )),
        }
    }
}

struct Job {
    id: String,
    task: Task,
    submitted: Instant,
}

struct Worker {
    ctx: Arc<TaskContext>,
    registry: Arc<TaskRegistry>,
    metrics: Arc<Mutex<MetricsCollector>>,
    policy: RetryPolicy,
}

impl Worker {
    fn with_metrics(&self, f: impl FnOnce(&mut MetricsCollector)) {
        if let Ok(mut metrics) = self.metrics.lock() {
            f(&mut metrics);
        }
    }

    async fn run(&self, job: Job) {
        let kind = job.task.kind();
        let policy = if job.task.retries_enabled() {
            self.policy
        } else {
            self.policy.without_retries()
        };
        let task = Arc::new(job.task);

        let outcome = run_with_retry(
            &policy,
            &job.id,
            kind,
            |cancel| {
                let ctx = self.ctx.clone();
                let task = task.clone();
                let task_id = job.id.clone();
                async move {
                    let work = move || ctx.execute_until(&task, &cancel);
                    match tokio::task::spawn_blocking(work).await {
                        Ok(result) => result,
                        Err(e) => Err(TaskError::Panicked {
                            task_id,
                            reason: e.to_string(),
                        }
                        .into()),
                    }
                }
            },
            |attempt| self.registry.mark_running(&job.id, attempt),
        )
        .await;

        let elapsed = job.submitted.elapsed();
        let attempts = outcome.attempts;
        let success = outcome.result.is_ok();
        self.with_metrics(|m| {
            for _ in 1..attempts {
                m.tasks.record_retry();
            }
            for _ in 0..outcome.timeouts {
                m.tasks.record_timeout();
            }
            m.tasks.record_finished(kind, success, elapsed);
            if let Ok(output) = &outcome.result {
                output.record(m);
            }
        });

        match outcome.result {
            Ok(output) => {
                self.registry.mark_succeeded(&job.id, output.summary());
                events::task_finished(&job.id, kind, "succeeded", attempts);
            }
            Err(e) => {
                self.registry.mark_failed(&job.id, e.to_string(), attempts);
                events::task_finished(&job.id, kind, "failed", attempts);
            }
        }
    }
}

/// Asynchronous task runner with a fixed pool of workers.
pub struct TaskRunner {
    sender: mpsc::Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    registry: Arc<TaskRegistry>,
    metrics: Arc<Mutex<MetricsCollector>>,
}

impl TaskRunner {
    /// Start `worker_count` workers. Must be called inside a tokio runtime.
    pub fn spawn(
        ctx: Arc<TaskContext>,
        config: &SchedulerConfig,
        metrics: Arc<Mutex<MetricsCollector>>,
    ) -> Self {
        Self::with_policy(ctx, config, RetryPolicy::from_config(config), metrics)
    }

    pub fn with_policy(
        ctx: Arc<TaskContext>,
        config: &SchedulerConfig,
        policy: RetryPolicy,
        metrics: Arc<Mutex<MetricsCollector>>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>(config.queue_capacity.max(1));
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let registry = Arc::new(TaskRegistry::new());
        let worker = Arc::new(Worker {
            ctx,
            registry: registry.clone(),
            metrics: metrics.clone(),
            policy,
        });

        let workers = (0..config.worker_count.max(1))
            .map(|n| {
                let receiver = receiver.clone();
                let worker = worker.clone();
                tokio::spawn(async move {
                    loop {
                        let job = receiver.lock().await.recv().await;
                        let Some(job) = job else { break };
                        let span = task_span!(job.id, job.task.kind());
                        worker.run(job).instrument(span).await;
                    }
                    debug!(worker = n, "task worker stopped");
                })
            })
            .collect();

        info!(
            workers = config.worker_count,
            queue_capacity = config.queue_capacity,
            "task runner started"
        );
        Self {
            sender,
            workers,
            registry,
            metrics,
        }
    }

    /// Queue a task and return its id. Waits while the queue is full.
    ///
    /// A bulk generation is recorded as a parent task whose summary lists one
    /// queued `GenerateContent` child per campaign.
    pub async fn submit(&self, task: Task) -> StoreSyncResult<String> {
        if let Task::BulkGenerate {
            campaign_ids,
            use_ai,
        } = &task
        {
            if campaign_ids.len() > MAX_BULK_BATCH_SIZE {
                return Err(StoreSyncError::validation(
                    "campaign_ids",
                    format!(
                        "at most {MAX_BULK_BATCH_SIZE} ids per call, got {}",
                        campaign_ids.len()
                    ),
                ));
            }
            let parent = self.registry.register(&task);
            let mut children = Vec::with_capacity(campaign_ids.len());
            for campaign_id in campaign_ids {
                let child = Task::GenerateContent {
                    campaign_id: campaign_id.clone(),
                    use_ai: *use_ai,
                    extra_instructions: None,
                };
                children.push(self.enqueue(child).await?);
            }
            self.registry
                .mark_succeeded(&parent, json!({ "task_ids": children }));
            info!(task_id = %parent, queued = campaign_ids.len(), "bulk generation queued");
            return Ok(parent);
        }
        self.enqueue(task).await
    }

    async fn enqueue(&self, task: Task) -> StoreSyncResult<String> {
        let id = self.registry.register(&task);
        let job = Job {
            id: id.clone(),
            task,
            submitted: Instant::now(),
        };
        if self.sender.send(job).await.is_err() {
            self.registry.mark_failed(&id, TaskError::QueueClosed.to_string(), 0);
            return Err(TaskError::QueueClosed.into());
        }
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.tasks.record_submitted();
        }
        debug!(task_id = %id, "task queued");
        Ok(id)
    }

    pub fn task_status(&self, id: &str) -> Option<TaskRecord> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Poll until the task reaches a terminal state or `budget` elapses.
    pub async fn wait_for(&self, id: &str, budget: Duration) -> Option<TaskRecord> {
        let deadline = Instant::now() + budget;
        loop {
            let record = self.registry.get(id)?;
            if record.status.is_terminal() || Instant::now() >= deadline {
                return Some(record);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Stop accepting work, let workers drain the queue, and wait for them.
    pub async fn shutdown(self) {
        drop(self.sender);
        for handle in self.workers {
            let _ = handle.await;
        }
        info!("task runner stopped");
    }
}
