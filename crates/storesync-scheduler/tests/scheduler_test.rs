use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use storesync_core::config::{EmailConfig, GenerationConfig, SchedulerConfig, SimilarityConfig};
use storesync_core::errors::{StorageError, StoreSyncResult};
use storesync_core::models::{
    ApprovalStep, CampaignBundle, CampaignStatus, Decision, GeneratedEmail, LocationCampaign,
    NewApprovalStep, NewRecipient, SimilarityQuery, VectorMatch,
};
use storesync_core::traits::{ICampaignStorage, ITextCompleter, ITextEmbedder};
use storesync_email::EmailSender;
use storesync_generation::{ContentGenerator, ContentPipeline};
use storesync_observability::MetricsCollector;
use storesync_retrieval::SimilarityIndex;
use storesync_scheduler::{
    run_sweeps, PeriodicScheduler, RetryPolicy, Sweeper, Task, TaskContext, TaskRegistry,
    TaskRunner, TaskStatus,
};
use storesync_storage::StorageEngine;
use storesync_workflow::WorkflowService;
use test_fixtures::{
    at, seed_campaign, seed_campaign_with, seeded_storage, DeterministicEmbedder, FailingEmbedder,
    RecordingTransport, ScriptedCompleter,
};

const WAIT: Duration = Duration::from_secs(10);

struct Harness {
    storage: Arc<StorageEngine>,
    runner: TaskRunner,
    metrics: Arc<Mutex<MetricsCollector>>,
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        delay: Duration::from_millis(5),
        timeout: Duration::from_secs(5),
    }
}

fn harness(completer: Arc<dyn ITextCompleter>, embedder: Arc<dyn ITextEmbedder>) -> Harness {
    harness_with_policy(completer, embedder, fast_policy())
}

fn harness_with_policy(
    completer: Arc<dyn ITextCompleter>,
    embedder: Arc<dyn ITextEmbedder>,
    policy: RetryPolicy,
) -> Harness {
    let storage = seeded_storage();
    let generator = Arc::new(ContentGenerator::new(
        completer,
        embedder.clone(),
        GenerationConfig::default(),
    ));
    let pipeline = Arc::new(ContentPipeline::new(storage.clone(), generator));
    let index = Arc::new(SimilarityIndex::new(
        storage.clone(),
        embedder,
        SimilarityConfig::default(),
    ));
    let email = Arc::new(EmailSender::new(
        storage.clone(),
        storage.clone(),
        Arc::new(RecordingTransport::new()),
        EmailConfig {
            rate_limit_pause_ms: 0,
            ..EmailConfig::default()
        },
    ));
    let ctx = Arc::new(TaskContext::new(pipeline, index, email));
    let config = SchedulerConfig {
        worker_count: 2,
        ..SchedulerConfig::default()
    };
    let metrics = Arc::new(Mutex::new(MetricsCollector::new()));
    let runner = TaskRunner::with_policy(ctx, &config, policy, metrics.clone());
    Harness {
        storage,
        runner,
        metrics,
    }
}

fn default_harness() -> Harness {
    harness(
        Arc::new(ScriptedCompleter::new("Fresh deals at Downtown this week.")),
        Arc::new(DeterministicEmbedder::new(8)),
    )
}

#[tokio::test]
async fn generate_task_persists_content_and_embedding() {
    let h = default_harness();
    let id = seed_campaign(&h.storage, "l1", "t1", CampaignStatus::Draft).id;

    let task_id = h
        .runner
        .submit(Task::GenerateContent {
            campaign_id: id.clone(),
            use_ai: true,
            extra_instructions: None,
        })
        .await
        .unwrap();
    let record = h.runner.wait_for(&task_id, WAIT).await.unwrap();

    let TaskStatus::Succeeded { summary } = record.status else {
        panic!("unexpected status {:?}", record.status);
    };
    assert_eq!(summary["used_ai"], true);
    assert_eq!(summary["embedded"], true);
    let campaign = h.storage.get_campaign(&id).unwrap().unwrap();
    assert_eq!(campaign.generated_content, "Fresh deals at Downtown this week.");
    assert!(campaign.embedding.is_some());

    let metrics = h.metrics.lock().unwrap().clone();
    assert_eq!(metrics.tasks.succeeded, 1);
    assert_eq!(metrics.generation.ai_generated, 1);
    h.runner.shutdown().await;
}

/// First call overruns the task budget, later calls answer at once.
struct SlowFirstCompleter {
    calls: AtomicUsize,
}

impl ITextCompleter for SlowFirstCompleter {
    fn complete(&self, _system: &str, _user: &str) -> StoreSyncResult<String> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(500));
            return Ok("stale copy from the slow attempt".to_string());
        }
        Ok("fresh copy from the retry".to_string())
    }
    fn name(&self) -> &str {
        "slow-first"
    }
    fn is_configured(&self) -> bool {
        true
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timed_out_attempt_never_overwrites_retry() {
    let h = harness_with_policy(
        Arc::new(SlowFirstCompleter {
            calls: AtomicUsize::new(0),
        }),
        Arc::new(DeterministicEmbedder::new(8)),
        RetryPolicy {
            max_retries: 2,
            delay: Duration::from_millis(5),
            timeout: Duration::from_millis(100),
        },
    );
    let id = seed_campaign(&h.storage, "l1", "t1", CampaignStatus::Draft).id;

    let task_id = h
        .runner
        .submit(Task::GenerateContent {
            campaign_id: id.clone(),
            use_ai: true,
            extra_instructions: None,
        })
        .await
        .unwrap();
    let record = h.runner.wait_for(&task_id, WAIT).await.unwrap();
    assert!(matches!(record.status, TaskStatus::Succeeded { .. }));

    tokio::time::sleep(Duration::from_millis(800)).await;
    let campaign = h.storage.get_campaign(&id).unwrap().unwrap();
    assert_eq!(campaign.generated_content, "fresh copy from the retry");
    let metrics = h.metrics.lock().unwrap().clone();
    assert_eq!(metrics.tasks.timeouts, 1);
    h.runner.shutdown().await;
}

#[tokio::test]
async fn embedding_failures_are_retried_then_reported() {
    let h = harness(
        Arc::new(ScriptedCompleter::new("unused")),
        Arc::new(FailingEmbedder::new(8)),
    );
    let id = seed_campaign_with(&h.storage, "l1", "t1", |c| {
        c.generated_content = "Some copy".into();
    })
    .id;

    let task_id = h
        .runner
        .submit(Task::ComputeEmbedding { campaign_id: id })
        .await
        .unwrap();
    let record = h.runner.wait_for(&task_id, WAIT).await.unwrap();

    match record.status {
        TaskStatus::Failed { attempts, error } => {
            assert_eq!(attempts, 4);
            assert!(error.contains("simulated outage"));
        }
        other => panic!("unexpected status {other:?}"),
    }
    let metrics = h.metrics.lock().unwrap().clone();
    assert_eq!(metrics.tasks.retries, 3);
    assert_eq!(metrics.tasks.failed, 1);
    h.runner.shutdown().await;
}

#[tokio::test]
async fn missing_campaign_fails_without_retry() {
    let h = default_harness();
    let task_id = h
        .runner
        .submit(Task::GenerateEmail {
            campaign_id: "missing".into(),
        })
        .await
        .unwrap();
    let record = h.runner.wait_for(&task_id, WAIT).await.unwrap();
    assert!(matches!(record.status, TaskStatus::Failed { attempts: 1, .. }));
    h.runner.shutdown().await;
}

#[tokio::test]
async fn sends_run_once() {
    let h = default_harness();
    let id = seed_campaign(&h.storage, "l1", "t1", CampaignStatus::Approved).id;
    let task_id = h
        .runner
        .submit(Task::SendBatch {
            campaign_id: id,
            recipient_ids: None,
        })
        .await
        .unwrap();
    let record = h.runner.wait_for(&task_id, WAIT).await.unwrap();
    match record.status {
        TaskStatus::Failed { attempts, error } => {
            assert_eq!(attempts, 1);
            assert!(error.contains("active"));
        }
        other => panic!("unexpected status {other:?}"),
    }
    h.runner.shutdown().await;
}

#[tokio::test]
async fn batch_send_summary_counts_deliveries() {
    let h = default_harness();
    let id = seed_campaign_with(&h.storage, "l1", "t1", |c| {
        c.status = CampaignStatus::Active;
        c.generated_html_email = "<p>Hi {{recipient_name}}</p>".into();
    })
    .id;
    storesync_core::traits::IRecipientStorage::insert_recipients(
        h.storage.as_ref(),
        &id,
        &[
            NewRecipient::new("ana@example.com", "Ana"),
            NewRecipient::new("bo@example.com", "Bo"),
        ],
    )
    .unwrap();

    let task_id = h
        .runner
        .submit(Task::SendBatch {
            campaign_id: id,
            recipient_ids: None,
        })
        .await
        .unwrap();
    let record = h.runner.wait_for(&task_id, WAIT).await.unwrap();
    let TaskStatus::Succeeded { summary } = record.status else {
        panic!("unexpected status {:?}", record.status);
    };
    assert_eq!(summary["sent"], 2);
    assert_eq!(h.metrics.lock().unwrap().email.sent, 2);
    h.runner.shutdown().await;
}

#[tokio::test]
async fn bulk_generation_fans_out() {
    let h = default_harness();
    let a = seed_campaign(&h.storage, "l1", "t1", CampaignStatus::Draft).id;
    let b = seed_campaign(&h.storage, "l2", "t1", CampaignStatus::Draft).id;

    let parent = h
        .runner
        .submit(Task::BulkGenerate {
            campaign_ids: vec![a.clone(), b.clone()],
            use_ai: false,
        })
        .await
        .unwrap();
    let record = h.runner.task_status(&parent).unwrap();
    let TaskStatus::Succeeded { summary } = record.status else {
        panic!("unexpected status {:?}", record.status);
    };
    let children: Vec<String> = serde_json::from_value(summary["task_ids"].clone()).unwrap();
    assert_eq!(children.len(), 2);
    for child in &children {
        let record = h.runner.wait_for(child, WAIT).await.unwrap();
        assert!(matches!(record.status, TaskStatus::Succeeded { .. }));
    }
    let campaign = h.storage.get_campaign(&b).unwrap().unwrap();
    assert_eq!(campaign.generated_content, "Visit Uptown for Acme Fuel deals!");
    assert_eq!(h.runner.registry().for_campaign(&a).len(), 1);

    let too_many = (0..1001).map(|i| i.to_string()).collect();
    assert!(h
        .runner
        .submit(Task::BulkGenerate {
            campaign_ids: too_many,
            use_ai: false,
        })
        .await
        .is_err());
    h.runner.shutdown().await;
}

fn sweeper(storage: &Arc<StorageEngine>) -> Sweeper {
    let workflow = Arc::new(WorkflowService::new(storage.clone(), storage.clone()));
    Sweeper::new(workflow, storage.clone(), 365)
}

#[test]
fn activation_sweep_is_idempotent() {
    let storage = seeded_storage();
    let scheduled = |start_day, end_day| {
        seed_campaign_with(&storage, "l1", "t1", |c| {
            c.status = CampaignStatus::Scheduled;
            c.scheduled_start = Some(at(start_day, 9));
            c.scheduled_end = Some(at(end_day, 9));
        })
        .id
    };
    let first = scheduled(2, 20);
    let second = scheduled(3, 20);
    let later = scheduled(15, 20);
    let sweeper = sweeper(&storage);
    let metrics = Mutex::new(MetricsCollector::new());

    let run = run_sweeps(&sweeper, at(10, 0), &metrics);
    assert_eq!(run.activated.processed, 2);
    assert_eq!(run.activated.failed, 0);
    assert!(run.activated.campaign_ids.contains(&first));
    assert!(run.activated.campaign_ids.contains(&second));
    assert_eq!(run.completed.processed, 0);

    for id in [&first, &second] {
        let campaign = storage.get_campaign(id).unwrap().unwrap();
        assert_eq!(campaign.status, CampaignStatus::Active);
        let history = storage.approval_history(id).unwrap();
        assert_eq!(history[0].actor, "system");
        assert_eq!(history[0].decision, Decision::Activated);
    }
    assert_eq!(
        storage.get_campaign(&later).unwrap().unwrap().status,
        CampaignStatus::Scheduled
    );

    let again = run_sweeps(&sweeper, at(10, 0), &metrics);
    assert_eq!(again.activated.processed, 0);
    assert_eq!(metrics.lock().unwrap().sweeps.activated, 2);
}

#[test]
fn completion_sweep_closes_expired_campaigns() {
    let storage = seeded_storage();
    let expired = seed_campaign_with(&storage, "l1", "t1", |c| {
        c.status = CampaignStatus::Active;
        c.scheduled_start = Some(at(1, 9));
        c.scheduled_end = Some(at(5, 9));
    })
    .id;
    let running = seed_campaign_with(&storage, "l1", "t1", |c| {
        c.status = CampaignStatus::Active;
        c.scheduled_start = Some(at(1, 9));
        c.scheduled_end = Some(at(25, 9));
    })
    .id;

    let report = sweeper(&storage).complete_expired(at(10, 0)).unwrap();
    assert_eq!(report.campaign_ids, vec![expired.clone()]);
    assert_eq!(
        storage.get_campaign(&expired).unwrap().unwrap().status,
        CampaignStatus::Completed
    );
    assert_eq!(
        storage.get_campaign(&running).unwrap().unwrap().status,
        CampaignStatus::Active
    );
}

/// Delegates to real storage but cannot list campaigns due for activation.
struct ActivationQueryDown(Arc<StorageEngine>);

impl ICampaignStorage for ActivationQueryDown {
    fn insert_campaign(&self, campaign: &LocationCampaign) -> StoreSyncResult<()> {
        self.0.insert_campaign(campaign)
    }
    fn get_campaign(&self, id: &str) -> StoreSyncResult<Option<LocationCampaign>> {
        self.0.get_campaign(id)
    }
    fn update_campaign(&self, campaign: &LocationCampaign) -> StoreSyncResult<()> {
        self.0.update_campaign(campaign)
    }
    fn delete_campaign(&self, id: &str) -> StoreSyncResult<bool> {
        self.0.delete_campaign(id)
    }
    fn load_bundle(&self, id: &str) -> StoreSyncResult<Option<CampaignBundle>> {
        self.0.load_bundle(id)
    }
    fn list_by_status(&self, status: CampaignStatus) -> StoreSyncResult<Vec<LocationCampaign>> {
        self.0.list_by_status(status)
    }
    fn list_by_location(&self, location_id: &str) -> StoreSyncResult<Vec<LocationCampaign>> {
        self.0.list_by_location(location_id)
    }
    fn commit_transition(
        &self,
        campaign_id: &str,
        expected: CampaignStatus,
        step: &NewApprovalStep,
    ) -> StoreSyncResult<ApprovalStep> {
        self.0.commit_transition(campaign_id, expected, step)
    }
    fn commit_schedule(
        &self,
        campaign_id: &str,
        expected: CampaignStatus,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: &NewApprovalStep,
    ) -> StoreSyncResult<ApprovalStep> {
        self.0.commit_schedule(campaign_id, expected, start, end, step)
    }
    fn approval_history(&self, campaign_id: &str) -> StoreSyncResult<Vec<ApprovalStep>> {
        self.0.approval_history(campaign_id)
    }
    fn save_generated_content(
        &self,
        campaign_id: &str,
        content: &str,
        embedding: Option<&[f32]>,
    ) -> StoreSyncResult<()> {
        self.0.save_generated_content(campaign_id, content, embedding)
    }
    fn save_embedding(&self, campaign_id: &str, embedding: &[f32]) -> StoreSyncResult<()> {
        self.0.save_embedding(campaign_id, embedding)
    }
    fn save_email_content(&self, campaign_id: &str, email: &GeneratedEmail) -> StoreSyncResult<()> {
        self.0.save_email_content(campaign_id, email)
    }
    fn find_nearest(
        &self,
        query_embedding: &[f32],
        query: &SimilarityQuery,
    ) -> StoreSyncResult<Vec<VectorMatch>> {
        self.0.find_nearest(query_embedding, query)
    }
    fn campaigns_needing_embedding(
        &self,
        ids: Option<&[String]>,
        recompute: bool,
    ) -> StoreSyncResult<Vec<String>> {
        self.0.campaigns_needing_embedding(ids, recompute)
    }
    fn due_for_activation(&self, _now: DateTime<Utc>) -> StoreSyncResult<Vec<String>> {
        Err(StorageError::SqliteError {
            message: "database is locked".to_string(),
        }
        .into())
    }
    fn due_for_completion(&self, now: DateTime<Utc>) -> StoreSyncResult<Vec<String>> {
        self.0.due_for_completion(now)
    }
    fn purge_approval_steps(&self, cutoff: DateTime<Utc>) -> StoreSyncResult<usize> {
        self.0.purge_approval_steps(cutoff)
    }
}

#[test]
fn completion_runs_when_activation_listing_fails() {
    let storage = seeded_storage();
    let waiting = seed_campaign_with(&storage, "l1", "t1", |c| {
        c.status = CampaignStatus::Scheduled;
        c.scheduled_start = Some(at(2, 9));
        c.scheduled_end = Some(at(20, 9));
    })
    .id;
    let expired = seed_campaign_with(&storage, "l1", "t1", |c| {
        c.status = CampaignStatus::Active;
        c.scheduled_start = Some(at(1, 9));
        c.scheduled_end = Some(at(5, 9));
    })
    .id;
    let workflow = Arc::new(WorkflowService::new(storage.clone(), storage.clone()));
    let sweeper = Sweeper::new(workflow, Arc::new(ActivationQueryDown(storage.clone())), 365);
    let metrics = Mutex::new(MetricsCollector::new());

    let run = run_sweeps(&sweeper, at(10, 0), &metrics);

    assert_eq!(run.errors.len(), 1);
    assert!(run.errors[0].starts_with("activate: "));
    assert_eq!(run.activated.processed, 0);
    assert_eq!(run.completed.campaign_ids, vec![expired.clone()]);
    assert_eq!(
        storage.get_campaign(&expired).unwrap().unwrap().status,
        CampaignStatus::Completed
    );
    assert_eq!(
        storage.get_campaign(&waiting).unwrap().unwrap().status,
        CampaignStatus::Scheduled
    );
}

#[test]
fn retention_purges_old_audit_rows() {
    let storage = seeded_storage();
    let id = seed_campaign(&storage, "l1", "t1", CampaignStatus::Draft).id;
    let workflow = WorkflowService::new(storage.clone(), storage.clone());
    workflow
        .transition(
            &storesync_core::models::Actor::system(),
            &id,
            storesync_core::models::TransitionAction::Submit,
            None,
        )
        .unwrap();

    let sweeper = sweeper(&storage);
    assert_eq!(sweeper.purge_old_approvals(Utc::now()).unwrap(), 0);
    let far_future = Utc::now() + chrono::Duration::days(400);
    assert_eq!(sweeper.purge_old_approvals(far_future).unwrap(), 1);
    assert!(storage.approval_history(&id).unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn periodic_loop_activates_and_stops() {
    let storage = seeded_storage();
    let id = seed_campaign_with(&storage, "l1", "t1", |c| {
        c.status = CampaignStatus::Scheduled;
        c.scheduled_start = Some(at(2, 9));
        c.scheduled_end = Some(Utc::now() + chrono::Duration::days(30));
    })
    .id;
    let config = SchedulerConfig {
        sweep_interval_secs: 1,
        ..SchedulerConfig::default()
    };
    let metrics = Arc::new(Mutex::new(MetricsCollector::new()));
    let handle = PeriodicScheduler::spawn(
        Arc::new(sweeper(&storage)),
        Arc::new(TaskRegistry::new()),
        metrics.clone(),
        &config,
    );

    tokio::time::sleep(Duration::from_millis(2500)).await;
    handle.shutdown().await;

    assert_eq!(
        storage.get_campaign(&id).unwrap().unwrap().status,
        CampaignStatus::Active
    );
    assert!(metrics.lock().unwrap().sweeps.runs >= 1);
}
