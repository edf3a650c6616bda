use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use storesync::models::{
    Actor, CampaignStatus, ContextMap, Decision, NewRecipient, Role, SimilarityQuery,
    TransitionAction,
};
use storesync::{Capabilities, SimilarTo, StoreSync, StoreSyncConfig, StoreSyncError, Task, TaskStatus};
use test_fixtures::{at, seeded_storage, DeterministicEmbedder, RecordingTransport, ScriptedCompleter};

struct Fixture {
    runtime: StoreSync,
    transport: Arc<RecordingTransport>,
}

fn fixture() -> Fixture {
    let completer = Arc::new(ScriptedCompleter::with_responses(
        "unused",
        &["<p>Hi {{recipient_name}}</p><a href=\"{{unsubscribe_link}}\">x</a>", "Summer at Downtown"],
    ));
    let transport = Arc::new(RecordingTransport::new());
    let mut config = StoreSyncConfig::default();
    config.email.rate_limit_pause_ms = 0;
    let runtime = StoreSync::with_parts(
        config,
        seeded_storage(),
        Capabilities {
            completer: completer.clone(),
            email_completer: completer,
            embedder: Arc::new(DeterministicEmbedder::new(8)),
            transport: transport.clone(),
        },
    );
    Fixture { runtime, transport }
}

fn manager() -> Actor {
    Actor::new("mgr", Role::BrandManager).with_brand("b1")
}

#[test]
fn campaign_runs_from_draft_to_delivery() {
    let Fixture { runtime, transport } = fixture();
    let actor = manager();

    let campaign = runtime
        .create_campaign(&actor, "l1", "t1", ContextMap::default())
        .unwrap();
    let generated = runtime.generate_content(&campaign.id, false, None).unwrap();
    assert_eq!(generated.generated.content, "Visit Downtown for Acme Fuel deals!");
    assert!(!generated.generated.used_ai);

    runtime
        .transition(&actor, &campaign.id, TransitionAction::Submit, None)
        .unwrap();
    runtime
        .transition(&actor, &campaign.id, TransitionAction::Approve, Some("ok"))
        .unwrap();
    runtime
        .schedule_campaign(
            &actor,
            &campaign.id,
            at(2, 9),
            Utc::now() + chrono::Duration::days(30),
            None,
        )
        .unwrap();

    let sweep = runtime.run_sweeps(Utc::now());
    assert!(sweep.errors.is_empty());
    assert_eq!(sweep.activated.campaign_ids, vec![campaign.id.clone()]);
    assert_eq!(
        runtime.get_campaign(&campaign.id).unwrap().status,
        CampaignStatus::Active
    );

    let email = runtime.generate_html_email(&campaign.id).unwrap();
    assert_eq!(email.subject, "Summer at Downtown");

    runtime
        .add_recipients(
            &campaign.id,
            &[
                NewRecipient::new("ana@example.com", "Ana"),
                NewRecipient::new("bo@example.com", ""),
            ],
        )
        .unwrap();
    let report = runtime.send_batch(&campaign.id, None).unwrap();
    assert_eq!((report.sent, report.failed), (2, 0));
    assert!(transport.sent()[0].html.contains("Hi Ana"));

    let decisions: Vec<Decision> = runtime
        .history(&campaign.id)
        .unwrap()
        .into_iter()
        .map(|s| s.decision)
        .collect();
    assert_eq!(
        decisions,
        vec![
            Decision::Activated,
            Decision::Scheduled,
            Decision::Approved,
            Decision::Submitted
        ]
    );

    let metrics = runtime.metrics();
    assert_eq!(metrics.generation.total, 1);
    assert_eq!(metrics.email.sent, 2);
    assert_eq!(metrics.sweeps.activated, 1);
}

#[test]
fn similar_campaigns_by_campaign_and_text() {
    let Fixture { runtime, .. } = fixture();
    let actor = manager();
    // Same location and template render the same copy, so the embeddings match.
    let a = runtime
        .create_campaign(&actor, "l1", "t1", ContextMap::default())
        .unwrap();
    let b = runtime
        .create_campaign(&actor, "l1", "t1", ContextMap::default())
        .unwrap();
    runtime.generate_content(&a.id, false, None).unwrap();
    runtime.generate_content(&b.id, false, None).unwrap();

    let query = SimilarityQuery::new(5, 0.5);
    let found = runtime
        .find_similar(
            SimilarTo::Campaign {
                id: &a.id,
                same_brand_only: true,
            },
            &query,
        )
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].campaign_id, b.id);
    assert_eq!(found[0].content_preview, "Visit Downtown for Acme Fuel deals!");

    let by_text = runtime
        .find_similar(SimilarTo::Text("Visit Downtown for Acme Fuel deals!"), &query)
        .unwrap();
    assert_eq!(by_text.len(), 2);
    assert!(by_text.iter().all(|c| c.similarity > 0.99));
}

#[test]
fn file_backed_runtime_without_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StoreSyncConfig::default();
    config.storage.db_path = dir.path().join("storesync.db").display().to_string();
    let runtime = StoreSync::open(config).unwrap();

    assert!(!runtime.generator.ai_configured());
    assert!(matches!(
        runtime.find_similar(SimilarTo::Text("coffee"), &SimilarityQuery::new(5, 0.5)),
        Err(StoreSyncError::NotConfigured { .. })
    ));
    let validation = runtime.validate_template("{{ b }} and {{ a }}");
    assert!(validation.valid);
    assert_eq!(validation.variables, vec!["a", "b"]);
    assert!(matches!(
        runtime.get_campaign("missing"),
        Err(StoreSyncError::NotFound { .. })
    ));
}

#[test]
fn capabilities_follow_mail_transport_setting() {
    let config = StoreSyncConfig::default();
    let capabilities = Capabilities::from_config(&config).unwrap();
    assert_eq!(capabilities.transport.name(), "logging");

    let config = StoreSyncConfig::from_toml(
        r#"
        [email]
        transport = "smtp"

        [email.smtp]
        host = "127.0.0.1"
        security = "none"
        "#,
    )
    .unwrap();
    let capabilities = Capabilities::from_config(&config).unwrap();
    assert_eq!(capabilities.transport.name(), "smtp");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn background_tasks_report_status() {
    let Fixture { runtime, .. } = fixture();
    let campaign = runtime
        .create_campaign(&manager(), "l3", "t2", ContextMap::default())
        .unwrap_err();
    assert!(matches!(campaign, StoreSyncError::PermissionDenied { .. }));

    let campaign = runtime
        .create_campaign(&manager(), "l1", "t1", ContextMap::default())
        .unwrap();
    let background = runtime.start();
    let task_id = background
        .submit(Task::GenerateContent {
            campaign_id: campaign.id.clone(),
            use_ai: false,
            extra_instructions: None,
        })
        .await
        .unwrap();
    let record = background
        .runner()
        .wait_for(&task_id, Duration::from_secs(10))
        .await
        .unwrap();
    assert!(matches!(record.status, TaskStatus::Succeeded { .. }));
    assert!(matches!(
        background.task_status("nope"),
        Err(StoreSyncError::NotFound { .. })
    ));
    background.shutdown().await;

    assert!(runtime.get_campaign(&campaign.id).unwrap().has_content());
    assert_eq!(runtime.metrics().tasks.succeeded, 1);
}
