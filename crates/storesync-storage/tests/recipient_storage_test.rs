mod common;

use storesync_core::models::{NewRecipient, RecipientStatus};
use storesync_core::traits::IRecipientStorage;

use common::{seeded_engine, ts};

#[test]
fn insert_ignores_duplicate_addresses() {
    let (engine, campaign) = seeded_engine();
    let created = engine
        .insert_recipients(
            &campaign.id,
            &[NewRecipient::new("a@x.com", "A"), NewRecipient::new("b@x.com", "")],
        )
        .unwrap();
    assert_eq!(created, 2);

    let again = engine
        .insert_recipients(
            &campaign.id,
            &[NewRecipient::new("a@x.com", "A2"), NewRecipient::new("c@x.com", "C")],
        )
        .unwrap();
    assert_eq!(again, 1);
    assert_eq!(engine.list_recipients(&campaign.id, None).unwrap().len(), 3);
}

#[test]
fn status_updates_and_stats() {
    let (engine, campaign) = seeded_engine();
    engine
        .insert_recipients(
            &campaign.id,
            &[
                NewRecipient::new("a@x.com", ""),
                NewRecipient::new("b@x.com", ""),
                NewRecipient::new("c@x.com", ""),
            ],
        )
        .unwrap();
    let all = engine.list_recipients(&campaign.id, None).unwrap();
    engine.mark_recipient_sent(&all[0].id, ts(3, 10)).unwrap();
    engine.mark_recipient_failed(&all[1].id, "mailbox full").unwrap();

    let stats = engine.recipient_stats(&campaign.id).unwrap();
    assert_eq!((stats.total, stats.pending, stats.sent, stats.failed), (3, 1, 1, 1));

    let failed = engine
        .list_recipients(&campaign.id, Some(RecipientStatus::Failed))
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].error_message, "mailbox full");

    let sent = engine
        .get_recipients(&campaign.id, &[all[0].id.clone()])
        .unwrap();
    assert_eq!(sent[0].sent_at, Some(ts(3, 10)));
}

#[test]
fn clear_removes_only_pending() {
    let (engine, campaign) = seeded_engine();
    engine
        .insert_recipients(
            &campaign.id,
            &[NewRecipient::new("a@x.com", ""), NewRecipient::new("b@x.com", "")],
        )
        .unwrap();
    let all = engine.list_recipients(&campaign.id, None).unwrap();
    engine.mark_recipient_sent(&all[0].id, ts(3, 10)).unwrap();

    assert_eq!(engine.clear_pending_recipients(&campaign.id).unwrap(), 1);
    let remaining = engine.list_recipients(&campaign.id, None).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].status, RecipientStatus::Sent);
}
