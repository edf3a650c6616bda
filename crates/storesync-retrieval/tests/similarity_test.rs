use std::sync::Arc;

use proptest::prelude::*;

use storesync_ai::UnconfiguredEmbedder;
use storesync_core::config::SimilarityConfig;
use storesync_core::errors::{RetrievalError, StoreSyncError};
use storesync_core::models::{CampaignStatus, SimilarityQuery};
use storesync_core::traits::{ICampaignStorage, IExampleRetriever};
use storesync_retrieval::{rag_query_text, SimilarityIndex};
use storesync_storage::StorageEngine;
use test_fixtures::{
    seed_campaign_with, seeded_storage, DeterministicEmbedder, FailingEmbedder, FixedEmbedder,
};

struct Seeded {
    storage: Arc<StorageEngine>,
    near: String,
    mid: String,
    far: String,
    other_brand: String,
    unembedded: String,
}

fn embedded(
    storage: &StorageEngine,
    location: &str,
    template: &str,
    status: CampaignStatus,
    vector: Vec<f32>,
    content: &str,
) -> String {
    seed_campaign_with(storage, location, template, |c| {
        c.status = status;
        c.embedding = Some(vector);
        c.generated_content = content.to_string();
    })
    .id
}

fn seeded() -> Seeded {
    let storage = seeded_storage();
    use CampaignStatus::{Active, Completed, Draft};
    let near = embedded(&storage, "l1", "t1", Completed, vec![1.0, 0.0, 0.0], "Near");
    let mid = embedded(&storage, "l2", "t1", Active, vec![0.8, 0.6, 0.0], "Mid");
    let far = embedded(&storage, "l1", "t1", Draft, vec![0.0, 1.0, 0.0], "Far");
    let other_brand = embedded(&storage, "l3", "t2", Completed, vec![0.9, 0.1, 0.0], "Other");
    let unembedded = seed_campaign_with(&storage, "l1", "t1", |c| {
        c.generated_content = "Waiting for an embedding".into();
    })
    .id;
    Seeded {
        storage,
        near,
        mid,
        far,
        other_brand,
        unembedded,
    }
}

fn index(storage: Arc<StorageEngine>, vector: Vec<f32>) -> SimilarityIndex {
    SimilarityIndex::new(
        storage,
        Arc::new(FixedEmbedder::new(vector)),
        SimilarityConfig::default(),
    )
}

#[test]
fn results_are_ordered_and_above_threshold() {
    let s = seeded();
    let idx = index(s.storage.clone(), vec![1.0, 0.0, 0.0]);
    let results = idx
        .find_similar(&[1.0, 0.0, 0.0], &SimilarityQuery::new(10, 0.7))
        .unwrap();
    let ids: Vec<_> = results.iter().map(|r| r.campaign_id.clone()).collect();
    assert_eq!(ids, vec![s.near.clone(), s.other_brand.clone(), s.mid.clone()]);
    assert!(results.iter().all(|r| r.similarity >= 0.7));
    assert!(!ids.contains(&s.far));
    assert!(!ids.contains(&s.unembedded));
    assert_eq!(results[0].brand_name, "Acme Fuel");
    assert_eq!(results[0].content_preview, "Near");
}

#[test]
fn exclusions_brand_and_status_filters_apply() {
    let s = seeded();
    let idx = index(s.storage.clone(), vec![1.0, 0.0, 0.0]);
    let mut query = SimilarityQuery::new(10, 0.0);
    query.exclude_ids.push(s.near.clone());
    query.brand_id = Some("b1".into());
    query.statuses = vec![CampaignStatus::Active, CampaignStatus::Draft];
    let ids: Vec<_> = idx
        .find_similar(&[1.0, 0.0, 0.0], &query)
        .unwrap()
        .into_iter()
        .map(|r| r.campaign_id)
        .collect();
    assert_eq!(ids, vec![s.mid, s.far]);
}

#[test]
fn invalid_threshold_and_empty_query_are_rejected() {
    let s = seeded();
    let idx = index(s.storage, vec![1.0, 0.0, 0.0]);
    assert!(matches!(
        idx.find_similar(&[1.0, 0.0, 0.0], &SimilarityQuery::new(5, 1.5)),
        Err(StoreSyncError::ValidationFailed { .. })
    ));
    assert!(matches!(
        idx.find_similar_by_text("   ", &SimilarityQuery::new(5, 0.5)),
        Err(StoreSyncError::RetrievalError(RetrievalError::EmptyQuery))
    ));
}

#[test]
fn find_similar_by_text_embeds_the_query() {
    let s = seeded();
    let idx = index(s.storage.clone(), vec![0.0, 1.0, 0.0]);
    let results = idx
        .find_similar_by_text("anything", &SimilarityQuery::new(1, 0.9))
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].campaign_id, s.far);
}

#[test]
fn find_similar_by_text_requires_embedder() {
    let s = seeded();
    let idx = SimilarityIndex::new(
        s.storage,
        Arc::new(UnconfiguredEmbedder::new(3)),
        SimilarityConfig::default(),
    );
    assert!(matches!(
        idx.find_similar_by_text("fuel", &SimilarityQuery::new(5, 0.5)),
        Err(StoreSyncError::NotConfigured { .. })
    ));
}

#[test]
fn similar_to_campaign_excludes_itself() {
    let s = seeded();
    let idx = index(s.storage.clone(), vec![1.0, 0.0, 0.0]);
    let results = idx.find_similar_to_campaign(&s.near, 10, 0.5, false).unwrap();
    assert!(results.iter().all(|r| r.campaign_id != s.near));
    assert_eq!(results[0].campaign_id, s.other_brand);

    let same_brand = idx.find_similar_to_campaign(&s.near, 10, 0.5, true).unwrap();
    assert_eq!(same_brand.len(), 1);
    assert_eq!(same_brand[0].campaign_id, s.mid);
}

#[test]
fn similar_to_campaign_without_embedding_is_empty() {
    let s = seeded();
    let idx = index(s.storage.clone(), vec![1.0, 0.0, 0.0]);
    assert!(idx
        .find_similar_to_campaign(&s.unembedded, 10, 0.0, false)
        .unwrap()
        .is_empty());
    assert!(matches!(
        idx.find_similar_to_campaign("missing", 10, 0.0, false),
        Err(StoreSyncError::NotFound { .. })
    ));
}

// --- RAG ---

#[test]
fn rag_prefers_same_brand_then_tops_up() {
    let s = seeded();
    let idx = index(s.storage.clone(), vec![1.0, 0.0, 0.0]);
    let bundle = s.storage.load_bundle(&s.unembedded).unwrap().unwrap();

    let examples = idx.rag_context(&bundle, 3, 0.6);
    let ids: Vec<_> = examples.iter().map(|e| e.campaign_id.clone()).collect();
    // Same-brand completed/active first, then the cross-brand top-up. Drafts never qualify.
    assert_eq!(ids, vec![s.near.clone(), s.mid.clone(), s.other_brand.clone()]);
    assert_eq!(examples[2].brand_name, "Beta Mart");
}

#[test]
fn rag_stops_when_same_brand_is_enough() {
    let s = seeded();
    let idx = index(s.storage.clone(), vec![1.0, 0.0, 0.0]);
    let bundle = s.storage.load_bundle(&s.unembedded).unwrap().unwrap();
    let examples = idx.rag_context(&bundle, 1, 0.6);
    assert_eq!(examples.len(), 1);
    assert_eq!(examples[0].campaign_id, s.near);
}

#[test]
fn rag_swallows_errors() {
    let s = seeded();
    let idx = SimilarityIndex::new(
        s.storage.clone(),
        Arc::new(FailingEmbedder::new(3)),
        SimilarityConfig::default(),
    );
    let bundle = s.storage.load_bundle(&s.near).unwrap().unwrap();
    assert!(idx.rag_context(&bundle, 3, 0.6).is_empty());
}

#[test]
fn rag_query_text_lists_campaign_fields() {
    let s = seeded();
    let mut bundle = s.storage.load_bundle(&s.near).unwrap().unwrap();
    bundle
        .campaign
        .customizations
        .insert("discount".into(), "10%".into());
    let text = rag_query_text(&bundle);
    assert_eq!(
        text,
        "Brand: Acme Fuel\nLocation: Downtown\nTemplate: Summer Sale\nCampaign type: seasonal\ndiscount: 10%"
    );
}

// --- Backfill ---

#[test]
fn bulk_compute_fills_missing_embeddings_only() {
    let s = seeded();
    let idx = SimilarityIndex::new(
        s.storage.clone(),
        Arc::new(DeterministicEmbedder::new(3)),
        SimilarityConfig::default(),
    );
    let summary = idx.bulk_compute_embeddings(None, false).unwrap();
    assert_eq!(summary.success, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total, 1);
    let stored = s.storage.get_campaign(&s.unembedded).unwrap().unwrap();
    assert_eq!(stored.embedding.map(|e| e.len()), Some(3));

    let again = idx.bulk_compute_embeddings(None, true).unwrap();
    assert_eq!(again.total, 5);
}

#[test]
fn bulk_compute_counts_failures() {
    let s = seeded();
    let idx = SimilarityIndex::new(
        s.storage.clone(),
        Arc::new(FailingEmbedder::new(3)),
        SimilarityConfig::default(),
    );
    let summary = idx
        .bulk_compute_embeddings(Some(&[s.unembedded.clone()][..]), false)
        .unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.success, 0);
}

#[test]
fn compute_without_content_returns_false() {
    let storage = seeded_storage();
    let empty = seed_campaign_with(&storage, "l1", "t1", |_| {}).id;
    let idx = SimilarityIndex::new(
        storage,
        Arc::new(DeterministicEmbedder::new(3)),
        SimilarityConfig::default(),
    );
    assert!(!idx.compute_embedding_for_campaign(&empty).unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn never_returns_below_threshold_or_excluded(
        vectors in prop::collection::vec(prop::array::uniform3(-1.0f32..1.0), 1..8),
        query in prop::array::uniform3(-1.0f32..1.0),
        threshold in 0.0f64..1.0,
    ) {
        let storage = seeded_storage();
        let mut ids = Vec::new();
        for v in &vectors {
            ids.push(embedded(&storage, "l1", "t1", CampaignStatus::Completed, v.to_vec(), "x"));
        }
        let idx = index(storage, query.to_vec());
        let mut q = SimilarityQuery::new(20, threshold);
        q.exclude_ids.push(ids[0].clone());
        let results = idx.find_similar(&query, &q).unwrap();
        for r in &results {
            prop_assert!(r.similarity >= threshold - 1e-9);
            prop_assert!(r.campaign_id != ids[0]);
        }
        for pair in results.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
        }
    }
}
