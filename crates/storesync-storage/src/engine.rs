//! StorageEngine: owns the ConnectionPool and implements the campaign,
//! recipient, and master-data storage traits.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use storesync_core::config::StorageConfig;
use storesync_core::errors::StoreSyncResult;
use storesync_core::models::{
    ApprovalStep, Brand, CampaignBundle, CampaignStatus, CampaignTemplate, EmailRecipient,
    GeneratedEmail, Location, LocationCampaign, NewApprovalStep, NewRecipient, RecipientStats,
    RecipientStatus, SimilarityQuery, VectorMatch,
};
use storesync_core::traits::{ICampaignStorage, IMasterDataReader, IRecipientStorage};

use crate::audit::ApprovalLog;
use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{
    campaign_crud, maintenance, master_data, recipient_ops, vector_search, with_savepoint,
};

/// The main storage engine.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path, read_pool_size: usize) -> StoreSyncResult<Self> {
        let pool = ConnectionPool::open(path, read_pool_size)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine. All reads go through the writer.
    pub fn open_in_memory() -> StoreSyncResult<Self> {
        let engine = Self {
            pool: ConnectionPool::open_in_memory()?,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open according to config; `:memory:` selects the in-memory engine.
    pub fn from_config(config: &StorageConfig) -> StoreSyncResult<Self> {
        if config.is_in_memory() {
            Self::open_in_memory()
        } else {
            Self::open(Path::new(&config.db_path), config.read_pool_size)
        }
    }

    fn initialize(&self) -> StoreSyncResult<()> {
        self.pool.writer.with_conn(|conn| {
            let version = migrations::run_migrations(conn)?;
            debug!(schema_version = version, "storage initialized");
            Ok(())
        })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// File-backed: uses the read pool. In-memory: uses the writer.
    fn with_reader<F, T>(&self, f: F) -> StoreSyncResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> StoreSyncResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f),
        }
    }

    // --- Master data seeding (owned by the external master-data service) ---

    pub fn upsert_brand(&self, brand: &Brand) -> StoreSyncResult<()> {
        self.pool
            .writer
            .with_conn(|conn| master_data::upsert_brand(conn, brand))
    }

    pub fn upsert_location(&self, location: &Location) -> StoreSyncResult<()> {
        self.pool
            .writer
            .with_conn(|conn| master_data::upsert_location(conn, location))
    }

    pub fn upsert_template(&self, template: &CampaignTemplate) -> StoreSyncResult<()> {
        self.pool
            .writer
            .with_conn(|conn| master_data::upsert_template(conn, template))
    }

    // --- Maintenance ---

    pub fn integrity_check(&self) -> StoreSyncResult<bool> {
        self.pool.writer.with_conn(maintenance::integrity_check)
    }

    /// Truncate the WAL. A no-op for in-memory databases.
    pub fn checkpoint(&self) -> StoreSyncResult<()> {
        if self.pool.db_path.is_none() {
            return Ok(());
        }
        self.pool.writer.with_conn(maintenance::wal_checkpoint)
    }
}

impl IMasterDataReader for StorageEngine {
    fn get_brand(&self, id: &str) -> StoreSyncResult<Option<Brand>> {
        self.with_reader(|conn| master_data::get_brand(conn, id))
    }

    fn get_location(&self, id: &str) -> StoreSyncResult<Option<Location>> {
        self.with_reader(|conn| master_data::get_location(conn, id))
    }

    fn get_template(&self, id: &str) -> StoreSyncResult<Option<CampaignTemplate>> {
        self.with_reader(|conn| master_data::get_template(conn, id))
    }
}

impl ICampaignStorage for StorageEngine {
    fn insert_campaign(&self, campaign: &LocationCampaign) -> StoreSyncResult<()> {
        self.pool
            .writer
            .with_conn(|conn| campaign_crud::insert_campaign(conn, campaign))
    }

    fn get_campaign(&self, id: &str) -> StoreSyncResult<Option<LocationCampaign>> {
        self.with_reader(|conn| campaign_crud::get_campaign(conn, id))
    }

    fn update_campaign(&self, campaign: &LocationCampaign) -> StoreSyncResult<()> {
        self.pool
            .writer
            .with_conn(|conn| campaign_crud::update_campaign_fields(conn, campaign))
    }

    fn delete_campaign(&self, id: &str) -> StoreSyncResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| campaign_crud::delete_campaign(conn, id))
    }

    fn load_bundle(&self, id: &str) -> StoreSyncResult<Option<CampaignBundle>> {
        self.with_reader(|conn| campaign_crud::load_bundle(conn, id))
    }

    fn list_by_status(&self, status: CampaignStatus) -> StoreSyncResult<Vec<LocationCampaign>> {
        self.with_reader(|conn| campaign_crud::list_by_status(conn, status))
    }

    fn list_by_location(&self, location_id: &str) -> StoreSyncResult<Vec<LocationCampaign>> {
        self.with_reader(|conn| campaign_crud::list_by_location(conn, location_id))
    }

    fn commit_transition(
        &self,
        campaign_id: &str,
        expected: CampaignStatus,
        step: &NewApprovalStep,
    ) -> StoreSyncResult<ApprovalStep> {
        self.pool.writer.with_conn(|conn| {
            with_savepoint(conn, "commit_transition", || {
                campaign_crud::set_status_if(
                    conn,
                    campaign_id,
                    expected,
                    step.new_status,
                    &step.created_at,
                )?;
                ApprovalLog::append(conn, step)
            })
        })
    }

    fn commit_schedule(
        &self,
        campaign_id: &str,
        expected: CampaignStatus,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: &NewApprovalStep,
    ) -> StoreSyncResult<ApprovalStep> {
        self.pool.writer.with_conn(|conn| {
            with_savepoint(conn, "commit_schedule", || {
                campaign_crud::set_status_if(
                    conn,
                    campaign_id,
                    expected,
                    step.new_status,
                    &step.created_at,
                )?;
                campaign_crud::set_window(conn, campaign_id, &start, &end)?;
                ApprovalLog::append(conn, step)
            })
        })
    }

    fn approval_history(&self, campaign_id: &str) -> StoreSyncResult<Vec<ApprovalStep>> {
        self.with_reader(|conn| ApprovalLog::history(conn, campaign_id))
    }

    fn save_generated_content(
        &self,
        campaign_id: &str,
        content: &str,
        embedding: Option<&[f32]>,
    ) -> StoreSyncResult<()> {
        self.pool.writer.with_conn(|conn| {
            campaign_crud::save_generated_content(conn, campaign_id, content, embedding)
        })
    }

    fn save_embedding(&self, campaign_id: &str, embedding: &[f32]) -> StoreSyncResult<()> {
        self.pool
            .writer
            .with_conn(|conn| campaign_crud::save_embedding(conn, campaign_id, embedding))
    }

    fn save_email_content(&self, campaign_id: &str, email: &GeneratedEmail) -> StoreSyncResult<()> {
        self.pool
            .writer
            .with_conn(|conn| campaign_crud::save_email_content(conn, campaign_id, email))
    }

    fn find_nearest(
        &self,
        query_embedding: &[f32],
        query: &SimilarityQuery,
    ) -> StoreSyncResult<Vec<VectorMatch>> {
        self.with_reader(|conn| vector_search::find_nearest(conn, query_embedding, query))
    }

    fn campaigns_needing_embedding(
        &self,
        ids: Option<&[String]>,
        recompute: bool,
    ) -> StoreSyncResult<Vec<String>> {
        self.with_reader(|conn| campaign_crud::campaigns_needing_embedding(conn, ids, recompute))
    }

    fn due_for_activation(&self, now: DateTime<Utc>) -> StoreSyncResult<Vec<String>> {
        self.with_reader(|conn| campaign_crud::due_for_activation(conn, &now))
    }

    fn due_for_completion(&self, now: DateTime<Utc>) -> StoreSyncResult<Vec<String>> {
        self.with_reader(|conn| campaign_crud::due_for_completion(conn, &now))
    }

    fn purge_approval_steps(&self, cutoff: DateTime<Utc>) -> StoreSyncResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| maintenance::purge_approval_steps(conn, &cutoff))
    }
}

impl IRecipientStorage for StorageEngine {
    fn insert_recipients(
        &self,
        campaign_id: &str,
        recipients: &[NewRecipient],
    ) -> StoreSyncResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| recipient_ops::insert_recipients(conn, campaign_id, recipients))
    }

    fn list_recipients(
        &self,
        campaign_id: &str,
        status: Option<RecipientStatus>,
    ) -> StoreSyncResult<Vec<EmailRecipient>> {
        self.with_reader(|conn| recipient_ops::list_recipients(conn, campaign_id, status))
    }

    fn get_recipients(
        &self,
        campaign_id: &str,
        ids: &[String],
    ) -> StoreSyncResult<Vec<EmailRecipient>> {
        self.with_reader(|conn| recipient_ops::get_recipients(conn, campaign_id, ids))
    }

    fn mark_recipient_sent(&self, recipient_id: &str, at: DateTime<Utc>) -> StoreSyncResult<()> {
        self.pool
            .writer
            .with_conn(|conn| recipient_ops::mark_sent(conn, recipient_id, &at))
    }

    fn mark_recipient_failed(&self, recipient_id: &str, error: &str) -> StoreSyncResult<()> {
        self.pool
            .writer
            .with_conn(|conn| recipient_ops::mark_failed(conn, recipient_id, error))
    }

    fn clear_pending_recipients(&self, campaign_id: &str) -> StoreSyncResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| recipient_ops::clear_pending(conn, campaign_id))
    }

    fn recipient_stats(&self, campaign_id: &str) -> StoreSyncResult<RecipientStats> {
        self.with_reader(|conn| recipient_ops::stats(conn, campaign_id))
    }
}
