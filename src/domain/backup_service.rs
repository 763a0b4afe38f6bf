//! Backup, restore, and the cloud-sync collaborator seam.
//!
//! A snapshot is the full serialized copy of every collection plus the
//! settings singleton. It is the device backup file format and the payload
//! round-tripped through cloud sync wrapped as `{user_id, data,
//! updated_at}`. Import is all-or-nothing at the parse step: the whole
//! payload is validated before any collection is touched.

use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::models::{
    AppSettings, Expense, Feed, Flock, GalleryItem, Medicine, Mortality, Sale, Vaccine,
};
use crate::domain::RepositoryError;
use crate::storage::FarmStore;

/// Full serialized state of the farm ledger. Collections absent from a
/// payload deserialize as empty rather than failing the import; `settings`
/// stays `null` for installations that were never configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub flocks: Vec<Flock>,
    #[serde(default)]
    pub feed: Vec<Feed>,
    #[serde(default)]
    pub medicine: Vec<Medicine>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub mortality: Vec<Mortality>,
    #[serde(default)]
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub vaccines: Vec<Vaccine>,
    #[serde(default)]
    pub gallery: Vec<GalleryItem>,
    #[serde(default)]
    pub settings: Option<AppSettings>,
}

/// Snapshot as stored remotely, keyed by user id. Last write wins at the
/// granularity of the whole snapshot; concurrent edits from two devices
/// clobber each other, by design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudBackup {
    pub user_id: String,
    pub data: Snapshot,
    pub updated_at: DateTime<Utc>,
}

/// The external cloud collaborator. The core never retries or orders
/// these calls; errors surface to the caller as-is.
pub trait RemoteBackupStore {
    fn upload(&self, backup: &CloudBackup) -> anyhow::Result<()>;
    fn download(&self, user_id: &str) -> anyhow::Result<Option<CloudBackup>>;
}

#[derive(Clone)]
pub struct BackupService {
    store: Arc<dyn FarmStore>,
}

impl BackupService {
    pub fn new(store: Arc<dyn FarmStore>) -> Self {
        Self { store }
    }

    /// Assemble the current state of every collection.
    pub fn snapshot(&self) -> Result<Snapshot, RepositoryError> {
        Ok(Snapshot {
            flocks: self.store.load_flocks()?,
            feed: self.store.load_feed()?,
            medicine: self.store.load_medicine()?,
            expenses: self.store.load_expenses()?,
            mortality: self.store.load_mortality()?,
            sales: self.store.load_sales()?,
            vaccines: self.store.load_vaccines()?,
            gallery: self.store.load_gallery()?,
            settings: self.store.load_settings()?,
        })
    }

    /// Serialize the full state as the device-backup JSON document.
    pub fn export_snapshot(&self) -> Result<String, RepositoryError> {
        let snapshot = self.snapshot()?;
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Validate fully, then replace fully: a payload that does not parse
    /// leaves every collection untouched. A payload that does parse
    /// overwrites every collection wholesale (absent keys become empty);
    /// stored settings are only replaced when the payload carries some.
    pub fn import_snapshot(&self, payload: &str) -> Result<(), RepositoryError> {
        let snapshot: Snapshot = serde_json::from_str(payload)?;
        self.apply_snapshot(snapshot)
    }

    fn apply_snapshot(&self, snapshot: Snapshot) -> Result<(), RepositoryError> {
        self.store.save_flocks(&snapshot.flocks)?;
        self.store.save_feed(&snapshot.feed)?;
        self.store.save_medicine(&snapshot.medicine)?;
        self.store.save_expenses(&snapshot.expenses)?;
        self.store.save_mortality(&snapshot.mortality)?;
        self.store.save_sales(&snapshot.sales)?;
        self.store.save_vaccines(&snapshot.vaccines)?;
        self.store.save_gallery(&snapshot.gallery)?;
        if let Some(settings) = &snapshot.settings {
            self.store.save_settings(settings)?;
        }
        info!(
            "Imported snapshot: {} flocks, {} feed, {} vaccines",
            snapshot.flocks.len(),
            snapshot.feed.len(),
            snapshot.vaccines.len()
        );
        Ok(())
    }

    /// Write the backup document to `dir`, or to the user's documents
    /// folder (falling back to the home directory) when none is given.
    /// Returns the path written.
    pub fn export_to_file(&self, dir: Option<&Path>) -> Result<PathBuf, RepositoryError> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::document_dir()
                .or_else(dirs::home_dir)
                .context("could not determine a default backup directory")?,
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create backup directory {:?}", dir))?;

        let filename = format!("farm_backup_{}.json", Utc::now().format("%Y%m%d"));
        let path = dir.join(filename);
        let payload = self.export_snapshot()?;
        fs::write(&path, payload)
            .with_context(|| format!("failed to write backup file {:?}", path))?;
        info!("Exported backup to {:?}", path);
        Ok(path)
    }

    /// Push the full local snapshot to the remote store under `user_id`.
    pub fn backup_to_remote(
        &self,
        remote: &dyn RemoteBackupStore,
        user_id: &str,
    ) -> Result<(), RepositoryError> {
        let backup = CloudBackup {
            user_id: user_id.to_string(),
            data: self.snapshot()?,
            updated_at: Utc::now(),
        };
        remote.upload(&backup)?;
        info!("Uploaded snapshot for user {}", user_id);
        Ok(())
    }

    /// Replace the local state with the remote snapshot for `user_id`.
    /// Returns `false` when the remote has nothing stored for that user.
    pub fn restore_from_remote(
        &self,
        remote: &dyn RemoteBackupStore,
        user_id: &str,
    ) -> Result<bool, RepositoryError> {
        match remote.download(user_id)? {
            Some(backup) => {
                self.apply_snapshot(backup.data)?;
                info!(
                    "Restored snapshot for user {} (remote updated {})",
                    user_id, backup.updated_at
                );
                Ok(true)
            }
            None => {
                warn!("No remote snapshot stored for user {}", user_id);
                Ok(false)
            }
        }
    }

    // --- User session ---

    pub fn session(&self) -> Result<Option<Value>, RepositoryError> {
        Ok(self.store.load_session()?)
    }

    pub fn save_session(&self, session: &Value) -> Result<(), RepositoryError> {
        self.store.save_session(session)?;
        Ok(())
    }

    pub fn logout(&self) -> Result<(), RepositoryError> {
        self.store.clear_session()?;
        info!("Cleared user session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flock_service::{FlockService, NewFlock};
    use crate::domain::ledger_service::LedgerService;
    use crate::domain::models::{Feed, FeedType};
    use crate::storage::MemoryStore;
    use std::sync::Mutex;

    fn seeded() -> (BackupService, Arc<dyn FarmStore>) {
        let store: Arc<dyn FarmStore> = Arc::new(MemoryStore::new());
        let flocks = FlockService::new(store.clone());
        let ledger = LedgerService::new(store.clone());
        let flock = flocks
            .create_flock(NewFlock {
                name: "Batch".into(),
                start_date: "2081-01-01".into(),
                total_birds: 500,
                notes: None,
                chick_rate: Some(50.0),
            })
            .unwrap();
        ledger
            .add_feed(Feed {
                id: "feed-1".into(),
                flock_id: flock.id,
                bill_no: "B-100".into(),
                date: "2081-01-05".into(),
                feed_type: FeedType::B0,
                quantity: 10.0,
                rate: 3000.0,
                total: 30000.0,
            })
            .unwrap();
        (BackupService::new(store.clone()), store)
    }

    #[test]
    fn snapshot_round_trip_is_idempotent() {
        let (backup, _store) = seeded();
        let before = backup.snapshot().unwrap();
        let payload = backup.export_snapshot().unwrap();
        backup.import_snapshot(&payload).unwrap();
        assert_eq!(backup.snapshot().unwrap(), before);
    }

    #[test]
    fn malformed_payload_leaves_state_untouched() {
        let (backup, _store) = seeded();
        let before = backup.snapshot().unwrap();
        let err = backup.import_snapshot("{ definitely not json").unwrap_err();
        assert!(matches!(err, RepositoryError::SnapshotParse(_)));
        assert_eq!(backup.snapshot().unwrap(), before);
    }

    #[test]
    fn absent_collections_import_as_empty_without_failing() {
        let (backup, _store) = seeded();
        backup.import_snapshot(r#"{"flocks": []}"#).unwrap();
        let after = backup.snapshot().unwrap();
        assert!(after.flocks.is_empty());
        assert!(after.feed.is_empty());
        assert!(after.vaccines.is_empty());
    }

    #[test]
    fn null_settings_do_not_clobber_stored_settings() {
        let (backup, store) = seeded();
        let mut settings = AppSettings::default();
        settings.dark_mode = true;
        store.save_settings(&settings).unwrap();

        backup
            .import_snapshot(r#"{"flocks": [], "settings": null}"#)
            .unwrap();
        assert_eq!(store.load_settings().unwrap(), Some(settings));
    }

    /// Remote store backed by a mutexed map, enough to exercise the
    /// pass-through contract.
    #[derive(Default)]
    struct FakeRemote {
        stored: Mutex<Option<CloudBackup>>,
        fail: bool,
    }

    impl RemoteBackupStore for FakeRemote {
        fn upload(&self, backup: &CloudBackup) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("network unreachable");
            }
            *self.stored.lock().unwrap() = Some(backup.clone());
            Ok(())
        }

        fn download(&self, user_id: &str) -> anyhow::Result<Option<CloudBackup>> {
            if self.fail {
                anyhow::bail!("network unreachable");
            }
            Ok(self
                .stored
                .lock()
                .unwrap()
                .clone()
                .filter(|b| b.user_id == user_id))
        }
    }

    #[test]
    fn cloud_round_trip_replaces_local_state() {
        let (backup, _store) = seeded();
        let remote = FakeRemote::default();
        backup.backup_to_remote(&remote, "user-1").unwrap();

        // Wipe locally, then restore.
        backup.import_snapshot("{}").unwrap();
        assert!(backup.snapshot().unwrap().flocks.is_empty());

        assert!(backup.restore_from_remote(&remote, "user-1").unwrap());
        let restored = backup.snapshot().unwrap();
        assert_eq!(restored.flocks.len(), 1);
        assert_eq!(restored.feed.len(), 1);
        assert_eq!(restored.vaccines.len(), 5);

        // Unknown user: nothing to restore.
        assert!(!backup.restore_from_remote(&remote, "user-2").unwrap());
    }

    #[test]
    fn remote_failures_surface_as_errors() {
        let (backup, _store) = seeded();
        let remote = FakeRemote {
            fail: true,
            ..FakeRemote::default()
        };
        assert!(backup.backup_to_remote(&remote, "user-1").is_err());
        assert!(backup.restore_from_remote(&remote, "user-1").is_err());
    }

    #[test]
    fn session_lifecycle() {
        let (backup, _store) = seeded();
        assert!(backup.session().unwrap().is_none());
        let session = serde_json::json!({"userId": "user-1"});
        backup.save_session(&session).unwrap();
        assert_eq!(backup.session().unwrap(), Some(session));
        backup.logout().unwrap();
        assert!(backup.session().unwrap().is_none());
    }

    #[test]
    fn export_to_file_writes_the_backup_document() {
        let (backup, _store) = seeded();
        let dir = tempfile::TempDir::new().unwrap();
        let path = backup.export_to_file(Some(dir.path())).unwrap();
        assert!(path.exists());
        let payload = std::fs::read_to_string(&path).unwrap();
        let reread: Snapshot = serde_json::from_str(&payload).unwrap();
        assert_eq!(reread, backup.snapshot().unwrap());
    }
}
