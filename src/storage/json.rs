//! # JSON file store
//!
//! Production [`FarmStore`] backend: one JSON array file per collection
//! under a data directory, the settings singleton as `settings.yaml`, and
//! the user session as `session.json`.
//!
//! ## File layout
//!
//! ```text
//! data/
//! ├── flocks.json
//! ├── feed.json
//! ├── medicine.json
//! ├── expenses.json
//! ├── mortality.json
//! ├── sales.json
//! ├── gallery.json
//! ├── vaccines.json
//! ├── settings.yaml
//! └── session.json
//! ```
//!
//! A missing file reads as an empty collection. All writes go through a
//! temp file and rename so a crash never leaves a half-written list.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::FarmStore;
use crate::domain::models::{
    AppSettings, Expense, Feed, Flock, GalleryItem, Medicine, Mortality, Sale, Vaccine,
};

const SETTINGS_FILE: &str = "settings.yaml";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create data directory {:?}", base_dir))?;
        info!("Opened farm data directory at {:?}", base_dir);
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.json"))
    }

    fn read_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.collection_path(name);
        if !path.exists() {
            debug!("Collection file {:?} absent, treating as empty", path);
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read collection file {:?}", path))?;
        let records = serde_json::from_str(&content)
            .with_context(|| format!("collection file {:?} is not a valid record array", path))?;
        Ok(records)
    }

    fn write_collection<T: Serialize>(&self, name: &str, records: &[T]) -> Result<()> {
        let path = self.collection_path(name);
        let content = serde_json::to_string(records)
            .with_context(|| format!("failed to serialize collection '{name}'"))?;
        self.write_atomic(&path, content.as_bytes())?;
        debug!("Wrote {} records to {:?}", records.len(), path);
        Ok(())
    }

    /// Write to a temp file, then rename over the target.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, bytes)
            .with_context(|| format!("failed to write temp file {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("failed to replace {:?}", path))?;
        Ok(())
    }

    fn settings_path(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }

    fn session_path(&self) -> PathBuf {
        self.base_dir.join(SESSION_FILE)
    }
}

impl FarmStore for JsonFileStore {
    fn load_flocks(&self) -> Result<Vec<Flock>> {
        self.read_collection("flocks")
    }

    fn save_flocks(&self, flocks: &[Flock]) -> Result<()> {
        self.write_collection("flocks", flocks)
    }

    fn load_feed(&self) -> Result<Vec<Feed>> {
        self.read_collection("feed")
    }

    fn save_feed(&self, feed: &[Feed]) -> Result<()> {
        self.write_collection("feed", feed)
    }

    fn load_medicine(&self) -> Result<Vec<Medicine>> {
        self.read_collection("medicine")
    }

    fn save_medicine(&self, medicine: &[Medicine]) -> Result<()> {
        self.write_collection("medicine", medicine)
    }

    fn load_expenses(&self) -> Result<Vec<Expense>> {
        self.read_collection("expenses")
    }

    fn save_expenses(&self, expenses: &[Expense]) -> Result<()> {
        self.write_collection("expenses", expenses)
    }

    fn load_mortality(&self) -> Result<Vec<Mortality>> {
        self.read_collection("mortality")
    }

    fn save_mortality(&self, mortality: &[Mortality]) -> Result<()> {
        self.write_collection("mortality", mortality)
    }

    fn load_sales(&self) -> Result<Vec<Sale>> {
        self.read_collection("sales")
    }

    fn save_sales(&self, sales: &[Sale]) -> Result<()> {
        self.write_collection("sales", sales)
    }

    fn load_gallery(&self) -> Result<Vec<GalleryItem>> {
        self.read_collection("gallery")
    }

    fn save_gallery(&self, gallery: &[GalleryItem]) -> Result<()> {
        self.write_collection("gallery", gallery)
    }

    fn load_vaccines(&self) -> Result<Vec<Vaccine>> {
        self.read_collection("vaccines")
    }

    fn save_vaccines(&self, vaccines: &[Vaccine]) -> Result<()> {
        self.write_collection("vaccines", vaccines)
    }

    fn load_settings(&self) -> Result<Option<AppSettings>> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read settings file {:?}", path))?;
        let settings = serde_yaml::from_str(&content)
            .with_context(|| format!("settings file {:?} is not valid", path))?;
        Ok(Some(settings))
    }

    fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let content =
            serde_yaml::to_string(settings).context("failed to serialize settings")?;
        self.write_atomic(&self.settings_path(), content.as_bytes())?;
        debug!("Saved settings to {:?}", self.settings_path());
        Ok(())
    }

    fn load_session(&self) -> Result<Option<Value>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read session file {:?}", path))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("session file {:?} is not valid", path))?;
        Ok(Some(session))
    }

    fn save_session(&self, session: &Value) -> Result<()> {
        let content = serde_json::to_string(session).context("failed to serialize session")?;
        self.write_atomic(&self.session_path(), content.as_bytes())
    }

    fn clear_session(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove session file {:?}", path))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FlockStatus;
    use tempfile::TempDir;

    fn flock(id: &str) -> Flock {
        Flock {
            id: id.into(),
            name: "Batch".into(),
            start_date: "2081-01-01".into(),
            end_date: Some("2081-02-15".into()),
            total_birds: 500,
            status: FlockStatus::Active,
            notes: None,
        }
    }

    #[test]
    fn missing_files_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        assert!(store.load_flocks().unwrap().is_empty());
        assert!(store.load_feed().unwrap().is_empty());
        assert!(store.load_settings().unwrap().is_none());
        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn collections_round_trip_through_files() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let flocks = vec![flock("flock-1"), flock("flock-2")];
        store.save_flocks(&flocks).unwrap();
        assert_eq!(store.load_flocks().unwrap(), flocks);

        // A fresh handle over the same directory sees the same data.
        let reopened = JsonFileStore::new(dir.path()).unwrap();
        assert_eq!(reopened.load_flocks().unwrap(), flocks);
    }

    #[test]
    fn settings_persist_as_yaml() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let mut settings = AppSettings::default();
        settings.dark_mode = true;
        settings.sack_weight_kg = 45.0;
        store.save_settings(&settings).unwrap();

        let loaded = store.load_settings().unwrap().unwrap();
        assert_eq!(loaded, settings);
        assert!(dir.path().join("settings.yaml").exists());
    }

    #[test]
    fn session_can_be_saved_and_cleared() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let session = serde_json::json!({"userId": "u-1", "token": "abc"});
        store.save_session(&session).unwrap();
        assert_eq!(store.load_session().unwrap(), Some(session));

        store.clear_session().unwrap();
        assert!(store.load_session().unwrap().is_none());
        // Clearing twice is a no-op.
        store.clear_session().unwrap();
    }

    #[test]
    fn corrupt_collection_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("flocks.json"), "not json").unwrap();
        assert!(store.load_flocks().is_err());
    }
}
