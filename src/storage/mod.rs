//! Storage abstraction for the farm ledger.
//!
//! The domain layer works against the [`FarmStore`] trait so storage
//! backends are interchangeable: a JSON-file store for the device and an
//! in-memory store for tests and embedding. The unit of persistence is a
//! whole collection: every write replaces one collection's full list,
//! which is also the extent of the store's atomicity.

pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::Result;
use serde_json::Value;

use crate::domain::models::{
    AppSettings, Expense, Feed, Flock, GalleryItem, Medicine, Mortality, Sale, Vaccine,
};

/// Whole-collection persistence for every record kind, plus the settings
/// singleton and the opaque user-session blob.
///
/// `load_*` returns the full collection (empty if never written);
/// `save_*` replaces it. Read-modify-write sequencing is the caller's job;
/// the store assumes a single writer (one app instance, one device).
pub trait FarmStore: Send + Sync {
    fn load_flocks(&self) -> Result<Vec<Flock>>;
    fn save_flocks(&self, flocks: &[Flock]) -> Result<()>;

    fn load_feed(&self) -> Result<Vec<Feed>>;
    fn save_feed(&self, feed: &[Feed]) -> Result<()>;

    fn load_medicine(&self) -> Result<Vec<Medicine>>;
    fn save_medicine(&self, medicine: &[Medicine]) -> Result<()>;

    fn load_expenses(&self) -> Result<Vec<Expense>>;
    fn save_expenses(&self, expenses: &[Expense]) -> Result<()>;

    fn load_mortality(&self) -> Result<Vec<Mortality>>;
    fn save_mortality(&self, mortality: &[Mortality]) -> Result<()>;

    fn load_sales(&self) -> Result<Vec<Sale>>;
    fn save_sales(&self, sales: &[Sale]) -> Result<()>;

    fn load_gallery(&self) -> Result<Vec<GalleryItem>>;
    fn save_gallery(&self, gallery: &[GalleryItem]) -> Result<()>;

    fn load_vaccines(&self) -> Result<Vec<Vaccine>>;
    fn save_vaccines(&self, vaccines: &[Vaccine]) -> Result<()>;

    /// `None` when the installation was never configured; callers merge
    /// defaults on top.
    fn load_settings(&self) -> Result<Option<AppSettings>>;
    fn save_settings(&self, settings: &AppSettings) -> Result<()>;

    /// Opaque authentication session owned by the cloud collaborator.
    fn load_session(&self) -> Result<Option<Value>>;
    fn save_session(&self, session: &Value) -> Result<()>;
    fn clear_session(&self) -> Result<()>;
}
