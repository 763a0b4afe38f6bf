//! In-memory [`FarmStore`] backend.
//!
//! Used by the test suite and by embedders that want the domain layer
//! without touching disk. Interior mutability keeps the trait's `&self`
//! contract; a single mutex is plenty for a single-writer store.

use anyhow::Result;
use serde_json::Value;
use std::sync::Mutex;

use super::FarmStore;
use crate::domain::models::{
    AppSettings, Expense, Feed, Flock, GalleryItem, Medicine, Mortality, Sale, Vaccine,
};

#[derive(Debug, Default)]
struct Collections {
    flocks: Vec<Flock>,
    feed: Vec<Feed>,
    medicine: Vec<Medicine>,
    expenses: Vec<Expense>,
    mortality: Vec<Mortality>,
    sales: Vec<Sale>,
    gallery: Vec<GalleryItem>,
    vaccines: Vec<Vaccine>,
    settings: Option<AppSettings>,
    session: Option<Value>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Collections) -> R) -> R {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            // A poisoned lock only means another test thread panicked
            // mid-write; the data itself is still a plain Vec.
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl FarmStore for MemoryStore {
    fn load_flocks(&self) -> Result<Vec<Flock>> {
        Ok(self.with(|c| c.flocks.clone()))
    }

    fn save_flocks(&self, flocks: &[Flock]) -> Result<()> {
        self.with(|c| c.flocks = flocks.to_vec());
        Ok(())
    }

    fn load_feed(&self) -> Result<Vec<Feed>> {
        Ok(self.with(|c| c.feed.clone()))
    }

    fn save_feed(&self, feed: &[Feed]) -> Result<()> {
        self.with(|c| c.feed = feed.to_vec());
        Ok(())
    }

    fn load_medicine(&self) -> Result<Vec<Medicine>> {
        Ok(self.with(|c| c.medicine.clone()))
    }

    fn save_medicine(&self, medicine: &[Medicine]) -> Result<()> {
        self.with(|c| c.medicine = medicine.to_vec());
        Ok(())
    }

    fn load_expenses(&self) -> Result<Vec<Expense>> {
        Ok(self.with(|c| c.expenses.clone()))
    }

    fn save_expenses(&self, expenses: &[Expense]) -> Result<()> {
        self.with(|c| c.expenses = expenses.to_vec());
        Ok(())
    }

    fn load_mortality(&self) -> Result<Vec<Mortality>> {
        Ok(self.with(|c| c.mortality.clone()))
    }

    fn save_mortality(&self, mortality: &[Mortality]) -> Result<()> {
        self.with(|c| c.mortality = mortality.to_vec());
        Ok(())
    }

    fn load_sales(&self) -> Result<Vec<Sale>> {
        Ok(self.with(|c| c.sales.clone()))
    }

    fn save_sales(&self, sales: &[Sale]) -> Result<()> {
        self.with(|c| c.sales = sales.to_vec());
        Ok(())
    }

    fn load_gallery(&self) -> Result<Vec<GalleryItem>> {
        Ok(self.with(|c| c.gallery.clone()))
    }

    fn save_gallery(&self, gallery: &[GalleryItem]) -> Result<()> {
        self.with(|c| c.gallery = gallery.to_vec());
        Ok(())
    }

    fn load_vaccines(&self) -> Result<Vec<Vaccine>> {
        Ok(self.with(|c| c.vaccines.clone()))
    }

    fn save_vaccines(&self, vaccines: &[Vaccine]) -> Result<()> {
        self.with(|c| c.vaccines = vaccines.to_vec());
        Ok(())
    }

    fn load_settings(&self) -> Result<Option<AppSettings>> {
        Ok(self.with(|c| c.settings.clone()))
    }

    fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        self.with(|c| c.settings = Some(settings.clone()));
        Ok(())
    }

    fn load_session(&self) -> Result<Option<Value>> {
        Ok(self.with(|c| c.session.clone()))
    }

    fn save_session(&self, session: &Value) -> Result<()> {
        self.with(|c| c.session = Some(session.clone()));
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        self.with(|c| c.session = None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FlockStatus;

    #[test]
    fn starts_empty_and_replaces_wholesale() {
        let store = MemoryStore::new();
        assert!(store.load_flocks().unwrap().is_empty());

        let flocks = vec![Flock {
            id: "flock-1".into(),
            name: "Batch".into(),
            start_date: "2081-01-01".into(),
            end_date: None,
            total_birds: 100,
            status: FlockStatus::Active,
            notes: None,
        }];
        store.save_flocks(&flocks).unwrap();
        assert_eq!(store.load_flocks().unwrap(), flocks);

        store.save_flocks(&[]).unwrap();
        assert!(store.load_flocks().unwrap().is_empty());
    }
}
