//! Day-book service for the per-flock record collections: feed purchases,
//! medicine, miscellaneous expenses, mortality, sales, and the photo log.
//!
//! Two invariants live here rather than at call sites: feed bill numbers
//! are unique across the whole farm, and recorded deaths can never exceed
//! a flock's initial stock. Stored `total` fields are denormalized; a
//! mismatch against quantity x rate is tolerated but logged so caller
//! bugs surface early.

use log::{info, warn};
use std::sync::Arc;

use crate::domain::models::{Expense, Feed, GalleryItem, Medicine, Mortality, Sale};
use crate::domain::RepositoryError;
use crate::storage::FarmStore;

/// Tolerance when checking denormalized totals; rates are currency values
/// entered by hand, so exact float equality is too strict.
const TOTAL_DRIFT_EPSILON: f64 = 0.005;

fn warn_on_total_drift(kind: &str, id: &str, stored: f64, expected: f64) {
    if (stored - expected).abs() > TOTAL_DRIFT_EPSILON {
        warn!(
            "{kind} record {id} stores total {stored} but quantity x rate gives {expected}; keeping the stored value"
        );
    }
}

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn FarmStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn FarmStore>) -> Self {
        Self { store }
    }

    // --- Feed ---

    /// All feed purchases, optionally scoped to one flock, in insertion
    /// order.
    pub fn list_feed(&self, flock_id: Option<&str>) -> Result<Vec<Feed>, RepositoryError> {
        let mut feed = self.store.load_feed()?;
        if let Some(flock_id) = flock_id {
            feed.retain(|r| r.flock_id == flock_id);
        }
        Ok(feed)
    }

    /// Record a feed purchase. Fails with
    /// [`RepositoryError::DuplicateBillNumber`] if the bill number exists
    /// anywhere in the feed collection; receipts are farm-wide unique.
    pub fn add_feed(&self, feed: Feed) -> Result<(), RepositoryError> {
        let mut list = self.store.load_feed()?;
        if list.iter().any(|r| r.bill_no == feed.bill_no) {
            return Err(RepositoryError::DuplicateBillNumber(feed.bill_no));
        }
        warn_on_total_drift("feed", &feed.id, feed.total, feed.expected_total());
        info!("Adding feed purchase {} (bill {})", feed.id, feed.bill_no);
        list.push(feed);
        self.store.save_feed(&list)?;
        Ok(())
    }

    /// Replace a feed purchase, re-validating bill uniqueness against
    /// every record but the one being replaced.
    pub fn update_feed(&self, feed: Feed) -> Result<(), RepositoryError> {
        let mut list = self.store.load_feed()?;
        if list
            .iter()
            .any(|r| r.bill_no == feed.bill_no && r.id != feed.id)
        {
            return Err(RepositoryError::DuplicateBillNumber(feed.bill_no));
        }
        warn_on_total_drift("feed", &feed.id, feed.total, feed.expected_total());
        match list.iter().position(|r| r.id == feed.id) {
            Some(pos) => {
                list[pos] = feed;
                self.store.save_feed(&list)?;
            }
            None => warn!("Ignoring update for unknown feed record {}", feed.id),
        }
        Ok(())
    }

    pub fn delete_feed(&self, id: &str) -> Result<(), RepositoryError> {
        let mut list = self.store.load_feed()?;
        list.retain(|r| r.id != id);
        self.store.save_feed(&list)?;
        Ok(())
    }

    // --- Medicine ---

    pub fn list_medicine(
        &self,
        flock_id: Option<&str>,
    ) -> Result<Vec<Medicine>, RepositoryError> {
        let mut list = self.store.load_medicine()?;
        if let Some(flock_id) = flock_id {
            list.retain(|r| r.flock_id == flock_id);
        }
        Ok(list)
    }

    pub fn add_medicine(&self, medicine: Medicine) -> Result<(), RepositoryError> {
        warn_on_total_drift(
            "medicine",
            &medicine.id,
            medicine.total,
            medicine.expected_total(),
        );
        let mut list = self.store.load_medicine()?;
        list.push(medicine);
        self.store.save_medicine(&list)?;
        Ok(())
    }

    pub fn update_medicine(&self, medicine: Medicine) -> Result<(), RepositoryError> {
        warn_on_total_drift(
            "medicine",
            &medicine.id,
            medicine.total,
            medicine.expected_total(),
        );
        let mut list = self.store.load_medicine()?;
        match list.iter().position(|r| r.id == medicine.id) {
            Some(pos) => {
                list[pos] = medicine;
                self.store.save_medicine(&list)?;
            }
            None => warn!("Ignoring update for unknown medicine record {}", medicine.id),
        }
        Ok(())
    }

    pub fn delete_medicine(&self, id: &str) -> Result<(), RepositoryError> {
        let mut list = self.store.load_medicine()?;
        list.retain(|r| r.id != id);
        self.store.save_medicine(&list)?;
        Ok(())
    }

    // --- Expenses ---

    pub fn list_expenses(
        &self,
        flock_id: Option<&str>,
    ) -> Result<Vec<Expense>, RepositoryError> {
        let mut list = self.store.load_expenses()?;
        if let Some(flock_id) = flock_id {
            list.retain(|r| r.flock_id == flock_id);
        }
        Ok(list)
    }

    pub fn add_expense(&self, expense: Expense) -> Result<(), RepositoryError> {
        warn_on_total_drift(
            "expense",
            &expense.id,
            expense.total,
            expense.expected_total(),
        );
        let mut list = self.store.load_expenses()?;
        list.push(expense);
        self.store.save_expenses(&list)?;
        Ok(())
    }

    pub fn update_expense(&self, expense: Expense) -> Result<(), RepositoryError> {
        warn_on_total_drift(
            "expense",
            &expense.id,
            expense.total,
            expense.expected_total(),
        );
        let mut list = self.store.load_expenses()?;
        match list.iter().position(|r| r.id == expense.id) {
            Some(pos) => {
                list[pos] = expense;
                self.store.save_expenses(&list)?;
            }
            None => warn!("Ignoring update for unknown expense record {}", expense.id),
        }
        Ok(())
    }

    pub fn delete_expense(&self, id: &str) -> Result<(), RepositoryError> {
        let mut list = self.store.load_expenses()?;
        list.retain(|r| r.id != id);
        self.store.save_expenses(&list)?;
        Ok(())
    }

    // --- Mortality ---

    pub fn list_mortality(
        &self,
        flock_id: Option<&str>,
    ) -> Result<Vec<Mortality>, RepositoryError> {
        let mut list = self.store.load_mortality()?;
        if let Some(flock_id) = flock_id {
            list.retain(|r| r.flock_id == flock_id);
        }
        Ok(list)
    }

    /// Record bird deaths. The running death total for the flock can never
    /// exceed its initial stock; that cap is enforced here, not left to
    /// whichever form happens to submit the record.
    pub fn add_mortality(&self, mortality: Mortality) -> Result<(), RepositoryError> {
        if mortality.count == 0 {
            return Err(RepositoryError::InvalidRecord(
                "mortality count must be at least 1".into(),
            ));
        }
        let remaining = self.remaining_capacity(&mortality.flock_id, None)?;
        if mortality.count > remaining {
            return Err(RepositoryError::MortalityExceedsStock {
                requested: mortality.count,
                remaining,
            });
        }
        info!(
            "Recording {} deaths for flock {}",
            mortality.count, mortality.flock_id
        );
        let mut list = self.store.load_mortality()?;
        list.push(mortality);
        self.store.save_mortality(&list)?;
        Ok(())
    }

    /// Replace a mortality entry, re-checking the cap with the old entry
    /// excluded from the running total.
    pub fn update_mortality(&self, mortality: Mortality) -> Result<(), RepositoryError> {
        if mortality.count == 0 {
            return Err(RepositoryError::InvalidRecord(
                "mortality count must be at least 1".into(),
            ));
        }
        let remaining =
            self.remaining_capacity(&mortality.flock_id, Some(mortality.id.as_str()))?;
        if mortality.count > remaining {
            return Err(RepositoryError::MortalityExceedsStock {
                requested: mortality.count,
                remaining,
            });
        }
        let mut list = self.store.load_mortality()?;
        match list.iter().position(|r| r.id == mortality.id) {
            Some(pos) => {
                list[pos] = mortality;
                self.store.save_mortality(&list)?;
            }
            None => warn!(
                "Ignoring update for unknown mortality record {}",
                mortality.id
            ),
        }
        Ok(())
    }

    pub fn delete_mortality(&self, id: &str) -> Result<(), RepositoryError> {
        let mut list = self.store.load_mortality()?;
        list.retain(|r| r.id != id);
        self.store.save_mortality(&list)?;
        Ok(())
    }

    /// Birds not yet recorded dead, excluding `skip_record` from the
    /// running total (used when replacing an entry).
    fn remaining_capacity(
        &self,
        flock_id: &str,
        skip_record: Option<&str>,
    ) -> Result<u32, RepositoryError> {
        let flock = self
            .store
            .load_flocks()?
            .into_iter()
            .find(|f| f.id == flock_id)
            .ok_or_else(|| RepositoryError::UnknownFlock(flock_id.to_string()))?;
        let recorded: u32 = self
            .store
            .load_mortality()?
            .iter()
            .filter(|r| r.flock_id == flock_id && Some(r.id.as_str()) != skip_record)
            .map(|r| r.count)
            .sum();
        Ok(flock.total_birds.saturating_sub(recorded))
    }

    // --- Sales ---

    pub fn list_sales(&self, flock_id: Option<&str>) -> Result<Vec<Sale>, RepositoryError> {
        let mut list = self.store.load_sales()?;
        if let Some(flock_id) = flock_id {
            list.retain(|r| r.flock_id == flock_id);
        }
        Ok(list)
    }

    pub fn add_sale(&self, sale: Sale) -> Result<(), RepositoryError> {
        warn_on_total_drift("sale", &sale.id, sale.total, sale.expected_total());
        let mut list = self.store.load_sales()?;
        list.push(sale);
        self.store.save_sales(&list)?;
        Ok(())
    }

    pub fn update_sale(&self, sale: Sale) -> Result<(), RepositoryError> {
        warn_on_total_drift("sale", &sale.id, sale.total, sale.expected_total());
        let mut list = self.store.load_sales()?;
        match list.iter().position(|r| r.id == sale.id) {
            Some(pos) => {
                list[pos] = sale;
                self.store.save_sales(&list)?;
            }
            None => warn!("Ignoring update for unknown sale record {}", sale.id),
        }
        Ok(())
    }

    pub fn delete_sale(&self, id: &str) -> Result<(), RepositoryError> {
        let mut list = self.store.load_sales()?;
        list.retain(|r| r.id != id);
        self.store.save_sales(&list)?;
        Ok(())
    }

    // --- Gallery ---

    pub fn list_gallery(
        &self,
        flock_id: Option<&str>,
    ) -> Result<Vec<GalleryItem>, RepositoryError> {
        let mut list = self.store.load_gallery()?;
        if let Some(flock_id) = flock_id {
            list.retain(|r| r.flock_id == flock_id);
        }
        Ok(list)
    }

    pub fn add_gallery_item(&self, item: GalleryItem) -> Result<(), RepositoryError> {
        let mut list = self.store.load_gallery()?;
        list.push(item);
        self.store.save_gallery(&list)?;
        Ok(())
    }

    pub fn update_gallery_item(&self, item: GalleryItem) -> Result<(), RepositoryError> {
        let mut list = self.store.load_gallery()?;
        match list.iter().position(|r| r.id == item.id) {
            Some(pos) => {
                list[pos] = item;
                self.store.save_gallery(&list)?;
            }
            None => warn!("Ignoring update for unknown gallery item {}", item.id),
        }
        Ok(())
    }

    pub fn delete_gallery_item(&self, id: &str) -> Result<(), RepositoryError> {
        let mut list = self.store.load_gallery()?;
        list.retain(|r| r.id != id);
        self.store.save_gallery(&list)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flock_service::{FlockService, NewFlock};
    use crate::domain::models::FeedType;
    use crate::storage::MemoryStore;

    fn services() -> (LedgerService, FlockService) {
        let store: Arc<dyn FarmStore> = Arc::new(MemoryStore::new());
        (
            LedgerService::new(store.clone()),
            FlockService::new(store),
        )
    }

    fn feed(id: &str, flock_id: &str, bill_no: &str) -> Feed {
        Feed {
            id: id.into(),
            flock_id: flock_id.into(),
            bill_no: bill_no.into(),
            date: "2081-01-05".into(),
            feed_type: FeedType::B0,
            quantity: 10.0,
            rate: 3000.0,
            total: 30000.0,
        }
    }

    fn create_flock(flocks: &FlockService, birds: u32) -> String {
        flocks
            .create_flock(NewFlock {
                name: "Batch".into(),
                start_date: "2081-01-01".into(),
                total_birds: birds,
                notes: None,
                chick_rate: None,
            })
            .unwrap()
            .id
    }

    #[test]
    fn duplicate_bill_numbers_are_rejected_farm_wide() {
        let (ledger, flocks) = services();
        let flock_a = create_flock(&flocks, 500);
        let flock_b = create_flock(&flocks, 500);

        ledger.add_feed(feed("feed-1", &flock_a, "B-100")).unwrap();
        // Same bill on a different flock still collides.
        let err = ledger
            .add_feed(feed("feed-2", &flock_b, "B-100"))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateBillNumber(b) if b == "B-100"));

        // Deleting the first frees the bill number again.
        ledger.delete_feed("feed-1").unwrap();
        ledger.add_feed(feed("feed-2", &flock_b, "B-100")).unwrap();
        assert_eq!(ledger.list_feed(None).unwrap().len(), 1);
    }

    #[test]
    fn update_feed_excludes_its_own_bill_number() {
        let (ledger, flocks) = services();
        let flock = create_flock(&flocks, 500);
        ledger.add_feed(feed("feed-1", &flock, "B-100")).unwrap();
        ledger.add_feed(feed("feed-2", &flock, "B-200")).unwrap();

        // Keeping its own bill number is fine.
        let mut updated = feed("feed-1", &flock, "B-100");
        updated.quantity = 12.0;
        updated.total = 36000.0;
        ledger.update_feed(updated).unwrap();

        // Taking another record's bill number is not.
        let stolen = feed("feed-1", &flock, "B-200");
        assert!(matches!(
            ledger.update_feed(stolen),
            Err(RepositoryError::DuplicateBillNumber(_))
        ));
        assert_eq!(ledger.list_feed(None).unwrap()[0].quantity, 12.0);
    }

    #[test]
    fn list_feed_filters_by_flock() {
        let (ledger, flocks) = services();
        let flock_a = create_flock(&flocks, 500);
        let flock_b = create_flock(&flocks, 500);
        ledger.add_feed(feed("feed-1", &flock_a, "B-1")).unwrap();
        ledger.add_feed(feed("feed-2", &flock_b, "B-2")).unwrap();
        ledger.add_feed(feed("feed-3", &flock_a, "B-3")).unwrap();

        let scoped = ledger.list_feed(Some(flock_a.as_str())).unwrap();
        assert_eq!(scoped.len(), 2);
        assert!(scoped.iter().all(|r| r.flock_id == flock_a));
        assert_eq!(ledger.list_feed(None).unwrap().len(), 3);
    }

    fn mortality(id: &str, flock_id: &str, count: u32) -> Mortality {
        Mortality {
            id: id.into(),
            flock_id: flock_id.into(),
            date: "2081-01-10".into(),
            count,
            remarks: None,
        }
    }

    #[test]
    fn mortality_cannot_exceed_initial_stock() {
        let (ledger, flocks) = services();
        let flock = create_flock(&flocks, 10);

        ledger.add_mortality(mortality("mort-1", &flock, 6)).unwrap();
        let err = ledger
            .add_mortality(mortality("mort-2", &flock, 5))
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::MortalityExceedsStock {
                requested: 5,
                remaining: 4
            }
        ));
        ledger.add_mortality(mortality("mort-2", &flock, 4)).unwrap();
        assert_eq!(
            ledger.list_mortality(Some(flock.as_str())).unwrap().len(),
            2
        );
    }

    #[test]
    fn mortality_update_excludes_its_own_count() {
        let (ledger, flocks) = services();
        let flock = create_flock(&flocks, 10);
        ledger.add_mortality(mortality("mort-1", &flock, 6)).unwrap();

        // Raising 6 -> 10 is allowed because the old 6 no longer counts.
        ledger
            .update_mortality(mortality("mort-1", &flock, 10))
            .unwrap();
        // 11 exceeds the stock.
        assert!(matches!(
            ledger.update_mortality(mortality("mort-1", &flock, 11)),
            Err(RepositoryError::MortalityExceedsStock { .. })
        ));
    }

    #[test]
    fn mortality_rejects_unknown_flock_and_zero_count() {
        let (ledger, _flocks) = services();
        assert!(matches!(
            ledger.add_mortality(mortality("mort-1", "flock-ghost", 1)),
            Err(RepositoryError::UnknownFlock(_))
        ));
        let (ledger, flocks) = services();
        let flock = create_flock(&flocks, 10);
        assert!(matches!(
            ledger.add_mortality(mortality("mort-1", &flock, 0)),
            Err(RepositoryError::InvalidRecord(_))
        ));
    }

    #[test]
    fn deletes_are_idempotent() {
        let (ledger, flocks) = services();
        let flock = create_flock(&flocks, 500);
        ledger.add_feed(feed("feed-1", &flock, "B-1")).unwrap();
        ledger.delete_feed("feed-1").unwrap();
        ledger.delete_feed("feed-1").unwrap();
        ledger.delete_medicine("nope").unwrap();
        ledger.delete_gallery_item("nope").unwrap();
        assert!(ledger.list_feed(None).unwrap().is_empty());
    }

    #[test]
    fn gallery_round_trip() {
        let (ledger, flocks) = services();
        let flock = create_flock(&flocks, 500);
        let item = GalleryItem {
            id: GalleryItem::generate_id(),
            flock_id: flock.clone(),
            image_data: "aGVsbG8=".into(),
            date: "2081-01-08".into(),
            caption: Some("Day 7".into()),
        };
        ledger.add_gallery_item(item.clone()).unwrap();
        assert_eq!(
            ledger.list_gallery(Some(flock.as_str())).unwrap(),
            vec![item.clone()]
        );

        let mut recaptioned = item.clone();
        recaptioned.caption = Some("Day 8".into());
        ledger.update_gallery_item(recaptioned.clone()).unwrap();
        assert_eq!(ledger.list_gallery(None).unwrap(), vec![recaptioned]);

        ledger.delete_gallery_item(&item.id).unwrap();
        assert!(ledger.list_gallery(None).unwrap().is_empty());
    }
}
