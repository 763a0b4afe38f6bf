//! Flock lifecycle service.
//!
//! Owns the derivations that fire when a flock is created (45-day end
//! date, the five-dose vaccine schedule, the optional initial chick
//! purchase expense) and the cascade that fires when one is deleted.
//! Creation and deletion touch several collections as sequential
//! whole-collection rewrites; a failure partway leaves earlier writes
//! committed, and [`FlockService::sweep_orphans`] is the repair path.

use log::{info, warn};
use std::sync::Arc;

use crate::calendar::BsDate;
use crate::domain::models::{
    Expense, Flock, FlockStatus, Vaccine, VaccineStatus, VACCINE_SCHEDULE,
};
use crate::domain::RepositoryError;
use crate::storage::FarmStore;

/// Standard broiler grow-out length, used to derive a flock's end date.
const GROW_OUT_DAYS: i64 = 45;

/// Fields supplied by the caller when registering a new flock.
#[derive(Debug, Clone)]
pub struct NewFlock {
    pub name: String,
    /// BS date the chicks arrived.
    pub start_date: String,
    pub total_birds: u32,
    pub notes: Option<String>,
    /// Purchase price per chick; when given, an "Initial Chicks Purchase"
    /// expense is recorded alongside the flock.
    pub chick_rate: Option<f64>,
}

/// Counts of dangling records removed by [`FlockService::sweep_orphans`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OrphanSweep {
    pub feed: usize,
    pub medicine: usize,
    pub expenses: usize,
    pub mortality: usize,
    pub sales: usize,
    pub gallery: usize,
    pub vaccines: usize,
}

impl OrphanSweep {
    pub fn total(&self) -> usize {
        self.feed
            + self.medicine
            + self.expenses
            + self.mortality
            + self.sales
            + self.gallery
            + self.vaccines
    }
}

#[derive(Clone)]
pub struct FlockService {
    store: Arc<dyn FarmStore>,
}

impl FlockService {
    pub fn new(store: Arc<dyn FarmStore>) -> Self {
        Self { store }
    }

    /// Register a flock and synthesize its derived records: the vaccine
    /// schedule at day offsets 1/7/14/21/28 and, when a chick rate is
    /// supplied, the initial purchase expense.
    ///
    /// The start date must be a valid BS date, since the derived
    /// schedule is meaningless otherwise.
    pub fn create_flock(&self, new_flock: NewFlock) -> Result<Flock, RepositoryError> {
        if new_flock.total_birds == 0 {
            return Err(RepositoryError::InvalidRecord(
                "a flock needs at least one bird".into(),
            ));
        }
        let start: BsDate = new_flock.start_date.parse()?;
        let end = start.add_days(GROW_OUT_DAYS)?;

        let flock = Flock {
            id: Flock::generate_id(),
            name: new_flock.name.trim().to_string(),
            start_date: start.to_string(),
            end_date: Some(end.to_string()),
            total_birds: new_flock.total_birds,
            status: FlockStatus::Active,
            notes: new_flock.notes,
        };

        let mut flocks = self.store.load_flocks()?;
        flocks.push(flock.clone());
        self.store.save_flocks(&flocks)?;
        info!(
            "Created flock '{}' ({}) with {} birds starting {}",
            flock.name, flock.id, flock.total_birds, flock.start_date
        );

        let mut vaccines = self.store.load_vaccines()?;
        for (offset, name) in VACCINE_SCHEDULE {
            vaccines.push(Vaccine {
                id: Vaccine::generate_id(),
                flock_id: flock.id.clone(),
                name: name.to_string(),
                scheduled_date: start.add_days(offset)?.to_string(),
                status: VaccineStatus::Pending,
                notes: None,
            });
        }
        self.store.save_vaccines(&vaccines)?;
        info!(
            "Scheduled {} vaccine doses for flock {}",
            VACCINE_SCHEDULE.len(),
            flock.id
        );

        if let Some(rate) = new_flock.chick_rate {
            let mut expenses = self.store.load_expenses()?;
            expenses.push(Expense {
                id: Expense::generate_id(),
                flock_id: flock.id.clone(),
                date: flock.start_date.clone(),
                name: "Initial Chicks Purchase".to_string(),
                quantity: f64::from(flock.total_birds),
                rate,
                total: f64::from(flock.total_birds) * rate,
            });
            self.store.save_expenses(&expenses)?;
            info!("Recorded initial chick purchase for flock {}", flock.id);
        }

        Ok(flock)
    }

    /// All flocks in insertion order.
    pub fn list_flocks(&self) -> Result<Vec<Flock>, RepositoryError> {
        Ok(self.store.load_flocks()?)
    }

    pub fn get_flock(&self, id: &str) -> Result<Option<Flock>, RepositoryError> {
        Ok(self.store.load_flocks()?.into_iter().find(|f| f.id == id))
    }

    /// Replace the flock matching `flock.id`; a no-op if it is gone.
    pub fn update_flock(&self, flock: Flock) -> Result<(), RepositoryError> {
        let mut flocks = self.store.load_flocks()?;
        match flocks.iter().position(|f| f.id == flock.id) {
            Some(pos) => {
                flocks[pos] = flock;
                self.store.save_flocks(&flocks)?;
            }
            None => warn!("Ignoring update for unknown flock {}", flock.id),
        }
        Ok(())
    }

    /// Delete a flock and every dependent record across all child
    /// collections. Records of other flocks are untouched.
    pub fn delete_flock(&self, id: &str) -> Result<(), RepositoryError> {
        let mut flocks = self.store.load_flocks()?;
        flocks.retain(|f| f.id != id);
        self.store.save_flocks(&flocks)?;

        let mut feed = self.store.load_feed()?;
        feed.retain(|r| r.flock_id != id);
        self.store.save_feed(&feed)?;

        let mut medicine = self.store.load_medicine()?;
        medicine.retain(|r| r.flock_id != id);
        self.store.save_medicine(&medicine)?;

        let mut expenses = self.store.load_expenses()?;
        expenses.retain(|r| r.flock_id != id);
        self.store.save_expenses(&expenses)?;

        let mut mortality = self.store.load_mortality()?;
        mortality.retain(|r| r.flock_id != id);
        self.store.save_mortality(&mortality)?;

        let mut sales = self.store.load_sales()?;
        sales.retain(|r| r.flock_id != id);
        self.store.save_sales(&sales)?;

        let mut gallery = self.store.load_gallery()?;
        gallery.retain(|r| r.flock_id != id);
        self.store.save_gallery(&gallery)?;

        let mut vaccines = self.store.load_vaccines()?;
        vaccines.retain(|r| r.flock_id != id);
        self.store.save_vaccines(&vaccines)?;

        info!("Deleted flock {} and its dependent records", id);
        Ok(())
    }

    /// Remove records in every child collection whose flock no longer
    /// exists. This is the repair path for a cascade interrupted partway.
    pub fn sweep_orphans(&self) -> Result<OrphanSweep, RepositoryError> {
        let flocks = self.store.load_flocks()?;
        let known: Vec<&str> = flocks.iter().map(|f| f.id.as_str()).collect();
        let mut sweep = OrphanSweep::default();

        let mut feed = self.store.load_feed()?;
        let before = feed.len();
        feed.retain(|r| known.contains(&r.flock_id.as_str()));
        if feed.len() != before {
            sweep.feed = before - feed.len();
            self.store.save_feed(&feed)?;
        }

        let mut medicine = self.store.load_medicine()?;
        let before = medicine.len();
        medicine.retain(|r| known.contains(&r.flock_id.as_str()));
        if medicine.len() != before {
            sweep.medicine = before - medicine.len();
            self.store.save_medicine(&medicine)?;
        }

        let mut expenses = self.store.load_expenses()?;
        let before = expenses.len();
        expenses.retain(|r| known.contains(&r.flock_id.as_str()));
        if expenses.len() != before {
            sweep.expenses = before - expenses.len();
            self.store.save_expenses(&expenses)?;
        }

        let mut mortality = self.store.load_mortality()?;
        let before = mortality.len();
        mortality.retain(|r| known.contains(&r.flock_id.as_str()));
        if mortality.len() != before {
            sweep.mortality = before - mortality.len();
            self.store.save_mortality(&mortality)?;
        }

        let mut sales = self.store.load_sales()?;
        let before = sales.len();
        sales.retain(|r| known.contains(&r.flock_id.as_str()));
        if sales.len() != before {
            sweep.sales = before - sales.len();
            self.store.save_sales(&sales)?;
        }

        let mut gallery = self.store.load_gallery()?;
        let before = gallery.len();
        gallery.retain(|r| known.contains(&r.flock_id.as_str()));
        if gallery.len() != before {
            sweep.gallery = before - gallery.len();
            self.store.save_gallery(&gallery)?;
        }

        let mut vaccines = self.store.load_vaccines()?;
        let before = vaccines.len();
        vaccines.retain(|r| known.contains(&r.flock_id.as_str()));
        if vaccines.len() != before {
            sweep.vaccines = before - vaccines.len();
            self.store.save_vaccines(&vaccines)?;
        }

        if sweep.total() > 0 {
            warn!("Swept {} orphaned records", sweep.total());
        }
        Ok(sweep)
    }

    /// Days since the flock's start date, 0 when the date is unreadable.
    pub fn flock_age_days(&self, flock: &Flock) -> i64 {
        crate::calendar::days_between_str(&flock.start_date, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Feed, FeedType, GalleryItem, Medicine, Mortality, Sale};
    use crate::storage::MemoryStore;

    fn service() -> FlockService {
        FlockService::new(Arc::new(MemoryStore::new()))
    }

    fn new_flock(start_date: &str, chick_rate: Option<f64>) -> NewFlock {
        NewFlock {
            name: "Batch A".into(),
            start_date: start_date.into(),
            total_birds: 500,
            notes: None,
            chick_rate,
        }
    }

    #[test]
    fn create_derives_end_date_45_days_out() {
        let service = service();
        let flock = service.create_flock(new_flock("2081-01-01", None)).unwrap();
        assert_eq!(flock.start_date, "2081-01-01");
        assert_eq!(flock.end_date.as_deref(), Some("2081-02-15"));
        assert_eq!(flock.status, FlockStatus::Active);
    }

    #[test]
    fn create_generates_the_five_dose_schedule() {
        let service = service();
        let flock = service.create_flock(new_flock("2081-01-01", None)).unwrap();

        let vaccines = service.store.load_vaccines().unwrap();
        assert_eq!(vaccines.len(), 5);
        let expected: Vec<(String, &str)> = VACCINE_SCHEDULE
            .iter()
            .map(|(offset, name)| {
                let date = crate::calendar::add_days_str("2081-01-01", *offset);
                (date, *name)
            })
            .collect();
        for (vaccine, (date, name)) in vaccines.iter().zip(expected) {
            assert_eq!(vaccine.flock_id, flock.id);
            assert_eq!(vaccine.scheduled_date, date);
            assert_eq!(vaccine.name, name);
            assert_eq!(vaccine.status, VaccineStatus::Pending);
        }
        // Day 1, 7, 14, 21, 28 offsets within Baisakh 2081 (31 days).
        assert_eq!(vaccines[0].scheduled_date, "2081-01-02");
        assert_eq!(vaccines[4].scheduled_date, "2081-01-29");
    }

    #[test]
    fn create_records_initial_expense_when_rate_given() {
        let service = service();
        let flock = service
            .create_flock(new_flock("2081-01-01", Some(55.0)))
            .unwrap();

        let expenses = service.store.load_expenses().unwrap();
        assert_eq!(expenses.len(), 1);
        let expense = &expenses[0];
        assert_eq!(expense.flock_id, flock.id);
        assert_eq!(expense.name, "Initial Chicks Purchase");
        assert_eq!(expense.quantity, 500.0);
        assert_eq!(expense.rate, 55.0);
        assert_eq!(expense.total, 500.0 * 55.0);
        assert_eq!(expense.date, flock.start_date);
    }

    #[test]
    fn create_skips_expense_without_rate() {
        let service = service();
        service.create_flock(new_flock("2081-01-01", None)).unwrap();
        assert!(service.store.load_expenses().unwrap().is_empty());
    }

    #[test]
    fn create_rejects_bad_input() {
        let service = service();
        assert!(matches!(
            service.create_flock(new_flock("not-a-date", None)),
            Err(RepositoryError::Calendar(_))
        ));
        let mut zero_birds = new_flock("2081-01-01", None);
        zero_birds.total_birds = 0;
        assert!(matches!(
            service.create_flock(zero_birds),
            Err(RepositoryError::InvalidRecord(_))
        ));
        assert!(service.store.load_flocks().unwrap().is_empty());
        assert!(service.store.load_vaccines().unwrap().is_empty());
    }

    #[test]
    fn update_replaces_matching_flock_only() {
        let service = service();
        let mut flock = service.create_flock(new_flock("2081-01-01", None)).unwrap();
        flock.status = FlockStatus::Closed;
        service.update_flock(flock.clone()).unwrap();
        assert_eq!(
            service.get_flock(&flock.id).unwrap().unwrap().status,
            FlockStatus::Closed
        );

        // Updating a vanished flock is a quiet no-op.
        let mut ghost = flock.clone();
        ghost.id = "flock-ghost".into();
        service.update_flock(ghost).unwrap();
        assert_eq!(service.list_flocks().unwrap().len(), 1);
    }

    fn seed_children(service: &FlockService, flock_id: &str) {
        let store = &service.store;
        let mut feed = store.load_feed().unwrap();
        feed.push(Feed {
            id: format!("feed-{flock_id}"),
            flock_id: flock_id.into(),
            bill_no: format!("B-{flock_id}"),
            date: "2081-01-05".into(),
            feed_type: FeedType::B0,
            quantity: 4.0,
            rate: 3000.0,
            total: 12000.0,
        });
        store.save_feed(&feed).unwrap();

        let mut medicine = store.load_medicine().unwrap();
        medicine.push(Medicine {
            id: format!("med-{flock_id}"),
            flock_id: flock_id.into(),
            date: "2081-01-06".into(),
            name: "Electrolyte".into(),
            quantity: 2.0,
            rate: 150.0,
            total: 300.0,
        });
        store.save_medicine(&medicine).unwrap();

        let mut mortality = store.load_mortality().unwrap();
        mortality.push(Mortality {
            id: format!("mort-{flock_id}"),
            flock_id: flock_id.into(),
            date: "2081-01-07".into(),
            count: 2,
            remarks: None,
        });
        store.save_mortality(&mortality).unwrap();

        let mut sales = store.load_sales().unwrap();
        sales.push(Sale {
            id: format!("sale-{flock_id}"),
            flock_id: flock_id.into(),
            date: "2081-02-10".into(),
            quantity: 50,
            weight_kg: 110.0,
            rate: 400.0,
            total: 44000.0,
        });
        store.save_sales(&sales).unwrap();

        let mut gallery = store.load_gallery().unwrap();
        gallery.push(GalleryItem {
            id: GalleryItem::generate_id(),
            flock_id: flock_id.into(),
            image_data: "aGVsbG8=".into(),
            date: "2081-01-08".into(),
            caption: None,
        });
        store.save_gallery(&gallery).unwrap();
    }

    #[test]
    fn delete_cascades_across_every_collection() {
        let service = service();
        let doomed = service
            .create_flock(new_flock("2081-01-01", Some(50.0)))
            .unwrap();
        let kept = service.create_flock(new_flock("2081-01-15", None)).unwrap();
        seed_children(&service, &doomed.id);
        seed_children(&service, &kept.id);

        service.delete_flock(&doomed.id).unwrap();

        assert!(service.get_flock(&doomed.id).unwrap().is_none());
        assert!(service.get_flock(&kept.id).unwrap().is_some());

        let store = &service.store;
        assert!(store.load_feed().unwrap().iter().all(|r| r.flock_id == kept.id));
        assert!(store
            .load_medicine()
            .unwrap()
            .iter()
            .all(|r| r.flock_id == kept.id));
        assert!(store
            .load_expenses()
            .unwrap()
            .iter()
            .all(|r| r.flock_id == kept.id));
        assert!(store
            .load_mortality()
            .unwrap()
            .iter()
            .all(|r| r.flock_id == kept.id));
        assert!(store.load_sales().unwrap().iter().all(|r| r.flock_id == kept.id));
        assert!(store
            .load_gallery()
            .unwrap()
            .iter()
            .all(|r| r.flock_id == kept.id));
        assert!(store
            .load_vaccines()
            .unwrap()
            .iter()
            .all(|r| r.flock_id == kept.id));
        // The kept flock still has its full complement.
        assert_eq!(store.load_vaccines().unwrap().len(), 5);
        assert_eq!(store.load_feed().unwrap().len(), 1);
    }

    #[test]
    fn sweep_removes_only_orphans() {
        let service = service();
        let flock = service.create_flock(new_flock("2081-01-01", None)).unwrap();
        seed_children(&service, &flock.id);
        seed_children(&service, "flock-gone");

        let sweep = service.sweep_orphans().unwrap();
        assert_eq!(sweep.feed, 1);
        assert_eq!(sweep.medicine, 1);
        assert_eq!(sweep.mortality, 1);
        assert_eq!(sweep.sales, 1);
        assert_eq!(sweep.gallery, 1);
        assert_eq!(sweep.vaccines, 0);
        assert_eq!(sweep.total(), 5);

        // Nothing left to sweep on a second pass.
        assert_eq!(service.sweep_orphans().unwrap().total(), 0);
        assert_eq!(service.store.load_feed().unwrap().len(), 1);
    }
}
