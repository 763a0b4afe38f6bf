//! Vaccine schedule service.
//!
//! Schedules are synthesized by the flock service at creation; this
//! service covers the follow-up: listing doses, toggling their status,
//! and flagging overdue ones. A dose's scheduled date is computed once
//! and never recomputed here.

use log::warn;
use std::sync::Arc;

use crate::calendar::BsDate;
use crate::domain::models::Vaccine;
use crate::domain::RepositoryError;
use crate::storage::FarmStore;

#[derive(Clone)]
pub struct VaccineService {
    store: Arc<dyn FarmStore>,
}

impl VaccineService {
    pub fn new(store: Arc<dyn FarmStore>) -> Self {
        Self { store }
    }

    /// All doses, optionally scoped to one flock, in insertion order.
    /// Callers wanting schedule order sort by `scheduled_date` (canonical
    /// BS strings sort chronologically).
    pub fn list_vaccines(
        &self,
        flock_id: Option<&str>,
    ) -> Result<Vec<Vaccine>, RepositoryError> {
        let mut list = self.store.load_vaccines()?;
        if let Some(flock_id) = flock_id {
            list.retain(|r| r.flock_id == flock_id);
        }
        Ok(list)
    }

    /// Record a dose outside the standard schedule (the five standard
    /// doses are synthesized when the flock is created).
    pub fn add_vaccine(&self, vaccine: Vaccine) -> Result<(), RepositoryError> {
        let mut list = self.store.load_vaccines()?;
        list.push(vaccine);
        self.store.save_vaccines(&list)?;
        Ok(())
    }

    /// Replace the dose matching `vaccine.id`; a no-op if it is gone.
    pub fn update_vaccine(&self, vaccine: Vaccine) -> Result<(), RepositoryError> {
        let mut list = self.store.load_vaccines()?;
        match list.iter().position(|r| r.id == vaccine.id) {
            Some(pos) => {
                list[pos] = vaccine;
                self.store.save_vaccines(&list)?;
            }
            None => warn!("Ignoring update for unknown vaccine record {}", vaccine.id),
        }
        Ok(())
    }

    pub fn delete_vaccine(&self, id: &str) -> Result<(), RepositoryError> {
        let mut list = self.store.load_vaccines()?;
        list.retain(|r| r.id != id);
        self.store.save_vaccines(&list)?;
        Ok(())
    }

    /// Pending doses for a flock whose scheduled date has passed.
    pub fn overdue_vaccines(&self, flock_id: &str) -> Result<Vec<Vaccine>, RepositoryError> {
        let today = BsDate::today()?;
        let mut list = self.list_vaccines(Some(flock_id))?;
        list.retain(|v| v.is_overdue_on(&today));
        Ok(list)
    }
}
