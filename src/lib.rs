//! # poultry-ledger
//!
//! Offline-first record keeping for broiler poultry operations, tracked on
//! the Bikram Sambat (BS) calendar: flocks, feed purchases, medicine,
//! expenses, mortality, sales, a photo log, and an auto-generated vaccine
//! schedule per flock.
//!
//! The crate is the storage-and-rules core of the application. A UI layer
//! calls the domain services; the services enforce every cross-entity
//! invariant (farm-wide unique feed bill numbers, mortality capped by
//! initial stock, cascade delete) over an injectable [`storage::FarmStore`]
//! backend. The [`calendar`] module isolates everyone else from BS date
//! arithmetic, which is table-driven rather than formulaic.
//!
//! ```
//! use std::sync::Arc;
//! use poultry_ledger::domain::{FlockService, NewFlock, VaccineService};
//! use poultry_ledger::storage::{FarmStore, MemoryStore};
//!
//! let store: Arc<dyn FarmStore> = Arc::new(MemoryStore::new());
//! let flocks = FlockService::new(store.clone());
//!
//! let flock = flocks.create_flock(NewFlock {
//!     name: "Batch A".into(),
//!     start_date: "2081-01-01".into(),
//!     total_birds: 500,
//!     notes: None,
//!     chick_rate: Some(55.0),
//! }).expect("valid flock");
//! assert_eq!(flock.end_date.as_deref(), Some("2081-02-15"));
//!
//! // Five vaccine doses were scheduled alongside the flock.
//! let vaccines = VaccineService::new(store.clone());
//! assert_eq!(vaccines.list_vaccines(Some(flock.id.as_str())).unwrap().len(), 5);
//! ```

pub mod calendar;
pub mod domain;
pub mod storage;

pub use calendar::{BsDate, CalendarError};
pub use domain::{
    BackupService, FlockService, LedgerService, NewFlock, ReportService, RepositoryError,
    SettingsService, VaccineService,
};
pub use storage::{FarmStore, JsonFileStore, MemoryStore};
