//! Domain layer: models plus the services that own every cross-entity
//! invariant. Services are thin `Clone`-able handles over a shared
//! [`crate::storage::FarmStore`], constructed once and passed to whatever
//! needs them.

pub mod models;

mod errors;

pub mod backup_service;
pub mod flock_service;
pub mod ledger_service;
pub mod report_service;
pub mod settings_service;
pub mod vaccine_service;

pub use backup_service::{BackupService, CloudBackup, RemoteBackupStore, Snapshot};
pub use errors::RepositoryError;
pub use flock_service::{FlockService, NewFlock, OrphanSweep};
pub use ledger_service::LedgerService;
pub use report_service::{DashboardStats, FlockReport, ReportService};
pub use settings_service::SettingsService;
pub use vaccine_service::VaccineService;
