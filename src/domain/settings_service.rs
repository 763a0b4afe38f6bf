//! Settings singleton access: stored overrides merged over documented
//! defaults.

use log::info;
use std::sync::Arc;

use crate::domain::models::AppSettings;
use crate::domain::RepositoryError;
use crate::storage::FarmStore;

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn FarmStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn FarmStore>) -> Self {
        Self { store }
    }

    /// Stored settings, or the documented defaults when the installation
    /// was never configured. Missing fields inside a stored file already
    /// fall back field-by-field at deserialization.
    pub fn get_settings(&self) -> Result<AppSettings, RepositoryError> {
        Ok(self.store.load_settings()?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<(), RepositoryError> {
        self.store.save_settings(settings)?;
        info!("Saved settings (setup={})", settings.is_setup);
        Ok(())
    }
}
