//! Derived reporting over the stored collections: dashboard stat tiles,
//! per-flock performance reports, and a CSV ledger export. Nothing here
//! is persisted; every number is recomputed from the records.

use anyhow::Context;
use log::info;
use std::sync::Arc;

use crate::calendar;
use crate::domain::settings_service::SettingsService;
use crate::domain::RepositoryError;
use crate::storage::FarmStore;

/// Headline numbers across the whole farm.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Birds alive across active flocks (initial stock minus recorded
    /// deaths and sales).
    pub live_birds: u32,
    /// Deaths recorded today.
    pub mortality_today: u32,
    /// Estimated feed conversion ratio: feed kg consumed over live weight
    /// sold. Zero until something is sold.
    pub fcr: f64,
    /// Sales revenue minus feed, medicine, and other expenses.
    pub profit: f64,
    pub active_flocks: usize,
    pub sales_total: f64,
}

/// Performance summary for one flock.
#[derive(Debug, Clone, PartialEq)]
pub struct FlockReport {
    pub flock_id: String,
    pub name: String,
    pub age_days: i64,
    pub initial_birds: u32,
    pub deaths: u32,
    pub sold_birds: u32,
    pub current_birds: u32,
    pub mortality_pct: f64,
    pub feed_total: f64,
    pub medicine_total: f64,
    pub other_expense_total: f64,
    pub revenue: f64,
    pub profit: f64,
    pub fcr: f64,
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn FarmStore>,
    settings: SettingsService,
}

impl ReportService {
    pub fn new(store: Arc<dyn FarmStore>) -> Self {
        let settings = SettingsService::new(store.clone());
        Self { store, settings }
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats, RepositoryError> {
        let flocks = self.store.load_flocks()?;
        let feed = self.store.load_feed()?;
        let medicine = self.store.load_medicine()?;
        let expenses = self.store.load_expenses()?;
        let mortality = self.store.load_mortality()?;
        let sales = self.store.load_sales()?;
        let sack_weight = self.settings.get_settings()?.sack_weight_kg;

        let mut live_birds: u32 = 0;
        for flock in flocks.iter().filter(|f| f.is_active()) {
            let deaths: u32 = mortality
                .iter()
                .filter(|r| r.flock_id == flock.id)
                .map(|r| r.count)
                .sum();
            let sold: u32 = sales
                .iter()
                .filter(|r| r.flock_id == flock.id)
                .map(|r| r.quantity)
                .sum();
            live_birds += flock.total_birds.saturating_sub(deaths).saturating_sub(sold);
        }

        let today = calendar::current_date_str();
        let mortality_today = mortality
            .iter()
            .filter(|r| !today.is_empty() && r.date == today)
            .map(|r| r.count)
            .sum();

        let feed_kg: f64 = feed.iter().map(|r| r.quantity * sack_weight).sum();
        let sold_weight_kg: f64 = sales.iter().map(|r| r.weight_kg).sum();
        let fcr = if sold_weight_kg > 0.0 {
            feed_kg / sold_weight_kg
        } else {
            0.0
        };

        let costs: f64 = feed.iter().map(|r| r.total).sum::<f64>()
            + medicine.iter().map(|r| r.total).sum::<f64>()
            + expenses.iter().map(|r| r.total).sum::<f64>();
        let sales_total: f64 = sales.iter().map(|r| r.total).sum();

        Ok(DashboardStats {
            live_birds,
            mortality_today,
            fcr,
            profit: sales_total - costs,
            active_flocks: flocks.iter().filter(|f| f.is_active()).count(),
            sales_total,
        })
    }

    pub fn flock_report(&self, flock_id: &str) -> Result<FlockReport, RepositoryError> {
        let flock = self
            .store
            .load_flocks()?
            .into_iter()
            .find(|f| f.id == flock_id)
            .ok_or_else(|| RepositoryError::UnknownFlock(flock_id.to_string()))?;
        let sack_weight = self.settings.get_settings()?.sack_weight_kg;

        let feed: Vec<_> = self
            .store
            .load_feed()?
            .into_iter()
            .filter(|r| r.flock_id == flock_id)
            .collect();
        let medicine_total: f64 = self
            .store
            .load_medicine()?
            .iter()
            .filter(|r| r.flock_id == flock_id)
            .map(|r| r.total)
            .sum();
        let other_expense_total: f64 = self
            .store
            .load_expenses()?
            .iter()
            .filter(|r| r.flock_id == flock_id)
            .map(|r| r.total)
            .sum();
        let deaths: u32 = self
            .store
            .load_mortality()?
            .iter()
            .filter(|r| r.flock_id == flock_id)
            .map(|r| r.count)
            .sum();
        let sales: Vec<_> = self
            .store
            .load_sales()?
            .into_iter()
            .filter(|r| r.flock_id == flock_id)
            .collect();

        let feed_total: f64 = feed.iter().map(|r| r.total).sum();
        let feed_kg: f64 = feed.iter().map(|r| r.quantity * sack_weight).sum();
        let sold_birds: u32 = sales.iter().map(|r| r.quantity).sum();
        let sold_weight_kg: f64 = sales.iter().map(|r| r.weight_kg).sum();
        let revenue: f64 = sales.iter().map(|r| r.total).sum();

        let mortality_pct = if flock.total_birds > 0 {
            f64::from(deaths) / f64::from(flock.total_birds) * 100.0
        } else {
            0.0
        };
        let fcr = if sold_weight_kg > 0.0 {
            feed_kg / sold_weight_kg
        } else {
            0.0
        };

        Ok(FlockReport {
            flock_id: flock.id.clone(),
            name: flock.name.clone(),
            age_days: calendar::days_between_str(&flock.start_date, None),
            initial_birds: flock.total_birds,
            deaths,
            sold_birds,
            current_birds: flock
                .total_birds
                .saturating_sub(deaths)
                .saturating_sub(sold_birds),
            mortality_pct,
            feed_total,
            medicine_total,
            other_expense_total,
            revenue,
            profit: revenue - (feed_total + medicine_total + other_expense_total),
            fcr,
        })
    }

    /// One flock's combined ledger as CSV, rows sorted by date (canonical
    /// BS strings sort chronologically).
    pub fn ledger_csv(&self, flock_id: &str) -> Result<String, RepositoryError> {
        // Fail fast on unknown flocks rather than emitting an empty sheet.
        let flock = self
            .store
            .load_flocks()?
            .into_iter()
            .find(|f| f.id == flock_id)
            .ok_or_else(|| RepositoryError::UnknownFlock(flock_id.to_string()))?;

        // (date, category, description, quantity, rate, amount)
        let mut rows: Vec<(String, String, String, String, String, String)> = Vec::new();

        for r in self.store.load_feed()?.iter().filter(|r| r.flock_id == flock_id) {
            rows.push((
                r.date.clone(),
                "Feed".into(),
                format!("Bill {} ({:?})", r.bill_no, r.feed_type),
                format!("{}", r.quantity),
                format!("{}", r.rate),
                format!("{:.2}", r.total),
            ));
        }
        for r in self
            .store
            .load_medicine()?
            .iter()
            .filter(|r| r.flock_id == flock_id)
        {
            rows.push((
                r.date.clone(),
                "Medicine".into(),
                r.name.clone(),
                format!("{}", r.quantity),
                format!("{}", r.rate),
                format!("{:.2}", r.total),
            ));
        }
        for r in self
            .store
            .load_expenses()?
            .iter()
            .filter(|r| r.flock_id == flock_id)
        {
            rows.push((
                r.date.clone(),
                "Expense".into(),
                r.name.clone(),
                format!("{}", r.quantity),
                format!("{}", r.rate),
                format!("{:.2}", r.total),
            ));
        }
        for r in self
            .store
            .load_mortality()?
            .iter()
            .filter(|r| r.flock_id == flock_id)
        {
            rows.push((
                r.date.clone(),
                "Mortality".into(),
                r.remarks.clone().unwrap_or_default(),
                format!("{}", r.count),
                String::new(),
                String::new(),
            ));
        }
        for r in self.store.load_sales()?.iter().filter(|r| r.flock_id == flock_id) {
            rows.push((
                r.date.clone(),
                "Sale".into(),
                format!("{} birds, {} kg", r.quantity, r.weight_kg),
                format!("{}", r.weight_kg),
                format!("{}", r.rate),
                format!("{:.2}", r.total),
            ));
        }

        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["date", "category", "description", "quantity", "rate", "amount"])
            .context("failed to write csv header")?;
        let row_count = rows.len();
        for (date, category, description, quantity, rate, amount) in rows {
            writer
                .write_record([&date, &category, &description, &quantity, &rate, &amount])
                .context("failed to write csv row")?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to flush csv writer: {e}"))?;
        let content = String::from_utf8(bytes).context("csv output was not utf-8")?;
        info!(
            "Exported ledger for flock '{}' ({} rows)",
            flock.name, row_count
        );
        Ok(content)
    }
}
