//! Weekly payroll over site attendance and salary advances.
//!
//! Data only flows one way: attendance and advance entries are aggregated per
//! worker and site, the aggregates become weekly salary logs, and salary logs
//! then move between unpaid and paid. Every operation takes the acting user
//! explicitly, nothing here reads ambient session state.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

mod aggregate;
mod calculator;
mod entries;
mod error;
mod ledger;
mod rate;
mod shift;

pub use aggregate::aggregate_attendance;
pub use calculator::{calculate_weekly_salaries, fits_money_column, round_money, CalculationSummary};
pub use entries::{record_advance, record_attendance, revise_advance, NewAdvance, NewAttendance};
pub use error::PayrollError;
pub use ledger::{set_paid, set_paid_bulk};

/// Salary logs, aggregates and rates are all keyed by a worker on a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairKey {
    pub worker_id: Uuid,
    pub site_id: Uuid,
}

impl PairKey {
    pub fn new(worker_id: Uuid, site_id: Uuid) -> Self {
        Self { worker_id, site_id }
    }
}

/// Restricts aggregation to one site and/or one worker, `None` admits everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    pub site_id: Option<Uuid>,
    pub worker_id: Option<Uuid>,
}

impl Scope {
    pub fn site(site_id: Option<Uuid>) -> Self {
        Self { site_id, worker_id: None }
    }

    pub fn admits(&self, worker_id: Uuid, site_id: Uuid) -> bool {
        self.site_id.is_none_or(|id| id == site_id) && self.worker_id.is_none_or(|id| id == worker_id)
    }
}

/// Inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_admits() {
        let worker = Uuid::new_v4();
        let site = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(Scope::default().admits(worker, site));
        assert!(Scope::site(Some(site)).admits(worker, site));
        assert!(!Scope::site(Some(other)).admits(worker, site));
        assert!(!Scope { site_id: None, worker_id: Some(other) }.admits(worker, site));
    }

    #[test]
    fn test_week_window_is_inclusive() {
        let week = WeekWindow {
            start: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 8).unwrap(),
        };

        assert!(week.contains(week.start));
        assert!(week.contains(week.end));
        assert!(!week.contains(NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()));
        assert!(!week.contains(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
    }
}
