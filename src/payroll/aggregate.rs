use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use tracing::warn;

use crate::entity::{advance, attendance, prelude::*};

use super::{PairKey, Scope, WeekWindow};

/// Per worker/site sums, ordered so that downstream writes happen in a stable order
pub type PairTotals = BTreeMap<PairKey, Decimal>;

fn sum_by_pair(amounts: impl IntoIterator<Item = (PairKey, Decimal)>) -> PairTotals {
    amounts.into_iter().fold(PairTotals::new(), |mut totals, (pair, amount)| {
        *totals.entry(pair).or_default() += amount;
        totals
    })
}

/// Sums the stored multiplier of every entry inside `week` and `scope`.
///
/// Several entries for the same worker, site and day all count.
pub fn aggregate_attendance(entries: &[attendance::Model], scope: &Scope, week: &WeekWindow) -> PairTotals {
    sum_by_pair(
        entries.iter()
            .filter(|e| scope.admits(e.worker_id, e.site_id) && week.contains(e.date))
            .map(|e| (PairKey::new(e.worker_id, e.site_id), e.multiplier))
    )
}

/// Sums advance amounts inside `week` and `scope`, amounts were validated on entry
pub fn aggregate_advances(entries: &[advance::Model], scope: &Scope, week: &WeekWindow) -> PairTotals {
    sum_by_pair(
        entries.iter()
            .filter(|e| scope.admits(e.worker_id, e.site_id) && week.contains(e.date))
            .map(|e| (PairKey::new(e.worker_id, e.site_id), e.amount))
    )
}

/// Pairs that carry entries although the worker is not assigned to the site.
///
/// They are still summed; this only reports them.
pub fn orphaned_pairs(totals: &PairTotals, is_assigned: impl Fn(&PairKey) -> bool) -> Vec<PairKey> {
    totals.keys()
        .filter(|pair| !is_assigned(pair))
        .inspect(|pair| warn!(worker_id = %pair.worker_id, site_id = %pair.site_id, "entries found for a worker not assigned to the site"))
        .copied()
        .collect()
}

pub async fn fetch_attendance<C: ConnectionTrait>(
    db: &C,
    scope: &Scope,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<attendance::Model>, DbErr> {
    let mut query = Attendance::find()
        .filter(attendance::Column::Date.between(start, end));

    if let Some(site_id) = scope.site_id {
        query = query.filter(attendance::Column::SiteId.eq(site_id));
    }
    if let Some(worker_id) = scope.worker_id {
        query = query.filter(attendance::Column::WorkerId.eq(worker_id));
    }

    query
        .order_by_asc(attendance::Column::Date)
        .all(db).await
}

pub async fn fetch_advances<C: ConnectionTrait>(
    db: &C,
    scope: &Scope,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<advance::Model>, DbErr> {
    let mut query = Advance::find()
        .filter(advance::Column::Date.between(start, end));

    if let Some(site_id) = scope.site_id {
        query = query.filter(advance::Column::SiteId.eq(site_id));
    }
    if let Some(worker_id) = scope.worker_id {
        query = query.filter(advance::Column::WorkerId.eq(worker_id));
    }

    query
        .order_by_asc(advance::Column::Date)
        .all(db).await
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::entity::sea_orm_active_enums::ShiftType;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    /// Monday 2 June to Sunday 8 June 2025
    fn week() -> WeekWindow {
        WeekWindow { start: day(2), end: day(8) }
    }

    fn entry(worker_id: Uuid, site_id: Uuid, date: NaiveDate, shift_type: ShiftType) -> attendance::Model {
        attendance::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            worker_id,
            site_id,
            date,
            shift_type,
            multiplier: shift_type.multiplier(),
        }
    }

    fn advance(worker_id: Uuid, site_id: Uuid, date: NaiveDate, amount: Decimal) -> advance::Model {
        advance::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            worker_id,
            site_id,
            date,
            amount,
            reason: String::new(),
        }
    }

    #[test]
    fn test_aggregate_attendance_sums_multipliers() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());

        let entries = vec![
            entry(w, s, day(2), ShiftType::FullDay),
            entry(w, s, day(4), ShiftType::HalfDayMorning),
            entry(w, s, day(6), ShiftType::OneAndAHalfDay),
        ];

        let totals = aggregate_attendance(&entries, &Scope::default(), &week());
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&PairKey::new(w, s)], dec!(3.0));
    }

    #[test]
    fn test_aggregate_attendance_ignores_insertion_order() {
        let (w1, w2, s) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let mut entries = vec![
            entry(w1, s, day(2), ShiftType::FullDay),
            entry(w2, s, day(3), ShiftType::HalfDayEvening),
            entry(w1, s, day(3), ShiftType::HalfDayMorning),
            entry(w1, s, day(8), ShiftType::OneAndAHalfDay),
            entry(w2, s, day(5), ShiftType::FullDay),
        ];

        let forward = aggregate_attendance(&entries, &Scope::default(), &week());
        entries.reverse();
        let backward = aggregate_attendance(&entries, &Scope::default(), &week());
        entries.rotate_left(2);
        let rotated = aggregate_attendance(&entries, &Scope::default(), &week());

        assert_eq!(forward, backward);
        assert_eq!(forward, rotated);
        assert_eq!(forward[&PairKey::new(w1, s)], dec!(3.0));
        assert_eq!(forward[&PairKey::new(w2, s)], dec!(1.5));
    }

    #[test]
    fn test_same_day_entries_are_all_counted() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());

        let entries = vec![
            entry(w, s, day(4), ShiftType::HalfDayMorning),
            entry(w, s, day(4), ShiftType::HalfDayEvening),
            entry(w, s, day(4), ShiftType::FullDay),
        ];

        let totals = aggregate_attendance(&entries, &Scope::default(), &week());
        assert_eq!(totals[&PairKey::new(w, s)], dec!(2.0));
    }

    #[test]
    fn test_aggregate_attendance_respects_range_and_scope() {
        let (w, s1, s2) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let entries = vec![
            entry(w, s1, day(1), ShiftType::FullDay),
            entry(w, s1, day(2), ShiftType::FullDay),
            entry(w, s2, day(3), ShiftType::FullDay),
            entry(w, s1, day(9), ShiftType::FullDay),
        ];

        let all_sites = aggregate_attendance(&entries, &Scope::default(), &week());
        assert_eq!(all_sites.len(), 2);
        assert_eq!(all_sites[&PairKey::new(w, s1)], dec!(1.0));

        let one_site = aggregate_attendance(&entries, &Scope::site(Some(s2)), &week());
        assert_eq!(one_site.len(), 1);
        assert_eq!(one_site[&PairKey::new(w, s2)], dec!(1.0));

        let other_worker = Scope { site_id: None, worker_id: Some(Uuid::new_v4()) };
        assert!(aggregate_attendance(&entries, &other_worker, &week()).is_empty());
    }

    #[test]
    fn test_aggregate_advances() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());

        let entries = vec![
            advance(w, s, day(3), dec!(200)),
            advance(w, s, day(7), dec!(150.50)),
            advance(w, s, day(10), dec!(999)),
        ];

        let totals = aggregate_advances(&entries, &Scope::default(), &week());
        assert_eq!(totals[&PairKey::new(w, s)], dec!(350.50));
    }

    #[test]
    fn test_orphaned_pairs() {
        let assigned = PairKey::new(Uuid::new_v4(), Uuid::new_v4());
        let stray = PairKey::new(Uuid::new_v4(), Uuid::new_v4());

        let totals = PairTotals::from([(assigned, dec!(1)), (stray, dec!(0.5))]);

        assert_eq!(orphaned_pairs(&totals, |pair| *pair == assigned), vec![stray]);
    }
}
