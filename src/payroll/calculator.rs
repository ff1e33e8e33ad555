use std::collections::BTreeSet;

use chrono::{Days, Local, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use sea_orm::{sea_query::OnConflict, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{consts::WEEK_LENGTH_DAYS, entity::{prelude::*, salary_log, user}};

use super::{
    aggregate::{aggregate_advances, aggregate_attendance, fetch_advances, fetch_attendance, orphaned_pairs},
    rate::RateBook,
    PairKey, PayrollError, Scope, WeekWindow,
};

/// Consecutive 7-day windows starting at `start`, the last one cut short at `end`
pub fn partition_weeks(start: NaiveDate, end: NaiveDate) -> Vec<WeekWindow> {
    let mut weeks = Vec::new();
    let mut week_start = start;

    while week_start <= end {
        let week_end = week_start
            .checked_add_days(Days::new(WEEK_LENGTH_DAYS - 1))
            .map_or(end, |d| d.min(end));

        weeks.push(WeekWindow { start: week_start, end: week_end });

        match week_end.succ_opt() {
            Some(next) => week_start = next,
            None => break,
        }
    }

    weeks
}

/// Two decimal places, half away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Exclusive bound of a `numeric(12, 2)` money column
const MONEY_LIMIT: Decimal = dec!(10_000_000_000);

/// Whether a `numeric(12, 2)` column stores `amount` as is, without rounding or overflowing
pub fn fits_money_column(amount: Decimal) -> bool {
    amount.normalize().scale() <= 2 && amount.abs() < MONEY_LIMIT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryFigures {
    pub total_attendance_days: Decimal,
    pub gross_salary: Decimal,
    pub total_advance_deducted: Decimal,
    /// Negative when advances exceed earnings, never floored
    pub net_salary: Decimal,
}

impl SalaryFigures {
    pub fn compute(total_attendance_days: Decimal, daily_rate: Decimal, total_advance_deducted: Decimal) -> Self {
        let gross_salary = round_money(total_attendance_days * daily_rate);
        let total_advance_deducted = round_money(total_advance_deducted);

        Self {
            total_attendance_days,
            gross_salary,
            total_advance_deducted,
            net_salary: gross_salary - total_advance_deducted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairFailure {
    pub worker_id: Uuid,
    pub site_id: Uuid,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub reason: String,
}

impl PairFailure {
    fn new(pair: &PairKey, week: &WeekWindow, reason: impl ToString) -> Self {
        Self {
            worker_id: pair.worker_id,
            site_id: pair.site_id,
            week_start: week.start,
            week_end: week.end,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationSummary {
    pub created: usize,
    pub updated: usize,
    pub failed: Vec<PairFailure>,
    /// Pairs that had entries without a matching worker assignment
    pub orphaned: Vec<PairKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upserted {
    Created,
    Updated,
}

impl Upserted {
    /// A conflicting row keeps its own id, so only a fresh insert returns the id we sent
    fn of(sent_id: Uuid, saved: &salary_log::Model) -> Self {
        if saved.id == sent_id { Upserted::Created } else { Upserted::Updated }
    }
}

fn salary_log_model(id: Uuid, actor: &user::Model, pair: &PairKey, week: &WeekWindow, figures: &SalaryFigures) -> salary_log::ActiveModel {
    let now = Local::now().fixed_offset();

    salary_log::ActiveModel {
        id: Set(id),
        created_at: Set(now),
        updated_at: Set(now),
        created_by: Set(Some(actor.id)),
        updated_by: Set(Some(actor.id)),
        worker_id: Set(pair.worker_id),
        site_id: Set(pair.site_id),
        week_start: Set(week.start),
        week_end: Set(week.end),
        total_attendance_days: Set(figures.total_attendance_days),
        gross_salary: Set(figures.gross_salary),
        total_advance_deducted: Set(figures.total_advance_deducted),
        net_salary: Set(figures.net_salary),
        paid: Set(false),
        payment_date: Set(None),
    }
}

/// On a key collision only the computed figures and the audit columns are
/// overwritten; `paid` and `payment_date` belong to the ledger.
fn salary_log_conflict() -> OnConflict {
    OnConflict::columns([
        salary_log::Column::WorkerId,
        salary_log::Column::SiteId,
        salary_log::Column::WeekStart,
        salary_log::Column::WeekEnd,
    ])
    .update_columns([
        salary_log::Column::TotalAttendanceDays,
        salary_log::Column::GrossSalary,
        salary_log::Column::TotalAdvanceDeducted,
        salary_log::Column::NetSalary,
        salary_log::Column::UpdatedAt,
        salary_log::Column::UpdatedBy,
    ])
    .to_owned()
}

/// Single `INSERT .. ON CONFLICT DO UPDATE`, so concurrent runs over the same
/// week can never both create a row for one key
async fn upsert_salary_log<C: ConnectionTrait>(
    db: &C,
    actor: &user::Model,
    pair: &PairKey,
    week: &WeekWindow,
    figures: &SalaryFigures,
) -> Result<Upserted, DbErr> {
    let id = Uuid::new_v4();

    let saved = SalaryLog::insert(salary_log_model(id, actor, pair, week, figures))
        .on_conflict(salary_log_conflict())
        .exec_with_returning(db).await?;

    Ok(Upserted::of(id, &saved))
}

/// Keys of the salary logs already stored for weeks starting inside the span
async fn fetch_logged_pairs<C: ConnectionTrait>(
    db: &C,
    scope: &Scope,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(PairKey, WeekWindow)>, DbErr> {
    let mut query = SalaryLog::find()
        .filter(salary_log::Column::WeekStart.between(start, end));

    if let Some(site_id) = scope.site_id {
        query = query.filter(salary_log::Column::SiteId.eq(site_id));
    }

    let logs = query.all(db).await?;

    Ok(logs.into_iter()
        .map(|log| (PairKey::new(log.worker_id, log.site_id), WeekWindow { start: log.week_start, end: log.week_end }))
        .collect())
}

/// Computes and stores the weekly salary of every worker/site pair with
/// attendance or advances between `start` and `end`.
///
/// Rerunning over unchanged entries rewrites identical figures. A stored log
/// of one of the run's weeks whose entries are all gone is reset to zero
/// figures, its paid status untouched. Problems with a single pair are
/// collected in the summary and the run carries on; logs written before a
/// failure or cancellation stay written.
pub async fn calculate_weekly_salaries<C: ConnectionTrait>(
    db: &C,
    actor: &user::Model,
    start: NaiveDate,
    end: NaiveDate,
    site_id: Option<Uuid>,
) -> Result<CalculationSummary, PayrollError> {
    if end < start {
        return Err(PayrollError::InvalidDateRange { start, end });
    }

    if let Some(site_id) = site_id {
        Project::find_by_id(site_id)
            .one(db).await?
            .ok_or(PayrollError::SiteNotFound(site_id))?;
    }

    let scope = Scope::site(site_id);
    let attendance = fetch_attendance(db, &scope, start, end).await?;
    let advances = fetch_advances(db, &scope, start, end).await?;

    let logged = fetch_logged_pairs(db, &scope, start, end).await?;

    let mut summary = CalculationSummary::default();

    let worker_ids = attendance.iter().map(|e| e.worker_id)
        .chain(advances.iter().map(|e| e.worker_id))
        .collect::<BTreeSet<_>>();

    if worker_ids.is_empty() && logged.is_empty() {
        info!(%start, %end, ?site_id, "no attendance or advances to calculate");
        return Ok(summary);
    }

    let rates = if worker_ids.is_empty() {
        RateBook::default()
    } else {
        RateBook::load(db, &worker_ids).await?
    };
    let mut orphaned = BTreeSet::new();

    for week in partition_weeks(start, end) {
        let days = aggregate_attendance(&attendance, &scope, &week);
        let advanced = aggregate_advances(&advances, &scope, &week);

        orphaned.extend(orphaned_pairs(&days, |pair| rates.is_assigned(pair)));
        orphaned.extend(orphaned_pairs(&advanced, |pair| rates.is_assigned(pair)));

        let pairs = days.keys().chain(advanced.keys()).copied().collect::<BTreeSet<_>>();

        // Logs whose entries were all deleted or moved since the last run
        let emptied = logged.iter()
            .filter(|(pair, logged_week)| *logged_week == week && !pairs.contains(pair))
            .map(|(pair, _)| *pair)
            .collect::<BTreeSet<_>>();

        let mut writes = Vec::with_capacity(pairs.len() + emptied.len());

        for pair in pairs {
            let rate = match rates.resolve(&pair) {
                Ok(rate) => rate,
                Err(err) => {
                    warn!(worker_id = %pair.worker_id, site_id = %pair.site_id, week_start = %week.start, error = %err, "skipping salary");
                    summary.failed.push(PairFailure::new(&pair, &week, err));
                    continue;
                }
            };

            writes.push((pair, SalaryFigures::compute(
                days.get(&pair).copied().unwrap_or_default(),
                rate,
                advanced.get(&pair).copied().unwrap_or_default(),
            )));
        }

        for pair in emptied {
            info!(worker_id = %pair.worker_id, site_id = %pair.site_id, week_start = %week.start, "clearing salary log without entries");
            writes.push((pair, SalaryFigures::compute(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)));
        }

        for (pair, figures) in writes {
            match upsert_salary_log(db, actor, &pair, &week, &figures).await {
                Ok(Upserted::Created) => summary.created += 1,
                Ok(Upserted::Updated) => summary.updated += 1,
                Err(err) => {
                    error!(worker_id = %pair.worker_id, site_id = %pair.site_id, week_start = %week.start, error = %err, "unable to store salary log");
                    summary.failed.push(PairFailure::new(&pair, &week, PayrollError::Database(err)));
                }
            }
        }
    }

    summary.orphaned = orphaned.into_iter().collect();

    info!(
        %start, %end, ?site_id,
        created = summary.created,
        updated = summary.updated,
        failed = summary.failed.len(),
        "weekly salaries calculated"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait as _};

    use crate::entity::{advance, attendance, project, role, sea_orm_active_enums::{RoleType, ShiftType}, worker, worker_assignment};

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn admin() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            username: "admin".to_string(),
            password: Vec::new(),
            role: RoleType::Admin,
        }
    }

    fn site(id: Uuid) -> project::Model {
        project::Model {
            id,
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            name: "Riverside Towers".to_string(),
            site_type: "Residential".to_string(),
            location: "Pune".to_string(),
            start_date: day(1),
        }
    }

    fn worker(id: Uuid, base_salary: Option<Decimal>) -> worker::Model {
        worker::Model {
            id,
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            name: "Suresh".to_string(),
            role: "Mason".to_string(),
            base_salary,
            rfid_id: Some("04A2B9".to_string()),
        }
    }

    fn mark(worker_id: Uuid, site_id: Uuid, date: NaiveDate, shift_type: ShiftType) -> attendance::Model {
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
            reason: "rent".to_string(),
        }
    }

    fn stored_log(worker_id: Uuid, site_id: Uuid, week: &WeekWindow, figures: &SalaryFigures, paid: bool) -> salary_log::Model {
        salary_log::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            worker_id,
            site_id,
            week_start: week.start,
            week_end: week.end,
            total_attendance_days: figures.total_attendance_days,
            gross_salary: figures.gross_salary,
            total_advance_deducted: figures.total_advance_deducted,
            net_salary: figures.net_salary,
            paid,
            payment_date: paid.then(|| Local::now().fixed_offset()),
        }
    }

    #[test]
    fn test_partition_weeks() {
        assert_eq!(partition_weeks(day(2), day(15)), vec![
            WeekWindow { start: day(2), end: day(8) },
            WeekWindow { start: day(9), end: day(15) },
        ]);

        assert_eq!(partition_weeks(day(4), day(12)), vec![
            WeekWindow { start: day(4), end: day(10) },
            WeekWindow { start: day(11), end: day(12) },
        ]);

        assert_eq!(partition_weeks(day(4), day(4)), vec![ WeekWindow { start: day(4), end: day(4) } ]);
        assert!(partition_weeks(day(5), day(4)).is_empty());
    }

    #[test]
    fn test_example_week() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());
        let week = WeekWindow { start: day(2), end: day(8) };

        let entries = vec![
            mark(w, s, day(2), ShiftType::FullDay),
            mark(w, s, day(4), ShiftType::HalfDayMorning),
            mark(w, s, day(6), ShiftType::OneAndAHalfDay),
        ];
        let advances = vec![ advance(w, s, day(5), dec!(200)) ];

        let pair = PairKey::new(w, s);
        let days = aggregate_attendance(&entries, &Scope::default(), &week)[&pair];
        let advanced = aggregate_advances(&advances, &Scope::default(), &week)[&pair];

        let figures = SalaryFigures::compute(days, dec!(500), advanced);
        assert_eq!(figures.total_attendance_days, dec!(3.0));
        assert_eq!(figures.gross_salary, dec!(1500));
        assert_eq!(figures.total_advance_deducted, dec!(200));
        assert_eq!(figures.net_salary, dec!(1300));
    }

    #[test]
    fn test_negative_net_salary_is_kept() {
        let figures = SalaryFigures::compute(dec!(1.0), dec!(500), dec!(800));

        assert_eq!(figures.gross_salary, dec!(500));
        assert_eq!(figures.net_salary, dec!(-300));
    }

    #[test]
    fn test_advance_only_week() {
        let figures = SalaryFigures::compute(Decimal::ZERO, dec!(500), dec!(250));

        assert_eq!(figures.gross_salary, Decimal::ZERO);
        assert_eq!(figures.net_salary, dec!(-250));
    }

    #[test]
    fn test_money_is_rounded_to_cents() {
        let figures = SalaryFigures::compute(dec!(0.5), dec!(333.33), Decimal::ZERO);

        assert_eq!(figures.gross_salary, dec!(166.67));
    }

    #[test]
    fn test_figures_are_deterministic() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());
        let week = WeekWindow { start: day(2), end: day(8) };

        let entries = vec![
            mark(w, s, day(3), ShiftType::HalfDayEvening),
            mark(w, s, day(3), ShiftType::FullDay),
            mark(w, s, day(7), ShiftType::OneAndAHalfDay),
        ];

        let run = || SalaryFigures::compute(
            aggregate_attendance(&entries, &Scope::default(), &week)[&PairKey::new(w, s)],
            dec!(612.50),
            dec!(100),
        );

        assert_eq!(run(), run());
    }

    #[test]
    fn test_upsert_never_overwrites_paid_status() {
        let week = WeekWindow { start: day(2), end: day(8) };
        let pair = PairKey::new(Uuid::new_v4(), Uuid::new_v4());
        let figures = SalaryFigures::compute(dec!(3), dec!(500), dec!(200));

        let sql = SalaryLog::insert(salary_log_model(Uuid::new_v4(), &admin(), &pair, &week, &figures))
            .on_conflict(salary_log_conflict())
            .build(DatabaseBackend::Postgres)
            .to_string();

        let (_, on_conflict) = sql.split_once("ON CONFLICT").expect("upsert must carry an ON CONFLICT clause");

        assert!(on_conflict.contains(r#"("worker_id", "site_id", "week_start", "week_end")"#));
        assert!(on_conflict.contains(r#""net_salary" = "excluded"."net_salary""#));
        assert!(on_conflict.contains(r#""total_attendance_days" = "excluded"."total_attendance_days""#));
        assert!(!on_conflict.contains(r#""paid""#));
        assert!(!on_conflict.contains(r#""payment_date""#));
        assert!(!on_conflict.contains(r#""created_at""#));
    }

    #[test]
    fn test_fits_money_column() {
        assert!(fits_money_column(dec!(1500.50)));
        assert!(fits_money_column(dec!(12.500)));
        assert!(fits_money_column(dec!(9_999_999_999.99)));
        assert!(fits_money_column(dec!(-300)));

        assert!(!fits_money_column(dec!(0.001)));
        assert!(!fits_money_column(dec!(10_000_000_000)));
    }

    #[test]
    fn test_upsert_outcome() {
        let week = WeekWindow { start: day(2), end: day(8) };
        let figures = SalaryFigures::compute(dec!(1), dec!(500), Decimal::ZERO);
        let log = stored_log(Uuid::new_v4(), Uuid::new_v4(), &week, &figures, false);

        assert_eq!(Upserted::of(log.id, &log), Upserted::Created);
        assert_eq!(Upserted::of(Uuid::new_v4(), &log), Upserted::Updated);
    }

    #[actix_web::test]
    async fn test_invalid_date_range() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = calculate_weekly_salaries(&db, &admin(), day(9), day(2), None).await.unwrap_err();
        assert!(matches!(err, PayrollError::InvalidDateRange { .. }));
    }

    #[actix_web::test]
    async fn test_unknown_site() {
        let site_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<project::Model>::new()])
            .into_connection();

        let err = calculate_weekly_salaries(&db, &admin(), day(2), day(8), Some(site_id)).await.unwrap_err();
        assert!(matches!(err, PayrollError::SiteNotFound(id) if id == site_id));
    }

    #[actix_web::test]
    async fn test_nothing_to_calculate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<attendance::Model>::new()])
            .append_query_results([Vec::<advance::Model>::new()])
            .append_query_results([Vec::<salary_log::Model>::new()])
            .into_connection();

        let summary = calculate_weekly_salaries(&db, &admin(), day(2), day(8), None).await.unwrap();
        assert_eq!((summary.created, summary.updated), (0, 0));
        assert!(summary.failed.is_empty());
    }

    #[actix_web::test]
    async fn test_recompute_keeps_paid_log() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());
        let week = WeekWindow { start: day(2), end: day(8) };

        // The paid row the database hands back after the conflict update
        let recomputed = SalaryFigures::compute(dec!(4.0), dec!(500), dec!(200));
        let existing = stored_log(w, s, &week, &recomputed, true);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ site(s) ]])
            .append_query_results([vec![
                mark(w, s, day(2), ShiftType::FullDay),
                mark(w, s, day(4), ShiftType::HalfDayMorning),
                mark(w, s, day(6), ShiftType::OneAndAHalfDay),
                mark(w, s, day(7), ShiftType::FullDay),
            ]])
            .append_query_results([vec![ advance(w, s, day(5), dec!(200)) ]])
            .append_query_results([vec![ existing.clone() ]])
            .append_query_results([vec![ worker(w, Some(dec!(500))) ]])
            .append_query_results([vec![ worker_assignment::Model { worker_id: w, project_id: s, salary_override: None } ]])
            .append_query_results([vec![ role::Model {
                id: Uuid::new_v4(),
                created_at: Local::now().into(),
                updated_at: Local::now().into(),
                role_name: "Mason".to_string(),
                default_salary: dec!(450),
            } ]])
            .append_query_results([vec![ existing.clone() ]])
            .into_connection();

        let summary = calculate_weekly_salaries(&db, &admin(), day(2), day(8), Some(s)).await.unwrap();

        assert_eq!(summary.created, 0);
        assert_eq!(summary.updated, 1);
        assert!(summary.failed.is_empty());
        assert!(summary.orphaned.is_empty());

        // The mock hands back whatever row it is given, so the kept paid status
        // is asserted on the statement itself in test_upsert_never_overwrites_paid_status
        let upsert = format!("{:?}", db.into_transaction_log().last().unwrap());
        assert!(upsert.contains("ON CONFLICT"));
    }

    #[actix_web::test]
    async fn test_log_without_entries_is_reset() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());
        let week = WeekWindow { start: day(2), end: day(8) };

        // Paid 1500 for a week whose only attendance entries were deleted afterwards
        let stale = stored_log(w, s, &week, &SalaryFigures::compute(dec!(3.0), dec!(500), Decimal::ZERO), true);
        let reset = salary_log::Model {
            total_attendance_days: Decimal::ZERO,
            gross_salary: Decimal::ZERO,
            total_advance_deducted: Decimal::ZERO,
            net_salary: Decimal::ZERO,
            ..stale.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<attendance::Model>::new()])
            .append_query_results([Vec::<advance::Model>::new()])
            .append_query_results([vec![ stale.clone() ]])
            .append_query_results([vec![ reset ]])
            .into_connection();

        let summary = calculate_weekly_salaries(&db, &admin(), day(2), day(8), None).await.unwrap();

        assert_eq!((summary.created, summary.updated), (0, 1));
        assert!(summary.failed.is_empty());

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 4);

        let upsert = format!("{:?}", log[3]);
        assert!(upsert.contains("INSERT INTO"));
        assert!(upsert.contains("ON CONFLICT"));
    }

    #[actix_web::test]
    async fn test_logs_of_other_weeks_are_left_alone() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());

        // Stored by an earlier run anchored on a different day
        let other_anchor = WeekWindow { start: day(4), end: day(10) };
        let stored = stored_log(w, s, &other_anchor, &SalaryFigures::compute(dec!(1.0), dec!(500), Decimal::ZERO), false);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<attendance::Model>::new()])
            .append_query_results([Vec::<advance::Model>::new()])
            .append_query_results([vec![ stored ]])
            .into_connection();

        let summary = calculate_weekly_salaries(&db, &admin(), day(2), day(15), None).await.unwrap();

        assert_eq!((summary.created, summary.updated), (0, 0));
        assert_eq!(db.into_transaction_log().len(), 3);
    }

    #[actix_web::test]
    async fn test_pair_failures_do_not_abort_the_run() {
        let (paid_worker, unpriced_worker, s) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let week = WeekWindow { start: day(2), end: day(8) };

        let priced = SalaryFigures::compute(dec!(1.0), dec!(500), Decimal::ZERO);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                mark(paid_worker, s, day(3), ShiftType::FullDay),
                mark(unpriced_worker, s, day(3), ShiftType::FullDay),
            ]])
            .append_query_results([Vec::<advance::Model>::new()])
            .append_query_results([Vec::<salary_log::Model>::new()])
            .append_query_results([vec![
                worker(paid_worker, Some(dec!(500))),
                worker(unpriced_worker, None),
            ]])
            .append_query_results([Vec::<worker_assignment::Model>::new()])
            .append_query_results([Vec::<role::Model>::new()])
            .append_query_results([vec![ stored_log(paid_worker, s, &week, &priced, false) ]])
            .into_connection();

        let summary = calculate_weekly_salaries(&db, &admin(), day(2), day(8), None).await.unwrap();

        assert_eq!(summary.created + summary.updated, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].worker_id, unpriced_worker);
        assert_eq!(summary.failed[0].week_start, day(2));

        // Neither worker is assigned to the site, both are still processed
        let mut orphaned = summary.orphaned.iter().map(|p| p.worker_id).collect::<Vec<_>>();
        orphaned.sort();
        let mut expected = vec![ paid_worker, unpriced_worker ];
        expected.sort();
        assert_eq!(orphaned, expected);
    }
}
