use actix_web::{get, post, put, web, Responder};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{auth::Admin, entity::{prelude::*, salary_log, user}, error::ApiError, payroll::{self, CalculationSummary}, utils::empty_string_as_none};

use super::access::SiteScope;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(calculate_weekly_salaries)
        .service(list_salary_logs)
        .service(set_paid_bulk)
        .service(set_paid);
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculateSalaries {
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    site_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct CalculationResponse {
    message: String,
    #[serde(flatten)]
    summary: CalculationSummary,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SalaryLogFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    site_id: Option<Uuid>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    worker_id: Option<Uuid>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    paid_status: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PaidStatus {
    paid: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct BulkPaidStatus {
    ids: Vec<Uuid>,
    paid: bool,
}

#[post("/calculate-weekly-salaries")]
async fn calculate_weekly_salaries(db: web::Data<DatabaseConnection>, admin: Admin, payload: web::Json<CalculateSalaries>) -> Result<impl Responder, ApiError> {
    let summary = payroll::calculate_weekly_salaries(db.get_ref(), &admin, payload.start_date, payload.end_date, payload.site_id).await?;

    let message = format!(
        "Weekly salaries calculated: {} created, {} updated, {} failed",
        summary.created, summary.updated, summary.failed.len()
    );

    Ok(web::Json(CalculationResponse { message, summary }))
}

/// A log is listed when its week overlaps the requested dates
#[get("/salary-logs")]
async fn list_salary_logs(db: web::Data<DatabaseConnection>, user: user::Model, filter: web::Query<SalaryLogFilter>) -> Result<impl Responder, ApiError> {
    let scope = SiteScope::resolve(db.get_ref(), &user, filter.site_id).await?;

    let mut query = scope.apply(SalaryLog::find(), salary_log::Column::SiteId);

    if let Some(worker_id) = filter.worker_id {
        query = query.filter(salary_log::Column::WorkerId.eq(worker_id));
    }
    if let Some(start) = filter.start_date {
        query = query.filter(salary_log::Column::WeekEnd.gte(start));
    }
    if let Some(end) = filter.end_date {
        query = query.filter(salary_log::Column::WeekStart.lte(end));
    }
    if let Some(paid) = filter.paid_status {
        query = query.filter(salary_log::Column::Paid.eq(paid));
    }

    let logs = query
        .order_by_desc(salary_log::Column::WeekStart)
        .order_by_asc(salary_log::Column::WorkerId)
        .all(db.get_ref()).await?;

    Ok(web::Json(logs))
}

#[put("/salary-logs/{id}/paid")]
async fn set_paid(db: web::Data<DatabaseConnection>, admin: Admin, id: web::Path<Uuid>, payload: web::Json<PaidStatus>) -> Result<impl Responder, ApiError> {
    let log = payroll::set_paid(db.get_ref(), &admin, *id, payload.paid).await?;

    Ok(web::Json(log))
}

#[put("/salary-logs/paid")]
async fn set_paid_bulk(db: web::Data<DatabaseConnection>, admin: Admin, payload: web::Json<BulkPaidStatus>) -> impl Responder {
    let outcome = payroll::set_paid_bulk(db.get_ref(), &admin, &payload.ids, payload.paid).await;

    info!(
        paid = payload.paid,
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        by = %admin.id,
        "bulk payment status update"
    );

    web::Json(outcome)
}
