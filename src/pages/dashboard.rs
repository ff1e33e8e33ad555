//! Cost and headcount roll-ups behind the admin and supervisor dashboards.
//!
//! Salary cost is the gross of every stored salary log, paid or not. Advances
//! are already inside that figure, the supervisor summary lists them apart.

use std::collections::{BTreeMap, BTreeSet};

use actix_web::{get, web, Responder};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::Admin,
    consts::RECENT_ACTIVITY_LIMIT,
    entity::{activity_log, advance, material_log, prelude::*, project, salary_log, sea_orm_active_enums::RoleType, user, worker_assignment},
    error::ApiError,
};

use super::access::SiteScope;

pub(super) fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(admin_dashboard_summary)
        .service(project_summaries);
}

pub(super) fn supervisor_config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(supervisor_dashboard_summary)
        .service(site_summaries);
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteSummary {
    site_id: Uuid,
    name: String,
    location: String,
    start_date: NaiveDate,
    total_workers: usize,
    total_material_cost: Decimal,
    total_salary_cost: Decimal,
    overall_cost: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentActivity {
    id: Uuid,
    site_id: Uuid,
    site_name: Option<String>,
    message: String,
    date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminSummary {
    total_projects: usize,
    total_workers: u64,
    total_supervisors: u64,
    total_material_cost: Decimal,
    total_salary_cost: Decimal,
    overall_total_cost: Decimal,
    recent_activities: Vec<RecentActivity>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SupervisorSummary {
    total_assigned_sites: usize,
    total_workers_across_assigned_sites: usize,
    total_material_cost: Decimal,
    total_salary_cost: Decimal,
    total_advance_given: Decimal,
    overall_total_cost: Decimal,
    recent_activities: Vec<RecentActivity>,
}

fn sum_by_site(amounts: impl IntoIterator<Item = (Uuid, Decimal)>) -> BTreeMap<Uuid, Decimal> {
    amounts.into_iter().fold(BTreeMap::new(), |mut totals, (site_id, amount)| {
        *totals.entry(site_id).or_insert(Decimal::ZERO) += amount;
        totals
    })
}

/// Per-site figures of every site in a scope, plus the workers assigned across them
struct Rollup {
    sites: Vec<SiteSummary>,
    workers: BTreeSet<Uuid>,
}

impl Rollup {
    async fn load<C: ConnectionTrait>(db: &C, scope: &SiteScope) -> Result<Self, ApiError> {
        let projects = scope.apply(Project::find(), project::Column::Id)
            .order_by_asc(project::Column::Name)
            .all(db).await?;
        let assignments = scope.apply(WorkerAssignment::find(), worker_assignment::Column::ProjectId)
            .all(db).await?;
        let materials = scope.apply(MaterialLog::find(), material_log::Column::SiteId)
            .all(db).await?;
        let salaries = scope.apply(SalaryLog::find(), salary_log::Column::SiteId)
            .all(db).await?;

        let staffed = assignments.iter().fold(BTreeMap::<Uuid, usize>::new(), |mut counts, a| {
            *counts.entry(a.project_id).or_default() += 1;
            counts
        });
        let material_costs = sum_by_site(materials.iter().map(|m| (m.site_id, m.total_cost)));
        let salary_costs = sum_by_site(salaries.iter().map(|l| (l.site_id, l.gross_salary)));

        let sites = projects.into_iter()
            .map(|p| {
                let total_material_cost = material_costs.get(&p.id).copied().unwrap_or_default();
                let total_salary_cost = salary_costs.get(&p.id).copied().unwrap_or_default();

                SiteSummary {
                    site_id: p.id,
                    total_workers: staffed.get(&p.id).copied().unwrap_or_default(),
                    total_material_cost,
                    total_salary_cost,
                    overall_cost: total_material_cost + total_salary_cost,
                    name: p.name,
                    location: p.location,
                    start_date: p.start_date,
                }
            })
            .collect();

        Ok(Rollup {
            sites,
            workers: assignments.iter().map(|a| a.worker_id).collect(),
        })
    }

    fn material_cost(&self) -> Decimal {
        self.sites.iter().map(|s| s.total_material_cost).sum()
    }

    fn salary_cost(&self) -> Decimal {
        self.sites.iter().map(|s| s.total_salary_cost).sum()
    }

    /// Newest activities first, named after the rolled up sites
    async fn recent_activities<C: ConnectionTrait>(&self, db: &C, scope: &SiteScope) -> Result<Vec<RecentActivity>, ApiError> {
        let names = self.sites.iter()
            .map(|s| (s.site_id, s.name.as_str()))
            .collect::<BTreeMap<_, _>>();

        let activities = scope.apply(ActivityLog::find(), activity_log::Column::SiteId)
            .order_by_desc(activity_log::Column::Date)
            .order_by_desc(activity_log::Column::CreatedAt)
            .limit(RECENT_ACTIVITY_LIMIT)
            .all(db).await?;

        Ok(activities.into_iter()
            .map(|a| RecentActivity {
                site_name: names.get(&a.site_id).map(|name| name.to_string()),
                id: a.id,
                site_id: a.site_id,
                message: a.message,
                date: a.date,
            })
            .collect())
    }
}

#[get("/dashboard-summary")]
async fn admin_dashboard_summary(db: web::Data<DatabaseConnection>, _admin: Admin) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();
    let rollup = Rollup::load(db, &SiteScope::All).await?;

    let total_workers = Worker::find().count(db).await?;
    let total_supervisors = User::find()
        .filter(user::Column::Role.eq(RoleType::Supervisor))
        .count(db).await?;

    let (total_material_cost, total_salary_cost) = (rollup.material_cost(), rollup.salary_cost());

    Ok(web::Json(AdminSummary {
        total_projects: rollup.sites.len(),
        total_workers,
        total_supervisors,
        total_material_cost,
        total_salary_cost,
        overall_total_cost: total_material_cost + total_salary_cost,
        recent_activities: rollup.recent_activities(db, &SiteScope::All).await?,
    }))
}

#[get("/project-summaries")]
async fn project_summaries(db: web::Data<DatabaseConnection>, _admin: Admin) -> Result<impl Responder, ApiError> {
    let rollup = Rollup::load(db.get_ref(), &SiteScope::All).await?;

    Ok(web::Json(rollup.sites))
}

/// Same figures as the admin summary, narrowed to the caller's sites
#[get("/dashboard-summary")]
async fn supervisor_dashboard_summary(db: web::Data<DatabaseConnection>, user: user::Model) -> Result<impl Responder, ApiError> {
    let db = db.get_ref();
    let scope = SiteScope::resolve(db, &user, None).await?;
    let rollup = Rollup::load(db, &scope).await?;

    let total_advance_given = scope.apply(Advance::find(), advance::Column::SiteId)
        .all(db).await?
        .iter()
        .map(|a| a.amount)
        .sum();

    let (total_material_cost, total_salary_cost) = (rollup.material_cost(), rollup.salary_cost());

    Ok(web::Json(SupervisorSummary {
        total_assigned_sites: rollup.sites.len(),
        total_workers_across_assigned_sites: rollup.workers.len(),
        total_material_cost,
        total_salary_cost,
        total_advance_given,
        overall_total_cost: total_material_cost + total_salary_cost,
        recent_activities: rollup.recent_activities(db, &scope).await?,
    }))
}

#[get("/site-summaries")]
async fn site_summaries(db: web::Data<DatabaseConnection>, user: user::Model) -> Result<impl Responder, ApiError> {
    let scope = SiteScope::resolve(db.get_ref(), &user, None).await?;
    let rollup = Rollup::load(db.get_ref(), &scope).await?;

    Ok(web::Json(rollup.sites))
}
