use std::collections::{BTreeSet, HashMap};

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Local;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::{NotSet, Set, Unchanged}, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{auth::Admin, entity::{prelude::*, role, user, worker, worker_assignment}, error::ApiError};

use super::access::ensure_sites_exist;

use model::*;

mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_workers)
        .service(get_worker)
        .service(create_worker)
        .service(update_worker)
        .service(delete_worker);
}

/// A worker's form owns the worker's side of `worker_assignment`
struct ValidWorker {
    name: String,
    role: String,
    base_salary: Option<Decimal>,
    rfid_id: Option<String>,
    assignments: Vec<AssignedProject>,
}

async fn validate<C: ConnectionTrait>(db: &C, payload: &WorkerPayload) -> Result<ValidWorker, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }

    let salaries = payload.base_salary.iter()
        .chain(payload.assigned_projects.iter().filter_map(|ap| ap.project_salary.as_ref()));
    for salary in salaries {
        if *salary < Decimal::ZERO {
            return Err(ApiError::BadRequest("salaries cannot be negative".to_string()));
        }
    }

    let sites = payload.assigned_projects.iter().map(|ap| ap.site_id).collect::<BTreeSet<_>>();
    if sites.len() != payload.assigned_projects.len() {
        return Err(ApiError::BadRequest("a project can only be assigned once".to_string()));
    }

    let role = Role::find()
        .filter(role::Column::RoleName.eq(payload.role.trim()))
        .one(db).await?
        .ok_or_else(|| ApiError::BadRequest(format!("unknown role `{}`", payload.role.trim())))?;

    ensure_sites_exist(db, &sites).await?;

    Ok(ValidWorker {
        name: name.to_string(),
        role: role.role_name,
        base_salary: payload.base_salary,
        rfid_id: payload.rfid_id.as_deref().map(str::trim).filter(|id| !id.is_empty()).map(str::to_string),
        assignments: payload.assigned_projects.clone(),
    })
}

async fn load_assignments<C: ConnectionTrait>(db: &C, worker_ids: impl IntoIterator<Item = Uuid>) -> Result<HashMap<Uuid, Vec<AssignedProject>>, ApiError> {
    let mut assignments = HashMap::<Uuid, Vec<AssignedProject>>::new();

    for wa in WorkerAssignment::find()
        .filter(worker_assignment::Column::WorkerId.is_in(worker_ids))
        .all(db).await?
    {
        assignments.entry(wa.worker_id).or_default().push(AssignedProject {
            site_id: wa.project_id,
            project_salary: wa.salary_override,
        });
    }

    Ok(assignments)
}

async fn replace_assignments<C: ConnectionTrait>(db: &C, worker_id: Uuid, assignments: &[AssignedProject]) -> Result<(), ApiError> {
    WorkerAssignment::delete_many()
        .filter(worker_assignment::Column::WorkerId.eq(worker_id))
        .exec(db).await?;

    if assignments.is_empty() {
        return Ok(());
    }

    WorkerAssignment::insert_many(assignments.iter().map(|ap| worker_assignment::ActiveModel {
        worker_id: Set(worker_id),
        project_id: Set(ap.site_id),
        salary_override: Set(ap.project_salary),
    })).exec_without_returning(db).await?;

    Ok(())
}

#[get("")]
async fn list_workers(db: web::Data<DatabaseConnection>, _user: user::Model) -> Result<impl Responder, ApiError> {
    let workers = Worker::find()
        .order_by_asc(worker::Column::Name)
        .all(db.get_ref()).await?;

    let mut assignments = if workers.is_empty() {
        HashMap::new()
    } else {
        load_assignments(db.get_ref(), workers.iter().map(|w| w.id)).await?
    };

    Ok(web::Json(
        workers.into_iter()
            .map(|worker| WorkerDetails { assigned_projects: assignments.remove(&worker.id).unwrap_or_default(), worker })
            .collect::<Vec<_>>()
    ))
}

#[get("/{id}")]
async fn get_worker(db: web::Data<DatabaseConnection>, _user: user::Model, id: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let worker = Worker::find_by_id(*id)
        .one(db.get_ref()).await?
        .ok_or(ApiError::NotFound("worker"))?;

    let assigned_projects = load_assignments(db.get_ref(), [worker.id]).await?
        .remove(&worker.id)
        .unwrap_or_default();

    Ok(web::Json(WorkerDetails { worker, assigned_projects }))
}

#[post("")]
async fn create_worker(db: web::Data<DatabaseConnection>, admin: Admin, payload: web::Json<WorkerPayload>) -> Result<impl Responder, ApiError> {
    let valid = validate(db.get_ref(), &payload).await?;

    let txn = db.begin().await?;

    let worker = Worker::insert(worker::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        created_by: Set(Some(admin.id)),
        updated_by: Set(Some(admin.id)),
        name: Set(valid.name),
        role: Set(valid.role),
        base_salary: Set(valid.base_salary),
        rfid_id: Set(valid.rfid_id),
    }).exec_with_returning(&txn).await?;

    if !valid.assignments.is_empty() {
        WorkerAssignment::insert_many(valid.assignments.iter().map(|ap| worker_assignment::ActiveModel {
            worker_id: Set(worker.id),
            project_id: Set(ap.site_id),
            salary_override: Set(ap.project_salary),
        })).exec_without_returning(&txn).await?;
    }

    txn.commit().await?;

    info!(worker_id = %worker.id, by = %admin.id, "worker created");

    Ok(HttpResponse::Created().json(WorkerDetails { worker, assigned_projects: valid.assignments }))
}

#[put("/{id}")]
async fn update_worker(db: web::Data<DatabaseConnection>, admin: Admin, id: web::Path<Uuid>, payload: web::Json<WorkerPayload>) -> Result<impl Responder, ApiError> {
    let existing = Worker::find_by_id(*id)
        .one(db.get_ref()).await?
        .ok_or(ApiError::NotFound("worker"))?;

    let valid = validate(db.get_ref(), &payload).await?;

    let txn = db.begin().await?;

    let worker = Worker::update(worker::ActiveModel {
        id: Unchanged(existing.id),
        created_at: NotSet,
        updated_at: Set(Local::now().fixed_offset()),
        created_by: NotSet,
        updated_by: Set(Some(admin.id)),
        name: Set(valid.name),
        role: Set(valid.role),
        base_salary: Set(valid.base_salary),
        rfid_id: Set(valid.rfid_id),
    }).exec(&txn).await?;

    replace_assignments(&txn, worker.id, &valid.assignments).await?;

    txn.commit().await?;

    info!(worker_id = %worker.id, by = %admin.id, "worker updated");

    Ok(web::Json(WorkerDetails { worker, assigned_projects: valid.assignments }))
}

#[delete("/{id}")]
async fn delete_worker(db: web::Data<DatabaseConnection>, admin: Admin, id: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let result = Worker::delete_by_id(*id).exec(db.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound("worker"));
    }

    info!(worker_id = %id, by = %admin.id, "worker deleted");

    Ok(HttpResponse::NoContent().finish())
}
